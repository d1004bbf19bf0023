//! HTTP-level tests for the blocking client against a mock tacomail server.

use httpmock::prelude::*;
use serde_json::json;
use std::time::{Duration, Instant};
use tacomail_client::blocking::Client;
use tacomail_client::{Error, WaitOptions, WaitOutcome};

const ADDRESS: &str = "user@tacomail.de";

fn mail_json(id: &str, subject: &str) -> serde_json::Value {
    json!({
        "id": id,
        "from": {"address": "sender@example.com", "name": "Sender"},
        "to": {"address": ADDRESS, "name": ""},
        "subject": subject,
        "date": "2026-01-15T10:30:00Z",
        "body": {"text": "hello there", "html": ""},
        "headers": {},
        "attachments": []
    })
}

fn client(server: &MockServer) -> Client {
    Client::builder().base_url(server.base_url()).build().unwrap()
}

#[test]
fn get_inbox_parses_mail() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path(format!("/api/v1/mail/{ADDRESS}"));
        then.status(200).json_body(json!([mail_json("m-1", "hi")]));
    });

    let inbox = client(&server).get_inbox(ADDRESS, None).unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].id, "m-1");
    mock.assert();
}

#[test]
fn get_contact_email_extracts_field() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v1/contactEmail");
        then.status(200).json_body(json!({"email": "admin@tacomail.de"}));
    });

    assert_eq!(
        client(&server).get_contact_email().unwrap(),
        "admin@tacomail.de"
    );
}

#[test]
fn session_create_parses_response() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(format!("/api/v1/session/{ADDRESS}"));
        then.status(200).json_body(json!({
            "username": "user",
            "domain": "tacomail.de",
            "expires": 1_705_320_600_000i64
        }));
    });

    let session = client(&server).create_session("user", "tacomail.de").unwrap();
    assert_eq!(session.username, "user");
    assert_eq!(session.domain, "tacomail.de");
}

#[test]
fn http_errors_surface_as_request_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(format!("/api/v1/mail/{ADDRESS}/m-404"));
        then.status(404);
    });

    let err = client(&server).get_email(ADDRESS, "m-404").unwrap_err();
    assert!(matches!(err, Error::Request(_)));
}

#[test]
fn wait_matches_mail_already_present() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path(format!("/api/v1/mail/{ADDRESS}"));
        then.status(200).json_body(json!([mail_json("m-1", "verify")]));
    });

    let options = WaitOptions::new(Duration::ZERO, Duration::from_millis(100));
    let outcome = client(&server)
        .wait_for_mail_where(ADDRESS, |m| Ok(m.subject == "verify"), &options)
        .unwrap();

    match outcome {
        WaitOutcome::Matched(mail) => assert_eq!(mail.id, "m-1"),
        other => panic!("expected a match, got {other:?}"),
    }
    assert_eq!(mock.hits(), 1);
}

#[test]
fn wait_times_out_against_an_empty_inbox() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path(format!("/api/v1/mail/{ADDRESS}"));
        then.status(200).json_body(json!([]));
    });

    let options = WaitOptions::new(Duration::from_millis(300), Duration::from_millis(100));
    let start = Instant::now();
    let outcome = client(&server).wait_for_mail(ADDRESS, &options).unwrap();
    let elapsed = start.elapsed();

    assert_eq!(outcome, WaitOutcome::TimedOut);
    assert!(elapsed >= Duration::from_millis(300), "returned early: {elapsed:?}");
    assert!(mock.hits() >= 2);
}
