//! HTTP-level tests for the async client against a mock tacomail server.

use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use tacomail_client::{Client, Error, WaitError, WaitOptions, WaitOutcome};

const ADDRESS: &str = "user@tacomail.de";

fn mail_json(id: &str, subject: &str) -> serde_json::Value {
    json!({
        "id": id,
        "from": {"address": "sender@example.com", "name": "Sender"},
        "to": {"address": ADDRESS, "name": ""},
        "subject": subject,
        "date": "2026-01-15T10:30:00Z",
        "body": {"text": "hello there", "html": "<p>hello there</p>"},
        "headers": {"message-id": "<abc@example.com>"},
        "attachments": []
    })
}

fn client(server: &MockServer) -> Client {
    Client::builder().base_url(server.base_url()).build().unwrap()
}

#[tokio::test]
async fn get_contact_email_extracts_field() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/contactEmail");
            then.status(200).json_body(json!({"email": "admin@tacomail.de"}));
        })
        .await;

    let contact = client(&server).get_contact_email().await.unwrap();
    assert_eq!(contact, "admin@tacomail.de");
    mock.assert_async().await;
}

#[tokio::test]
async fn get_contact_email_reports_missing_field() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/contactEmail");
            then.status(200).json_body(json!({"mail": "wrong-key"}));
        })
        .await;

    let err = client(&server).get_contact_email().await.unwrap_err();
    assert!(matches!(err, Error::ResponseParse(_)));
}

#[tokio::test]
async fn get_random_username_and_domains() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/randomUsername");
            then.status(200).json_body(json!({"username": "grumpy-taco"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/domains");
            then.status(200).json_body(json!(["tacomail.de", "taco.email"]));
        })
        .await;

    let client = client(&server);
    assert_eq!(client.get_random_username().await.unwrap(), "grumpy-taco");
    assert_eq!(
        client.get_domains().await.unwrap(),
        vec!["tacomail.de", "taco.email"]
    );

    let address = client.get_random_address().await.unwrap();
    let (user, domain) = address.split_once('@').unwrap();
    assert_eq!(user, "grumpy-taco");
    assert!(["tacomail.de", "taco.email"].contains(&domain));
}

#[tokio::test]
async fn get_inbox_parses_mail_and_forwards_limit() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("/api/v1/mail/{ADDRESS}"))
                .query_param("limit", "5");
            then.status(200)
                .json_body(json!([mail_json("m-1", "first"), mail_json("m-2", "second")]));
        })
        .await;

    let inbox = client(&server).get_inbox(ADDRESS, Some(5)).await.unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].id, "m-1");
    assert_eq!(inbox[1].subject, "second");
    assert_eq!(inbox[0].body.text, "hello there");
    mock.assert_async().await;
}

#[tokio::test]
async fn get_email_fetches_single_mail() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/api/v1/mail/{ADDRESS}/m-1"));
            then.status(200).json_body(mail_json("m-1", "hi"));
        })
        .await;

    let mail = client(&server).get_email(ADDRESS, "m-1").await.unwrap();
    assert_eq!(mail.id, "m-1");
    assert_eq!(mail.from.address, "sender@example.com");
}

#[tokio::test]
async fn attachments_are_listed_and_downloaded() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("/api/v1/mail/{ADDRESS}/m-1/attachments"));
            then.status(200)
                .json_body(json!([{"id": "a-1", "fileName": "notes.txt", "present": true}]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("/api/v1/mail/{ADDRESS}/m-1/attachments/a-1"));
            then.status(200).body("attachment bytes");
        })
        .await;

    let client = client(&server);
    let attachments = client.get_attachments(ADDRESS, "m-1").await.unwrap();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].file_name, "notes.txt");

    let bytes = client.download_attachment(ADDRESS, "m-1", "a-1").await.unwrap();
    assert_eq!(bytes, b"attachment bytes");
}

#[tokio::test]
async fn delete_endpoints_issue_delete_requests() {
    let server = MockServer::start_async().await;
    let delete_one = server
        .mock_async(|when, then| {
            when.method(DELETE).path(format!("/api/v1/mail/{ADDRESS}/m-1"));
            then.status(204);
        })
        .await;
    let delete_all = server
        .mock_async(|when, then| {
            when.method(DELETE).path(format!("/api/v1/mail/{ADDRESS}"));
            then.status(204);
        })
        .await;

    let client = client(&server);
    client.delete_email(ADDRESS, "m-1").await.unwrap();
    client.delete_inbox(ADDRESS).await.unwrap();
    delete_one.assert_async().await;
    delete_all.assert_async().await;
}

#[tokio::test]
async fn session_lifecycle_round_trips() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path(format!("/api/v1/session/{ADDRESS}"));
            then.status(200).json_body(json!({
                "username": "user",
                "domain": "tacomail.de",
                "expires": 1_705_320_600_000i64
            }));
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path(format!("/api/v1/session/{ADDRESS}"));
            then.status(204);
        })
        .await;

    let client = client(&server);
    let session = client.create_session("user", "tacomail.de").await.unwrap();
    assert_eq!(session.address(), ADDRESS);
    assert_eq!(session.expires_at().unwrap().timestamp(), 1_705_320_600);

    client.delete_session("user", "tacomail.de").await.unwrap();
    create.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn http_errors_surface_as_request_errors() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/api/v1/mail/{ADDRESS}"));
            then.status(500);
        })
        .await;

    let err = client(&server).get_inbox(ADDRESS, None).await.unwrap_err();
    match err {
        Error::Request(inner) => {
            assert_eq!(inner.status().map(|s| s.as_u16()), Some(500));
        }
        other => panic!("expected a request error, got {other:?}"),
    }
}

#[tokio::test]
async fn wait_matches_mail_already_present() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/api/v1/mail/{ADDRESS}"));
            then.status(200).json_body(json!([mail_json("m-1", "verify")]));
        })
        .await;

    let options = WaitOptions::new(Duration::ZERO, Duration::from_millis(100));
    let outcome = client(&server)
        .wait_for_mail_where(ADDRESS, |m| Ok(m.subject == "verify"), &options)
        .await
        .unwrap();

    match outcome {
        WaitOutcome::Matched(mail) => assert_eq!(mail.id, "m-1"),
        other => panic!("expected a match, got {other:?}"),
    }
    assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn wait_surfaces_transport_failure_without_retry() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/api/v1/mail/{ADDRESS}"));
            then.status(503);
        })
        .await;

    let options = WaitOptions::new(Duration::from_secs(10), Duration::from_millis(50));
    let err = client(&server)
        .wait_for_mail(ADDRESS, &options)
        .await
        .unwrap_err();

    assert!(matches!(err, WaitError::Transport(_)));
    assert_eq!(mock.hits_async().await, 1);
}
