//! Blocking tacomail client.
//!
//! Mirrors [`crate::Client`] for callers without an async runtime, the way
//! `reqwest::blocking` mirrors `reqwest`. Waiting occupies the calling
//! thread; concurrent waits each need their own thread but share no state,
//! so one `Client` may be used from many threads at once.

use crate::client::{DEFAULT_BASE_URL, USER_AGENT_VALUE};
use crate::error::BoxError;
use crate::models::{Attachment, Email, Session};
use crate::wait::{self, BlockingFetchInbox, WaitOptions, WaitOutcome};
use crate::{Error, Result, WaitError};
use rand::seq::IndexedRandom;
use std::time::Duration;

/// Blocking client for the tacomail disposable email service.
///
/// Do not use from within an async runtime; use [`crate::Client`] there.
#[derive(Debug)]
pub struct Client {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client against the public tacomail instance.
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// The base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the contact email address of the tacomail instance.
    pub fn get_contact_email(&self) -> Result<String> {
        let response: serde_json::Value = self
            .http
            .get(self.url("/api/v1/contactEmail"))
            .send()?
            .error_for_status()?
            .json()?;

        response
            .get("email")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| Error::ResponseParse("missing `email` field".into()))
    }

    /// Get a random username suitable for building an address.
    pub fn get_random_username(&self) -> Result<String> {
        let response: serde_json::Value = self
            .http
            .get(self.url("/api/v1/randomUsername"))
            .send()?
            .error_for_status()?
            .json()?;

        response
            .get("username")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| Error::ResponseParse("missing `username` field".into()))
    }

    /// Get all domains this instance accepts mail for.
    pub fn get_domains(&self) -> Result<Vec<String>> {
        self.http
            .get(self.url("/api/v1/domains"))
            .send()?
            .error_for_status()?
            .json()
            .map_err(Into::into)
    }

    /// Build a random address from a random username and a random domain.
    pub fn get_random_address(&self) -> Result<String> {
        let username = self.get_random_username()?;
        let domains = self.get_domains()?;
        let domain = domains
            .choose(&mut rand::rng())
            .ok_or_else(|| Error::ResponseParse("domain list is empty".into()))?;
        Ok(format!("{username}@{domain}"))
    }

    /// Get the most recent mail in an inbox.
    ///
    /// The service caps results at 10 regardless of `limit`.
    pub fn get_inbox(&self, address: &str, limit: Option<u32>) -> Result<Vec<Email>> {
        let mut request = self.http.get(self.url(&format!("/api/v1/mail/{address}")));
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }

        request.send()?.error_for_status()?.json().map_err(Into::into)
    }

    /// Get a single mail by its id.
    pub fn get_email(&self, address: &str, mail_id: &str) -> Result<Email> {
        self.http
            .get(self.url(&format!("/api/v1/mail/{address}/{mail_id}")))
            .send()?
            .error_for_status()?
            .json()
            .map_err(Into::into)
    }

    /// List the attachments of a mail.
    pub fn get_attachments(&self, address: &str, mail_id: &str) -> Result<Vec<Attachment>> {
        self.http
            .get(self.url(&format!("/api/v1/mail/{address}/{mail_id}/attachments")))
            .send()?
            .error_for_status()?
            .json()
            .map_err(Into::into)
    }

    /// Download the raw bytes of a single attachment.
    pub fn download_attachment(
        &self,
        address: &str,
        mail_id: &str,
        attachment_id: &str,
    ) -> Result<Vec<u8>> {
        let bytes = self
            .http
            .get(self.url(&format!(
                "/api/v1/mail/{address}/{mail_id}/attachments/{attachment_id}"
            )))
            .send()?
            .error_for_status()?
            .bytes()?;
        Ok(bytes.to_vec())
    }

    /// Delete a single mail.
    pub fn delete_email(&self, address: &str, mail_id: &str) -> Result<()> {
        self.http
            .delete(self.url(&format!("/api/v1/mail/{address}/{mail_id}")))
            .send()?
            .error_for_status()?;
        Ok(())
    }

    /// Delete every mail in an inbox.
    pub fn delete_inbox(&self, address: &str) -> Result<()> {
        self.http
            .delete(self.url(&format!("/api/v1/mail/{address}")))
            .send()?
            .error_for_status()?;
        Ok(())
    }

    /// Register a session so the service accepts and retains incoming mail
    /// for `username@domain`.
    pub fn create_session(&self, username: &str, domain: &str) -> Result<Session> {
        self.http
            .post(self.url(&format!("/api/v1/session/{username}@{domain}")))
            .send()?
            .error_for_status()?
            .json()
            .map_err(Into::into)
    }

    /// Drop the session for `username@domain`. Incoming mail is rejected
    /// afterwards; already stored mail is kept.
    pub fn delete_session(&self, username: &str, domain: &str) -> Result<()> {
        self.http
            .delete(self.url(&format!("/api/v1/session/{username}@{domain}")))
            .send()?
            .error_for_status()?;
        Ok(())
    }

    /// Wait until any mail arrives in the inbox, blocking the calling thread.
    pub fn wait_for_mail(
        &self,
        address: &str,
        options: &WaitOptions,
    ) -> std::result::Result<WaitOutcome, WaitError> {
        self.wait_for_mail_where(address, |_: &Email| Ok(true), options)
    }

    /// Wait until a mail satisfying `predicate` arrives, blocking the
    /// calling thread. Semantics are identical to
    /// [`crate::Client::wait_for_mail_where`].
    pub fn wait_for_mail_where<F>(
        &self,
        address: &str,
        predicate: F,
        options: &WaitOptions,
    ) -> std::result::Result<WaitOutcome, WaitError>
    where
        F: FnMut(&Email) -> std::result::Result<bool, BoxError>,
    {
        wait::wait_for_match_blocking(self, address, predicate, options)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl BlockingFetchInbox for Client {
    fn fetch_inbox(&self, address: &str) -> Result<Vec<Email>> {
        self.get_inbox(address, None)
    }
}

/// Builder for configuring a blocking tacomail client.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    base_url: String,
    user_agent: String,
    proxy: Option<String>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: USER_AGENT_VALUE.to_string(),
            proxy: None,
            timeout: None,
        }
    }

    /// Point the client at a different tacomail instance.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Route all requests through a proxy (e.g. "socks5://127.0.0.1:9050").
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set a per-request timeout on the HTTP transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the blocking client.
    pub fn build(self) -> Result<Client> {
        let mut builder = reqwest::blocking::Client::builder().user_agent(&self.user_agent);
        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Client {
            http: builder.build()?,
            base_url: self.base_url,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
