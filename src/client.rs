//! Tacomail async client implementation.

use crate::error::BoxError;
use crate::models::{Attachment, Email, Session};
use crate::wait::{self, FetchInbox, WaitOptions, WaitOutcome};
use crate::{Error, Result, WaitError};
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use std::time::Duration;

/// Async client for the tacomail disposable email service.
///
/// Use [`Client::new`] for defaults or [`Client::builder`] to point at a
/// different instance or tune the HTTP transport.
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client against the public tacomail instance.
    ///
    /// # Examples
    /// ```no_run
    /// # use tacomail_client::Client;
    /// # fn main() -> Result<(), tacomail_client::Error> {
    /// let client = Client::new()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// The base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the contact email address of the tacomail instance.
    pub async fn get_contact_email(&self) -> Result<String> {
        let response: serde_json::Value = self
            .http
            .get(self.url("/api/v1/contactEmail"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .get("email")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| Error::ResponseParse("missing `email` field".into()))
    }

    /// Get a random username suitable for building an address.
    pub async fn get_random_username(&self) -> Result<String> {
        let response: serde_json::Value = self
            .http
            .get(self.url("/api/v1/randomUsername"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .get("username")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| Error::ResponseParse("missing `username` field".into()))
    }

    /// Get all domains this instance accepts mail for.
    pub async fn get_domains(&self) -> Result<Vec<String>> {
        self.http
            .get(self.url("/api/v1/domains"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(Into::into)
    }

    /// Build a random address from a random username and a random domain.
    pub async fn get_random_address(&self) -> Result<String> {
        let (username, domains) =
            tokio::try_join!(self.get_random_username(), self.get_domains())?;
        let domain = domains
            .choose(&mut rand::rng())
            .ok_or_else(|| Error::ResponseParse("domain list is empty".into()))?;
        Ok(format!("{username}@{domain}"))
    }

    /// Get the most recent mail in an inbox.
    ///
    /// The service caps results at 10 regardless of `limit`.
    ///
    /// # Examples
    /// ```no_run
    /// # use tacomail_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), tacomail_client::Error> {
    /// let client = Client::new()?;
    /// for mail in client.get_inbox("user@tacomail.de", None).await? {
    ///     println!("{}: {}", mail.from.address, mail.subject);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_inbox(&self, address: &str, limit: Option<u32>) -> Result<Vec<Email>> {
        let mut request = self.http.get(self.url(&format!("/api/v1/mail/{address}")));
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }

        request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(Into::into)
    }

    /// Get a single mail by its id.
    pub async fn get_email(&self, address: &str, mail_id: &str) -> Result<Email> {
        self.http
            .get(self.url(&format!("/api/v1/mail/{address}/{mail_id}")))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(Into::into)
    }

    /// List the attachments of a mail.
    pub async fn get_attachments(&self, address: &str, mail_id: &str) -> Result<Vec<Attachment>> {
        self.http
            .get(self.url(&format!("/api/v1/mail/{address}/{mail_id}/attachments")))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(Into::into)
    }

    /// Download the raw bytes of a single attachment.
    pub async fn download_attachment(
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
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }

    /// Delete a single mail.
    pub async fn delete_email(&self, address: &str, mail_id: &str) -> Result<()> {
        self.http
            .delete(self.url(&format!("/api/v1/mail/{address}/{mail_id}")))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Delete every mail in an inbox.
    pub async fn delete_inbox(&self, address: &str) -> Result<()> {
        self.http
            .delete(self.url(&format!("/api/v1/mail/{address}")))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Register a session so the service accepts and retains incoming mail
    /// for `username@domain`.
    pub async fn create_session(&self, username: &str, domain: &str) -> Result<Session> {
        self.http
            .post(self.url(&format!("/api/v1/session/{username}@{domain}")))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(Into::into)
    }

    /// Drop the session for `username@domain`. Incoming mail is rejected
    /// afterwards; already stored mail is kept.
    pub async fn delete_session(&self, username: &str, domain: &str) -> Result<()> {
        self.http
            .delete(self.url(&format!("/api/v1/session/{username}@{domain}")))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Wait until any mail arrives in the inbox.
    ///
    /// Returns the first mail observed during the wait; mail already present
    /// when the wait starts counts.
    pub async fn wait_for_mail(
        &self,
        address: &str,
        options: &WaitOptions,
    ) -> std::result::Result<WaitOutcome, WaitError> {
        self.wait_for_mail_where(address, |_: &Email| Ok(true), options)
            .await
    }

    /// Wait until a mail satisfying `predicate` arrives in the inbox.
    ///
    /// The inbox is polled every `options.interval` until `options.timeout`
    /// passes or the cancellation token fires; each distinct mail is handed
    /// to the predicate at most once per call. See [`crate::wait_for_match`]
    /// for the full semantics.
    ///
    /// # Examples
    /// ```no_run
    /// # use tacomail_client::{Client, WaitOptions, WaitOutcome};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = Client::new()?;
    /// let outcome = client
    ///     .wait_for_mail_where(
    ///         "user@tacomail.de",
    ///         |mail| Ok(mail.subject.contains("verification")),
    ///         &WaitOptions::default(),
    ///     )
    ///     .await?;
    /// if let WaitOutcome::Matched(mail) = outcome {
    ///     println!("got it: {}", mail.subject);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn wait_for_mail_where<F>(
        &self,
        address: &str,
        predicate: F,
        options: &WaitOptions,
    ) -> std::result::Result<WaitOutcome, WaitError>
    where
        F: FnMut(&Email) -> std::result::Result<bool, BoxError> + Send,
    {
        wait::wait_for_match(self, address, predicate, options).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl FetchInbox for Client {
    async fn fetch_inbox(&self, address: &str) -> Result<Vec<Email>> {
        self.get_inbox(address, None).await
    }
}

pub(crate) const DEFAULT_BASE_URL: &str = "https://tacomail.de";
pub(crate) const USER_AGENT_VALUE: &str =
    concat!("tacomail-client-rs/", env!("CARGO_PKG_VERSION"));

/// Builder for configuring a tacomail client.
///
/// Start with [`Client::builder`] to override defaults.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    base_url: String,
    user_agent: String,
    proxy: Option<String>,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - Public tacomail instance (`https://tacomail.de`)
    /// - Crate user agent
    /// - No proxy, no request timeout
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: USER_AGENT_VALUE.to_string(),
            proxy: None,
            timeout: None,
        }
    }

    /// Point the client at a different tacomail instance.
    ///
    /// A trailing slash is trimmed. Useful for self-hosted instances and
    /// for tests against a mock server.
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

    /// Build the async client.
    pub fn build(self) -> Result<Client> {
        let mut builder = reqwest::Client::builder().user_agent(&self.user_agent);
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
