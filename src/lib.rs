//! # Tacomail Client
//! Rust wrapper around the tacomail disposable email HTTP API, providing simple methods to create, poll, and delete temporary inboxes using [`Client`] (async) or [`blocking::Client`], plus a mail-waiting core that blocks until a matching mail arrives ([`WaitOutcome`]).
//!
//! ## Audience and uses
//! For Rust developers who need throwaway addresses in integration tests, demos, or automation scripts without running mail infrastructure: build a client with [`ClientBuilder`], open a session for an address, then either poll the inbox ([`Email`]) or wait for a specific mail with `wait_for_mail_where` and a predicate.
//!
//! ## Runtime requirements
//! The async client runs inside a Tokio (v1) runtime; HTTP calls use `reqwest`. The [`blocking`] module needs no runtime and must not be used from within one.
//!
//! ## Out of scope
//! Not a general-purpose mail client, SMTP sender, or durable mailbox. It only proxies the tacomail service and inherits its availability, retention limits, and 10-mail inbox cap. A failed poll during a wait is surfaced immediately; retrying is the caller's decision.
//!
//! ## Errors
//! All network calls surface transport and non-2xx statuses as [`Error::Request`]; shape or content issues become [`Error::ResponseParse`] or [`Error::Json`]. Wait calls distinguish "no mail yet" ([`WaitOutcome::TimedOut`]) from failures ([`WaitError`]). The crate-wide [`Result`] alias wraps API errors.
//!
//! ## Example
//! ```no_run
//! use tacomail_client::{Client, WaitOptions, WaitOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new()?;
//!     let address = client.get_random_address().await?;
//!     let (user, domain) = address.split_once('@').unwrap();
//!     client.create_session(user, domain).await?;
//!     println!("Receiving at: {address}");
//!
//!     let outcome = client
//!         .wait_for_mail_where(
//!             &address,
//!             |mail| Ok(mail.subject.contains("welcome")),
//!             &WaitOptions::default(),
//!         )
//!         .await?;
//!     match outcome {
//!         WaitOutcome::Matched(mail) => println!("From: {}", mail.from.address),
//!         WaitOutcome::TimedOut => println!("nothing arrived"),
//!         WaitOutcome::Cancelled => println!("cancelled"),
//!     }
//!
//!     client.delete_inbox(&address).await?;
//!     Ok(())
//! }
//! ```

pub mod blocking;
mod client;
mod error;
mod models;
mod wait;

pub use client::{Client, ClientBuilder};
pub use error::{BoxError, Error, WaitError};
pub use models::{Attachment, Email, EmailAddress, EmailBody, Session};
pub use wait::{
    BlockingFetchInbox, FetchInbox, WaitOptions, WaitOutcome, wait_for_match,
    wait_for_match_blocking,
};

// Re-exported so callers can cancel waits without depending on tokio-util.
pub use tokio_util::sync::CancellationToken;

/// Result type alias for tacomail API operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
