//! Data records returned by the tacomail API.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A sender or recipient address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// The address itself, e.g. `user@tacomail.de`.
    pub address: String,
    /// Display name; empty when the mail carried none.
    pub name: String,
}

/// Plain-text and HTML renderings of a mail body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailBody {
    pub text: String,
    pub html: String,
}

/// Descriptor for one attachment of a mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment id, unique within its mail.
    pub id: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
    /// Whether the attachment content is still retrievable.
    pub present: bool,
}

/// One mail as stored by the tacomail service.
///
/// Mail records are read-only: the service assigns the `id` (unique within
/// an inbox) and the client never mutates a received mail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub id: String,
    pub from: EmailAddress,
    pub to: EmailAddress,
    pub subject: String,
    /// Arrival time as reported by the service.
    pub date: DateTime<Utc>,
    pub body: EmailBody,
    pub headers: HashMap<String, String>,
    pub attachments: Vec<Attachment>,
}

/// A registration that makes the service accept and retain incoming mail
/// for `username@domain` until `expires`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub username: String,
    pub domain: String,
    /// Expiry as a millisecond Unix timestamp.
    pub expires: i64,
}

impl Session {
    /// Expiry as a UTC timestamp, or `None` if the service reported a value
    /// outside the representable range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.expires).single()
    }

    /// The full address this session covers.
    pub fn address(&self) -> String {
        format!("{}@{}", self.username, self.domain)
    }
}
