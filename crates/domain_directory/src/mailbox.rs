//! Mailbox projections
//!
//! Messages are read and sent through the directory service; the client
//! keeps no local mail state beyond what a listing returned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A mailbox message header as returned by a listing or search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessage {
    /// Message id within the mailbox
    pub id: String,
    /// Subject line
    pub subject: String,
    /// Sender address
    pub from: String,
    /// When the message was received
    pub received_at: DateTime<Utc>,
    /// Read flag
    pub is_read: bool,
    /// Short body preview
    pub preview: String,
}

/// Request payload for sending a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl NewMailMessage {
    pub fn new(to: Vec<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to,
            subject: subject.into(),
            body: body.into(),
        }
    }
}
