//! Record store data models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Scheme and authority of every store reference.
pub const CONTENT_PREFIX: &str = "content://mms/";

/// Reference to a row in the message store.
///
/// Written as `content://mms/<id>`; the box-qualified form
/// `content://mms/<box>/<id>` is accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator(pub i64);

impl Locator {
    /// Create a locator for a row id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Row id in the `pdu` table.
    #[must_use]
    pub const fn id(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CONTENT_PREFIX}{}", self.0)
    }
}

impl FromStr for Locator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidReference(s.to_string());
        let path = s.strip_prefix(CONTENT_PREFIX).ok_or_else(invalid)?;
        let id = match path.split_once('/') {
            Some((message_box, id)) if MessageBox::parse(message_box).is_some() => id,
            Some(_) => return Err(invalid()),
            None => path,
        };
        id.parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .map(Self)
            .ok_or_else(invalid)
    }
}

/// Message box a record is filed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageBox {
    /// Received messages and notifications.
    Inbox,
    /// Sent messages.
    Sent,
    /// Drafts.
    Drafts,
    /// Messages waiting to be sent.
    Outbox,
}

impl MessageBox {
    /// Parse from the path segment used in locators.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "inbox" => Some(Self::Inbox),
            "sent" => Some(Self::Sent),
            "drafts" => Some(Self::Drafts),
            "outbox" => Some(Self::Outbox),
            _ => None,
        }
    }

    /// Column value stored in `pdu.msg_box`.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Inbox => 1,
            Self::Sent => 2,
            Self::Drafts => 3,
            Self::Outbox => 4,
        }
    }

    /// Inverse of [`MessageBox::code`].
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Inbox),
            2 => Some(Self::Sent),
            3 => Some(Self::Drafts),
            4 => Some(Self::Outbox),
            _ => None,
        }
    }
}

/// Download state of a notification, visible to readers of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DownloadState {
    /// Not downloaded yet.
    #[default]
    Unstarted,
    /// A retrieval is in progress.
    Downloading,
    /// The last attempt failed; a retry may succeed.
    TransientFailure,
    /// Retrieval gave up.
    PermanentFailure,
}

impl DownloadState {
    /// Column value stored in `pdu.st`.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Unstarted => 0x80,
            Self::Downloading => 0x81,
            Self::TransientFailure => 0x82,
            Self::PermanentFailure => 0x87,
        }
    }

    /// Inverse of [`DownloadState::code`]; unknown values read as unstarted.
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            0x81 => Self::Downloading,
            0x82 => Self::TransientFailure,
            0x87 => Self::PermanentFailure,
            _ => Self::Unstarted,
        }
    }
}

/// A pending download as loaded from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    /// Where the notification lives.
    pub locator: Locator,
    /// Relay URL the message is fetched from.
    pub content_location: Option<String>,
    /// Pinned by the user against auto-deletion.
    pub locked: bool,
    /// Current download state.
    pub download_state: DownloadState,
}

/// Notification to file into the inbox.
#[derive(Debug, Clone, Default)]
pub struct NewNotification {
    /// X-Mms-Transaction-ID of the m-notification-ind.
    pub transaction_id: String,
    /// Relay URL the message is fetched from.
    pub content_location: String,
    /// Sender address, if announced.
    pub from: Option<String>,
    /// Subject, if announced.
    pub subject: Option<String>,
    /// Announced message size in bytes.
    pub message_size: u64,
    /// Pinned by the user.
    pub locked: bool,
}

/// A part of a persisted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPart {
    /// Position within the message.
    pub seq: i64,
    /// Media type.
    pub content_type: String,
    /// Charset MIBenum, `0` when unspecified.
    pub charset: u32,
    /// `name` parameter.
    pub name: Option<String>,
    /// Content-ID.
    pub content_id: Option<String>,
    /// Content-Location.
    pub content_location: Option<String>,
    /// Payload.
    pub data: Vec<u8>,
}

/// A persisted message with its parts.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    /// Where the message lives.
    pub locator: Locator,
    /// Conversation thread.
    pub thread_id: Option<i64>,
    /// Box the message is filed in.
    pub message_box: Option<MessageBox>,
    /// X-Mms-Message-Type code.
    pub message_type: u8,
    /// Message-ID.
    pub message_id: Option<String>,
    /// X-Mms-Transaction-ID.
    pub transaction_id: Option<String>,
    /// Relay URL the message was fetched from.
    pub content_location: Option<String>,
    /// Sender address.
    pub from: Option<String>,
    /// To recipients.
    pub to: Vec<String>,
    /// Subject.
    pub subject: Option<String>,
    /// Pinned by the user.
    pub locked: bool,
    /// Message date.
    pub date: DateTime<Utc>,
    /// Body parts in order.
    pub parts: Vec<StoredPart>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_parse() {
        assert_eq!("content://mms/12".parse::<Locator>().unwrap(), Locator(12));
        assert_eq!(
            "content://mms/inbox/7".parse::<Locator>().unwrap(),
            Locator(7)
        );
        assert_eq!(Locator(3).to_string(), "content://mms/3");
    }

    #[test]
    fn test_locator_rejects_foreign_references() {
        for reference in [
            "http://mmsc.example.com/abc",
            "content://sms/12",
            "content://mms/",
            "content://mms/abc",
            "content://mms/trash/3",
            "content://mms/0",
        ] {
            let err = reference.parse::<Locator>().unwrap_err();
            assert!(matches!(err, Error::InvalidReference(_)), "{reference}");
        }
    }

    #[test]
    fn test_download_state_codes() {
        for state in [
            DownloadState::Unstarted,
            DownloadState::Downloading,
            DownloadState::TransientFailure,
            DownloadState::PermanentFailure,
        ] {
            assert_eq!(DownloadState::from_code(state.code()), state);
        }
    }
}
