//! Local message store.
//!
//! Notifications and downloaded messages live in the same `pdu` table and
//! are addressed by [`Locator`].

mod model;
mod repository;

use async_trait::async_trait;
use mmsledger_pdu::{MessageType, RetrieveConf};

pub use model::{
    CONTENT_PREFIX, DownloadState, Locator, MessageBox, NewNotification, NotificationRecord,
    StoredMessage, StoredPart,
};
pub use repository::MessageRepository;

use crate::Result;

/// Storage operations a retrieval needs.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load the notification at `locator`, if there is one.
    async fn load_notification(&self, locator: Locator) -> Result<Option<NotificationRecord>>;

    /// Record the download state of a notification.
    async fn set_download_state(&self, locator: Locator, state: DownloadState) -> Result<()>;

    /// Find a message of the given type by its Message-ID.
    async fn find_message(
        &self,
        message_id: &str,
        message_type: MessageType,
    ) -> Result<Option<Locator>>;

    /// Store a downloaded message in a box and return where it went.
    async fn persist(&self, conf: &RetrieveConf, message_box: MessageBox) -> Result<Locator>;

    /// Set the content location and lock flag of a record.
    async fn update_location(
        &self,
        locator: Locator,
        content_location: &str,
        locked: bool,
    ) -> Result<()>;

    /// Delete a record with its parts; returns the number of rows removed.
    async fn delete(&self, locator: Locator) -> Result<u64>;

    /// Thread a record belongs to.
    async fn thread_of(&self, locator: Locator) -> Result<Option<i64>>;

    /// Unlocked messages of a thread, oldest first.
    async fn unlocked_messages_in_thread(&self, thread_id: i64) -> Result<Vec<Locator>>;

    /// Notifications whose download has not started or may be retried.
    async fn pending_notifications(&self) -> Result<Vec<Locator>>;
}
