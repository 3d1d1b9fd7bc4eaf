//! Per-thread message retention.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::RetentionSettings;
use crate::store::{Locator, RecordStore};
use crate::Result;

/// Deletes old messages once a thread exceeds its budget.
#[async_trait]
pub trait RetentionEnforcer: Send + Sync {
    /// Enforce the limit on the thread containing `locator`.
    ///
    /// Returns the number of messages deleted.
    async fn enforce_limit(&self, store: &dyn RecordStore, locator: Locator) -> Result<usize>;
}

/// Keeps at most `mms_limit` unlocked messages per thread, oldest go first.
///
/// Locked messages are neither deleted nor counted.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recycler {
    settings: RetentionSettings,
}

impl Recycler {
    /// Create a recycler with the given settings.
    #[must_use]
    pub const fn new(settings: RetentionSettings) -> Self {
        Self { settings }
    }

    /// Current settings.
    #[must_use]
    pub const fn settings(&self) -> &RetentionSettings {
        &self.settings
    }
}

#[async_trait]
impl RetentionEnforcer for Recycler {
    async fn enforce_limit(&self, store: &dyn RecordStore, locator: Locator) -> Result<usize> {
        if !self.settings.auto_delete {
            return Ok(0);
        }

        let Some(thread_id) = store.thread_of(locator).await? else {
            debug!(%locator, "No thread, nothing to recycle");
            return Ok(0);
        };

        let messages = store.unlocked_messages_in_thread(thread_id).await?;
        let limit = usize::try_from(self.settings.mms_limit).unwrap_or(usize::MAX);
        let excess = messages.len().saturating_sub(limit);
        if excess == 0 {
            return Ok(0);
        }

        for old in &messages[..excess] {
            store.delete(*old).await?;
        }

        info!(thread_id, deleted = excess, "Deleted old messages over limit");
        Ok(excess)
    }
}
