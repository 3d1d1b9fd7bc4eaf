//! Transaction state.

use serde::{Deserialize, Serialize};

use crate::store::Locator;

/// Lifecycle of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Constructed, not started.
    Initialized,
    /// Fetching from the relay.
    Downloading,
    /// The message was stored.
    Success,
    /// The message was not stored, or was a duplicate.
    Failed,
}

impl TransactionStatus {
    /// Returns true for [`TransactionStatus::Success`] and [`TransactionStatus::Failed`].
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// Status plus the record the outcome points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionState {
    status: TransactionStatus,
    content_uri: Option<Locator>,
}

impl Default for TransactionState {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionState {
    /// Fresh state of a constructed transaction.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            status: TransactionStatus::Initialized,
            content_uri: None,
        }
    }

    /// A successful retrieval stored at `locator`.
    #[must_use]
    pub const fn success(locator: Locator) -> Self {
        Self {
            status: TransactionStatus::Success,
            content_uri: Some(locator),
        }
    }

    /// A failed retrieval of the notification at `locator`.
    #[must_use]
    pub const fn failed(locator: Locator) -> Self {
        Self {
            status: TransactionStatus::Failed,
            content_uri: Some(locator),
        }
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> TransactionStatus {
        self.status
    }

    /// New message on success, the original notification otherwise.
    #[must_use]
    pub const fn content_uri(&self) -> Option<Locator> {
        self.content_uri
    }

    pub(crate) const fn set_status(&mut self, status: TransactionStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(!TransactionStatus::Initialized.is_terminal());
        assert!(!TransactionStatus::Downloading.is_terminal());
        assert!(TransactionStatus::Success.is_terminal());
        assert!(TransactionStatus::Failed.is_terminal());
        assert!(TransactionState::failed(Locator(3)).status().is_terminal());
    }
}
