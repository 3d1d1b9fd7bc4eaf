//! MMS transactions.
//!
//! A [`RetrieveTransaction`] takes a stored notification through download,
//! duplicate check, normalization, persistence, retention and
//! acknowledgement, and reports a [`TransactionState`] to its observers.

pub mod ack;
pub mod duplicate;
mod observer;
mod retrieve;
mod state;

use std::sync::Arc;

pub use observer::{Observable, TransactionObserver};
pub use retrieve::RetrieveTransaction;
pub use state::{TransactionState, TransactionStatus};

use crate::config::TransactionSettings;
use crate::retention::{Recycler, RetentionEnforcer};
use crate::store::RecordStore;
use crate::transport::Transport;

/// Collaborators shared by all transactions.
#[derive(Clone)]
pub struct TransactionContext {
    /// Local message store.
    pub store: Arc<dyn RecordStore>,
    /// Exchange with the relay.
    pub transport: Arc<dyn Transport>,
    /// Applied to the thread of every stored message.
    pub retention: Arc<dyn RetentionEnforcer>,
    /// Connection settings.
    pub settings: Arc<TransactionSettings>,
    /// Attached to every transaction at construction.
    pub retry_scheduler: Option<Arc<dyn TransactionObserver>>,
}

impl TransactionContext {
    /// Creates a context with the default (disabled) recycler and no retry
    /// scheduler.
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        transport: Arc<dyn Transport>,
        settings: TransactionSettings,
    ) -> Self {
        Self {
            store,
            transport,
            retention: Arc::new(Recycler::default()),
            settings: Arc::new(settings),
            retry_scheduler: None,
        }
    }

    /// Sets the retention enforcer.
    #[must_use]
    pub fn with_retention(mut self, retention: Arc<dyn RetentionEnforcer>) -> Self {
        self.retention = retention;
        self
    }

    /// Sets the retry scheduler.
    #[must_use]
    pub fn with_retry_scheduler(mut self, scheduler: Arc<dyn TransactionObserver>) -> Self {
        self.retry_scheduler = Some(scheduler);
        self
    }
}

impl std::fmt::Debug for TransactionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionContext")
            .field("settings", &self.settings)
            .field("retry_scheduler", &self.retry_scheduler.is_some())
            .finish_non_exhaustive()
    }
}
