//! Retrieval service.
//!
//! Starts retrieve transactions for single notifications or for everything
//! pending in the store.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::Result;
use crate::transaction::{
    RetrieveTransaction, TransactionContext, TransactionObserver, TransactionState,
};

/// Starts retrievals against a shared [`TransactionContext`].
#[derive(Debug, Clone)]
pub struct RetrievalService {
    ctx: TransactionContext,
}

impl RetrievalService {
    /// Creates a service.
    #[must_use]
    pub const fn new(ctx: TransactionContext) -> Self {
        Self { ctx }
    }

    /// Shared collaborators.
    #[must_use]
    pub const fn context(&self) -> &TransactionContext {
        &self.ctx
    }

    /// Retrieve the message announced by the notification at `uri`.
    ///
    /// `observers` are attached before the transaction starts.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be constructed.
    pub async fn process(
        &self,
        uri: &str,
        observers: impl IntoIterator<Item = Arc<dyn TransactionObserver>>,
    ) -> Result<JoinHandle<TransactionState>> {
        let mut transaction = RetrieveTransaction::new(self.ctx.clone(), uri).await?;
        for observer in observers {
            transaction.attach(observer);
        }
        Ok(transaction.start())
    }

    /// Start a retrieval for every notification that is not downloaded yet
    /// or whose last attempt may be retried.
    ///
    /// Notifications that cannot be retrieved at all are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be queried.
    pub async fn process_pending(&self) -> Result<Vec<JoinHandle<TransactionState>>> {
        let pending = self.ctx.store.pending_notifications().await?;
        let mut handles = Vec::with_capacity(pending.len());

        for locator in pending {
            match RetrieveTransaction::for_locator(self.ctx.clone(), locator).await {
                Ok(transaction) => handles.push(transaction.start()),
                Err(e) if e.is_construction() => {
                    warn!(%locator, "Skipping notification: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        info!(started = handles.len(), "Started pending retrievals");
        Ok(handles)
    }
}
