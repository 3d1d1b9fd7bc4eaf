//! Retrieval of a notified message.

use std::sync::Arc;

use mmsledger_pdu::GenericPdu;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::TransactionContext;
use super::ack::send_acknowledge;
use super::duplicate::is_duplicate;
use super::observer::{Observable, TransactionObserver};
use super::state::{TransactionState, TransactionStatus};
use crate::normalize::normalize_message;
use crate::store::{DownloadState, Locator, MessageBox};
use crate::{Error, Result};

/// Downloads the message announced by a notification and stores it.
///
/// The transaction fetches M-Retrieve.conf from the content location,
/// drops duplicates, normalizes charsets, files the message into the inbox,
/// removes the notification and acknowledges the retrieval. Observers are
/// told the outcome exactly once.
pub struct RetrieveTransaction {
    ctx: TransactionContext,
    uri: Locator,
    content_location: String,
    locked: bool,
    observers: Observable,
    state: watch::Sender<TransactionState>,
}

impl RetrieveTransaction {
    /// Create a transaction for the notification at `uri`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReference`] if `uri` is not a store locator,
    /// and [`Error::MissingContentLocation`] if there is no such notification
    /// or it has no content location.
    pub async fn new(ctx: TransactionContext, uri: &str) -> Result<Self> {
        let locator: Locator = uri.parse()?;
        Self::for_locator(ctx, locator).await
    }

    /// Create a transaction for an already parsed locator.
    ///
    /// # Errors
    ///
    /// See [`RetrieveTransaction::new`].
    pub async fn for_locator(ctx: TransactionContext, uri: Locator) -> Result<Self> {
        let missing = || Error::MissingContentLocation(uri.to_string());
        let record = ctx.store.load_notification(uri).await?.ok_or_else(missing)?;
        let content_location = record
            .content_location
            .filter(|location| !location.is_empty())
            .ok_or_else(missing)?;

        let mut observers = Observable::new();
        if let Some(scheduler) = &ctx.retry_scheduler {
            observers.attach(Arc::clone(scheduler));
        }

        let (state, _) = watch::channel(TransactionState::new());
        debug!(%uri, content_location = %content_location, "Retrieve transaction created");

        Ok(Self {
            ctx,
            uri,
            content_location,
            locked: record.locked,
            observers,
            state,
        })
    }

    /// The notification being retrieved.
    #[must_use]
    pub const fn uri(&self) -> Locator {
        self.uri
    }

    /// Where the message is fetched from.
    #[must_use]
    pub fn content_location(&self) -> &str {
        &self.content_location
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        *self.state.borrow()
    }

    /// Watch state changes while the transaction runs.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TransactionState> {
        self.state.subscribe()
    }

    /// Register an observer for the final state.
    pub fn attach(&mut self, observer: Arc<dyn TransactionObserver>) {
        self.observers.attach(observer);
    }

    /// Remove an observer.
    pub fn detach(&mut self, observer: &Arc<dyn TransactionObserver>) {
        self.observers.detach(observer);
    }

    /// Run the transaction in the background.
    ///
    /// Returns at once; the handle resolves to the final state. Errors and
    /// panics inside the run end in [`TransactionStatus::Failed`], they are
    /// never returned to the caller.
    pub fn start(self) -> JoinHandle<TransactionState> {
        let transaction = Arc::new(self);
        tokio::spawn(async move {
            let run = Arc::clone(&transaction);
            match tokio::spawn(async move { run.execute().await }).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(uri = %transaction.uri, "Retrieval error: {e}"),
                Err(e) => error!(uri = %transaction.uri, "Retrieval aborted: {e}"),
            }
            if !transaction.state().status().is_terminal() {
                transaction.release().await;
            }
            transaction.finalize()
        })
    }

    /// Mark the notification as retryable after an unfinished run.
    async fn release(&self) {
        if let Err(e) = self
            .ctx
            .store
            .set_download_state(self.uri, DownloadState::TransientFailure)
            .await
        {
            warn!(uri = %self.uri, "Failed to reset download state: {e}");
        }
    }

    async fn execute(&self) -> Result<()> {
        let store = self.ctx.store.as_ref();

        store
            .set_download_state(self.uri, DownloadState::Downloading)
            .await?;
        self.state
            .send_modify(|state| state.set_status(TransactionStatus::Downloading));

        let response = self.ctx.transport.fetch(&self.content_location).await?;
        debug!(uri = %self.uri, len = response.len(), "Fetched");

        let mut conf = match mmsledger_pdu::parse(&response)? {
            GenericPdu::RetrieveConf(conf) => conf,
            other => return Err(Error::NotRetrieveConf(other.message_type())),
        };

        let persisted = if is_duplicate(store, &conf).await? {
            info!(uri = %self.uri, "Duplicate message, not stored");
            self.state.send_replace(TransactionState::failed(self.uri));
            None
        } else {
            normalize_message(&mut conf)?;
            let locator = store.persist(&conf, MessageBox::Inbox).await?;
            self.state.send_replace(TransactionState::success(locator));
            info!(uri = %self.uri, %locator, "Message retrieved");

            if let Err(e) = store
                .update_location(locator, &self.content_location, self.locked)
                .await
            {
                warn!(%locator, "Failed to record content location: {e}");
            }
            Some(locator)
        };

        store.delete(self.uri).await?;

        // After the delete, so the notification is not counted
        if let Some(locator) = persisted
            && let Err(e) = self.ctx.retention.enforce_limit(store, locator).await
        {
            warn!(%locator, "Failed to enforce retention: {e}");
        }

        if let Err(e) = send_acknowledge(
            self.ctx.transport.as_ref(),
            &self.ctx.settings,
            &conf,
            &self.content_location,
        )
        .await
        {
            warn!(uri = %self.uri, "Failed to send acknowledgement: {e}");
        }

        Ok(())
    }

    fn finalize(&self) -> TransactionState {
        self.state.send_if_modified(|state| {
            if state.status() == TransactionStatus::Success {
                return false;
            }
            *state = TransactionState::failed(self.uri);
            true
        });

        let state = self.state();
        if state.status() == TransactionStatus::Failed {
            error!(uri = %self.uri, "Retrieval failed");
        }
        self.observers.notify(&state);
        state
    }
}

impl std::fmt::Debug for RetrieveTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrieveTransaction")
            .field("uri", &self.uri)
            .field("content_location", &self.content_location)
            .field("locked", &self.locked)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
