//! # mmsledger-core
//!
//! MMS retrieval engine for `MmsLedger`.
//!
//! This crate provides:
//! - Local storage (`SQLite`) of notifications and downloaded messages
//! - **Retrieve transactions** - download, duplicate check, persist and acknowledge
//! - **Charset normalization** - legacy Japanese encodings and carrier glyphs to UTF-8
//! - **Retention** - per-thread message limits
//! - HTTP transport to the MMSC

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod normalize;
pub mod retention;
pub mod service;
pub mod store;
pub mod transaction;
pub mod transport;

pub use config::{RetentionSettings, TransactionSettings};
pub use error::{Error, Result};
pub use normalize::{normalize, normalize_message, normalize_part, remap_glyph};
pub use retention::{Recycler, RetentionEnforcer};
pub use service::RetrievalService;
pub use store::{
    DownloadState, Locator, MessageBox, MessageRepository, NewNotification, NotificationRecord,
    RecordStore, StoredMessage, StoredPart,
};
pub use transaction::{
    Observable, RetrieveTransaction, TransactionContext, TransactionObserver, TransactionState,
    TransactionStatus,
};
pub use transport::{HttpTransport, Transport, TransportError};
