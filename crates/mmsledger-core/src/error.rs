//! Error types for the core library.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The reference does not name a record in the local store.
    #[error("Invalid store reference: {0}")]
    InvalidReference(String),

    /// No notification record, or one without a content location.
    #[error("Cannot get X-Mms-Content-Location from: {0}")]
    MissingContentLocation(String),

    /// Exchange with the relay failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// PDU could not be parsed or composed.
    #[error("PDU error: {0}")]
    Pdu(#[from] mmsledger_pdu::Error),

    /// The relay answered with a PDU other than m-retrieve-conf.
    #[error("Invalid M-Retrieve.conf PDU: got {0:?}")]
    NotRetrieveConf(mmsledger_pdu::MessageType),

    /// A part names a charset that cannot be decoded.
    #[error("Unsupported charset: {0}")]
    UnsupportedCharset(u32),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A store write did not produce the expected record.
    #[error("Persist error: {0}")]
    Persist(String),
}

impl Error {
    /// Returns true for errors raised while constructing a transaction.
    #[must_use]
    pub const fn is_construction(&self) -> bool {
        matches!(
            self,
            Self::InvalidReference(_) | Self::MissingContentLocation(_)
        )
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
