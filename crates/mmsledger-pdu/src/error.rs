//! Error types for PDU operations.

/// Result type alias for PDU operations.
pub type Result<T> = std::result::Result<T, Error>;

/// PDU error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input ended before a complete value could be read.
    #[error("Unexpected end of PDU at offset {0}")]
    UnexpectedEof(usize),

    /// A value was present but malformed.
    #[error("Invalid value at offset {position}: {message}")]
    InvalidValue {
        /// Byte offset where the value starts.
        position: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// Content type could not be decoded.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// A header the message type requires is absent.
    #[error("Missing required header: {0}")]
    MissingHeader(&'static str),

    /// The PDU carries a message type this library does not handle.
    #[error("Unsupported message type: {0:#04x}")]
    UnsupportedMessageType(u8),

    /// A value cannot be represented on the wire.
    #[error("Cannot encode {0}")]
    Encode(String),
}
