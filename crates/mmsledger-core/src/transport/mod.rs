//! Exchange of PDUs with the relay.

mod http;

use async_trait::async_trait;
use bytes::Bytes;

pub use http::HttpTransport;

/// Content type of every PDU sent to the relay.
pub const MMS_CONTENT_TYPE: &str = "application/vnd.wap.mms-message";

/// Errors raised by a [`Transport`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The relay answered with a non-success status.
    #[error("Relay returned status {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// No endpoint was given and none is configured.
    #[error("No MMSC endpoint configured")]
    NoEndpoint,

    /// Any other failure of a custom transport.
    #[error("{0}")]
    Other(String),
}

/// GET/POST exchange with the relay.
///
/// Timeouts are the transport's business; callers never apply their own.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Download the PDU stored at `content_location`.
    async fn fetch(&self, content_location: &str) -> Result<Bytes, TransportError>;

    /// Post a PDU to `endpoint`, or to the default MMSC endpoint when `None`.
    async fn send(&self, pdu: Vec<u8>, endpoint: Option<&str>) -> Result<Bytes, TransportError>;
}
