//! HTTP transport on `reqwest`.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Proxy, Response};
use tracing::debug;

use super::{MMS_CONTENT_TYPE, Transport, TransportError};
use crate::config::TransactionSettings;

const ACCEPT_MMS: &str = "*/*, application/vnd.wap.mms-message, application/vnd.wap.sic";

/// Talks to the MMSC over HTTP, optionally through the carrier proxy.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    mmsc_url: String,
    http_client: Client,
}

impl HttpTransport {
    /// Creates a transport from the transaction settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy address is invalid or the HTTP client
    /// cannot be built.
    pub fn new(settings: &TransactionSettings) -> Result<Self, TransportError> {
        let mut builder = Client::builder().user_agent(settings.user_agent.clone());
        if let Some(proxy) = settings.proxy_address() {
            builder = builder.proxy(Proxy::http(format!("http://{proxy}"))?);
        }

        Ok(Self {
            mmsc_url: settings.mmsc_url.clone(),
            http_client: builder.build()?,
        })
    }

    /// Default endpoint acknowledgements are posted to.
    #[must_use]
    pub fn mmsc_url(&self) -> &str {
        &self.mmsc_url
    }

    async fn read_body(response: Response) -> Result<Bytes, TransportError> {
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        Ok(response.bytes().await?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, content_location: &str) -> Result<Bytes, TransportError> {
        debug!(url = content_location, "GET");
        let response = self
            .http_client
            .get(content_location)
            .header(ACCEPT, ACCEPT_MMS)
            .send()
            .await?;

        Self::read_body(response).await
    }

    async fn send(&self, pdu: Vec<u8>, endpoint: Option<&str>) -> Result<Bytes, TransportError> {
        let url = endpoint.unwrap_or(&self.mmsc_url);
        if url.is_empty() {
            return Err(TransportError::NoEndpoint);
        }

        debug!(url, len = pdu.len(), "POST");
        let response = self
            .http_client
            .post(url)
            .header(ACCEPT, ACCEPT_MMS)
            .header(CONTENT_TYPE, MMS_CONTENT_TYPE)
            .body(pdu)
            .send()
            .await?;

        Self::read_body(response).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        let mut settings = TransactionSettings::new("http://mmsc.example.com/mms");
        settings.proxy_host = Some("10.0.0.1".to_string());

        let transport = HttpTransport::new(&settings).unwrap();
        assert_eq!(transport.mmsc_url(), "http://mmsc.example.com/mms");
    }

    #[tokio::test]
    async fn test_send_without_endpoint() {
        let transport = HttpTransport::new(&TransactionSettings::default()).unwrap();
        let err = transport.send(vec![0x8C, 0x85], None).await.unwrap_err();
        assert!(matches!(err, TransportError::NoEndpoint));
    }
}
