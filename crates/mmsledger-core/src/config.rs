//! Transaction and retention settings.
//!
//! Settings are plain data; the embedding application decides where
//! they come from.

use serde::{Deserialize, Serialize};

/// Default HTTP proxy port used by most carriers.
pub const DEFAULT_PROXY_PORT: u16 = 80;

/// Default number of MMS kept per conversation thread.
pub const DEFAULT_MMS_LIMIT: u32 = 20;

/// Connection settings for talking to the relay (MMSC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionSettings {
    /// MMSC URL that acknowledgements are posted to by default.
    pub mmsc_url: String,
    /// HTTP proxy host, if the carrier requires one.
    pub proxy_host: Option<String>,
    /// HTTP proxy port.
    pub proxy_port: u16,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Post acknowledgements to the message's content location instead
    /// of the MMSC URL.
    pub notify_wap_mmsc: bool,
    /// Local line number written into the From of acknowledgements.
    pub local_number: String,
}

impl Default for TransactionSettings {
    fn default() -> Self {
        Self {
            mmsc_url: String::new(),
            proxy_host: None,
            proxy_port: DEFAULT_PROXY_PORT,
            user_agent: concat!("mmsledger/", env!("CARGO_PKG_VERSION")).to_string(),
            notify_wap_mmsc: false,
            local_number: String::new(),
        }
    }
}

impl TransactionSettings {
    /// Create settings for an MMSC URL.
    #[must_use]
    pub fn new(mmsc_url: impl Into<String>) -> Self {
        Self {
            mmsc_url: mmsc_url.into(),
            ..Self::default()
        }
    }

    /// Returns the proxy as `host:port`, if configured.
    #[must_use]
    pub fn proxy_address(&self) -> Option<String> {
        self.proxy_host
            .as_deref()
            .filter(|host| !host.is_empty())
            .map(|host| format!("{host}:{}", self.proxy_port))
    }
}

/// Per-thread message retention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionSettings {
    /// Delete old messages automatically.
    pub auto_delete: bool,
    /// Maximum number of unlocked MMS kept per thread.
    pub mms_limit: u32,
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self {
            auto_delete: false,
            mms_limit: DEFAULT_MMS_LIMIT,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_address() {
        let mut settings = TransactionSettings::new("http://mmsc.example.com/mms");
        assert_eq!(settings.proxy_address(), None);

        settings.proxy_host = Some("10.0.0.1".to_string());
        settings.proxy_port = 8080;
        assert_eq!(settings.proxy_address().as_deref(), Some("10.0.0.1:8080"));
    }

    #[test]
    fn test_partial_settings_deserialize_with_defaults() {
        let settings: TransactionSettings =
            serde_json::from_str(r#"{"mmsc_url":"http://mmsc","notify_wap_mmsc":true}"#).unwrap();
        assert!(settings.notify_wap_mmsc);
        assert_eq!(settings.proxy_port, DEFAULT_PROXY_PORT);

        let retention: RetentionSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(retention.mms_limit, DEFAULT_MMS_LIMIT);
        assert!(!retention.auto_delete);
    }
}
