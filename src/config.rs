//! Client configuration.
//!
//! [`ClientConfig`] is deserializable, so deployments can keep it in a TOML
//! file alongside the rest of their configuration:
//!
//! ```toml
//! merchant_id = "TestTerminal"
//! secret = "TestPassword"
//! api_url = "https://rest-api-test.tinkoff.ru"
//!
//! [retry]
//! max_attempts = 5
//! ```
//!
//! The signing secret is held in [`zeroize::Zeroizing`] memory, redacted from
//! the `Debug` output, and never transmitted or logged.

use std::fmt;

use serde::Deserialize;
use zeroize::Zeroizing;

use crate::{
    error::{PaymentsError, Result},
    retry::RetryPolicy,
};

/// Default production endpoint of the T-Bank acquiring API.
pub const DEFAULT_API_URL: &str = "https://securepay.tinkoff.ru";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Immutable configuration held by a [`crate::TbankPayments`] instance.
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    /// Merchant terminal identifier issued by the gateway (`TerminalKey`).
    pub merchant_id: String,

    /// Signing secret. Never transmitted; used only inside token generation.
    pub secret: Zeroizing<String>,

    /// Base API URL. A trailing slash is stripped at construction.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry policy for transport-level failures.
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Creates a configuration with default URL, timeout, and retry policy.
    #[must_use]
    pub fn new(merchant_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            secret: Zeroizing::new(secret.into()),
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            retry: RetryPolicy::default(),
        }
    }

    /// Validates required fields.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentsError::Config`] if `merchant_id` or `secret` is
    /// empty.
    pub fn validate(&self) -> Result<()> {
        if self.merchant_id.is_empty() {
            return Err(PaymentsError::Config("merchant_id is required".to_owned()));
        }
        if self.secret.is_empty() {
            return Err(PaymentsError::Config("secret is required".to_owned()));
        }
        Ok(())
    }

    /// Base URL with any trailing slash stripped.
    #[must_use]
    pub fn normalized_api_url(&self) -> String {
        self.api_url.trim_end_matches('/').to_owned()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("merchant_id", &self.merchant_id)
            .field("secret", &"***")
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("retry", &self.retry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let config = ClientConfig::new("TestTerminal", "TestPassword");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_merchant_id_rejected() {
        let config = ClientConfig::new("", "TestPassword");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("merchant_id"));
    }

    #[test]
    fn test_missing_secret_rejected() {
        let config = ClientConfig::new("TestTerminal", "");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("secret"));
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let mut config = ClientConfig::new("t", "s");
        config.api_url = "https://securepay.tinkoff.ru/".to_owned();
        assert_eq!(config.normalized_api_url(), "https://securepay.tinkoff.ru");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = ClientConfig::new("TestTerminal", "TopSecret");
        let output = format!("{config:?}");
        assert!(!output.contains("TopSecret"));
        assert!(output.contains("***"));
    }

    #[test]
    fn test_from_toml() {
        let toml = r#"
            merchant_id = "TestTerminal"
            secret = "TestPassword"
            api_url = "https://rest-api-test.tinkoff.ru"
            timeout_secs = 10

            [retry]
            max_attempts = 5
        "#;

        let config: ClientConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.merchant_id, "TestTerminal");
        assert_eq!(config.api_url, "https://rest-api-test.tinkoff.ru");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.retry.max_attempts, 5);
    }

    #[test]
    fn test_from_toml_defaults() {
        let toml = r#"
            merchant_id = "TestTerminal"
            secret = "TestPassword"
        "#;

        let config: ClientConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_from_toml_missing_required_field() {
        let result: std::result::Result<ClientConfig, _> =
            toml::from_str("merchant_id = \"TestTerminal\"");
        assert!(result.is_err());
    }
}
