//! Error types for the T-Bank payments client.
//!
//! All errors implement the standard [`std::error::Error`] trait via
//! [`thiserror::Error`] and fall into the four categories the client
//! distinguishes:
//!
//! - **Validation** ([`PaymentsError::Validation`]): parameter shape violated;
//!   raised before any network call, never retried.
//! - **Api** ([`PaymentsError::Api`]): the gateway answered with
//!   `Success: false`; deterministic rejection, never retried.
//! - **Network** ([`PaymentsError::Network`]): connection, timeout, or 5xx
//!   failure; retried per policy before surfacing.
//! - **Config** ([`PaymentsError::Config`]): missing required construction
//!   parameters; fatal, raised synchronously at construction.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, PaymentsError>;

/// Errors that can occur while talking to the T-Bank API.
///
/// Retry classification lives in [`crate::retry::is_retryable`]: only
/// [`Network`](Self::Network) errors are transient.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum PaymentsError {
    /// Request parameters violated the endpoint schema.
    ///
    /// The message aggregates every violating field, joined with `"; "`.
    /// Validation runs strictly before signing and dispatch, so a request
    /// that fails validation makes zero network side effects.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The gateway received the request and rejected it (`Success: false`).
    ///
    /// Carries the remote `ErrorCode`, `Message`, and `Details`. Display
    /// shows the remote message (falling back to details when the gateway
    /// omits it). Never retried: the rejection is deterministic.
    #[error("{message}")]
    Api {
        /// Remote `ErrorCode` (or the HTTP status when the body omits one).
        code: String,
        /// Remote `Message`, falling back to `Details`, then `"API error"`.
        message: String,
        /// Remote `Details`, when present.
        details: Option<String>,
    },

    /// Transport-level failure: connection refused, timeout, or a 5xx status.
    ///
    /// Retried with exponential backoff up to the configured maximum; the
    /// final failure is surfaced with the underlying [`reqwest::Error`]
    /// attached as source when one exists.
    #[error("network request failed: {message}")]
    Network {
        /// Human-readable description of the failure.
        message: String,
        /// HTTP status code, when the server responded at all.
        status: Option<u16>,
        /// Underlying transport error, when the failure happened below HTTP.
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Client construction failed: merchant id or secret missing.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PaymentsError {
    /// Builds a [`Network`](Self::Network) error from a transport failure.
    pub(crate) fn network(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
            status: err.status().map(|s| s.as_u16()),
            source: Some(err),
        }
    }

    /// Remote or HTTP error code, when this is an [`Api`](Self::Api) error.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let error = PaymentsError::Validation("\"Amount\" is required".into());
        assert_eq!(error.to_string(), "validation failed: \"Amount\" is required");
    }

    #[test]
    fn test_api_display_is_remote_message() {
        let error = PaymentsError::Api {
            code: "9999".into(),
            message: "Неверный статус платежа".into(),
            details: Some("payment already confirmed".into()),
        };
        assert_eq!(error.to_string(), "Неверный статус платежа");
        assert_eq!(error.code(), Some("9999"));
    }

    #[test]
    fn test_network_display() {
        let error = PaymentsError::Network {
            message: "server returned status 502".into(),
            status: Some(502),
            source: None,
        };
        assert!(error.to_string().contains("502"));
        assert!(error.code().is_none());
    }

    #[test]
    fn test_config_display() {
        let error = PaymentsError::Config("merchant_id is required".into());
        assert_eq!(error.to_string(), "configuration error: merchant_id is required");
    }
}
