//! Pluggable logging for request/response diagnostics.
//!
//! The transport reports every request and response at debug level and every
//! failure at error level through an injected [`Logger`]. The default
//! implementation forwards to the `tracing` crate; callers with their own
//! sinks implement the two-method trait. Logging never alters the result of
//! a call, and the signing secret never passes through this interface.

use serde_json::Value;

/// Minimal logging capability the client needs.
pub trait Logger: Send + Sync {
    /// Records request/response diagnostics.
    fn debug(&self, message: &str, data: &Value);

    /// Records a failed call.
    fn error(&self, message: &str, data: &Value);
}

/// Default [`Logger`] backed by the `tracing` crate.
///
/// Emits events under the `tbank_payments` target; install any
/// `tracing_subscriber` to see them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str, data: &Value) {
        tracing::debug!(target: "tbank_payments", data = %data, "{message}");
    }

    fn error(&self, message: &str, data: &Value) {
        tracing::error!(target: "tbank_payments", data = %data, "{message}");
    }
}
