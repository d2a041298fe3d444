//! T-Bank Payments: Rust client for the T-Bank acquiring REST API
//!
//! An async client for the T-Bank (Tinkoff) internet acquiring API v2:
//! payment sessions, card and recurrent payments, 3-D Secure flows, SBP
//! (Faster Payments System) QR codes, T-Pay, SberPay, Mir Pay, customers,
//! bound cards, and fiscal receipts.
//!
//! # What the client does for you
//!
//! - **Request signing**: every signed call carries a `Token`, the SHA-256
//!   digest of the request's scalar fields plus the terminal password,
//!   computed exactly as the gateway specifies
//! - **Request validation**: parameters are checked against per-endpoint
//!   shapes before anything touches the network, and every violation is
//!   reported at once
//! - **Error normalization**: transport failures, HTTP status errors, and
//!   gateway-level rejections (`Success: false`) all surface as one error
//!   type with the gateway's own code and message
//! - **Retries**: network failures and 5xx responses are retried with
//!   exponential backoff; business rejections never are
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │   Your service      │
//! └─────────┬───────────┘
//!           │ init_payment(params), get_qr(params), ...
//! ┌─────────▼───────────────────────────────────────┐
//! │          TbankPayments (this crate)             │
//! │  ┌────────────┐  ┌──────────┐  ┌────────────┐  │
//! │  │  registry  │──│ validator│──│   token    │  │
//! │  │ (endpoint  │  │ (shape   │  │ (SHA-256   │  │
//! │  │  shapes)   │  │  checks) │  │  signing)  │  │
//! │  └────────────┘  └──────────┘  └─────┬──────┘  │
//! │                              ┌───────▼──────┐  │
//! │                              │  transport   │  │
//! │                              │ (retry, error│  │
//! │                              │  normalizing)│  │
//! │                              └───────┬──────┘  │
//! └──────────────────────────────────────┼─────────┘
//!                                        │ HTTPS POST/GET
//!                              ┌─────────▼─────────┐
//!                              │  securepay.       │
//!                              │  tinkoff.ru       │
//!                              └───────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use serde_json::json;
//! use tbank_payments::{ClientConfig, TbankPayments};
//!
//! # async fn example() -> tbank_payments::Result<()> {
//! let client = TbankPayments::new(ClientConfig::new("TestTerminal", "TestPassword"))?;
//!
//! let payment = client
//!     .init_payment(
//!         json!({
//!             "Amount": 10000,
//!             "OrderId": "order-123",
//!             "Description": "Подарочная карта",
//!         })
//!         .as_object()
//!         .cloned()
//!         .unwrap_or_default(),
//!     )
//!     .await?;
//!
//! println!("Pay at: {}", payment["PaymentURL"]);
//! # Ok(())
//! # }
//! ```
//!
//! Amounts are in kopecks. [`amount_to_kopecks`] and [`kopecks_to_amount`]
//! convert to and from rubles, and [`create_receipt`] assembles a fiscal
//! receipt with the gateway's defaults filled in.
//!
//! # Verifying notifications
//!
//! The gateway signs webhook notifications with the same token scheme.
//! Reject anything that fails verification:
//!
//! ```rust
//! use tbank_payments::{ClientConfig, TbankPayments};
//!
//! # fn example(notification: tbank_payments::RequestParams) -> tbank_payments::Result<()> {
//! let client = TbankPayments::new(ClientConfig::new("TestTerminal", "TestPassword"))?;
//!
//! let mut notification = notification;
//! let token = notification
//!     .remove("Token")
//!     .and_then(|t| t.as_str().map(ToOwned::to_owned))
//!     .unwrap_or_default();
//!
//! if !client.verify_notification_signature(&notification, &token) {
//!     return Err(tbank_payments::PaymentsError::Validation(
//!         "notification signature mismatch".to_owned(),
//!     ));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`client`]: the [`TbankPayments`] facade, one method per endpoint
//! - [`registry`]: the [`Operation`] enum mapping endpoints to paths and
//!   parameter shapes
//! - [`validator`]: declarative field rules and the collect-all checker
//! - [`token`]: request signing and notification verification
//! - [`transport`]: HTTP dispatch, retry, error normalization
//! - [`receipt`]: fiscal receipt assembly and amount conversion
//! - [`config`]: client configuration
//! - [`retry`]: backoff policy and retryability classification
//! - [`logger`]: pluggable request/response logging
//! - [`error`]: the [`PaymentsError`] taxonomy
//!
//! # Security Considerations
//!
//! - **Never hardcode the terminal password**: load it from the environment
//!   or a secret store. The client keeps it in zeroizing memory and redacts
//!   it from `Debug` output and logs.
//! - **Always verify notification signatures** with
//!   [`TbankPayments::verify_notification_signature`] before trusting a
//!   webhook; the comparison is constant-time.
//! - **HTTPS only**: the default endpoint is TLS and requests time out
//!   after 30 seconds.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod client;
pub mod config;
pub mod error;
pub mod logger;
pub mod receipt;
pub mod registry;
pub mod retry;
pub mod token;
pub mod transport;
pub mod validator;

pub use client::{TbankPayments, TbankPaymentsBuilder};
pub use config::{ClientConfig, DEFAULT_API_URL};
pub use error::{PaymentsError, Result};
pub use logger::{Logger, TracingLogger};
pub use receipt::{
    Receipt, ReceiptItem, ReceiptItemParams, ReceiptParams, amount_to_kopecks, create_receipt,
    kopecks_to_amount,
};
pub use registry::Operation;
pub use retry::{RetryPolicy, is_retryable};
pub use token::{generate_token, verify_signature};
pub use transport::{RequestParams, RetryPredicate};
pub use validator::{ArrayItems, FieldKind, FieldRule, FieldShape, StringFormat, validate};
