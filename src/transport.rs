//! HTTP transport: signed POST dispatch, unsigned GET, retry, and error
//! normalization.
//!
//! Every signed POST goes through the same pipeline:
//!
//! 1. Clone the caller's parameters (the caller's map is never mutated).
//! 2. Inject `TerminalKey` (the configured merchant id) if absent.
//! 3. Inject `Token` (computed over the post-injection set) if absent.
//! 4. Send with a bounded timeout; retry transport-level failures per policy.
//! 5. Map `Success:false` payloads to [`PaymentsError::Api`]; never retry
//!    those.
//!
//! GET requests skip signing and the retry wrapper but share the same error
//! normalization.

use std::{fmt, sync::Arc, time::Duration};

use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Map, Value};
use zeroize::Zeroizing;

use crate::{
    config::ClientConfig,
    error::{PaymentsError, Result},
    logger::Logger,
    retry::{is_retryable, retry_with_backoff, RetryPolicy},
    token::generate_token,
};

/// Request parameters: a JSON object mapping field names to values.
///
/// Scalar fields participate in signing; nested objects (`Receipt`, `DATA`)
/// and arrays (`Shops`) are passed through to the gateway verbatim.
pub type RequestParams = Map<String, Value>;

/// Custom classification of retryable errors, installable per client.
pub type RetryPredicate = Arc<dyn Fn(&PaymentsError) -> bool + Send + Sync>;

const USER_AGENT: &str = concat!("tbank-payments-rust/", env!("CARGO_PKG_VERSION"));

/// Issues authenticated calls against the gateway.
pub(crate) struct HttpTransport {
    http: Client,
    api_url: String,
    merchant_id: String,
    secret: Zeroizing<String>,
    logger: Arc<dyn Logger>,
    retry: RetryPolicy,
    retry_predicate: Option<RetryPredicate>,
}

impl HttpTransport {
    pub(crate) fn new(
        config: &ClientConfig,
        logger: Arc<dyn Logger>,
        retry_predicate: Option<RetryPredicate>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(PaymentsError::network)?;

        Ok(Self {
            http,
            api_url: config.normalized_api_url(),
            merchant_id: config.merchant_id.clone(),
            secret: config.secret.clone(),
            logger,
            retry: config.retry.clone(),
            retry_predicate,
        })
    }

    pub(crate) fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }

    /// Sends a signed POST request.
    ///
    /// # Errors
    ///
    /// [`PaymentsError::Api`] on a `Success:false` payload or a 4xx status,
    /// [`PaymentsError::Network`] on connection failures, timeouts, and 5xx
    /// statuses after retries are exhausted.
    pub(crate) async fn post(&self, path: &str, params: &RequestParams) -> Result<Value> {
        let mut body = params.clone();
        if !body.contains_key("TerminalKey") {
            body.insert("TerminalKey".to_owned(), json!(self.merchant_id));
        }
        if !body.contains_key("Token") {
            let token = generate_token(&body, &self.secret);
            body.insert("Token".to_owned(), json!(token));
        }

        let url = format!("{}{path}", self.api_url);
        self.logger.debug(&format!("[T-Bank] Request: {path}"), &Value::Object(body.clone()));

        let retryable = |error: &PaymentsError| match &self.retry_predicate {
            Some(predicate) => predicate(error),
            None => is_retryable(error),
        };

        let result = retry_with_backoff(&self.retry, retryable, || self.send_post(&url, &body))
            .await;

        match result {
            Ok(payload) => {
                self.logger.debug(&format!("[T-Bank] Response: {path}"), &payload);
                Ok(payload)
            }
            Err(error) => {
                self.logger.error(
                    &format!("[T-Bank] Error: {path}"),
                    &json!({ "message": error.to_string() }),
                );
                Err(error)
            }
        }
    }

    async fn send_post(&self, url: &str, body: &RequestParams) -> Result<Value> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(PaymentsError::network)?;
        Self::normalize_response(response, true).await
    }

    /// Sends an unsigned GET request. Single attempt, no retry wrapper.
    ///
    /// # Errors
    ///
    /// Same normalization as [`post`](Self::post), minus the retries.
    pub(crate) async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}{path}", self.api_url);
        self.logger.debug(
            &format!("[T-Bank] GET Request: {path}"),
            &json!({ "query": query.iter().map(|(k, v)| json!([k, v])).collect::<Vec<_>>() }),
        );

        let mut request = self.http.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let result = async {
            let response = request.send().await.map_err(PaymentsError::network)?;
            Self::normalize_response(response, false).await
        }
        .await;

        match result {
            Ok(payload) => {
                self.logger.debug(&format!("[T-Bank] GET Response: {path}"), &payload);
                Ok(payload)
            }
            Err(error) => {
                self.logger.error(
                    &format!("[T-Bank] GET Error: {path}"),
                    &json!({ "message": error.to_string() }),
                );
                Err(error)
            }
        }
    }

    /// Maps an HTTP response to the uniform result shape.
    ///
    /// 5xx becomes a retryable [`PaymentsError::Network`]. 4xx becomes
    /// [`PaymentsError::Api`], using the JSON body's error fields when the
    /// gateway sent them. A 2xx payload carrying `Success:false` is an
    /// application-level rejection (checked for POST only, matching the
    /// gateway's protocol).
    async fn normalize_response(response: Response, check_success: bool) -> Result<Value> {
        let status = response.status();

        if status.is_server_error() {
            return Err(PaymentsError::Network {
                message: format!("server returned status {status}"),
                status: Some(status.as_u16()),
                source: None,
            });
        }

        if status.is_client_error() {
            let payload = response.json::<Value>().await.unwrap_or(Value::Null);
            return Err(api_error_from_payload(&payload, Some(status)));
        }

        let payload: Value = response.json().await.map_err(PaymentsError::network)?;

        if check_success && payload.get("Success").and_then(Value::as_bool) == Some(false) {
            return Err(api_error_from_payload(&payload, None));
        }

        Ok(payload)
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("api_url", &self.api_url)
            .field("merchant_id", &self.merchant_id)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

/// Builds an [`PaymentsError::Api`] from a gateway error payload.
///
/// Message precedence follows the wire contract: `Message`, then `Details`,
/// then a generic fallback. The code falls back to the HTTP status when the
/// body carries no `ErrorCode`.
fn api_error_from_payload(payload: &Value, status: Option<StatusCode>) -> PaymentsError {
    let message = payload
        .get("Message")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .or_else(|| payload.get("Details").and_then(Value::as_str).filter(|s| !s.is_empty()))
        .unwrap_or("API error")
        .to_owned();

    let code = match payload.get("ErrorCode") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => status.map_or_else(String::new, |s| s.as_u16().to_string()),
    };

    let details = payload.get("Details").and_then(Value::as_str).map(str::to_owned);

    PaymentsError::Api { code, message, details }
}
