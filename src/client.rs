//! The `TbankPayments` facade.
//!
//! One async method per remote operation, each a lookup into the
//! [`Operation`] registry: validate against the operation's shape, then
//! delegate to the transport, which injects `TerminalKey` and `Token` and
//! normalizes errors. The unsigned GET endpoints (T-Pay, SberPay) take typed
//! arguments instead of parameter maps.

use std::{fmt, sync::Arc};

use serde_json::Value;

use crate::{
    config::ClientConfig,
    error::{PaymentsError, Result},
    logger::{Logger, TracingLogger},
    registry::Operation,
    retry::RetryPolicy,
    token,
    transport::{HttpTransport, RequestParams, RetryPredicate},
    validator::validate,
};

/// Client for the T-Bank acquiring API.
///
/// Holds only immutable configuration; every call is an independent,
/// stateless request, so one instance can serve any number of concurrent
/// calls.
///
/// # Examples
///
/// ```no_run
/// use serde_json::json;
/// use tbank_payments::{ClientConfig, TbankPayments};
///
/// # async fn example() -> tbank_payments::Result<()> {
/// let client = TbankPayments::new(ClientConfig::new("TestTerminal", "TestPassword"))?;
///
/// let payment = client
///     .init_payment(
///         json!({ "Amount": 10000, "OrderId": "order-123" })
///             .as_object()
///             .cloned()
///             .unwrap_or_default(),
///     )
///     .await?;
///
/// println!("PaymentURL: {}", payment["PaymentURL"]);
/// # Ok(())
/// # }
/// ```
pub struct TbankPayments {
    transport: HttpTransport,
}

/// Builder for [`TbankPayments`] with a custom logger or retry predicate.
pub struct TbankPaymentsBuilder {
    config: ClientConfig,
    logger: Arc<dyn Logger>,
    retry_predicate: Option<RetryPredicate>,
}

impl TbankPaymentsBuilder {
    /// Replaces the default tracing-backed logger.
    #[must_use]
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Installs a custom classification of retryable errors.
    #[must_use]
    pub fn retry_predicate(mut self, predicate: RetryPredicate) -> Self {
        self.retry_predicate = Some(predicate);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// [`PaymentsError::Config`] if the merchant id or secret is empty;
    /// no partial client is returned.
    pub fn build(self) -> Result<TbankPayments> {
        self.config.validate()?;
        let transport = HttpTransport::new(&self.config, self.logger, self.retry_predicate)?;
        Ok(TbankPayments { transport })
    }
}

impl fmt::Debug for TbankPaymentsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TbankPaymentsBuilder").field("config", &self.config).finish_non_exhaustive()
    }
}

impl fmt::Debug for TbankPayments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TbankPayments").field("transport", &self.transport).finish()
    }
}

impl TbankPayments {
    /// Creates a client with the default logger and retry classification.
    ///
    /// # Errors
    ///
    /// [`PaymentsError::Config`] if the merchant id or secret is empty.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Starts a builder for customized construction.
    #[must_use]
    pub fn builder(config: ClientConfig) -> TbankPaymentsBuilder {
        TbankPaymentsBuilder {
            config,
            logger: Arc::new(TracingLogger),
            retry_predicate: None,
        }
    }

    /// Validates `params` against `operation`'s shape, then dispatches.
    ///
    /// # Errors
    ///
    /// [`PaymentsError::Validation`] before any network traffic when the
    /// shape is violated; transport errors otherwise.
    pub async fn call(&self, operation: Operation, params: RequestParams) -> Result<Value> {
        validate(&operation.shape(), &params)?;
        self.transport.post(operation.path(), &params).await
    }

    /// Computes the request token for `params` under this client's secret.
    #[must_use]
    pub fn generate_token(&self, params: &RequestParams) -> String {
        token::generate_token(params, self.transport.secret())
    }

    /// Verifies a gateway notification signature (constant-time comparison).
    ///
    /// Callers must reject any notification for which this returns `false`
    /// before acting on its contents.
    #[must_use]
    pub fn verify_notification_signature(
        &self,
        notification: &RequestParams,
        received_token: &str,
    ) -> bool {
        token::verify_signature(notification, self.transport.secret(), received_token)
    }

    // --- Payment initiation ---

    /// Initiates a payment session (`/v2/Init`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn init_payment(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::Init, params).await
    }

    /// Confirms a two-stage payment (`/v2/Confirm`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn confirm_payment(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::Confirm, params).await
    }

    /// Confirms a debit (`/v2/ConfirmDebit`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn confirm_debit(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::ConfirmDebit, params).await
    }

    // --- Card payments ---

    /// Finishes card authorization (`/v2/FinishAuthorize`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn finish_authorize(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::FinishAuthorize, params).await
    }

    // --- 3DS ---

    /// Checks the applicable 3DS version (`/v2/Check3dsVersion`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn check_3ds_version(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::Check3dsVersion, params).await
    }

    /// Passes the 3DS Method stage (`/v2/3DSMethod`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn submit_3ds_method(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::Submit3dsMethod, params).await
    }

    /// Submits 3DS authorization to the issuer (`/v2/Submit3DSAuthorization`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn submit_3ds_authorization(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::Submit3dsAuthorization, params).await
    }

    /// Confirms 3DS v1.0 completion (`/v2/Submit3DSAuthorizationV1`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn confirm_3ds_v1(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::Submit3dsAuthorizationV1, params).await
    }

    /// Confirms 3DS v2.1 completion (`/v2/Submit3DSAuthorizationV2`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn confirm_3ds_v2(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::Submit3dsAuthorizationV2, params).await
    }

    // --- Cancellation and status ---

    /// Cancels or refunds a payment (`/v2/Cancel`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn cancel_payment(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::Cancel, params).await
    }

    /// Looks up payment state (`/v2/GetState`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn get_payment_state(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::GetState, params).await
    }

    /// Looks up order state (`/v2/CheckOrder`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn check_order(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::CheckOrder, params).await
    }

    /// Requests an operation reference document (`/v2/GetConfirmOperation`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn get_confirm_operation(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::GetConfirmOperation, params).await
    }

    // --- Saved payment credentials ---

    /// Charges saved card credentials (`/v2/Charge`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn charge_recurrent(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::Charge, params).await
    }

    /// Recurring SBP charge against a bound account (`/v2/ChargeQr`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn charge_qr(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::ChargeQr, params).await
    }

    // --- Receipts ---

    /// Sends a closing fiscal receipt (`/v2/SendClosingReceipt`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn send_closing_receipt(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::SendClosingReceipt, params).await
    }

    /// Looks up receipt delivery state (`/v2/GetReceiptState`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn get_receipt_state(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::GetReceiptState, params).await
    }

    // --- SBP ---

    /// Generates an SBP QR code (`/v2/GetQr`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn get_qr(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::GetQr, params).await
    }

    /// Looks up SBP QR state (`/v2/GetQrState`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn get_qr_state(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::GetQrState, params).await
    }

    /// Lists banks accepting QR refunds (`/v2/GetQrBankList`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn get_qr_bank_list(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::GetQrBankList, params).await
    }

    /// Binds an SBP account to the shop (`/v2/AddAccount`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn add_account(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::AddAccount, params).await
    }

    /// Looks up account binding state (`/v2/GetAddAccountState`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn get_add_account_state(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::GetAddAccountState, params).await
    }

    /// Lists accounts bound to the shop (`/v2/GetAccountQrList`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn get_account_qr_list(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::GetAccountQrList, params).await
    }

    /// Creates an SBP test payment session (`/v2/SbpPayTest`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn sbp_pay_test(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::SbpPayTest, params).await
    }

    /// Lists SBP member banks for a payment (`/v2/QrMembersList`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn get_qr_members_list(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::QrMembersList, params).await
    }

    // --- Mir Pay ---

    /// Fetches a Mir Pay deep link (`/v2/MirPay/GetDeepLink`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn get_mir_pay_deep_link(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::MirPayGetDeepLink, params).await
    }

    // --- Customers ---

    /// Registers a customer (`/v2/AddCustomer`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn add_customer(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::AddCustomer, params).await
    }

    /// Looks up a customer (`/v2/GetCustomer`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn get_customer(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::GetCustomer, params).await
    }

    /// Removes a customer (`/v2/RemoveCustomer`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn remove_customer(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::RemoveCustomer, params).await
    }

    // --- Cards ---

    /// Initiates card binding (`/v2/AddCard`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn add_card(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::AddCard, params).await
    }

    /// Attaches a card (`/v2/AttachCard`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn attach_card(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::AttachCard, params).await
    }

    /// Looks up card binding state (`/v2/GetAddCardState`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn get_add_card_state(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::GetAddCardState, params).await
    }

    /// Lists a customer's bound cards (`/v2/GetCardList`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn get_card_list(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::GetCardList, params).await
    }

    /// Removes a bound card (`/v2/RemoveCard`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn remove_card(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::RemoveCard, params).await
    }

    /// Confirms a card with a random debited amount (`/v2/SubmitRandomAmount`).
    ///
    /// # Errors
    ///
    /// See [`call`](Self::call).
    pub async fn submit_random_amount(&self, params: RequestParams) -> Result<Value> {
        self.call(Operation::SubmitRandomAmount, params).await
    }

    // --- T-Pay (unsigned GET, keyed by URL path) ---

    /// Checks T-Pay availability for this terminal.
    ///
    /// # Errors
    ///
    /// Transport errors; no signing, single attempt.
    pub async fn get_tpay_status(&self) -> Result<Value> {
        let path =
            format!("/v2/TinkoffPay/terminals/{}/status", self.transport.merchant_id());
        self.transport.get(&path, &[]).await
    }

    /// Fetches a T-Pay link for a payment. `version` defaults to `"2.0"`.
    ///
    /// # Errors
    ///
    /// [`PaymentsError::Validation`] when `payment_id` is empty; transport
    /// errors otherwise.
    pub async fn get_tpay_link(&self, payment_id: &str, version: Option<&str>) -> Result<Value> {
        require_payment_id(payment_id)?;
        let version = version.unwrap_or("2.0");
        let path =
            format!("/v2/TinkoffPay/transactions/{payment_id}/versions/{version}/link");
        self.transport.get(&path, &[]).await
    }

    /// Fetches a T-Pay QR code for a payment.
    ///
    /// # Errors
    ///
    /// [`PaymentsError::Validation`] when `payment_id` is empty; transport
    /// errors otherwise.
    pub async fn get_tpay_qr(&self, payment_id: &str) -> Result<Value> {
        require_payment_id(payment_id)?;
        let path = format!("/v2/TinkoffPay/{payment_id}/QR");
        self.transport.get(&path, &[]).await
    }

    // --- SberPay (unsigned GET) ---

    /// Fetches a SberPay QR code for a payment.
    ///
    /// # Errors
    ///
    /// [`PaymentsError::Validation`] when `payment_id` is empty; transport
    /// errors otherwise.
    pub async fn get_sber_pay_qr(&self, payment_id: &str) -> Result<Value> {
        require_payment_id(payment_id)?;
        let path = format!("/v2/SberPay/{payment_id}/QR");
        self.transport.get(&path, &[]).await
    }

    /// Fetches a SberPay link for a payment. `version` defaults to `"2.0"`.
    ///
    /// # Errors
    ///
    /// [`PaymentsError::Validation`] when `payment_id` is empty; transport
    /// errors otherwise.
    pub async fn get_sber_pay_link(
        &self,
        payment_id: &str,
        version: Option<&str>,
    ) -> Result<Value> {
        require_payment_id(payment_id)?;
        let version = version.unwrap_or("2.0");
        let path = format!("/v2/SberPay/transactions/{payment_id}/versions/{version}/link");
        self.transport.get(&path, &[]).await
    }
}

fn require_payment_id(payment_id: &str) -> Result<()> {
    if payment_id.is_empty() {
        return Err(PaymentsError::Validation("\"paymentId\" is required".to_owned()));
    }
    Ok(())
}
