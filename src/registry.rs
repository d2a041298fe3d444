//! Registry of signed POST operations.
//!
//! Each remote operation is one [`Operation`] variant carrying its API path
//! and parameter shape. The facade validates against the shape, then hands
//! the parameters to the transport; no per-endpoint code beyond this table.

use crate::validator::{ArrayItems, FieldRule, FieldShape, StringFormat};

/// Every signed POST operation of the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Initiate a payment session.
    Init,
    /// Confirm a two-stage payment.
    Confirm,
    /// Confirm a debit.
    ConfirmDebit,
    /// Finish card authorization.
    FinishAuthorize,
    /// Check which 3DS version applies to a card.
    Check3dsVersion,
    /// Pass the 3DS Method stage.
    Submit3dsMethod,
    /// Submit 3DS authorization to the issuer.
    Submit3dsAuthorization,
    /// Confirm 3DS v1.0 completion.
    Submit3dsAuthorizationV1,
    /// Confirm 3DS v2.1 completion.
    Submit3dsAuthorizationV2,
    /// Cancel (fully or partially refund) a payment.
    Cancel,
    /// Payment state lookup.
    GetState,
    /// Order state lookup.
    CheckOrder,
    /// Operation reference document request.
    GetConfirmOperation,
    /// Charge against saved card credentials.
    Charge,
    /// Recurring charge against a bound SBP account.
    ChargeQr,
    /// Send a closing fiscal receipt.
    SendClosingReceipt,
    /// Receipt delivery state lookup.
    GetReceiptState,
    /// Generate an SBP QR code.
    GetQr,
    /// SBP QR state lookup.
    GetQrState,
    /// Banks accepting QR refunds.
    GetQrBankList,
    /// Bind an SBP account to the shop.
    AddAccount,
    /// Account binding state lookup.
    GetAddAccountState,
    /// Accounts bound to the shop.
    GetAccountQrList,
    /// Create an SBP test payment session.
    SbpPayTest,
    /// SBP member banks for a payment.
    QrMembersList,
    /// Mir Pay deep link.
    MirPayGetDeepLink,
    /// Register a customer.
    AddCustomer,
    /// Customer lookup.
    GetCustomer,
    /// Remove a customer.
    RemoveCustomer,
    /// Initiate card binding.
    AddCard,
    /// Attach a card.
    AttachCard,
    /// Card binding state lookup.
    GetAddCardState,
    /// Customer's bound cards.
    GetCardList,
    /// Remove a bound card.
    RemoveCard,
    /// Confirm a card with a random debited amount.
    SubmitRandomAmount,
}

impl Operation {
    /// All registered operations, for iteration in tests and tooling.
    pub const ALL: &'static [Operation] = &[
        Self::Init,
        Self::Confirm,
        Self::ConfirmDebit,
        Self::FinishAuthorize,
        Self::Check3dsVersion,
        Self::Submit3dsMethod,
        Self::Submit3dsAuthorization,
        Self::Submit3dsAuthorizationV1,
        Self::Submit3dsAuthorizationV2,
        Self::Cancel,
        Self::GetState,
        Self::CheckOrder,
        Self::GetConfirmOperation,
        Self::Charge,
        Self::ChargeQr,
        Self::SendClosingReceipt,
        Self::GetReceiptState,
        Self::GetQr,
        Self::GetQrState,
        Self::GetQrBankList,
        Self::AddAccount,
        Self::GetAddAccountState,
        Self::GetAccountQrList,
        Self::SbpPayTest,
        Self::QrMembersList,
        Self::MirPayGetDeepLink,
        Self::AddCustomer,
        Self::GetCustomer,
        Self::RemoveCustomer,
        Self::AddCard,
        Self::AttachCard,
        Self::GetAddCardState,
        Self::GetCardList,
        Self::RemoveCard,
        Self::SubmitRandomAmount,
    ];

    /// API path of this operation.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Init => "/v2/Init",
            Self::Confirm => "/v2/Confirm",
            Self::ConfirmDebit => "/v2/ConfirmDebit",
            Self::FinishAuthorize => "/v2/FinishAuthorize",
            Self::Check3dsVersion => "/v2/Check3dsVersion",
            Self::Submit3dsMethod => "/v2/3DSMethod",
            Self::Submit3dsAuthorization => "/v2/Submit3DSAuthorization",
            Self::Submit3dsAuthorizationV1 => "/v2/Submit3DSAuthorizationV1",
            Self::Submit3dsAuthorizationV2 => "/v2/Submit3DSAuthorizationV2",
            Self::Cancel => "/v2/Cancel",
            Self::GetState => "/v2/GetState",
            Self::CheckOrder => "/v2/CheckOrder",
            Self::GetConfirmOperation => "/v2/GetConfirmOperation",
            Self::Charge => "/v2/Charge",
            Self::ChargeQr => "/v2/ChargeQr",
            Self::SendClosingReceipt => "/v2/SendClosingReceipt",
            Self::GetReceiptState => "/v2/GetReceiptState",
            Self::GetQr => "/v2/GetQr",
            Self::GetQrState => "/v2/GetQrState",
            Self::GetQrBankList => "/v2/GetQrBankList",
            Self::AddAccount => "/v2/AddAccount",
            Self::GetAddAccountState => "/v2/GetAddAccountState",
            Self::GetAccountQrList => "/v2/GetAccountQrList",
            Self::SbpPayTest => "/v2/SbpPayTest",
            Self::QrMembersList => "/v2/QrMembersList",
            Self::MirPayGetDeepLink => "/v2/MirPay/GetDeepLink",
            Self::AddCustomer => "/v2/AddCustomer",
            Self::GetCustomer => "/v2/GetCustomer",
            Self::RemoveCustomer => "/v2/RemoveCustomer",
            Self::AddCard => "/v2/AddCard",
            Self::AttachCard => "/v2/AttachCard",
            Self::GetAddCardState => "/v2/GetAddCardState",
            Self::GetCardList => "/v2/GetCardList",
            Self::RemoveCard => "/v2/RemoveCard",
            Self::SubmitRandomAmount => "/v2/SubmitRandomAmount",
        }
    }

    /// Parameter shape of this operation.
    #[must_use]
    pub fn shape(self) -> FieldShape {
        match self {
            Self::Init => shape(vec![
                FieldRule::integer("Amount").min(1).required(),
                FieldRule::string("OrderId").required(),
                FieldRule::string("Description").max_len(250),
                FieldRule::string("PayForm"),
                FieldRule::string("CustomerKey"),
                FieldRule::string("Recurrent").allowed(&["Y"]),
                FieldRule::string("PayType").allowed(&["O", "T"]),
                FieldRule::string("Language").allowed(&["ru", "en"]),
                FieldRule::string("NotificationURL").format(StringFormat::Uri),
                FieldRule::string("SuccessURL").format(StringFormat::Uri),
                FieldRule::string("FailURL").format(StringFormat::Uri),
                FieldRule::string("RedirectDueDate"),
                FieldRule::object("Receipt"),
                FieldRule::object("DATA"),
                FieldRule::array("Shops"),
                FieldRule::string("Descriptor").max_len(256),
                FieldRule::string("OperationInitiatorType").allowed(&["2", "R", "I", "D", "N"]),
                FieldRule::string_or_number("RebillId"),
            ]),
            Self::Confirm | Self::ConfirmDebit => shape(vec![
                FieldRule::string_or_number("PaymentId").required(),
                FieldRule::integer("Amount").min(1),
                FieldRule::string("IP").format(StringFormat::Ip),
                FieldRule::object("Receipt"),
                FieldRule::array("Shops"),
                FieldRule::string("Route"),
                FieldRule::string("Source"),
            ]),
            Self::FinishAuthorize => shape(vec![
                FieldRule::string_or_number("PaymentId").required(),
                FieldRule::string("CardData").required(),
                FieldRule::string("IP").format(StringFormat::Ip),
                FieldRule::boolean("SendEmail"),
                FieldRule::string("Source"),
                FieldRule::object("DATA"),
                FieldRule::string("InfoEmail").format(StringFormat::Email),
                FieldRule::string("EncryptedPaymentData"),
                FieldRule::integer("Amount"),
                FieldRule::string("deviceChannel"),
                FieldRule::string("Route"),
            ]),
            Self::Check3dsVersion => shape(vec![
                FieldRule::string_or_number("PaymentId").required(),
                FieldRule::string("CardData").required(),
            ]),
            // Sent towards the ACS; the shape carries neither TerminalKey
            // nor Token.
            Self::Submit3dsMethod => FieldShape::new(vec![
                FieldRule::string("threeDSMethodData").required(),
            ]),
            Self::Submit3dsAuthorization | Self::Submit3dsAuthorizationV1 => shape(vec![
                FieldRule::string_or_number("PaymentId").required(),
                FieldRule::string("MD"),
                FieldRule::string("PaRes"),
            ]),
            Self::Submit3dsAuthorizationV2 => shape(vec![
                FieldRule::string_or_number("PaymentId").required(),
                FieldRule::string("Cres"),
            ]),
            Self::Cancel => shape(vec![
                FieldRule::string_or_number("PaymentId").required(),
                FieldRule::integer("Amount").min(1),
                FieldRule::string("IP").format(StringFormat::Ip),
                FieldRule::object("Receipt"),
                FieldRule::array("Shops"),
                FieldRule::string("QrMemberId"),
                FieldRule::string("Route"),
                FieldRule::string("Source"),
                FieldRule::string("ExternalRequestId"),
            ]),
            Self::GetState => shape(vec![
                FieldRule::string_or_number("PaymentId").required(),
                FieldRule::string("IP").format(StringFormat::Ip),
            ]),
            Self::CheckOrder => shape(vec![FieldRule::string("OrderId").required()]),
            Self::GetConfirmOperation => shape(vec![
                FieldRule::string("CallbackUrl").format(StringFormat::Uri),
                FieldRule::array("PaymentIdList").items(ArrayItems::Numbers),
                FieldRule::array("EmailList").items(ArrayItems::Emails),
            ]),
            Self::Charge => shape(vec![
                FieldRule::string_or_number("PaymentId").required(),
                FieldRule::string_or_number("RebillId").required(),
                FieldRule::string("IP").format(StringFormat::Ip),
                FieldRule::boolean("SendEmail"),
                FieldRule::string("InfoEmail").format(StringFormat::Email),
            ]),
            Self::ChargeQr => shape(vec![
                FieldRule::string_or_number("PaymentId").required(),
                FieldRule::string("AccountToken").required(),
                FieldRule::string("IP").format(StringFormat::Ip),
                FieldRule::boolean("SendEmail"),
                FieldRule::string("InfoEmail").format(StringFormat::Email),
            ]),
            Self::SendClosingReceipt => shape(vec![
                FieldRule::string_or_number("PaymentId").required(),
                FieldRule::object("Receipt").required(),
            ]),
            Self::GetReceiptState => shape(vec![
                FieldRule::string_or_number("PaymentId").required(),
            ]),
            Self::GetQr => shape(vec![
                FieldRule::string_or_number("PaymentId").required(),
                FieldRule::string("DataType").allowed(&["PAYLOAD", "IMAGE"]),
            ]),
            Self::GetQrState | Self::MirPayGetDeepLink => shape(vec![
                FieldRule::string_or_number("PaymentId").required(),
            ]),
            Self::GetQrBankList | Self::GetAccountQrList | Self::QrMembersList => shape(vec![]),
            Self::AddAccount => shape(vec![
                FieldRule::string("CustomerKey").required(),
                FieldRule::string("Description"),
                FieldRule::string("NotificationURL").format(StringFormat::Uri),
                FieldRule::string("SuccessURL").format(StringFormat::Uri),
                FieldRule::string("FailURL").format(StringFormat::Uri),
                FieldRule::object("DATA"),
            ]),
            Self::GetAddAccountState => shape(vec![
                FieldRule::string("RequestKey").required(),
            ]),
            Self::SbpPayTest => shape(vec![
                FieldRule::string_or_number("PaymentId").required(),
                FieldRule::boolean("IsDeadlineExpired"),
                FieldRule::boolean("IsRejected"),
            ]),
            Self::AddCustomer => shape(vec![
                FieldRule::string("CustomerKey").required(),
                FieldRule::string("Email").format(StringFormat::Email),
                FieldRule::string("Phone"),
                FieldRule::string("IP").format(StringFormat::Ip),
            ]),
            Self::GetCustomer | Self::RemoveCustomer => shape(vec![
                FieldRule::string("CustomerKey").required(),
                FieldRule::string("IP").format(StringFormat::Ip),
            ]),
            Self::AddCard => shape(vec![
                FieldRule::string("CustomerKey").required(),
                FieldRule::string("CheckType").allowed(&["NO", "3DS", "HOLD"]),
                FieldRule::string("IP").format(StringFormat::Ip),
                FieldRule::boolean("ResidentState"),
            ]),
            Self::AttachCard => shape(vec![
                FieldRule::string("RequestKey").required(),
                FieldRule::string("CardData").required(),
                FieldRule::object("DATA"),
            ]),
            Self::GetAddCardState => shape(vec![
                FieldRule::string("RequestKey").required(),
            ]),
            Self::GetCardList => shape(vec![
                FieldRule::string("CustomerKey").required(),
                FieldRule::boolean("SavedCard"),
                FieldRule::string("IP").format(StringFormat::Ip),
            ]),
            Self::RemoveCard => shape(vec![
                FieldRule::string("CustomerKey").required(),
                FieldRule::string_or_number("CardId").required(),
                FieldRule::string("IP").format(StringFormat::Ip),
            ]),
            Self::SubmitRandomAmount => shape(vec![
                FieldRule::string("RequestKey").required(),
                FieldRule::integer("Amount").min(1).max(999).required(),
            ]),
        }
    }
}

/// Wraps operation-specific rules with the fields every signed request may
/// carry: an explicit `TerminalKey` and a precomputed `Token`.
fn shape(mut rules: Vec<FieldRule>) -> FieldShape {
    rules.insert(0, FieldRule::string("TerminalKey"));
    rules.push(FieldRule::string("Token"));
    FieldShape::new(rules)
}
