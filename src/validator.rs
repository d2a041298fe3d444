//! Declarative parameter validation for endpoint schemas.
//!
//! Each remote operation declares a [`FieldShape`]: the set of fields it
//! accepts and the constraint on each one. Validation is collect-all: every
//! violation is recorded and the aggregated message is raised as a single
//! [`PaymentsError::Validation`]. It runs strictly before signing and
//! dispatch, so an invalid call never reaches the network.
//!
//! Unknown fields are rejected, matching the gateway's strict schemas.

use std::net::IpAddr;

use serde_json::Value;
use url::Url;

use crate::{
    error::{PaymentsError, Result},
    transport::RequestParams,
};

/// Value kind a field must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// JSON string.
    String,
    /// JSON integer number.
    Integer,
    /// JSON boolean.
    Boolean,
    /// JSON object, passed through verbatim (e.g. `Receipt`, `DATA`).
    Object,
    /// JSON array, passed through verbatim (e.g. `Shops`).
    Array,
    /// String or number; payment identifiers arrive as either.
    StringOrNumber,
}

impl FieldKind {
    fn describe(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Boolean => "a boolean",
            Self::Object => "an object",
            Self::Array => "an array",
            Self::StringOrNumber => "a string or a number",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.as_i64().is_some() || value.as_u64().is_some(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::StringOrNumber => value.is_string() || value.is_number(),
        }
    }
}

/// String format constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    /// Absolute URI.
    Uri,
    /// IPv4 or IPv6 address.
    Ip,
    /// Email address.
    Email,
}

/// Element constraint for array-valued fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayItems {
    /// Every element must be a number.
    Numbers,
    /// Every element must be an email string.
    Emails,
}

/// Constraint on a single request field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    name: &'static str,
    kind: FieldKind,
    required: bool,
    allowed: Option<&'static [&'static str]>,
    min: Option<i64>,
    max: Option<i64>,
    max_len: Option<usize>,
    format: Option<StringFormat>,
    items: Option<ArrayItems>,
}

impl FieldRule {
    fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            allowed: None,
            min: None,
            max: None,
            max_len: None,
            format: None,
            items: None,
        }
    }

    /// Optional string field.
    #[must_use]
    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldKind::String)
    }

    /// Optional integer field.
    #[must_use]
    pub fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    /// Optional boolean field.
    #[must_use]
    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    /// Optional opaque object field.
    #[must_use]
    pub fn object(name: &'static str) -> Self {
        Self::new(name, FieldKind::Object)
    }

    /// Optional opaque array field.
    #[must_use]
    pub fn array(name: &'static str) -> Self {
        Self::new(name, FieldKind::Array)
    }

    /// Optional field accepting a string or a number.
    #[must_use]
    pub fn string_or_number(name: &'static str) -> Self {
        Self::new(name, FieldKind::StringOrNumber)
    }

    /// Field name this rule constrains.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Marks the field required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restricts string values to an allowed set.
    #[must_use]
    pub fn allowed(mut self, values: &'static [&'static str]) -> Self {
        self.allowed = Some(values);
        self
    }

    /// Minimum for integer values.
    #[must_use]
    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Maximum for integer values.
    #[must_use]
    pub fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    /// Maximum length for string values, in characters.
    #[must_use]
    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    /// String format constraint.
    #[must_use]
    pub fn format(mut self, format: StringFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Element constraint for array fields.
    #[must_use]
    pub fn items(mut self, items: ArrayItems) -> Self {
        self.items = Some(items);
        self
    }

    /// Appends this rule's violations for `value` to `violations`.
    fn check(&self, value: &Value, violations: &mut Vec<String>) {
        let name = self.name;

        if !self.kind.matches(value) {
            violations.push(format!("\"{name}\" must be {}", self.kind.describe()));
            return;
        }

        if let Some(allowed) = self.allowed {
            if let Some(s) = value.as_str() {
                if !allowed.contains(&s) {
                    violations.push(format!("\"{name}\" must be one of [{}]", allowed.join(", ")));
                }
            }
        }

        if let Some(n) = value.as_i64() {
            if self.min.is_some_and(|min| n < min) || self.max.is_some_and(|max| n > max) {
                violations.push(format!("\"{name}\" is out of range"));
            }
        }

        if let Some(s) = value.as_str() {
            if self.max_len.is_some_and(|max_len| s.chars().count() > max_len) {
                violations.push(format!("\"{name}\" is too long"));
            }
            if let Some(format) = self.format {
                if !format_matches(format, s) {
                    let expected = match format {
                        StringFormat::Uri => "a valid URI",
                        StringFormat::Ip => "a valid IP address",
                        StringFormat::Email => "a valid email",
                    };
                    violations.push(format!("\"{name}\" must be {expected}"));
                }
            }
        }

        if let (Some(items), Some(elements)) = (self.items, value.as_array()) {
            let ok = match items {
                ArrayItems::Numbers => elements.iter().all(Value::is_number),
                ArrayItems::Emails => elements
                    .iter()
                    .all(|e| e.as_str().is_some_and(|s| format_matches(StringFormat::Email, s))),
            };
            if !ok {
                let expected = match items {
                    ArrayItems::Numbers => "numbers",
                    ArrayItems::Emails => "emails",
                };
                violations.push(format!("\"{name}\" items must be {expected}"));
            }
        }
    }
}

fn format_matches(format: StringFormat, s: &str) -> bool {
    match format {
        StringFormat::Uri => Url::parse(s).is_ok(),
        StringFormat::Ip => s.parse::<IpAddr>().is_ok(),
        StringFormat::Email => {
            // Deliberately loose: one '@', non-empty local part, dotted domain.
            let mut parts = s.splitn(2, '@');
            let local = parts.next().unwrap_or("");
            match parts.next() {
                Some(domain) => {
                    !local.is_empty()
                        && !domain.is_empty()
                        && domain.contains('.')
                        && !domain.starts_with('.')
                        && !domain.ends_with('.')
                }
                None => false,
            }
        }
    }
}

/// Declarative shape of one endpoint's parameters.
#[derive(Debug, Clone)]
pub struct FieldShape {
    rules: Vec<FieldRule>,
}

impl FieldShape {
    /// Builds a shape from its field rules.
    #[must_use]
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    /// Field rules of this shape.
    #[must_use]
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    fn has_field(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.name == name)
    }
}

/// Validates `params` against `shape`.
///
/// Collect-all: does not stop at the first violation. On failure returns a
/// single [`PaymentsError::Validation`] whose message joins every violation
/// with `"; "`.
///
/// # Errors
///
/// Returns [`PaymentsError::Validation`] if any field violates its rule or an
/// unknown field is present.
pub fn validate(shape: &FieldShape, params: &RequestParams) -> Result<()> {
    let mut violations = Vec::new();

    for rule in shape.rules() {
        match params.get(rule.name) {
            None => {
                if rule.required {
                    violations.push(format!("\"{}\" is required", rule.name));
                }
            }
            Some(value) => rule.check(value, &mut violations),
        }
    }

    for key in params.keys() {
        if !shape.has_field(key) {
            violations.push(format!("\"{key}\" is not allowed"));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(PaymentsError::Validation(violations.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::registry::Operation;

    fn params(value: Value) -> RequestParams {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other:?}"),
        }
    }

    fn expect_violation(result: Result<()>, needle: &str) {
        let err = result.expect_err("expected validation error");
        let message = err.to_string();
        assert!(message.contains(needle), "{message:?} does not contain {needle:?}");
    }

    #[test]
    fn test_init_shape_rejects_empty_params() {
        let result = validate(&Operation::Init.shape(), &RequestParams::new());
        let message = result.expect_err("missing required fields").to_string();
        assert!(message.contains("\"Amount\" is required"));
        assert!(message.contains("\"OrderId\" is required"));
    }

    #[test]
    fn test_init_shape_rejects_wrong_amount_type() {
        let p = params(json!({ "Amount": "invalid", "OrderId": "order-123" }));
        expect_violation(validate(&Operation::Init.shape(), &p), "\"Amount\" must be an integer");
    }

    #[test]
    fn test_init_shape_accepts_minimal_params() {
        let p = params(json!({ "Amount": 10000, "OrderId": "order-123" }));
        assert!(validate(&Operation::Init.shape(), &p).is_ok());
    }

    #[test]
    fn test_init_shape_accepts_nested_passthrough() {
        let p = params(json!({
            "Amount": 10000,
            "OrderId": "order-123",
            "Receipt": { "Email": "a@b.com" },
            "DATA": { "Phone": "+71234567890" },
            "Shops": [],
        }));
        assert!(validate(&Operation::Init.shape(), &p).is_ok());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let p = params(json!({ "Amount": 10000, "OrderId": "o", "Bogus": 1 }));
        expect_violation(validate(&Operation::Init.shape(), &p), "\"Bogus\" is not allowed");
    }

    #[test]
    fn test_collect_all_aggregates_messages() {
        let p = params(json!({ "Amount": "invalid", "Bogus": 1 }));
        let message = validate(&Operation::Init.shape(), &p)
            .expect_err("two violations")
            .to_string();
        assert!(message.contains("\"Amount\" must be an integer"));
        assert!(message.contains("\"OrderId\" is required"));
        assert!(message.contains("\"Bogus\" is not allowed"));
        assert!(message.contains("; "));
    }

    #[test]
    fn test_allowed_values() {
        let shape = FieldShape::new(vec![FieldRule::string("PayType").allowed(&["O", "T"])]);
        assert!(validate(&shape, &params(json!({ "PayType": "O" }))).is_ok());
        expect_violation(
            validate(&shape, &params(json!({ "PayType": "X" }))),
            "must be one of",
        );
    }

    #[test]
    fn test_integer_bounds() {
        let shape = FieldShape::new(vec![FieldRule::integer("Amount").min(1).max(999)]);
        assert!(validate(&shape, &params(json!({ "Amount": 500 }))).is_ok());
        expect_violation(validate(&shape, &params(json!({ "Amount": 0 }))), "out of range");
        expect_violation(validate(&shape, &params(json!({ "Amount": 1000 }))), "out of range");
    }

    #[test]
    fn test_max_len() {
        let shape = FieldShape::new(vec![FieldRule::string("Description").max_len(3)]);
        assert!(validate(&shape, &params(json!({ "Description": "abc" }))).is_ok());
        expect_violation(validate(&shape, &params(json!({ "Description": "abcd" }))), "too long");
    }

    #[test]
    fn test_uri_format() {
        let shape =
            FieldShape::new(vec![FieldRule::string("SuccessURL").format(StringFormat::Uri)]);
        assert!(validate(&shape, &params(json!({ "SuccessURL": "https://shop.ru/ok" }))).is_ok());
        expect_violation(
            validate(&shape, &params(json!({ "SuccessURL": "not a uri" }))),
            "valid URI",
        );
    }

    #[test]
    fn test_ip_format() {
        let shape = FieldShape::new(vec![FieldRule::string("IP").format(StringFormat::Ip)]);
        assert!(validate(&shape, &params(json!({ "IP": "192.168.0.1" }))).is_ok());
        assert!(validate(&shape, &params(json!({ "IP": "2a00:1450::1" }))).is_ok());
        expect_violation(validate(&shape, &params(json!({ "IP": "999.1.1.1" }))), "IP address");
    }

    #[test]
    fn test_email_format() {
        let shape =
            FieldShape::new(vec![FieldRule::string("InfoEmail").format(StringFormat::Email)]);
        assert!(validate(&shape, &params(json!({ "InfoEmail": "user@example.com" }))).is_ok());
        expect_violation(validate(&shape, &params(json!({ "InfoEmail": "no-at-sign" }))), "email");
        expect_violation(validate(&shape, &params(json!({ "InfoEmail": "a@nodot" }))), "email");
    }

    #[test]
    fn test_string_or_number() {
        let shape =
            FieldShape::new(vec![FieldRule::string_or_number("PaymentId").required()]);
        assert!(validate(&shape, &params(json!({ "PaymentId": 13660 }))).is_ok());
        assert!(validate(&shape, &params(json!({ "PaymentId": "13660" }))).is_ok());
        expect_violation(
            validate(&shape, &params(json!({ "PaymentId": true }))),
            "string or a number",
        );
    }

    #[test]
    fn test_array_items() {
        let shape = FieldShape::new(vec![
            FieldRule::array("PaymentIdList").items(ArrayItems::Numbers),
            FieldRule::array("EmailList").items(ArrayItems::Emails),
        ]);
        let ok = params(json!({
            "PaymentIdList": [1, 2, 3],
            "EmailList": ["a@b.com", "c@d.org"],
        }));
        assert!(validate(&shape, &ok).is_ok());

        expect_violation(
            validate(&shape, &params(json!({ "PaymentIdList": [1, "two"] }))),
            "items must be numbers",
        );
        expect_violation(
            validate(&shape, &params(json!({ "EmailList": ["not-an-email"] }))),
            "items must be emails",
        );
    }

    #[test]
    fn test_null_fails_type_check() {
        let shape = FieldShape::new(vec![FieldRule::string("OrderId")]);
        expect_violation(
            validate(&shape, &params(json!({ "OrderId": null }))),
            "must be a string",
        );
    }

    #[test]
    fn test_boolean_field() {
        let shape = FieldShape::new(vec![FieldRule::boolean("SendEmail")]);
        assert!(validate(&shape, &params(json!({ "SendEmail": true }))).is_ok());
        expect_violation(
            validate(&shape, &params(json!({ "SendEmail": "yes" }))),
            "must be a boolean",
        );
    }
}
