//! Amount conversion and fiscal receipt helpers.
//!
//! Gateway amounts travel as integers in minor units (kopecks). The receipt
//! builder maps a caller-friendly item list into the wire shape the gateway
//! expects, filling the defaults the fiscal protocol allows to be implied.

use serde::Serialize;
use serde_json::Value;

/// Converts rubles to kopecks, rounding to the nearest kopeck.
///
/// # Examples
///
/// ```
/// use tbank_payments::amount_to_kopecks;
///
/// assert_eq!(amount_to_kopecks(100.0), 10_000);
/// assert_eq!(amount_to_kopecks(99.99), 9_999);
/// ```
#[must_use]
pub fn amount_to_kopecks(rubles: f64) -> i64 {
    (rubles * 100.0).round() as i64
}

/// Converts kopecks to rubles.
///
/// # Examples
///
/// ```
/// use tbank_payments::kopecks_to_amount;
///
/// assert!((kopecks_to_amount(10_000) - 100.0).abs() < f64::EPSILON);
/// assert!((kopecks_to_amount(1) - 0.01).abs() < f64::EPSILON);
/// ```
#[must_use]
pub fn kopecks_to_amount(kopecks: i64) -> f64 {
    kopecks as f64 / 100.0
}

/// One receipt line as supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct ReceiptItemParams {
    /// Item name.
    pub name: String,
    /// Unit price in kopecks.
    pub price: i64,
    /// Quantity; defaults to 1. Fractional values allowed for weighed goods.
    pub quantity: Option<f64>,
    /// Line total in kopecks; defaults to `price * quantity`, rounded.
    pub amount: Option<i64>,
    /// Tax category (e.g. `"vat20"`); defaults to `"none"`.
    pub tax: Option<String>,
    /// EAN-13 barcode, when the goods carry one.
    pub ean13: Option<String>,
}

/// Caller-friendly receipt description.
#[derive(Debug, Clone)]
pub struct ReceiptParams {
    /// Buyer email.
    pub email: String,
    /// Buyer phone; omitted from the wire shape entirely when absent.
    pub phone: Option<String>,
    /// Taxation system; defaults to `"osn"`.
    pub taxation: Option<String>,
    /// Receipt lines.
    pub items: Vec<ReceiptItemParams>,
}

/// Receipt line in the gateway's wire shape.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReceiptItem {
    /// Item name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Unit price in kopecks.
    #[serde(rename = "Price")]
    pub price: i64,
    /// Quantity.
    #[serde(rename = "Quantity")]
    pub quantity: f64,
    /// Line total in kopecks.
    #[serde(rename = "Amount")]
    pub amount: i64,
    /// Tax category.
    #[serde(rename = "Tax")]
    pub tax: String,
    /// EAN-13 barcode; absent fields are not serialized.
    #[serde(rename = "Ean13", skip_serializing_if = "Option::is_none")]
    pub ean13: Option<String>,
}

/// Fiscal receipt in the gateway's wire shape, ready to be attached to a
/// request under the `Receipt` key.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Receipt {
    /// Buyer email.
    #[serde(rename = "Email")]
    pub email: String,
    /// Buyer phone; skipped when not supplied.
    #[serde(rename = "Phone", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Taxation system.
    #[serde(rename = "Taxation")]
    pub taxation: String,
    /// Receipt lines.
    #[serde(rename = "Items")]
    pub items: Vec<ReceiptItem>,
}

impl Receipt {
    /// Serializes the receipt into a JSON value for request parameters.
    ///
    /// The wire shape is plain data, so serialization cannot fail.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Builds a fiscal receipt from caller-friendly parameters.
///
/// Defaults: taxation `"osn"`, quantity 1, amount `price * quantity`
/// (rounded), tax `"none"`. `Phone` and `Ean13` are omitted from the wire
/// shape entirely when not supplied, never sent empty.
///
/// # Examples
///
/// ```
/// use tbank_payments::{create_receipt, ReceiptItemParams, ReceiptParams};
///
/// let receipt = create_receipt(ReceiptParams {
///     email: "buyer@example.com".to_owned(),
///     phone: None,
///     taxation: None,
///     items: vec![ReceiptItemParams {
///         name: "Gift card".to_owned(),
///         price: 10_000,
///         quantity: Some(2.0),
///         tax: Some("vat20".to_owned()),
///         ..Default::default()
///     }],
/// });
///
/// assert_eq!(receipt.items[0].amount, 20_000);
/// assert_eq!(receipt.taxation, "osn");
/// ```
#[must_use]
pub fn create_receipt(params: ReceiptParams) -> Receipt {
    let items = params
        .items
        .into_iter()
        .map(|item| {
            let quantity = item.quantity.unwrap_or(1.0);
            let amount =
                item.amount.unwrap_or_else(|| (item.price as f64 * quantity).round() as i64);
            ReceiptItem {
                name: item.name,
                price: item.price,
                quantity,
                amount,
                tax: item.tax.unwrap_or_else(|| "none".to_owned()),
                ean13: item.ean13,
            }
        })
        .collect();

    Receipt {
        email: params.email,
        phone: params.phone,
        taxation: params.taxation.unwrap_or_else(|| "osn".to_owned()),
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_to_kopecks() {
        assert_eq!(amount_to_kopecks(100.0), 10_000);
        assert_eq!(amount_to_kopecks(99.99), 9_999);
        assert_eq!(amount_to_kopecks(0.005), 1);
        assert_eq!(amount_to_kopecks(0.0), 0);
    }

    #[test]
    fn test_kopecks_to_amount() {
        assert!((kopecks_to_amount(10_000) - 100.0).abs() < f64::EPSILON);
        assert!((kopecks_to_amount(1) - 0.01).abs() < f64::EPSILON);
        assert!((kopecks_to_amount(0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_amount_roundtrip_two_decimals() {
        for cents in [1_i64, 99, 100, 9_999, 10_000, 123_456_789] {
            let rubles = kopecks_to_amount(cents);
            assert_eq!(amount_to_kopecks(rubles), cents);
        }
    }

    #[test]
    fn test_create_receipt_computes_amount() {
        let receipt = create_receipt(ReceiptParams {
            email: "buyer@example.com".to_owned(),
            phone: None,
            taxation: None,
            items: vec![ReceiptItemParams {
                name: "Gift card".to_owned(),
                price: 10_000,
                quantity: Some(2.0),
                tax: Some("vat20".to_owned()),
                ..Default::default()
            }],
        });

        assert_eq!(receipt.items.len(), 1);
        let item = &receipt.items[0];
        assert_eq!(item.amount, 20_000);
        assert_eq!(item.tax, "vat20");
        assert!((item.quantity - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_create_receipt_defaults() {
        let receipt = create_receipt(ReceiptParams {
            email: "buyer@example.com".to_owned(),
            phone: None,
            taxation: None,
            items: vec![ReceiptItemParams {
                name: "Pen".to_owned(),
                price: 500,
                ..Default::default()
            }],
        });

        assert_eq!(receipt.taxation, "osn");
        let item = &receipt.items[0];
        assert!((item.quantity - 1.0).abs() < f64::EPSILON);
        assert_eq!(item.amount, 500);
        assert_eq!(item.tax, "none");
        assert!(item.ean13.is_none());
    }

    #[test]
    fn test_explicit_amount_wins() {
        let receipt = create_receipt(ReceiptParams {
            email: "buyer@example.com".to_owned(),
            phone: None,
            taxation: None,
            items: vec![ReceiptItemParams {
                name: "Discounted".to_owned(),
                price: 1000,
                quantity: Some(3.0),
                amount: Some(2500),
                ..Default::default()
            }],
        });

        assert_eq!(receipt.items[0].amount, 2500);
    }

    #[test]
    fn test_phone_omitted_from_wire_shape() {
        let receipt = create_receipt(ReceiptParams {
            email: "buyer@example.com".to_owned(),
            phone: None,
            taxation: None,
            items: Vec::new(),
        });

        let value = receipt.to_value();
        let object = value.as_object().expect("receipt serializes to an object");
        assert!(!object.contains_key("Phone"));
        assert_eq!(object["Email"], "buyer@example.com");
    }

    #[test]
    fn test_phone_present_when_supplied() {
        let receipt = create_receipt(ReceiptParams {
            email: "buyer@example.com".to_owned(),
            phone: Some("+79991234567".to_owned()),
            taxation: Some("usn_income".to_owned()),
            items: Vec::new(),
        });

        let value = receipt.to_value();
        assert_eq!(value["Phone"], "+79991234567");
        assert_eq!(value["Taxation"], "usn_income");
    }

    #[test]
    fn test_ean13_serialized_when_present() {
        let receipt = create_receipt(ReceiptParams {
            email: "b@e.com".to_owned(),
            phone: None,
            taxation: None,
            items: vec![ReceiptItemParams {
                name: "Book".to_owned(),
                price: 100,
                ean13: Some("9780306406157".to_owned()),
                ..Default::default()
            }],
        });

        let value = receipt.to_value();
        assert_eq!(value["Items"][0]["Ean13"], "9780306406157");
    }
}
