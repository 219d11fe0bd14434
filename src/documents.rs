//! Building blocks shared by commercial documents (invoices, quotes, purchases).
//!
//! Totals, taxes and numbering are computed by the server; the SDK only
//! carries the values it returns.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{Result, ValidationError},
    model::{null_as_default, validate_required, Model},
};

/// A priced line on an invoice, quote or purchase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<u64>,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// VAT rate in percent (e.g. `20.0`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<f64>,
    /// Discount in percent of the line amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_excl_tax: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_incl_tax: Option<f64>,
}

impl DocumentLine {
    pub fn new(description: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            ..Default::default()
        }
    }

    /// A line billing a catalog product; the server fills in what is not given.
    pub fn for_product(
        product_id: u64,
        description: impl Into<String>,
        quantity: f64,
        unit_price: f64,
    ) -> Self {
        Self {
            product_id: Some(product_id),
            ..Self::new(description, quantity, unit_price)
        }
    }

    pub fn vat_rate(mut self, rate: f64) -> Self {
        self.vat_rate = Some(rate);
        self
    }

    pub fn discount_rate(mut self, rate: f64) -> Self {
        self.discount_rate = Some(rate);
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

impl Model for DocumentLine {
    const NAME: &'static str = "document line";

    fn required_fields() -> &'static [&'static str] {
        &["description", "quantity", "unit_price"]
    }

    fn validate(&self) -> Result<()> {
        validate_required(self)?;
        if !self.quantity.is_finite() || self.quantity == 0.0 {
            return Err(ValidationError::new("quantity must be a non-zero number")
                .with_field("quantity")
                .into());
        }
        if !self.unit_price.is_finite() {
            return Err(ValidationError::new("unit_price must be a finite number")
                .with_field("unit_price")
                .into());
        }
        check_percent(self.vat_rate, "vat_rate")?;
        check_percent(self.discount_rate, "discount_rate")
    }
}

fn check_percent(value: Option<f64>, field: &str) -> Result<()> {
    match value {
        Some(rate) if !(0.0..=100.0).contains(&rate) => Err(ValidationError::new(
            "must be a percentage between 0 and 100",
        )
        .with_field(field)
        .into()),
        _ => Ok(()),
    }
}

/// Validates every line and requires at least one.
pub(crate) fn validate_lines<L: Model>(lines: &[L]) -> Result<()> {
    if lines.is_empty() {
        return Err(ValidationError::new("at least one line is required")
            .with_field("lines")
            .into());
    }
    validate_each_line(lines)
}

/// Validates every line, prefixing errors with the line's position.
pub(crate) fn validate_each_line<L: Model>(lines: &[L]) -> Result<()> {
    for (index, line) in lines.iter().enumerate() {
        line.validate().map_err(|err| match err {
            crate::Error::Validation(mut v) => {
                v.field = Some(match v.field.take() {
                    Some(field) => format!("lines[{index}].{field}"),
                    None => format!("lines[{index}]"),
                });
                crate::Error::Validation(v)
            }
            other => other,
        })?;
    }
    Ok(())
}

/// Document totals as computed by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_excl_tax: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_tax: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_incl_tax: f64,
}

/// A payment recorded against an invoice or a purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub amount: f64,
    pub paid_at: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_model!(Payment, "payment", ["amount", "paid_at"]);

/// Request body for the `payments` action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: f64,
    pub paid_at: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PaymentRequest {
    pub fn new(amount: f64, paid_at: NaiveDate) -> Self {
        Self {
            amount,
            paid_at,
            payment_method_id: None,
            reference: None,
            notes: None,
        }
    }

    pub fn payment_method(mut self, payment_method_id: u64) -> Self {
        self.payment_method_id = Some(payment_method_id);
        self
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl Model for PaymentRequest {
    const NAME: &'static str = "payment";

    fn required_fields() -> &'static [&'static str] {
        &["amount", "paid_at"]
    }

    fn validate(&self) -> Result<()> {
        validate_required(self)?;
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ValidationError::new("amount must be greater than zero")
                .with_field("amount")
                .into());
        }
        Ok(())
    }
}
