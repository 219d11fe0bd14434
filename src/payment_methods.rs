use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    client::{Body, NO_QUERY},
    common::{ListParams, Page, Paged},
    core::ensure_id,
    errors::{Result, ValidationError},
    model::{null_as_default, validate_required, validate_update, Model},
};

const PAYMENT_METHODS: &str = "/payment_methods";

string_enum! {
    pub enum PaymentMethodKind {
        BankTransfer => "bank_transfer",
        Card => "card",
        Check => "check",
        Cash => "cash",
        DirectDebit => "direct_debit",
        Other => "other",
    }
}

/// How a company gets paid; bank details are printed on invoices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PaymentMethodKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub default: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_model!(PaymentMethod, "payment method", ["name"]);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodCreateRequest {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PaymentMethodKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
}

impl PaymentMethodCreateRequest {
    pub fn new(name: impl Into<String>, kind: PaymentMethodKind) -> Self {
        Self {
            name: name.into(),
            kind: Some(kind),
            iban: None,
            bic: None,
            default: None,
        }
    }

    /// Bank transfer method with its account details.
    pub fn bank_transfer(
        name: impl Into<String>,
        iban: impl Into<String>,
        bic: impl Into<String>,
    ) -> Self {
        Self {
            iban: Some(iban.into()),
            bic: Some(bic.into()),
            ..Self::new(name, PaymentMethodKind::BankTransfer)
        }
    }

    pub fn default_method(mut self) -> Self {
        self.default = Some(true);
        self
    }
}

impl Model for PaymentMethodCreateRequest {
    const NAME: &'static str = "payment method";

    fn required_fields() -> &'static [&'static str] {
        &["name"]
    }

    fn validate(&self) -> Result<()> {
        validate_required(self)?;
        if let Some(iban) = &self.iban {
            check_iban(iban)?;
        }
        Ok(())
    }
}

/// Shape check only (country prefix, check digits, length); the checksum is
/// verified by the server.
fn check_iban(iban: &str) -> Result<()> {
    let compact: String = iban.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = compact.as_bytes();
    let well_formed = (15..=34).contains(&bytes.len())
        && bytes[..2].iter().all(u8::is_ascii_alphabetic)
        && bytes[2..4].iter().all(u8::is_ascii_digit)
        && bytes[4..].iter().all(u8::is_ascii_alphanumeric);
    if !well_formed {
        return Err(ValidationError::new("invalid IBAN")
            .with_field("iban")
            .into());
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethodUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iban: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl Model for PaymentMethodUpdateRequest {
    const NAME: &'static str = "payment method update";

    fn validate(&self) -> Result<()> {
        validate_update(self)?;
        match &self.iban {
            Some(iban) => check_iban(iban),
            None => Ok(()),
        }
    }
}

resource_client! {
    /// Payment methods endpoints.
    PaymentMethodsClient
}

impl PaymentMethodsClient {
    pub async fn list(&self, params: ListParams) -> Result<Page<PaymentMethod>> {
        params.validate_filters()?;
        self.inner
            .execute_page(PAYMENT_METHODS, Some(&params), &self.options)
            .await
    }

    pub async fn get(&self, payment_method_id: u64) -> Result<PaymentMethod> {
        ensure_id(payment_method_id, "payment_method_id")?;
        self.inner
            .execute_model(
                Method::GET,
                &format!("{PAYMENT_METHODS}/{payment_method_id}"),
                NO_QUERY,
                Body::Empty,
                &self.options,
            )
            .await
    }

    pub async fn create(&self, req: PaymentMethodCreateRequest) -> Result<PaymentMethod> {
        req.validate()?;
        self.inner
            .execute_model(
                Method::POST,
                PAYMENT_METHODS,
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }

    pub async fn update(
        &self,
        payment_method_id: u64,
        req: PaymentMethodUpdateRequest,
    ) -> Result<PaymentMethod> {
        ensure_id(payment_method_id, "payment_method_id")?;
        req.validate()?;
        self.inner
            .execute_model(
                Method::PATCH,
                &format!("{PAYMENT_METHODS}/{payment_method_id}"),
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }

    pub async fn delete(&self, payment_method_id: u64) -> Result<()> {
        ensure_id(payment_method_id, "payment_method_id")?;
        self.inner
            .execute_empty(
                Method::DELETE,
                &format!("{PAYMENT_METHODS}/{payment_method_id}"),
                Body::Empty,
                &self.options,
            )
            .await
    }
}
