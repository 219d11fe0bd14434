//! Delivery receipts: unpriced documents listing shipped goods.

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    client::{Body, NO_QUERY},
    common::{Address, EmailDelivery, EmailRequest, ListParams, Page, Paged},
    core::ensure_id,
    documents::validate_lines,
    errors::{Result, ValidationError},
    model::{null_as_default, validate_required, validate_update, Model},
};

const DELIVERY_RECEIPTS: &str = "/delivery_receipts";

string_enum! {
    pub enum DeliveryState {
        Draft => "draft",
        Ready => "ready",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

/// A shipped item. Delivery lines carry no prices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<u64>,
    pub description: String,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl DeliveryLine {
    pub fn new(description: impl Into<String>, quantity: f64) -> Self {
        Self {
            description: description.into(),
            quantity,
            ..Default::default()
        }
    }

    pub fn product(mut self, product_id: u64) -> Self {
        self.product_id = Some(product_id);
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

impl Model for DeliveryLine {
    const NAME: &'static str = "delivery line";

    fn required_fields() -> &'static [&'static str] {
        &["description", "quantity"]
    }

    fn validate(&self) -> Result<()> {
        validate_required(self)?;
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(ValidationError::new("quantity must be greater than zero")
                .with_field("quantity")
                .into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub client_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<DeliveryState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<Address>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lines: Vec<DeliveryLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_model!(DeliveryReceipt, "delivery receipt", ["client_id"]);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReceiptCreateRequest {
    pub client_id: u64,
    pub lines: Vec<DeliveryLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<NaiveDate>,
    /// Defaults to the client's delivery address when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DeliveryReceiptCreateRequest {
    pub fn new(client_id: u64, lines: Vec<DeliveryLine>) -> Self {
        Self {
            client_id,
            lines,
            invoice_id: None,
            quote_id: None,
            delivery_date: None,
            delivery_address: None,
            notes: None,
        }
    }

    pub fn invoice(mut self, invoice_id: u64) -> Self {
        self.invoice_id = Some(invoice_id);
        self
    }

    pub fn delivery_date(mut self, date: NaiveDate) -> Self {
        self.delivery_date = Some(date);
        self
    }

    pub fn delivery_address(mut self, address: Address) -> Self {
        self.delivery_address = Some(address);
        self
    }
}

impl Model for DeliveryReceiptCreateRequest {
    const NAME: &'static str = "delivery receipt";

    fn required_fields() -> &'static [&'static str] {
        &["client_id", "lines"]
    }

    fn validate(&self) -> Result<()> {
        validate_required(self)?;
        ensure_id(self.client_id, "client_id")?;
        validate_lines(&self.lines)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReceiptUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<DeliveryState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<DeliveryLine>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DeliveryReceiptUpdateRequest {
    pub fn state(mut self, state: DeliveryState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn delivery_date(mut self, date: NaiveDate) -> Self {
        self.delivery_date = Some(date);
        self
    }
}

impl Model for DeliveryReceiptUpdateRequest {
    const NAME: &'static str = "delivery receipt update";

    fn validate(&self) -> Result<()> {
        validate_update(self)?;
        match &self.lines {
            Some(lines) => validate_lines(lines),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeliveryReceiptListParams {
    #[serde(flatten)]
    pub params: ListParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<DeliveryState>,
}

impl Paged for DeliveryReceiptListParams {
    fn list_params(&self) -> &ListParams {
        &self.params
    }

    fn list_params_mut(&mut self) -> &mut ListParams {
        &mut self.params
    }
}

resource_client! {
    /// Delivery receipts endpoints.
    DeliveryReceiptsClient
}

impl DeliveryReceiptsClient {
    pub async fn list(&self, params: DeliveryReceiptListParams) -> Result<Page<DeliveryReceipt>> {
        params.validate_filters()?;
        self.inner
            .execute_page(DELIVERY_RECEIPTS, Some(&params), &self.options)
            .await
    }

    pub async fn get(&self, receipt_id: u64) -> Result<DeliveryReceipt> {
        ensure_id(receipt_id, "receipt_id")?;
        self.inner
            .execute_model(
                Method::GET,
                &format!("{DELIVERY_RECEIPTS}/{receipt_id}"),
                NO_QUERY,
                Body::Empty,
                &self.options,
            )
            .await
    }

    pub async fn create(&self, req: DeliveryReceiptCreateRequest) -> Result<DeliveryReceipt> {
        req.validate()?;
        self.inner
            .execute_model(
                Method::POST,
                DELIVERY_RECEIPTS,
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }

    pub async fn update(
        &self,
        receipt_id: u64,
        req: DeliveryReceiptUpdateRequest,
    ) -> Result<DeliveryReceipt> {
        ensure_id(receipt_id, "receipt_id")?;
        req.validate()?;
        self.inner
            .execute_model(
                Method::PATCH,
                &format!("{DELIVERY_RECEIPTS}/{receipt_id}"),
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }

    pub async fn delete(&self, receipt_id: u64) -> Result<()> {
        ensure_id(receipt_id, "receipt_id")?;
        self.inner
            .execute_empty(
                Method::DELETE,
                &format!("{DELIVERY_RECEIPTS}/{receipt_id}"),
                Body::Empty,
                &self.options,
            )
            .await
    }

    pub async fn send_email(&self, receipt_id: u64, req: EmailRequest) -> Result<EmailDelivery> {
        ensure_id(receipt_id, "receipt_id")?;
        req.validate()?;
        self.inner
            .execute_model(
                Method::POST,
                &format!("{DELIVERY_RECEIPTS}/{receipt_id}/send"),
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }

    pub async fn generate_pdf(&self, receipt_id: u64) -> Result<Vec<u8>> {
        ensure_id(receipt_id, "receipt_id")?;
        self.inner
            .execute_bytes(
                &format!("{DELIVERY_RECEIPTS}/{receipt_id}/pdf"),
                "application/pdf",
                &self.options,
            )
            .await
    }
}
