//! Supplier purchases (expenses) and their payments.

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    client::{Body, NO_QUERY},
    common::{ListParams, Page, Paged},
    core::{ensure_date_order, ensure_id},
    documents::{validate_each_line, DocumentLine, Payment, PaymentRequest, Totals},
    errors::{Result, ValidationError},
    identifiers::CurrencyCode,
    model::{null_as_default, validate_required, validate_update, Model},
};

const PURCHASES: &str = "/purchases";

string_enum! {
    pub enum PurchaseState {
        Draft => "draft",
        ToPay => "to_pay",
        PartiallyPaid => "partially_paid",
        Paid => "paid",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub supplier_name: String,
    /// The supplier's own invoice number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<PurchaseState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lines: Vec<DocumentLine>,
    #[serde(flatten)]
    pub totals: Totals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<f64>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub payments: Vec<Payment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl_model!(Purchase, "purchase", ["supplier_name"]);

impl Purchase {
    /// Amount still owed to the supplier.
    pub fn outstanding(&self) -> f64 {
        (self.totals.total_incl_tax - self.amount_paid.unwrap_or_default()).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseCreateRequest {
    pub supplier_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub lines: Vec<DocumentLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PurchaseCreateRequest {
    pub fn new(supplier_name: impl Into<String>) -> Self {
        Self {
            supplier_name: supplier_name.into(),
            supplier_reference: None,
            purchase_date: None,
            due_date: None,
            currency: None,
            lines: Vec::new(),
            notes: None,
        }
    }

    pub fn supplier_reference(mut self, reference: impl Into<String>) -> Self {
        self.supplier_reference = Some(reference.into());
        self
    }

    pub fn purchase_date(mut self, date: NaiveDate) -> Self {
        self.purchase_date = Some(date);
        self
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn currency(mut self, currency: impl Into<CurrencyCode>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn line(mut self, line: DocumentLine) -> Self {
        self.lines.push(line);
        self
    }
}

impl Model for PurchaseCreateRequest {
    const NAME: &'static str = "purchase";

    fn required_fields() -> &'static [&'static str] {
        &["supplier_name"]
    }

    fn validate(&self) -> Result<()> {
        validate_required(self)?;
        // Lines are optional: a purchase may only carry its scanned receipt.
        validate_each_line(&self.lines)?;
        ensure_date_order(self.purchase_date, self.due_date, "due_date", "purchase_date")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<DocumentLine>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PurchaseUpdateRequest {
    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl Model for PurchaseUpdateRequest {
    const NAME: &'static str = "purchase update";

    fn validate(&self) -> Result<()> {
        validate_update(self)?;
        if matches!(&self.supplier_name, Some(name) if name.trim().is_empty()) {
            return Err(ValidationError::new("supplier_name must not be blank")
                .with_field("supplier_name")
                .into());
        }
        if let Some(lines) = &self.lines {
            validate_each_line(lines)?;
        }
        ensure_date_order(self.purchase_date, self.due_date, "due_date", "purchase_date")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PurchaseListParams {
    #[serde(flatten)]
    pub params: ListParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PurchaseState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

impl PurchaseListParams {
    pub fn state(mut self, state: PurchaseState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }
}

impl Paged for PurchaseListParams {
    fn list_params(&self) -> &ListParams {
        &self.params
    }

    fn list_params_mut(&mut self) -> &mut ListParams {
        &mut self.params
    }

    fn validate_filters(&self) -> Result<()> {
        self.params.validate()?;
        ensure_date_order(self.from, self.to, "to", "from")
    }
}

resource_client! {
    /// Purchases endpoints.
    PurchasesClient
}

impl PurchasesClient {
    pub async fn list(&self, params: PurchaseListParams) -> Result<Page<Purchase>> {
        params.validate_filters()?;
        self.inner
            .execute_page(PURCHASES, Some(&params), &self.options)
            .await
    }

    pub async fn list_all(&self, params: PurchaseListParams) -> Result<Vec<Purchase>> {
        self.inner
            .collect_pages(PURCHASES, params, &self.options)
            .await
    }

    pub async fn get(&self, purchase_id: u64) -> Result<Purchase> {
        ensure_id(purchase_id, "purchase_id")?;
        self.inner
            .execute_model(
                Method::GET,
                &format!("{PURCHASES}/{purchase_id}"),
                NO_QUERY,
                Body::Empty,
                &self.options,
            )
            .await
    }

    pub async fn create(&self, req: PurchaseCreateRequest) -> Result<Purchase> {
        req.validate()?;
        self.inner
            .execute_model(Method::POST, PURCHASES, NO_QUERY, Body::json(&req)?, &self.options)
            .await
    }

    pub async fn update(&self, purchase_id: u64, req: PurchaseUpdateRequest) -> Result<Purchase> {
        ensure_id(purchase_id, "purchase_id")?;
        req.validate()?;
        self.inner
            .execute_model(
                Method::PATCH,
                &format!("{PURCHASES}/{purchase_id}"),
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }

    pub async fn delete(&self, purchase_id: u64) -> Result<()> {
        ensure_id(purchase_id, "purchase_id")?;
        self.inner
            .execute_empty(
                Method::DELETE,
                &format!("{PURCHASES}/{purchase_id}"),
                Body::Empty,
                &self.options,
            )
            .await
    }

    pub async fn record_payment(&self, purchase_id: u64, req: PaymentRequest) -> Result<Payment> {
        ensure_id(purchase_id, "purchase_id")?;
        req.validate()?;
        self.inner
            .execute_model(
                Method::POST,
                &format!("{PURCHASES}/{purchase_id}/payments"),
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }
}
