//! Customer invoices: drafting, payments, emailing and PDF rendering.

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    client::{Body, NO_QUERY},
    common::{EmailDelivery, EmailRequest, ListParams, Page, Paged},
    core::{ensure_date_order, ensure_id},
    documents::{validate_lines, DocumentLine, Payment, PaymentRequest, Totals},
    errors::Result,
    identifiers::CurrencyCode,
    model::{null_as_default, validate_required, validate_update, Model},
};

const INVOICES: &str = "/invoices";
const PDF: &str = "application/pdf";

string_enum! {
    /// Lifecycle of an invoice.
    pub enum InvoiceState {
        Draft => "draft",
        /// Finalized and waiting for payment.
        Waiting => "waiting",
        PartiallyPaid => "partially_paid",
        Paid => "paid",
        /// Past its due date with an outstanding balance.
        Late => "late",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Assigned by the server when the invoice leaves the draft state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub client_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<InvoiceState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_due: Option<f64>,
    /// Quote this invoice was converted from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub payments: Vec<Payment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl_model!(Invoice, "invoice", ["client_id"]);

impl Invoice {
    pub fn is_settled(&self) -> bool {
        self.state == Some(InvoiceState::Paid)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceCreateRequest {
    pub client_id: u64,
    pub lines: Vec<DocumentLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
}

impl InvoiceCreateRequest {
    pub fn new(client_id: u64, lines: Vec<DocumentLine>) -> Self {
        Self {
            client_id,
            lines,
            issue_date: None,
            due_date: None,
            currency: None,
            payment_method_id: None,
            notes: None,
            terms: None,
        }
    }

    pub fn line(mut self, line: DocumentLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn issue_date(mut self, date: NaiveDate) -> Self {
        self.issue_date = Some(date);
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

    pub fn payment_method(mut self, payment_method_id: u64) -> Self {
        self.payment_method_id = Some(payment_method_id);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn terms(mut self, terms: impl Into<String>) -> Self {
        self.terms = Some(terms.into());
        self
    }
}

impl Model for InvoiceCreateRequest {
    const NAME: &'static str = "invoice";

    fn required_fields() -> &'static [&'static str] {
        &["client_id", "lines"]
    }

    fn validate(&self) -> Result<()> {
        validate_required(self)?;
        ensure_id(self.client_id, "client_id")?;
        validate_lines(&self.lines)?;
        ensure_date_order(self.issue_date, self.due_date, "due_date", "issue_date")
    }
}

/// Partial update of a draft invoice; only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
    /// Replaces every line of the invoice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<DocumentLine>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
}

impl InvoiceUpdateRequest {
    pub fn lines(mut self, lines: Vec<DocumentLine>) -> Self {
        self.lines = Some(lines);
        self
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl Model for InvoiceUpdateRequest {
    const NAME: &'static str = "invoice update";

    fn validate(&self) -> Result<()> {
        validate_update(self)?;
        if let Some(client_id) = self.client_id {
            ensure_id(client_id, "client_id")?;
        }
        if let Some(lines) = &self.lines {
            validate_lines(lines)?;
        }
        ensure_date_order(self.issue_date, self.due_date, "due_date", "issue_date")
    }
}

/// Filters for [`InvoicesClient::list`]. `from`/`to` bound the issue date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InvoiceListParams {
    #[serde(flatten)]
    pub params: ListParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<InvoiceState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

impl InvoiceListParams {
    pub fn client(mut self, client_id: u64) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn state(mut self, state: InvoiceState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn issued_between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.params = self.params.page(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.params = self.params.per_page(per_page);
        self
    }
}

impl Paged for InvoiceListParams {
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
    /// Invoices endpoints.
    InvoicesClient
}

impl InvoicesClient {
    pub async fn list(&self, params: InvoiceListParams) -> Result<Page<Invoice>> {
        params.validate_filters()?;
        self.inner
            .execute_page(INVOICES, Some(&params), &self.options)
            .await
    }

    /// Fetches every page matching `params`, starting from `params.page`.
    pub async fn list_all(&self, params: InvoiceListParams) -> Result<Vec<Invoice>> {
        self.inner
            .collect_pages(INVOICES, params, &self.options)
            .await
    }

    pub async fn get(&self, invoice_id: u64) -> Result<Invoice> {
        ensure_id(invoice_id, "invoice_id")?;
        self.inner
            .execute_model(
                Method::GET,
                &format!("{INVOICES}/{invoice_id}"),
                NO_QUERY,
                Body::Empty,
                &self.options,
            )
            .await
    }

    pub async fn create(&self, req: InvoiceCreateRequest) -> Result<Invoice> {
        req.validate()?;
        self.inner
            .execute_model(Method::POST, INVOICES, NO_QUERY, Body::json(&req)?, &self.options)
            .await
    }

    pub async fn update(&self, invoice_id: u64, req: InvoiceUpdateRequest) -> Result<Invoice> {
        ensure_id(invoice_id, "invoice_id")?;
        req.validate()?;
        self.inner
            .execute_model(
                Method::PATCH,
                &format!("{INVOICES}/{invoice_id}"),
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }

    /// Only draft invoices can be deleted; finalized ones must be cancelled.
    pub async fn delete(&self, invoice_id: u64) -> Result<()> {
        ensure_id(invoice_id, "invoice_id")?;
        self.inner
            .execute_empty(
                Method::DELETE,
                &format!("{INVOICES}/{invoice_id}"),
                Body::Empty,
                &self.options,
            )
            .await
    }

    pub async fn record_payment(&self, invoice_id: u64, req: PaymentRequest) -> Result<Payment> {
        ensure_id(invoice_id, "invoice_id")?;
        req.validate()?;
        self.inner
            .execute_model(
                Method::POST,
                &format!("{INVOICES}/{invoice_id}/payments"),
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }

    pub async fn send_email(&self, invoice_id: u64, req: EmailRequest) -> Result<EmailDelivery> {
        ensure_id(invoice_id, "invoice_id")?;
        req.validate()?;
        self.inner
            .execute_model(
                Method::POST,
                &format!("{INVOICES}/{invoice_id}/send"),
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }

    /// Returns the rendered PDF document.
    pub async fn generate_pdf(&self, invoice_id: u64) -> Result<Vec<u8>> {
        ensure_id(invoice_id, "invoice_id")?;
        self.inner
            .execute_bytes(&format!("{INVOICES}/{invoice_id}/pdf"), PDF, &self.options)
            .await
    }

    pub async fn cancel(&self, invoice_id: u64) -> Result<Invoice> {
        ensure_id(invoice_id, "invoice_id")?;
        self.inner
            .execute_model(
                Method::POST,
                &format!("{INVOICES}/{invoice_id}/cancel"),
                NO_QUERY,
                Body::Empty,
                &self.options,
            )
            .await
    }
}
