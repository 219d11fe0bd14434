//! Quotes (estimates) and their conversion into invoices.

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    client::{Body, NO_QUERY},
    common::{EmailDelivery, EmailRequest, ListParams, Page, Paged, ReasonBody},
    core::{ensure_date_order, ensure_id},
    documents::{validate_lines, DocumentLine, Totals},
    errors::Result,
    identifiers::CurrencyCode,
    invoices::Invoice,
    model::{null_as_default, validate_required, validate_update, Model},
};

const QUOTES: &str = "/quotes";

string_enum! {
    pub enum QuoteState {
        Draft => "draft",
        Sent => "sent",
        Accepted => "accepted",
        Refused => "refused",
        /// `valid_until` passed without an answer.
        Expired => "expired",
        /// Converted into an invoice.
        Invoiced => "invoiced",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub client_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<QuoteState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lines: Vec<DocumentLine>,
    #[serde(flatten)]
    pub totals: Totals,
    /// Set once the quote has been converted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl_model!(Quote, "quote", ["client_id"]);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteCreateRequest {
    pub client_id: u64,
    pub lines: Vec<DocumentLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
}

impl QuoteCreateRequest {
    pub fn new(client_id: u64, lines: Vec<DocumentLine>) -> Self {
        Self {
            client_id,
            lines,
            issue_date: None,
            valid_until: None,
            currency: None,
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

    pub fn valid_until(mut self, date: NaiveDate) -> Self {
        self.valid_until = Some(date);
        self
    }

    pub fn currency(mut self, currency: impl Into<CurrencyCode>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn terms(mut self, terms: impl Into<String>) -> Self {
        self.terms = Some(terms.into());
        self
    }
}

impl Model for QuoteCreateRequest {
    const NAME: &'static str = "quote";

    fn required_fields() -> &'static [&'static str] {
        &["client_id", "lines"]
    }

    fn validate(&self) -> Result<()> {
        validate_required(self)?;
        ensure_id(self.client_id, "client_id")?;
        validate_lines(&self.lines)?;
        ensure_date_order(self.issue_date, self.valid_until, "valid_until", "issue_date")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<DocumentLine>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms: Option<String>,
}

impl QuoteUpdateRequest {
    pub fn valid_until(mut self, date: NaiveDate) -> Self {
        self.valid_until = Some(date);
        self
    }

    pub fn lines(mut self, lines: Vec<DocumentLine>) -> Self {
        self.lines = Some(lines);
        self
    }
}

impl Model for QuoteUpdateRequest {
    const NAME: &'static str = "quote update";

    fn validate(&self) -> Result<()> {
        validate_update(self)?;
        if let Some(client_id) = self.client_id {
            ensure_id(client_id, "client_id")?;
        }
        if let Some(lines) = &self.lines {
            validate_lines(lines)?;
        }
        ensure_date_order(self.issue_date, self.valid_until, "valid_until", "issue_date")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuoteListParams {
    #[serde(flatten)]
    pub params: ListParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<QuoteState>,
}

impl QuoteListParams {
    pub fn client(mut self, client_id: u64) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn state(mut self, state: QuoteState) -> Self {
        self.state = Some(state);
        self
    }
}

impl Paged for QuoteListParams {
    fn list_params(&self) -> &ListParams {
        &self.params
    }

    fn list_params_mut(&mut self) -> &mut ListParams {
        &mut self.params
    }
}

resource_client! {
    /// Quotes endpoints.
    QuotesClient
}

impl QuotesClient {
    pub async fn list(&self, params: QuoteListParams) -> Result<Page<Quote>> {
        params.validate_filters()?;
        self.inner
            .execute_page(QUOTES, Some(&params), &self.options)
            .await
    }

    pub async fn list_all(&self, params: QuoteListParams) -> Result<Vec<Quote>> {
        self.inner
            .collect_pages(QUOTES, params, &self.options)
            .await
    }

    pub async fn get(&self, quote_id: u64) -> Result<Quote> {
        ensure_id(quote_id, "quote_id")?;
        self.inner
            .execute_model(
                Method::GET,
                &format!("{QUOTES}/{quote_id}"),
                NO_QUERY,
                Body::Empty,
                &self.options,
            )
            .await
    }

    pub async fn create(&self, req: QuoteCreateRequest) -> Result<Quote> {
        req.validate()?;
        self.inner
            .execute_model(Method::POST, QUOTES, NO_QUERY, Body::json(&req)?, &self.options)
            .await
    }

    pub async fn update(&self, quote_id: u64, req: QuoteUpdateRequest) -> Result<Quote> {
        ensure_id(quote_id, "quote_id")?;
        req.validate()?;
        self.inner
            .execute_model(
                Method::PATCH,
                &format!("{QUOTES}/{quote_id}"),
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }

    pub async fn delete(&self, quote_id: u64) -> Result<()> {
        ensure_id(quote_id, "quote_id")?;
        self.inner
            .execute_empty(
                Method::DELETE,
                &format!("{QUOTES}/{quote_id}"),
                Body::Empty,
                &self.options,
            )
            .await
    }

    pub async fn send_email(&self, quote_id: u64, req: EmailRequest) -> Result<EmailDelivery> {
        ensure_id(quote_id, "quote_id")?;
        req.validate()?;
        self.inner
            .execute_model(
                Method::POST,
                &format!("{QUOTES}/{quote_id}/send"),
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }

    pub async fn generate_pdf(&self, quote_id: u64) -> Result<Vec<u8>> {
        ensure_id(quote_id, "quote_id")?;
        self.inner
            .execute_bytes(
                &format!("{QUOTES}/{quote_id}/pdf"),
                "application/pdf",
                &self.options,
            )
            .await
    }

    pub async fn accept(&self, quote_id: u64) -> Result<Quote> {
        ensure_id(quote_id, "quote_id")?;
        self.inner
            .execute_model(
                Method::POST,
                &format!("{QUOTES}/{quote_id}/accept"),
                NO_QUERY,
                Body::Empty,
                &self.options,
            )
            .await
    }

    pub async fn refuse(&self, quote_id: u64, reason: Option<&str>) -> Result<Quote> {
        ensure_id(quote_id, "quote_id")?;
        let body = ReasonBody::new(reason);
        self.inner
            .execute_model(
                Method::POST,
                &format!("{QUOTES}/{quote_id}/refuse"),
                NO_QUERY,
                Body::json(&body)?,
                &self.options,
            )
            .await
    }

    /// Creates a draft invoice carrying the quote's lines and marks the quote invoiced.
    pub async fn convert_to_invoice(&self, quote_id: u64) -> Result<Invoice> {
        ensure_id(quote_id, "quote_id")?;
        self.inner
            .execute_model(
                Method::POST,
                &format!("{QUOTES}/{quote_id}/invoice"),
                NO_QUERY,
                Body::Empty,
                &self.options,
            )
            .await
    }
}
