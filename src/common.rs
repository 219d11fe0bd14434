//! Types shared across resources: addresses, pagination, CSV imports and email sending.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    core::is_valid_email,
    errors::{Error, Result, ValidationError},
    identifiers::CountryCode,
    model::{null_as_default, validate_required, Model},
};

/// Postal address used for billing, delivery and company headquarters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<CountryCode>,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        zip_code: impl Into<String>,
        city: impl Into<String>,
        country_code: impl Into<CountryCode>,
    ) -> Self {
        Self {
            street: Some(street.into()),
            zip_code: Some(zip_code.into()),
            city: Some(city.into()),
            country_code: Some(country_code.into()),
            ..Default::default()
        }
    }
}

impl_model!(Address, "address");

/// Pagination metadata attached to every list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default = "first_page")]
    pub last_page: u32,
    #[serde(default)]
    pub total: u64,
}

fn first_page() -> u32 {
    1
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            current_page: 1,
            per_page: 0,
            last_page: 1,
            total: 0,
        }
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.meta.current_page < self.meta.last_page
    }

    /// Page number to request next, if any.
    pub fn next_page(&self) -> Option<u32> {
        self.has_more().then(|| self.meta.current_page + 1)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

string_enum! {
    /// Sort direction for list endpoints.
    pub enum SortOrder {
        Asc => "asc",
        Desc => "desc",
    }
}

/// Largest page size the API accepts.
pub const MAX_PER_PAGE: u32 = 100;

/// Paging, search and sorting parameters accepted by every list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
}

impl ListParams {
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.order = Some(order);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.page == Some(0) {
            return Err(Error::Validation(
                ValidationError::new("page starts at 1").with_field("page"),
            ));
        }
        if let Some(per_page) = self.per_page {
            if per_page == 0 || per_page > MAX_PER_PAGE {
                return Err(Error::Validation(
                    ValidationError::new(format!("per_page must be between 1 and {MAX_PER_PAGE}"))
                        .with_field("per_page"),
                ));
            }
        }
        Ok(())
    }
}

/// Implemented by every list filter so the resource clients can page through results.
pub(crate) trait Paged: Serialize {
    fn list_params(&self) -> &ListParams;
    fn list_params_mut(&mut self) -> &mut ListParams;

    /// Local checks run before the first page is requested.
    fn validate_filters(&self) -> Result<()> {
        self.list_params().validate()
    }
}

impl Paged for ListParams {
    fn list_params(&self) -> &ListParams {
        self
    }

    fn list_params_mut(&mut self) -> &mut ListParams {
        self
    }
}

/// Options for the CSV import endpoints, sent as query parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CsvImportOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_header: Option<bool>,
    /// Update rows whose reference already exists instead of skipping them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_existing: Option<bool>,
}

/// A row the server could not import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRowError {
    pub row: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

/// Outcome of a CSV import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skipped: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<ImportRowError>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl_model!(ImportReport, "import report");

/// Request body for the `send` action of invoices, quotes and delivery receipts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailRequest {
    pub to: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub cc: Vec<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub bcc: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attach_pdf: Option<bool>,
}

impl EmailRequest {
    pub fn to(recipient: impl Into<String>) -> Self {
        Self {
            to: vec![recipient.into()],
            ..Default::default()
        }
    }

    pub fn cc(mut self, recipient: impl Into<String>) -> Self {
        self.cc.push(recipient.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn attach_pdf(mut self, attach: bool) -> Self {
        self.attach_pdf = Some(attach);
        self
    }
}

impl Model for EmailRequest {
    const NAME: &'static str = "email";

    fn required_fields() -> &'static [&'static str] {
        &["to"]
    }

    fn validate(&self) -> Result<()> {
        validate_required(self)?;
        if self.to.is_empty() {
            return Err(ValidationError::new("at least one recipient is required")
                .with_field("to")
                .into());
        }
        let lists = [("to", &self.to), ("cc", &self.cc), ("bcc", &self.bcc)];
        for (field, recipients) in lists {
            if let Some(bad) = recipients.iter().find(|r| !is_valid_email(r)) {
                return Err(ValidationError::new(format!("invalid email address `{bad}`"))
                    .with_field(field)
                    .into());
            }
        }
        Ok(())
    }
}

/// Acknowledgement returned by the `send` actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailDelivery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recipients: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
}

impl_model!(EmailDelivery, "email delivery");

/// Optional free-text reason sent with refusal actions.
#[derive(Debug, Serialize)]
pub(crate) struct ReasonBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

impl<'a> ReasonBody<'a> {
    pub(crate) fn new(reason: Option<&'a str>) -> Self {
        Self {
            reason: reason.map(str::trim).filter(|r| !r.is_empty()),
        }
    }
}
