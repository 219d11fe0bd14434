use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    client::{Body, NO_QUERY},
    common::{Address, ListParams, Page, Paged},
    core::{ensure_id, validate_email},
    errors::{Result, ValidationError},
    identifiers::CurrencyCode,
    model::{validate_update, Model},
};

const COMPANIES: &str = "/companies";

/// A company the authenticated account has access to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_form: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    /// Month (1-12) the fiscal year starts in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiscal_year_start_month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Model for Company {
    const NAME: &'static str = "company";

    fn required_fields() -> &'static [&'static str] {
        &["name"]
    }

    fn check_values(&self) -> Result<()> {
        check_fiscal_month(self.fiscal_year_start_month)
    }
}

fn check_fiscal_month(month: Option<u8>) -> Result<()> {
    match month {
        Some(month) if !(1..=12).contains(&month) => {
            Err(ValidationError::new("must be a month between 1 and 12")
                .with_field("fiscal_year_start_month")
                .into())
        }
        _ => Ok(()),
    }
}

/// Companies are created from the web app; the API only edits them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_form: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiscal_year_start_month: Option<u8>,
}

impl CompanyUpdateRequest {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn fiscal_year_start_month(mut self, month: u8) -> Self {
        self.fiscal_year_start_month = Some(month);
        self
    }
}

impl Model for CompanyUpdateRequest {
    const NAME: &'static str = "company update";

    fn validate(&self) -> Result<()> {
        validate_update(self)?;
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(ValidationError::new("name must not be blank")
                .with_field("name")
                .into());
        }
        if let Some(email) = &self.email {
            validate_email(email, "email")?;
        }
        check_fiscal_month(self.fiscal_year_start_month)
    }
}

resource_client! {
    /// Companies endpoints.
    CompaniesClient
}

impl CompaniesClient {
    pub async fn list(&self, params: ListParams) -> Result<Page<Company>> {
        params.validate_filters()?;
        self.inner
            .execute_page(COMPANIES, Some(&params), &self.options)
            .await
    }

    pub async fn get(&self, company_id: u64) -> Result<Company> {
        ensure_id(company_id, "company_id")?;
        self.inner
            .execute_model(
                Method::GET,
                &format!("{COMPANIES}/{company_id}"),
                NO_QUERY,
                Body::Empty,
                &self.options,
            )
            .await
    }

    /// The company selected by the client configuration (or the account's default).
    pub async fn current(&self) -> Result<Company> {
        self.inner
            .execute_model(
                Method::GET,
                &format!("{COMPANIES}/current"),
                NO_QUERY,
                Body::Empty,
                &self.options,
            )
            .await
    }

    pub async fn update(&self, company_id: u64, req: CompanyUpdateRequest) -> Result<Company> {
        ensure_id(company_id, "company_id")?;
        req.validate()?;
        self.inner
            .execute_model(
                Method::PATCH,
                &format!("{COMPANIES}/{company_id}"),
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }
}
