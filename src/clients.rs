//! Customer records (companies and individuals) with their contacts.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    client::{Body, NO_QUERY},
    common::{Address, CsvImportOptions, ImportReport, ListParams, Page, Paged},
    core::{ensure_id, validate_email},
    errors::{Result, ValidationError},
    identifiers::{CurrencyCode, LocaleCode},
    model::{null_as_default, validate_required, validate_update, Model},
};

const CLIENTS: &str = "/clients";

string_enum! {
    pub enum ClientKind {
        Company => "company",
        Individual => "individual",
    }
}

/// A person to reach at a client company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    /// Receives documents sent to the client by default.
    #[serde(default, deserialize_with = "null_as_default")]
    pub primary: bool,
}

impl Contact {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            ..Default::default()
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }
}

impl Model for Contact {
    const NAME: &'static str = "contact";

    fn validate(&self) -> Result<()> {
        match &self.email {
            Some(email) => validate_email(email, "email"),
            None => Ok(()),
        }
    }
}

/// A customer record. Named apart from the SDK [`Client`](crate::Client).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ClientKind>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<LocaleCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub contacts: Vec<Contact>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl_model!(ClientRecord, "client", ["name"]);

impl ClientRecord {
    pub fn primary_contact(&self) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.primary)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientCreateRequest {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ClientKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<LocaleCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms_days: Option<u32>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub contacts: Vec<Contact>,
}

impl ClientCreateRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            first_name: None,
            last_name: None,
            email: None,
            phone: None,
            vat_number: None,
            registration_number: None,
            billing_address: None,
            delivery_address: None,
            currency: None,
            language: None,
            payment_terms_days: None,
            contacts: Vec::new(),
        }
    }

    /// A company client.
    pub fn company(name: impl Into<String>) -> Self {
        Self::new(name).kind(ClientKind::Company)
    }

    /// A private individual; the display name is built from both names.
    pub fn individual(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        let first_name = first_name.into();
        let last_name = last_name.into();
        let mut req = Self::new(format!("{first_name} {last_name}").trim().to_string())
            .kind(ClientKind::Individual);
        req.first_name = Some(first_name);
        req.last_name = Some(last_name);
        req
    }

    pub fn kind(mut self, kind: ClientKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn vat_number(mut self, vat_number: impl Into<String>) -> Self {
        self.vat_number = Some(vat_number.into());
        self
    }

    pub fn billing_address(mut self, address: Address) -> Self {
        self.billing_address = Some(address);
        self
    }

    pub fn currency(mut self, currency: impl Into<CurrencyCode>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn payment_terms_days(mut self, days: u32) -> Self {
        self.payment_terms_days = Some(days);
        self
    }

    pub fn contact(mut self, contact: Contact) -> Self {
        self.contacts.push(contact);
        self
    }
}

impl Model for ClientCreateRequest {
    const NAME: &'static str = "client";

    fn required_fields() -> &'static [&'static str] {
        &["name"]
    }

    fn validate(&self) -> Result<()> {
        validate_required(self)?;
        if let Some(email) = &self.email {
            validate_email(email, "email")?;
        }
        validate_contacts(&self.contacts)
    }
}

fn validate_contacts(contacts: &[Contact]) -> Result<()> {
    for (index, contact) in contacts.iter().enumerate() {
        if let Some(email) = &contact.email {
            validate_email(email, &format!("contacts[{index}].email"))?;
        }
    }
    if contacts.iter().filter(|c| c.primary).count() > 1 {
        return Err(ValidationError::new("only one contact can be primary")
            .with_field("contacts")
            .into());
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ClientKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<Contact>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl ClientUpdateRequest {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }
}

impl Model for ClientUpdateRequest {
    const NAME: &'static str = "client update";

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
        match &self.contacts {
            Some(contacts) => validate_contacts(contacts),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientListParams {
    #[serde(flatten)]
    pub params: ListParams,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ClientKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl ClientListParams {
    pub fn kind(mut self, kind: ClientKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.params = self.params.search(search);
        self
    }
}

impl Paged for ClientListParams {
    fn list_params(&self) -> &ListParams {
        &self.params
    }

    fn list_params_mut(&mut self) -> &mut ListParams {
        &mut self.params
    }
}

#[derive(Serialize)]
struct MergeBody<'a> {
    source_ids: &'a [u64],
}

resource_client! {
    /// Clients endpoints.
    ClientsClient
}

impl ClientsClient {
    pub async fn list(&self, params: ClientListParams) -> Result<Page<ClientRecord>> {
        params.validate_filters()?;
        self.inner
            .execute_page(CLIENTS, Some(&params), &self.options)
            .await
    }

    pub async fn list_all(&self, params: ClientListParams) -> Result<Vec<ClientRecord>> {
        self.inner
            .collect_pages(CLIENTS, params, &self.options)
            .await
    }

    pub async fn get(&self, client_id: u64) -> Result<ClientRecord> {
        ensure_id(client_id, "client_id")?;
        self.inner
            .execute_model(
                Method::GET,
                &format!("{CLIENTS}/{client_id}"),
                NO_QUERY,
                Body::Empty,
                &self.options,
            )
            .await
    }

    pub async fn create(&self, req: ClientCreateRequest) -> Result<ClientRecord> {
        req.validate()?;
        self.inner
            .execute_model(Method::POST, CLIENTS, NO_QUERY, Body::json(&req)?, &self.options)
            .await
    }

    pub async fn update(&self, client_id: u64, req: ClientUpdateRequest) -> Result<ClientRecord> {
        ensure_id(client_id, "client_id")?;
        req.validate()?;
        self.inner
            .execute_model(
                Method::PATCH,
                &format!("{CLIENTS}/{client_id}"),
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }

    pub async fn delete(&self, client_id: u64) -> Result<()> {
        ensure_id(client_id, "client_id")?;
        self.inner
            .execute_empty(
                Method::DELETE,
                &format!("{CLIENTS}/{client_id}"),
                Body::Empty,
                &self.options,
            )
            .await
    }

    /// Folds the `source_ids` clients (documents, contacts) into `client_id`
    /// and deletes the sources.
    pub async fn merge(&self, client_id: u64, source_ids: &[u64]) -> Result<ClientRecord> {
        ensure_id(client_id, "client_id")?;
        validate_merge_sources(client_id, source_ids)?;
        self.inner
            .execute_model(
                Method::POST,
                &format!("{CLIENTS}/{client_id}/merge"),
                NO_QUERY,
                Body::json(&MergeBody { source_ids })?,
                &self.options,
            )
            .await
    }

    /// Uploads a CSV export; the report lists rows the server rejected.
    pub async fn import_from_csv(
        &self,
        csv: impl Into<String>,
        options: CsvImportOptions,
    ) -> Result<ImportReport> {
        let content = csv.into();
        if content.trim().is_empty() {
            return Err(ValidationError::new("csv content is empty").into());
        }
        self.inner
            .execute_model(
                Method::POST,
                &format!("{CLIENTS}/import"),
                Some(&options),
                Body::Text {
                    content_type: "text/csv",
                    content,
                },
                &self.options,
            )
            .await
    }
}

fn validate_merge_sources(client_id: u64, source_ids: &[u64]) -> Result<()> {
    if source_ids.is_empty() {
        return Err(ValidationError::required("source_ids").into());
    }
    if source_ids.contains(&client_id) {
        return Err(ValidationError::new("a client cannot be merged into itself")
            .with_field("source_ids")
            .into());
    }
    for id in source_ids {
        ensure_id(*id, "source_ids")?;
    }
    Ok(())
}
