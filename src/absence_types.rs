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

const ABSENCE_TYPES: &str = "/absence_types";

/// Kind of leave (paid holiday, sick leave, training...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsenceType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Calendar color as `#rrggbb`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub paid: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub requires_approval: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_model!(AbsenceType, "absence type", ["name"]);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsenceTypeCreateRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_approval: Option<bool>,
}

impl AbsenceTypeCreateRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: None,
            color: None,
            paid: None,
            requires_approval: None,
        }
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn paid(mut self, paid: bool) -> Self {
        self.paid = Some(paid);
        self
    }

    pub fn requires_approval(mut self, required: bool) -> Self {
        self.requires_approval = Some(required);
        self
    }
}

impl Model for AbsenceTypeCreateRequest {
    const NAME: &'static str = "absence type";

    fn required_fields() -> &'static [&'static str] {
        &["name"]
    }

    fn validate(&self) -> Result<()> {
        validate_required(self)?;
        check_color(self.color.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbsenceTypeUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_approval: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl AbsenceTypeUpdateRequest {
    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }
}

impl Model for AbsenceTypeUpdateRequest {
    const NAME: &'static str = "absence type update";

    fn validate(&self) -> Result<()> {
        validate_update(self)?;
        check_color(self.color.as_deref())
    }
}

fn check_color(color: Option<&str>) -> Result<()> {
    let Some(color) = color else {
        return Ok(());
    };
    let hex = color.strip_prefix('#').unwrap_or_default();
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::new(format!("invalid color `{color}` (expected #rrggbb)"))
            .with_field("color")
            .into());
    }
    Ok(())
}

resource_client! {
    /// Absence types endpoints.
    AbsenceTypesClient
}

impl AbsenceTypesClient {
    pub async fn list(&self, params: ListParams) -> Result<Page<AbsenceType>> {
        params.validate_filters()?;
        self.inner
            .execute_page(ABSENCE_TYPES, Some(&params), &self.options)
            .await
    }

    pub async fn get(&self, absence_type_id: u64) -> Result<AbsenceType> {
        ensure_id(absence_type_id, "absence_type_id")?;
        self.inner
            .execute_model(
                Method::GET,
                &format!("{ABSENCE_TYPES}/{absence_type_id}"),
                NO_QUERY,
                Body::Empty,
                &self.options,
            )
            .await
    }

    pub async fn create(&self, req: AbsenceTypeCreateRequest) -> Result<AbsenceType> {
        req.validate()?;
        self.inner
            .execute_model(Method::POST, ABSENCE_TYPES, NO_QUERY, Body::json(&req)?, &self.options)
            .await
    }

    pub async fn update(
        &self,
        absence_type_id: u64,
        req: AbsenceTypeUpdateRequest,
    ) -> Result<AbsenceType> {
        ensure_id(absence_type_id, "absence_type_id")?;
        req.validate()?;
        self.inner
            .execute_model(
                Method::PATCH,
                &format!("{ABSENCE_TYPES}/{absence_type_id}"),
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }

    pub async fn delete(&self, absence_type_id: u64) -> Result<()> {
        ensure_id(absence_type_id, "absence_type_id")?;
        self.inner
            .execute_empty(
                Method::DELETE,
                &format!("{ABSENCE_TYPES}/{absence_type_id}"),
                Body::Empty,
                &self.options,
            )
            .await
    }
}
