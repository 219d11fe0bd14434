use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    client::{Body, NO_QUERY},
    common::{ListParams, Page, Paged},
    core::{ensure_id, validate_email},
    errors::Result,
    identifiers::LocaleCode,
    model::{null_as_default, validate_required, validate_update, Model},
};

const USERS: &str = "/users";

string_enum! {
    pub enum UserRole {
        Owner => "owner",
        Admin => "admin",
        Accountant => "accountant",
        Employee => "employee",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<LocaleCode>,
    /// False until the invitation is accepted, or once the user is deactivated.
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_model!(User, "user", ["email"]);

impl User {
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Invites a user to the current company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreateRequest {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<LocaleCode>,
}

impl UserCreateRequest {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            first_name: None,
            last_name: None,
            role: None,
            locale: None,
        }
    }

    pub fn name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }

    pub fn role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn locale(mut self, locale: impl Into<LocaleCode>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

impl Model for UserCreateRequest {
    const NAME: &'static str = "user";

    fn required_fields() -> &'static [&'static str] {
        &["email"]
    }

    fn validate(&self) -> Result<()> {
        validate_required(self)?;
        validate_email(&self.email, "email")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<LocaleCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl UserUpdateRequest {
    pub fn role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }
}

impl Model for UserUpdateRequest {
    const NAME: &'static str = "user update";

    fn validate(&self) -> Result<()> {
        validate_update(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserListParams {
    #[serde(flatten)]
    pub params: ListParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl UserListParams {
    pub fn role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }
}

impl Paged for UserListParams {
    fn list_params(&self) -> &ListParams {
        &self.params
    }

    fn list_params_mut(&mut self) -> &mut ListParams {
        &mut self.params
    }
}

resource_client! {
    /// Users endpoints.
    UsersClient
}

impl UsersClient {
    pub async fn list(&self, params: UserListParams) -> Result<Page<User>> {
        params.validate_filters()?;
        self.inner
            .execute_page(USERS, Some(&params), &self.options)
            .await
    }

    pub async fn get(&self, user_id: u64) -> Result<User> {
        ensure_id(user_id, "user_id")?;
        self.inner
            .execute_model(
                Method::GET,
                &format!("{USERS}/{user_id}"),
                NO_QUERY,
                Body::Empty,
                &self.options,
            )
            .await
    }

    /// The user owning the API token.
    pub async fn me(&self) -> Result<User> {
        self.inner
            .execute_model(
                Method::GET,
                &format!("{USERS}/me"),
                NO_QUERY,
                Body::Empty,
                &self.options,
            )
            .await
    }

    /// Sends an invitation email; the user stays inactive until it is accepted.
    pub async fn create(&self, req: UserCreateRequest) -> Result<User> {
        req.validate()?;
        self.inner
            .execute_model(Method::POST, USERS, NO_QUERY, Body::json(&req)?, &self.options)
            .await
    }

    pub async fn update(&self, user_id: u64, req: UserUpdateRequest) -> Result<User> {
        ensure_id(user_id, "user_id")?;
        req.validate()?;
        self.inner
            .execute_model(
                Method::PATCH,
                &format!("{USERS}/{user_id}"),
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }

    pub async fn delete(&self, user_id: u64) -> Result<()> {
        ensure_id(user_id, "user_id")?;
        self.inner
            .execute_empty(
                Method::DELETE,
                &format!("{USERS}/{user_id}"),
                Body::Empty,
                &self.options,
            )
            .await
    }
}
