use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    client::{Body, NO_QUERY},
    common::{ListParams, Page, Paged},
    core::ensure_id,
    errors::{Result, ValidationError},
    model::{validate_required, validate_update, Model},
};

const PRODUCT_CATEGORIES: &str = "/product_categories";

/// Catalog category; categories nest through `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCategory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_model!(ProductCategory, "product category", ["name"]);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCategoryCreateRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProductCategoryCreateRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_id: None,
            description: None,
        }
    }

    pub fn parent(mut self, parent_id: u64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Model for ProductCategoryCreateRequest {
    const NAME: &'static str = "product category";

    fn required_fields() -> &'static [&'static str] {
        &["name"]
    }

    fn validate(&self) -> Result<()> {
        validate_required(self)?;
        if let Some(parent_id) = self.parent_id {
            ensure_id(parent_id, "parent_id")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductCategoryUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Model for ProductCategoryUpdateRequest {
    const NAME: &'static str = "product category update";

    fn validate(&self) -> Result<()> {
        validate_update(self)?;
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(ValidationError::new("name must not be blank")
                .with_field("name")
                .into());
        }
        Ok(())
    }
}

resource_client! {
    /// Product categories endpoints.
    ProductCategoriesClient
}

impl ProductCategoriesClient {
    pub async fn list(&self, params: ListParams) -> Result<Page<ProductCategory>> {
        params.validate_filters()?;
        self.inner
            .execute_page(PRODUCT_CATEGORIES, Some(&params), &self.options)
            .await
    }

    pub async fn get(&self, category_id: u64) -> Result<ProductCategory> {
        ensure_id(category_id, "category_id")?;
        self.inner
            .execute_model(
                Method::GET,
                &format!("{PRODUCT_CATEGORIES}/{category_id}"),
                NO_QUERY,
                Body::Empty,
                &self.options,
            )
            .await
    }

    pub async fn create(&self, req: ProductCategoryCreateRequest) -> Result<ProductCategory> {
        req.validate()?;
        self.inner
            .execute_model(
                Method::POST,
                PRODUCT_CATEGORIES,
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }

    pub async fn update(
        &self,
        category_id: u64,
        req: ProductCategoryUpdateRequest,
    ) -> Result<ProductCategory> {
        ensure_id(category_id, "category_id")?;
        req.validate()?;
        if req.parent_id == Some(category_id) {
            return Err(ValidationError::new("a category cannot be its own parent")
                .with_field("parent_id")
                .into());
        }
        self.inner
            .execute_model(
                Method::PATCH,
                &format!("{PRODUCT_CATEGORIES}/{category_id}"),
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }

    pub async fn delete(&self, category_id: u64) -> Result<()> {
        ensure_id(category_id, "category_id")?;
        self.inner
            .execute_empty(
                Method::DELETE,
                &format!("{PRODUCT_CATEGORIES}/{category_id}"),
                Body::Empty,
                &self.options,
            )
            .await
    }
}
