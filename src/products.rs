//! Product and service catalog.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::{
    client::{Body, NO_QUERY},
    common::{CsvImportOptions, ImportReport, ListParams, Page, Paged},
    core::ensure_id,
    errors::{Result, ValidationError},
    model::{null_as_default, validate_required, validate_update, Model},
};

const PRODUCTS: &str = "/products";

string_enum! {
    pub enum ProductKind {
        Product => "product",
        Service => "service",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProductKind>,
    /// Selling price, excluding tax.
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub track_stock: bool,
    /// Read-only; adjusted by the server from deliveries and purchases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl_model!(Product, "product", ["name", "unit_price"]);

impl Product {
    /// Margin on one unit, when the purchase price is known.
    pub fn unit_margin(&self) -> Option<f64> {
        self.purchase_price.map(|cost| self.unit_price - cost)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCreateRequest {
    pub name: String,
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProductKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_stock: Option<bool>,
}

impl ProductCreateRequest {
    pub fn new(name: impl Into<String>, unit_price: f64) -> Self {
        Self {
            name: name.into(),
            unit_price,
            reference: None,
            description: None,
            kind: None,
            purchase_price: None,
            vat_rate: None,
            unit: None,
            category_id: None,
            track_stock: None,
        }
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn kind(mut self, kind: ProductKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn vat_rate(mut self, rate: f64) -> Self {
        self.vat_rate = Some(rate);
        self
    }

    pub fn purchase_price(mut self, price: f64) -> Self {
        self.purchase_price = Some(price);
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn category(mut self, category_id: u64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn track_stock(mut self, track: bool) -> Self {
        self.track_stock = Some(track);
        self
    }
}

impl Model for ProductCreateRequest {
    const NAME: &'static str = "product";

    fn required_fields() -> &'static [&'static str] {
        &["name", "unit_price"]
    }

    fn validate(&self) -> Result<()> {
        validate_required(self)?;
        check_pricing(Some(self.unit_price), self.purchase_price, self.vat_rate)?;
        // Services have no stock to follow.
        if self.kind == Some(ProductKind::Service) && self.track_stock == Some(true) {
            return Err(ValidationError::new("services cannot track stock")
                .with_field("track_stock")
                .into());
        }
        Ok(())
    }
}

fn check_pricing(
    unit_price: Option<f64>,
    purchase_price: Option<f64>,
    vat_rate: Option<f64>,
) -> Result<()> {
    for (field, value) in [("unit_price", unit_price), ("purchase_price", purchase_price)] {
        if let Some(price) = value {
            if !price.is_finite() || price < 0.0 {
                return Err(ValidationError::new("must be a non-negative amount")
                    .with_field(field)
                    .into());
            }
        }
    }
    match vat_rate {
        Some(rate) if !(0.0..=100.0).contains(&rate) => Err(ValidationError::new(
            "must be a percentage between 0 and 100",
        )
        .with_field("vat_rate")
        .into()),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl ProductUpdateRequest {
    pub fn unit_price(mut self, price: f64) -> Self {
        self.unit_price = Some(price);
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }
}

impl Model for ProductUpdateRequest {
    const NAME: &'static str = "product update";

    fn validate(&self) -> Result<()> {
        validate_update(self)?;
        check_pricing(self.unit_price, self.purchase_price, self.vat_rate)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductListParams {
    #[serde(flatten)]
    pub params: ListParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ProductKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl ProductListParams {
    pub fn category(mut self, category_id: u64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn kind(mut self, kind: ProductKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }
}

impl Paged for ProductListParams {
    fn list_params(&self) -> &ListParams {
        &self.params
    }

    fn list_params_mut(&mut self) -> &mut ListParams {
        &mut self.params
    }
}

resource_client! {
    /// Products endpoints.
    ProductsClient
}

impl ProductsClient {
    pub async fn list(&self, params: ProductListParams) -> Result<Page<Product>> {
        params.validate_filters()?;
        self.inner
            .execute_page(PRODUCTS, Some(&params), &self.options)
            .await
    }

    pub async fn list_all(&self, params: ProductListParams) -> Result<Vec<Product>> {
        self.inner
            .collect_pages(PRODUCTS, params, &self.options)
            .await
    }

    pub async fn get(&self, product_id: u64) -> Result<Product> {
        ensure_id(product_id, "product_id")?;
        self.inner
            .execute_model(
                Method::GET,
                &format!("{PRODUCTS}/{product_id}"),
                NO_QUERY,
                Body::Empty,
                &self.options,
            )
            .await
    }

    pub async fn create(&self, req: ProductCreateRequest) -> Result<Product> {
        req.validate()?;
        self.inner
            .execute_model(Method::POST, PRODUCTS, NO_QUERY, Body::json(&req)?, &self.options)
            .await
    }

    pub async fn update(&self, product_id: u64, req: ProductUpdateRequest) -> Result<Product> {
        ensure_id(product_id, "product_id")?;
        req.validate()?;
        self.inner
            .execute_model(
                Method::PATCH,
                &format!("{PRODUCTS}/{product_id}"),
                NO_QUERY,
                Body::json(&req)?,
                &self.options,
            )
            .await
    }

    pub async fn delete(&self, product_id: u64) -> Result<()> {
        ensure_id(product_id, "product_id")?;
        self.inner
            .execute_empty(
                Method::DELETE,
                &format!("{PRODUCTS}/{product_id}"),
                Body::Empty,
                &self.options,
            )
            .await
    }

    /// Rows whose `reference` already exists are skipped unless
    /// `options.update_existing` is set.
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
                &format!("{PRODUCTS}/import"),
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

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn product_from_map() {
        let product = Product::from_value(json!({
            "id": 44,
            "reference": "SKU-44",
            "name": "Standing desk",
            "type": "product",
            "unit_price": 499.0,
            "purchase_price": 310.0,
            "track_stock": true,
            "stock_quantity": 12.0
        }))
        .expect("product");
        assert_eq!(product.kind, Some(ProductKind::Product));
        assert_eq!(product.unit_margin(), Some(189.0));
        assert!(product.track_stock);
    }

    #[test]
    fn product_requires_name_and_price() {
        let err = Product::from_value(json!({"name": "Desk"})).unwrap_err();
        assert_eq!(err.to_string(), "unit_price: unit_price is required");
        let err = Product::from_value(json!({"unit_price": 10.0})).unwrap_err();
        assert_eq!(err.to_string(), "name: name is required");
    }

    #[test]
    fn create_request_validation() {
        assert!(ProductCreateRequest::new("Desk", 499.0).vat_rate(20.0).validate().is_ok());
        assert!(ProductCreateRequest::new("Desk", -1.0).validate().is_err());
        assert!(ProductCreateRequest::new("Desk", 10.0).vat_rate(250.0).validate().is_err());

        let err = ProductCreateRequest::new("Support", 90.0)
            .kind(ProductKind::Service)
            .track_stock(true)
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "track_stock: services cannot track stock");
    }

    #[test]
    fn create_request_serializes_kind_as_type() {
        let value = ProductCreateRequest::new("Support", 90.0)
            .kind(ProductKind::Service)
            .to_value()
            .unwrap();
        assert_eq!(
            value,
            json!({"name": "Support", "unit_price": 90.0, "type": "service"})
        );
    }
}
