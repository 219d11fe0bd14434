use bizdesk::{
    testing::{page_body, test_client},
    CsvImportOptions, ListParams, PaymentMethodCreateRequest, PaymentMethodKind,
    PaymentMethodUpdateRequest, ProductCategoryCreateRequest, ProductCategoryUpdateRequest,
    ProductCreateRequest, ProductKind, ProductListParams, ProductUpdateRequest,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn products_async() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/products"))
        .and(body_json(json!({
            "name": "Standing desk",
            "unit_price": 490.0,
            "reference": "DESK-01",
            "type": "product",
            "purchase_price": 310.0,
            "vat_rate": 20.0,
            "category_id": 5,
            "track_stock": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 44,
            "reference": "DESK-01",
            "name": "Standing desk",
            "type": "product",
            "unit_price": 490.0,
            "purchase_price": 310.0,
            "vat_rate": 20.0,
            "category_id": 5,
            "track_stock": true,
            "stock_quantity": 0.0
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/products/44"))
        .and(body_json(json!({"unit_price": 520.0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 44, "name": "Standing desk", "unit_price": 520.0, "purchase_price": 310.0
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("category_id", "5"))
        .and(query_param("type", "product"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            vec![json!({"id": 44, "name": "Standing desk", "unit_price": 520.0})],
            1,
            1,
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/products/44"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let products = client.products();

    let created = products
        .create(
            ProductCreateRequest::new("Standing desk", 490.0)
                .reference("DESK-01")
                .kind(ProductKind::Product)
                .purchase_price(310.0)
                .vat_rate(20.0)
                .category(5)
                .track_stock(true),
        )
        .await
        .expect("create product");
    assert_eq!(created.unit_margin(), Some(180.0));
    assert!(created.track_stock);

    let repriced = products
        .update(44, ProductUpdateRequest::default().unit_price(520.0))
        .await
        .expect("update product");
    assert_eq!(repriced.unit_margin(), Some(210.0));

    let desks = products
        .list_all(
            ProductListParams::default()
                .category(5)
                .kind(ProductKind::Product),
        )
        .await
        .expect("list products");
    assert_eq!(desks.len(), 1);

    products.delete(44).await.expect("delete product");
}

#[tokio::test]
async fn product_import_and_local_checks_async() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/products/import"))
        .and(header("content-type", "text/csv"))
        .and(query_param("has_header", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created": 2, "updated": 1, "skipped": 0, "errors": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let products = client.products();

    let report = products
        .import_from_csv(
            "reference,name,unit_price\nDESK-01,Standing desk,490\nCHAIR-02,Chair,120\nLAMP-03,Lamp,35\n",
            CsvImportOptions {
                has_header: Some(true),
                ..Default::default()
            },
        )
        .await
        .expect("import");
    assert!(report.is_clean());
    assert_eq!(report.created + report.updated, 3);

    let err = products
        .create(
            ProductCreateRequest::new("Consulting day", 800.0)
                .kind(ProductKind::Service)
                .track_stock(true),
        )
        .await
        .expect_err("services have no stock");
    assert!(err.is_validation());

    let err = products
        .create(ProductCreateRequest::new("Desk", -1.0))
        .await
        .expect_err("negative price");
    assert!(err.is_validation());

    let err = products
        .update(44, ProductUpdateRequest::default())
        .await
        .expect_err("empty update");
    assert!(err.is_validation());

    let requests = server.received_requests().await.expect("requests");
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn product_categories_async() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/product_categories"))
        .and(body_json(json!({"name": "Desks", "parent_id": 2})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 5, "name": "Desks", "parent_id": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/product_categories"))
        .and(query_param("search", "desk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            vec![json!({"id": 5, "name": "Desks", "parent_id": 2})],
            1,
            1,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let categories = client.product_categories();

    let desks = categories
        .create(ProductCategoryCreateRequest::new("Desks").parent(2))
        .await
        .expect("create category");
    assert_eq!(desks.parent_id, Some(2));

    let page = categories
        .list(ListParams::default().search("desk"))
        .await
        .expect("list categories");
    assert_eq!(page.data[0].name, "Desks");

    let err = categories
        .update(
            5,
            ProductCategoryUpdateRequest {
                parent_id: Some(5),
                ..Default::default()
            },
        )
        .await
        .expect_err("own parent");
    assert!(err.is_validation());
}

#[tokio::test]
async fn payment_methods_async() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/payment_methods"))
        .and(body_json(json!({
            "name": "Main account",
            "type": "bank_transfer",
            "iban": "FR76 3000 6000 0112 3456 7890 189",
            "bic": "AGRIFRPP",
            "default": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 2,
            "name": "Main account",
            "type": "bank_transfer",
            "iban": "FR7630006000011234567890189",
            "bic": "AGRIFRPP",
            "default": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/payment_methods/2"))
        .and(body_json(json!({"archived": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 2, "name": "Main account", "archived": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let methods = client.payment_methods();

    let method = methods
        .create(
            PaymentMethodCreateRequest::bank_transfer(
                "Main account",
                "FR76 3000 6000 0112 3456 7890 189",
                "AGRIFRPP",
            )
            .default_method(),
        )
        .await
        .expect("create payment method");
    assert_eq!(method.kind, Some(PaymentMethodKind::BankTransfer));
    assert!(method.default);

    let archived = methods
        .update(
            2,
            PaymentMethodUpdateRequest {
                archived: Some(true),
                ..Default::default()
            },
        )
        .await
        .expect("archive");
    assert!(archived.archived);

    let err = methods
        .create(PaymentMethodCreateRequest::bank_transfer("Bad", "12345", "AGRIFRPP"))
        .await
        .expect_err("invalid iban");
    assert!(err.is_validation());
}

#[tokio::test]
async fn catalog_lookup_and_removal_async() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/payment_methods"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            vec![
                json!({"id": 2, "name": "Main account", "type": "bank_transfer", "default": true}),
                json!({"id": 3, "name": "Card terminal", "type": "card", "default": null}),
            ],
            1,
            1,
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/payment_methods/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3, "name": "Card terminal", "type": "card"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/payment_methods/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/product_categories/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5, "name": "Desks", "parent_id": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/product_categories/5"))
        .and(body_json(json!({"name": "Office desks", "parent_id": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5, "name": "Office desks", "parent_id": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/product_categories/5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());

    let methods = client.payment_methods();
    let page = methods.list(ListParams::default()).await.expect("list methods");
    assert_eq!(page.len(), 2);
    assert!(page.data[0].default);
    assert!(!page.data[1].default);

    let card = methods.get(3).await.expect("get method");
    assert_eq!(card.kind, Some(PaymentMethodKind::Card));
    methods.delete(3).await.expect("delete method");

    let categories = client.product_categories();
    let desks = categories.get(5).await.expect("get category");
    assert_eq!(desks.parent_id, Some(2));

    let moved = categories
        .update(
            5,
            ProductCategoryUpdateRequest {
                name: Some("Office desks".into()),
                parent_id: Some(1),
                ..Default::default()
            },
        )
        .await
        .expect("move category");
    assert_eq!(moved.name, "Office desks");

    categories.delete(5).await.expect("delete category");
}
