use bizdesk::{
    testing::{page_body, test_client},
    Address, ClientCreateRequest, ClientKind, ClientListParams, ClientUpdateRequest,
    CompanyUpdateRequest, Contact, CsvImportOptions, ListParams, UserCreateRequest,
    UserListParams, UserRole,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_json(id: u64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "type": "company",
        "name": name,
        "email": "billing@acme.fr",
        "currency": "EUR",
        "contacts": [
            {"id": 1, "first_name": "Léa", "last_name": "Martin", "email": "lea@acme.fr", "primary": true},
            {"id": 2, "first_name": "Hugo", "last_name": "Roux"}
        ],
        "archived": false
    })
}

#[tokio::test]
async fn clients_crud_async() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/clients"))
        .and(body_json(json!({
            "name": "Acme",
            "type": "company",
            "email": "billing@acme.fr",
            "billing_address": {"street": "10 rue de Rivoli", "zip_code": "75001", "city": "Paris", "country_code": "FR"},
            "currency": "EUR",
            "contacts": [{"first_name": "Léa", "last_name": "Martin", "email": "lea@acme.fr", "primary": true}]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(client_json(3, "Acme")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/clients/3"))
        .and(body_json(json!({"name": "Acme Group"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(client_json(3, "Acme Group")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/clients"))
        .and(query_param("type", "company"))
        .and(query_param("archived", "false"))
        .and(query_param("search", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            vec![client_json(3, "Acme Group")],
            1,
            1,
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/clients/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let clients = client.clients();

    let created = clients
        .create(
            ClientCreateRequest::company("Acme")
                .email("billing@acme.fr")
                .billing_address(Address::new("10 rue de Rivoli", "75001", "Paris", "FR"))
                .currency("eur")
                .contact(Contact::new("Léa", "Martin").email("lea@acme.fr").primary()),
        )
        .await
        .expect("create client");
    assert_eq!(created.kind, Some(ClientKind::Company));
    assert_eq!(
        created
            .primary_contact()
            .and_then(|c| c.email.as_deref()),
        Some("lea@acme.fr")
    );

    let renamed = clients
        .update(3, ClientUpdateRequest::default().name("Acme Group"))
        .await
        .expect("update client");
    assert_eq!(renamed.name, "Acme Group");

    let page = clients
        .list(
            ClientListParams::default()
                .kind(ClientKind::Company)
                .archived(false)
                .search("acme"),
        )
        .await
        .expect("list clients");
    assert_eq!(page.len(), 1);
    assert!(!page.has_more());

    clients.delete(3).await.expect("delete client");
}

#[tokio::test]
async fn merge_and_import_clients_async() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/clients/3/merge"))
        .and(body_json(json!({"source_ids": [8, 9]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(client_json(3, "Acme")))
        .expect(1)
        .mount(&server)
        .await;

    let csv = "name,email\nAcme,billing@acme.fr\nGlobex,\n";
    Mock::given(method("POST"))
        .and(path("/clients/import"))
        .and(header("content-type", "text/csv"))
        .and(query_param("delimiter", ","))
        .and(query_param("update_existing", "true"))
        .and(body_string(csv))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created": 1,
            "updated": 0,
            "skipped": 1,
            "errors": [{"row": 3, "field": "email", "message": "The email field is required."}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());

    let merged = client.clients().merge(3, &[8, 9]).await.expect("merge");
    assert_eq!(merged.id, Some(3));

    let report = client
        .clients()
        .import_from_csv(
            csv,
            CsvImportOptions {
                delimiter: Some(','),
                update_existing: Some(true),
                ..Default::default()
            },
        )
        .await
        .expect("import");
    assert_eq!(report.created, 1);
    assert!(!report.is_clean());
    assert_eq!(report.errors[0].row, 3);
}

#[tokio::test]
async fn invalid_merge_and_import_are_not_sent() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());

    assert!(client
        .clients()
        .merge(3, &[])
        .await
        .expect_err("no sources")
        .is_validation());
    assert!(client
        .clients()
        .merge(3, &[3, 4])
        .await
        .expect_err("self merge")
        .is_validation());
    assert!(client
        .clients()
        .import_from_csv("  \n", CsvImportOptions::default())
        .await
        .expect_err("empty csv")
        .is_validation());

    let requests = server.received_requests().await.expect("requests");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn companies_async() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/companies"))
        .and(query_param("per_page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            vec![
                json!({"id": 1, "name": "Bizdesk Demo SARL"}),
                json!({"id": 2, "name": "Bizdesk Labs SAS"}),
            ],
            1,
            1,
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/companies/2"))
        .and(body_json(json!({"email": "hello@labs.io", "fiscal_year_start_month": 4})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 2,
            "name": "Bizdesk Labs SAS",
            "email": "hello@labs.io",
            "fiscal_year_start_month": 4
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let companies = client.companies();

    let page = companies
        .list(ListParams::default().per_page(10))
        .await
        .expect("list companies");
    assert_eq!(page.len(), 2);

    let updated = companies
        .update(
            2,
            CompanyUpdateRequest::default()
                .email("hello@labs.io")
                .fiscal_year_start_month(4),
        )
        .await
        .expect("update company");
    assert_eq!(updated.fiscal_year_start_month, Some(4));

    let err = companies
        .update(2, CompanyUpdateRequest::default().fiscal_year_start_month(13))
        .await
        .expect_err("no thirteenth month");
    assert!(err.is_validation());
}

#[tokio::test]
async fn users_async() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4,
            "email": "marie@bizdesk.test",
            "first_name": "Marie",
            "last_name": "Curie",
            "role": "owner",
            "active": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/users"))
        .and(body_json(json!({
            "email": "paul@bizdesk.test",
            "first_name": "Paul",
            "last_name": "Langevin",
            "role": "accountant",
            "locale": "fr"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 11,
            "email": "paul@bizdesk.test",
            "role": "accountant",
            "active": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("role", "accountant"))
        .and(query_param("active", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            vec![json!({"id": 11, "email": "paul@bizdesk.test", "role": "accountant"})],
            1,
            1,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let users = client.users();

    let me = users.me().await.expect("me");
    assert_eq!(me.full_name(), "Marie Curie");
    assert_eq!(me.role, Some(UserRole::Owner));

    let invited = users
        .create(
            UserCreateRequest::new("paul@bizdesk.test")
                .name("Paul", "Langevin")
                .role(UserRole::Accountant)
                .locale("FR"),
        )
        .await
        .expect("invite");
    assert!(!invited.active);

    let pending = users
        .list(
            UserListParams::default()
                .role(UserRole::Accountant)
                .active(false),
        )
        .await
        .expect("list users");
    assert_eq!(pending.data[0].id, Some(11));
}
