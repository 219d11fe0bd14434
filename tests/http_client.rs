//! Transport tests using wiremock mock server.
//!
//! These tests verify:
//! - Authentication and identification headers
//! - Error envelope mapping
//! - Retry behavior per HTTP method
//! - Local validation short-circuiting the request

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use bizdesk::{
    testing::{test_client, test_client_for_company, TEST_TOKEN},
    Client, Config, Error, HttpRequestMetrics, InvoiceCreateRequest, MetricsCallbacks,
    RequestOptions, RetryConfig,
};
use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

#[derive(Clone)]
struct SequenceResponder {
    templates: Arc<Mutex<VecDeque<ResponseTemplate>>>,
}

impl SequenceResponder {
    fn new(templates: Vec<ResponseTemplate>) -> Self {
        Self {
            templates: Arc::new(Mutex::new(templates.into_iter().collect())),
        }
    }
}

impl Respond for SequenceResponder {
    fn respond(&self, _req: &Request) -> ResponseTemplate {
        let mut templates = self.templates.lock().expect("mutex should not be poisoned");
        templates.pop_front().unwrap_or_else(|| {
            ResponseTemplate::new(500).set_body_json(json!({
                "error": { "message": "No more mock responses configured" }
            }))
        })
    }
}

fn retrying_client(server: &MockServer, retry_non_idempotent: bool) -> Client {
    Client::new(Config {
        api_token: Some(TEST_TOKEN.into()),
        base_url: Some(server.uri()),
        retry: Some(RetryConfig {
            max_attempts: 3,
            base_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
            retry_non_idempotent,
        }),
        ..Default::default()
    })
    .expect("client creation should succeed")
}

fn company_json() -> serde_json::Value {
    json!({"id": 1, "name": "Bizdesk Demo SARL", "currency": "EUR"})
}

#[tokio::test]
async fn sends_auth_and_identification_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/companies/current"))
        .and(header("authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .and(header("x-company-id", "42"))
        .and(header("accept", "application/json"))
        .and(header_exists("x-request-id"))
        .and(header(
            "x-bizdesk-client",
            concat!("bizdesk-rust/", env!("CARGO_PKG_VERSION")),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(company_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client_for_company(&server.uri(), 42);
    let company = client.companies().current().await.expect("current company");
    assert_eq!(company.name, "Bizdesk Demo SARL");
}

#[tokio::test]
async fn per_call_options_override_request_id_and_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/companies/current"))
        .and(header("x-request-id", "req-fixed-1"))
        .and(header("x-trace", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(company_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let companies = client.companies().with_options(
        RequestOptions::default()
            .with_request_id("req-fixed-1")
            .with_header("X-Trace", "abc"),
    );
    companies.current().await.expect("current company");
}

#[tokio::test]
async fn unprocessable_entity_maps_field_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/clients"))
        .respond_with(
            ResponseTemplate::new(422)
                .insert_header("X-Request-Id", "req-422")
                .set_body_json(json!({
                    "message": "The given data was invalid.",
                    "errors": {
                        "vat_number": ["The vat number format is invalid."],
                        "email": ["The email has already been taken."]
                    }
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .clients()
        .create(bizdesk::ClientCreateRequest::company("Acme").vat_number("FR00"))
        .await
        .expect_err("server rejects the client");

    let api = err.api_error().expect("api error");
    assert!(api.is_unprocessable());
    assert_eq!(api.message, "The given data was invalid.");
    assert_eq!(api.request_id.as_deref(), Some("req-422"));
    assert_eq!(api.fields.len(), 2);
    assert!(api
        .fields
        .iter()
        .any(|f| f.field.as_deref() == Some("vat_number")));
}

#[tokio::test]
async fn error_envelope_and_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/invoices/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "not_found", "message": "Invoice not found"},
            "request_id": "req-body-id"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.invoices().get(404).await.expect_err("missing invoice");
    match err {
        Error::Api(api) => {
            assert!(api.is_not_found());
            assert_eq!(api.code.as_deref(), Some("not_found"));
            assert_eq!(api.request_id.as_deref(), Some("req-body-id"));
            assert_eq!(api.to_string(), "not_found (404): Invoice not found");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn raw_error_body_is_kept() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.users().me().await.expect_err("bad gateway");
    let api = err.api_error().expect("api error");
    assert_eq!(api.status, 502);
    assert_eq!(api.message, "upstream exploded");
    assert!(api.request_id.is_some(), "generated request id is attached");
}

#[tokio::test]
async fn get_is_retried_on_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/companies/current"))
        .respond_with(SequenceResponder::new(vec![
            ResponseTemplate::new(503),
            ResponseTemplate::new(429),
            ResponseTemplate::new(200).set_body_json(company_json()),
        ]))
        .expect(3)
        .mount(&server)
        .await;

    let client = retrying_client(&server, false);
    let company = client.companies().current().await.expect("third attempt succeeds");
    assert_eq!(company.id, Some(1));
}

#[tokio::test]
async fn retry_metadata_is_reported_when_attempts_are_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/companies/current"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = retrying_client(&server, false);
    let err = client.companies().current().await.expect_err("always failing");
    let retries = err
        .api_error()
        .and_then(|api| api.retries.clone())
        .expect("retry metadata");
    assert_eq!(retries.attempts, 3);
    assert_eq!(retries.last_status, Some(500));
}

#[tokio::test]
async fn post_is_not_retried_by_default() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoices/7/cancel"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = retrying_client(&server, false);
    let err = client.invoices().cancel(7).await.expect_err("unavailable");
    assert_eq!(err.api_error().map(|api| api.status), Some(503));
}

#[tokio::test]
async fn post_is_retried_when_opted_in() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invoices/7/cancel"))
        .respond_with(SequenceResponder::new(vec![
            ResponseTemplate::new(503),
            ResponseTemplate::new(200).set_body_json(json!({
                "id": 7, "client_id": 3, "state": "cancelled"
            })),
        ]))
        .expect(2)
        .mount(&server)
        .await;

    let client = retrying_client(&server, true);
    let invoice = client.invoices().cancel(7).await.expect("second attempt succeeds");
    assert_eq!(invoice.state, Some(bizdesk::InvoiceState::Cancelled));
}

#[tokio::test]
async fn validation_errors_are_raised_before_sending() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());

    let err = client
        .invoices()
        .create(InvoiceCreateRequest::new(7, vec![]))
        .await
        .expect_err("an invoice needs lines");
    match err {
        Error::Validation(ve) => assert_eq!(ve.field.as_deref(), Some("lines")),
        other => panic!("expected validation error, got {other:?}"),
    }

    let err = client.clients().get(0).await.expect_err("zero id");
    assert!(err.is_validation());

    let requests = server
        .received_requests()
        .await
        .expect("should be able to read received requests");
    assert!(
        requests.is_empty(),
        "request should not be sent on validation failure"
    );
}

#[tokio::test]
async fn malformed_record_is_a_validation_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4, "email": "marie@bizdesk.test", "role": "intern"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.users().me().await.expect_err("undeclared role");
    assert!(err.is_validation());
    assert!(err.to_string().contains("invalid UserRole value `intern`"));
}

#[tokio::test]
async fn metrics_callback_sees_each_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/companies/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(company_json()))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/users/9"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Forbidden"})))
        .mount(&server)
        .await;

    let seen: Arc<Mutex<Vec<HttpRequestMetrics>>> = Arc::default();
    let sink = seen.clone();
    let client = Client::new(Config {
        api_token: Some(TEST_TOKEN.into()),
        base_url: Some(server.uri()),
        retry: Some(RetryConfig::disabled()),
        metrics: Some(MetricsCallbacks::on_http_request(move |m: HttpRequestMetrics| {
            sink.lock().unwrap().push(m)
        })),
        ..Default::default()
    })
    .expect("client");

    client.companies().current().await.expect("ok");
    let err = client.users().delete(9).await.expect_err("forbidden");
    assert!(err.api_error().map(|api| api.is_unauthorized()).unwrap_or(false));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].is_success());
    assert_eq!(seen[0].status, Some(200));
    assert_eq!(seen[0].context.path, "/companies/current");
    assert_eq!(seen[1].context.method, "DELETE");
    assert_eq!(seen[1].error.as_deref(), Some("http 403"));
}
