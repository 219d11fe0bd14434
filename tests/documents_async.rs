use bizdesk::{
    testing::{page_body, test_client},
    Address, DeliveryLine, DeliveryReceiptCreateRequest, DeliveryReceiptListParams,
    DeliveryReceiptUpdateRequest, DeliveryState, DocumentLine, EmailRequest, InvoiceState,
    ListParams, PaymentRequest,
    PurchaseCreateRequest, PurchaseListParams, PurchaseState, QuoteCreateRequest, QuoteListParams,
    QuoteState,
};
use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn quote_json(state: &str) -> serde_json::Value {
    json!({
        "id": 12,
        "number": "D-2024-0012",
        "client_id": 3,
        "state": state,
        "issue_date": "2024-04-01",
        "valid_until": "2024-04-30",
        "lines": [{"description": "Design", "quantity": 3.0, "unit_price": 600.0}],
        "total_excl_tax": 1800.0,
        "total_tax": 360.0,
        "total_incl_tax": 2160.0
    })
}

#[tokio::test]
async fn quotes_lifecycle_async() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/quotes"))
        .and(body_json(json!({
            "client_id": 3,
            "lines": [{"description": "Design", "quantity": 3.0, "unit_price": 600.0}],
            "valid_until": "2024-04-30"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(quote_json("draft")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/quotes/12/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recipients": ["buyer@client.io"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/quotes/12/accept"))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote_json("accepted")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/quotes/12/invoice"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 77,
            "client_id": 3,
            "quote_id": 12,
            "state": "draft",
            "lines": [{"description": "Design", "quantity": 3.0, "unit_price": 600.0}],
            "total_incl_tax": 2160.0
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/quotes/12/pdf"))
        .and(header("accept", "application/pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-quote".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let quotes = client.quotes();

    let quote = quotes
        .create(
            QuoteCreateRequest::new(3, vec![DocumentLine::new("Design", 3.0, 600.0)])
                .valid_until(date(2024, 4, 30)),
        )
        .await
        .expect("create quote");
    assert_eq!(quote.state, Some(QuoteState::Draft));

    let sent = quotes
        .send_email(12, EmailRequest::to("buyer@client.io"))
        .await
        .expect("send quote");
    assert_eq!(sent.recipients, vec!["buyer@client.io".to_string()]);

    let accepted = quotes.accept(12).await.expect("accept");
    assert_eq!(accepted.state, Some(QuoteState::Accepted));

    let invoice = quotes.convert_to_invoice(12).await.expect("convert");
    assert_eq!(invoice.quote_id, Some(12));
    assert_eq!(invoice.state, Some(InvoiceState::Draft));

    let pdf = quotes.generate_pdf(12).await.expect("pdf");
    assert_eq!(pdf, b"%PDF-quote".to_vec());
}

#[tokio::test]
async fn quote_refusal_sends_reason_async() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/quotes/12/refuse"))
        .and(body_json(json!({"reason": "Budget cut"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(quote_json("refused")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/quotes"))
        .and(query_param("state", "refused"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(vec![quote_json("refused")], 1, 1)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let refused = client
        .quotes()
        .refuse(12, Some("  Budget cut "))
        .await
        .expect("refuse");
    assert_eq!(refused.state, Some(QuoteState::Refused));

    let all = client
        .quotes()
        .list_all(QuoteListParams::default().state(QuoteState::Refused))
        .await
        .expect("list all");
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn purchases_and_payments_async() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/purchases"))
        .and(body_json(json!({
            "supplier_name": "Office Depot",
            "supplier_reference": "OD-99812",
            "purchase_date": "2024-03-02"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 5,
            "supplier_name": "Office Depot",
            "supplier_reference": "OD-99812",
            "state": "to_pay",
            "total_incl_tax": 240.0
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/purchases/5/payments"))
        .and(body_json(json!({"amount": 240.0, "paid_at": "2024-03-10"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 8, "amount": 240.0, "paid_at": "2024-03-10"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/purchases"))
        .and(query_param("state", "paid"))
        .and(query_param("from", "2024-03-01"))
        .and(query_param("to", "2024-03-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(
            vec![json!({"id": 5, "supplier_name": "Office Depot", "state": "paid", "total_incl_tax": 240.0, "amount_paid": 240.0})],
            1,
            1,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let purchases = client.purchases();

    let purchase = purchases
        .create(
            PurchaseCreateRequest::new("Office Depot")
                .supplier_reference("OD-99812")
                .purchase_date(date(2024, 3, 2)),
        )
        .await
        .expect("create purchase");
    assert_eq!(purchase.state, Some(PurchaseState::ToPay));
    assert_eq!(purchase.outstanding(), 240.0);

    let payment = purchases
        .record_payment(5, PaymentRequest::new(240.0, date(2024, 3, 10)))
        .await
        .expect("payment");
    assert_eq!(payment.amount, 240.0);

    let page = purchases
        .list(
            PurchaseListParams::default()
                .state(PurchaseState::Paid)
                .between(date(2024, 3, 1), date(2024, 3, 31)),
        )
        .await
        .expect("list");
    assert_eq!(page.data[0].outstanding(), 0.0);
}

#[tokio::test]
async fn delivery_receipts_async() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/delivery_receipts"))
        .and(body_json(json!({
            "client_id": 7,
            "lines": [{"product_id": 44, "description": "Standing desk", "quantity": 2.0, "unit": "pcs"}],
            "invoice_id": 42,
            "delivery_address": {"street": "3 quai Rambaud", "zip_code": "69002", "city": "Lyon", "country_code": "FR"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 15,
            "number": "BL-0015",
            "client_id": 7,
            "invoice_id": 42,
            "state": "draft",
            "lines": [{"product_id": 44, "description": "Standing desk", "quantity": 2.0, "unit": "pcs"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/delivery_receipts/15"))
        .and(body_json(json!({"state": "delivered", "delivery_date": "2024-06-03"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 15, "client_id": 7, "state": "delivered", "delivery_date": "2024-06-03"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/delivery_receipts/15/pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-bl".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/delivery_receipts/15"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let receipts = client.delivery_receipts();

    let receipt = receipts
        .create(
            DeliveryReceiptCreateRequest::new(
                7,
                vec![DeliveryLine::new("Standing desk", 2.0).product(44).unit("pcs")],
            )
            .invoice(42)
            .delivery_address(Address::new("3 quai Rambaud", "69002", "Lyon", "fr")),
        )
        .await
        .expect("create receipt");
    assert_eq!(receipt.number.as_deref(), Some("BL-0015"));
    assert_eq!(receipt.state, Some(DeliveryState::Draft));

    let delivered = receipts
        .update(
            15,
            DeliveryReceiptUpdateRequest::default()
                .state(DeliveryState::Delivered)
                .delivery_date(date(2024, 6, 3)),
        )
        .await
        .expect("update");
    assert_eq!(delivered.state, Some(DeliveryState::Delivered));

    let pdf = receipts.generate_pdf(15).await.expect("pdf");
    assert!(!pdf.is_empty());

    receipts.delete(15).await.expect("delete");
}

#[tokio::test]
async fn delivery_receipt_listing_and_sending_async() {
    let server = MockServer::start().await;

    let receipt = json!({
        "id": 15,
        "number": "BL-0015",
        "client_id": 7,
        "state": "ready",
        "lines": [{"description": "Standing desk", "quantity": 2.0}]
    });

    Mock::given(method("GET"))
        .and(path("/delivery_receipts"))
        .and(query_param("client_id", "7"))
        .and(query_param("state", "ready"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(vec![receipt.clone()], 1, 1)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/delivery_receipts/15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(receipt))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/delivery_receipts/15/send"))
        .and(body_json(json!({"to": ["stores@acme.fr"], "attach_pdf": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "recipients": ["stores@acme.fr"],
            "sent_at": "2024-06-02T08:30:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let receipts = client.delivery_receipts();

    let page = receipts
        .list(DeliveryReceiptListParams {
            client_id: Some(7),
            state: Some(DeliveryState::Ready),
            ..Default::default()
        })
        .await
        .expect("list receipts");
    assert_eq!(page.len(), 1);

    let fetched = receipts.get(15).await.expect("get receipt");
    assert_eq!(fetched.lines.len(), 1);

    let delivery = receipts
        .send_email(15, EmailRequest::to("stores@acme.fr").attach_pdf(true))
        .await
        .expect("send receipt");
    assert_eq!(delivery.recipients, vec!["stores@acme.fr".to_string()]);
}

#[tokio::test]
async fn list_all_checks_filters_before_sending() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());

    let err = client
        .purchases()
        .list_all(PurchaseListParams::default().between(date(2024, 4, 1), date(2024, 3, 1)))
        .await
        .expect_err("inverted range");
    assert!(err.is_validation());

    let err = client
        .quotes()
        .list_all(QuoteListParams {
            params: ListParams::default().per_page(0),
            ..Default::default()
        })
        .await
        .expect_err("empty pages");
    assert!(err.is_validation());

    let requests = server.received_requests().await.expect("requests");
    assert!(requests.is_empty());
}
