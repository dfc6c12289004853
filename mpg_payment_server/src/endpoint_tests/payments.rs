use actix_web::{http::StatusCode, web, web::ServiceConfig};
use mpg_payment_engine::{
    db_types::{OrderId, OrderStatusType, TransactionStatus},
    events::EventProducers,
    payment_objects::{ChargeReceipt, CheckoutCallbacks, CheckoutSession, DEFAULT_ITEM_CATEGORY},
    traits::{GatewayError, PaymentGatewayError},
    GatewayApi,
    PaymentFlowApi,
};
use serde_json::{json, Value};

use super::{
    helpers::{get_request, order, post_raw_request, post_request, transaction_from},
    mocks::{MockDatabase, MockGateway},
};
use crate::{
    routes::{ChargeRoute, CreateSnapTokenRoute, PaymentStatusRoute},
    server::json_error_handler,
};

fn charge_body() -> Value {
    json!({
        "order_id": "ORD-1",
        "gross_amount": 150000,
        "payment_type": "bank_transfer",
        "bank_transfer": {"bank": "bca"}
    })
}

fn charge_response() -> Value {
    json!({
        "status_code": "201",
        "transaction_id": "tx-1",
        "order_id": "ORD-1",
        "gross_amount": "150000.00",
        "payment_type": "bank_transfer",
        "transaction_status": "pending",
        "va_numbers": [{"bank": "bca", "va_number": "12345678901"}]
    })
}

fn payments_scope(cfg: &mut ServiceConfig, db: MockDatabase, gateway: MockGateway) {
    let api = PaymentFlowApi::new(db, gateway, EventProducers::default());
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(ChargeRoute::<MockDatabase, MockGateway>::new())
        .app_data(web::Data::new(api));
}

fn gateway_scope(cfg: &mut ServiceConfig, gateway: MockGateway) {
    let callbacks = CheckoutCallbacks {
        finish: "https://shop.example/ok".into(),
        unfinish: "https://shop.example/wait".into(),
        error: "https://shop.example/fail".into(),
    };
    let api = GatewayApi::new(gateway, callbacks);
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(PaymentStatusRoute::<MockGateway>::new())
        .service(CreateSnapTokenRoute::<MockGateway>::new())
        .app_data(web::Data::new(api));
}

fn parse(body: &str) -> Value {
    serde_json::from_str(body).expect("Response is not JSON")
}

//----------------------------------------------   Charge  ----------------------------------------------------

fn configure_charge(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_fetch_order_by_order_id().returning(|id: &OrderId| match id.as_str() {
        "ORD-1" => Ok(Some(order("ORD-1", OrderStatusType::MenungguKonfirmasi))),
        _ => Ok(None),
    });
    db.expect_insert_transaction()
        .withf(|tx| {
            tx.order_id.as_str() == "ORD-1" &&
                tx.transaction_status == TransactionStatus::Pending &&
                tx.payment_type == "bank_transfer" &&
                tx.transaction_id == "tx-1"
        })
        .times(1)
        .returning(|tx| Ok(transaction_from(tx)));
    let mut gateway = MockGateway::new();
    gateway.expect_charge().withf(|c| c.order_id.as_str() == "ORD-1").times(1).returning(|_| {
        Ok(ChargeReceipt {
            transaction_id: Some("tx-1".into()),
            transaction_status: TransactionStatus::Pending,
            payment_type: Some("bank_transfer".into()),
            fraud_status: None,
            response: charge_response(),
        })
    });
    payments_scope(cfg, db, gateway);
}

#[actix_web::test]
async fn charge() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/payment/charge", charge_body(), configure_charge).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!({"status": true, "message": "Charge successful", "data": charge_response()}));
}

#[actix_web::test]
async fn charge_missing_amount() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/payment/charge", json!({"order_id": "ORD-1"}), configure_no_calls)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse(&body), json!({"status": false, "message": "order_id and gross_amount are required"}));
}

#[actix_web::test]
async fn charge_malformed_json() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_raw_request("/payment/charge", r#"{"order_id": "ORD-1", "#, configure_no_calls)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body = parse(&body);
    assert_eq!(body["status"], false);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid request payload."));
}

#[actix_web::test]
async fn charge_unknown_order() {
    let _ = env_logger::try_init().ok();
    let mut req = charge_body();
    req["order_id"] = json!("ORD-404");
    let (status, body) = post_request("/payment/charge", req, configure_charge_unknown).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse(&body), json!({"status": false, "message": "Order #ORD-404 does not exist"}));
}

fn configure_charge_unknown(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_fetch_order_by_order_id().times(1).returning(|_| Ok(None));
    db.expect_insert_transaction().never();
    let mut gateway = MockGateway::new();
    gateway.expect_charge().never();
    payments_scope(cfg, db, gateway);
}

#[actix_web::test]
async fn charge_rejected_by_gateway() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/payment/charge", charge_body(), configure_charge_rejected).await.expect("Request failed");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(parse(&body), json!({"status": false, "message": "Payment channel is not activated"}));
}

fn configure_charge_rejected(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_fetch_order_by_order_id()
        .returning(|id: &OrderId| Ok(Some(order(id.as_str(), OrderStatusType::MenungguKonfirmasi))));
    db.expect_insert_transaction().never();
    let mut gateway = MockGateway::new();
    gateway.expect_charge().times(1).returning(|_| {
        Err(GatewayError::Rejected { status: 402, message: "Payment channel is not activated".into() })
    });
    payments_scope(cfg, db, gateway);
}

#[actix_web::test]
async fn charge_already_recorded() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/payment/charge", charge_body(), configure_charge_duplicate).await.expect("Request failed");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = parse(&body);
    assert_eq!(body["status"], false);
    assert!(body["message"].as_str().unwrap().contains("Order #ORD-1 already has a transaction record"));
}

fn configure_charge_duplicate(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_fetch_order_by_order_id()
        .returning(|id: &OrderId| Ok(Some(order(id.as_str(), OrderStatusType::MenungguKonfirmasi))));
    db.expect_insert_transaction()
        .times(1)
        .returning(|tx| Err(PaymentGatewayError::TransactionAlreadyExists(tx.order_id)));
    let mut gateway = MockGateway::new();
    gateway.expect_charge().times(1).returning(|_| {
        Ok(ChargeReceipt {
            transaction_id: Some("tx-1".into()),
            transaction_status: TransactionStatus::Pending,
            payment_type: Some("bank_transfer".into()),
            fraud_status: None,
            response: charge_response(),
        })
    });
    payments_scope(cfg, db, gateway);
}

fn configure_no_calls(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_fetch_order_by_order_id().never();
    let mut gateway = MockGateway::new();
    gateway.expect_charge().never();
    payments_scope(cfg, db, gateway);
}

//----------------------------------------------   Status  ----------------------------------------------------

fn configure_status(cfg: &mut ServiceConfig) {
    let mut gateway = MockGateway::new();
    gateway.expect_transaction_status().returning(|id: &OrderId| match id.as_str() {
        "ORD-1" => Ok(json!({
            "status_code": "200",
            "order_id": "ORD-1",
            "transaction_status": "settlement",
            "fraud_status": "accept",
            "gross_amount": "150000.00"
        })),
        _ => Err(GatewayError::Rejected { status: 404, message: "Transaction doesn't exist.".into() }),
    });
    gateway_scope(cfg, gateway);
}

#[actix_web::test]
async fn payment_status() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/payment/status/ORD-1", configure_status).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let body = parse(&body);
    assert_eq!(body["status"], true);
    assert_eq!(body["data"]["transaction_status"], "settlement");
    assert_eq!(body["data"]["fraud_status"], "accept");
    assert_eq!(body["data"]["gross_amount"], "150000.00");
}

#[actix_web::test]
async fn payment_status_unknown_transaction() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/payment/status/ORD-2", configure_status).await.expect("Request failed");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(parse(&body), json!({"status": false, "message": "Transaction doesn't exist."}));
}

//----------------------------------------------   Snap  ----------------------------------------------------

fn snap_body(price: i64) -> Value {
    json!({
        "order_id": "ORD-1",
        "gross_amount": 150000,
        "customer_details": {"first_name": "Budi", "email": "budi@example.com"},
        "item_details": [{"id": "SKU-1", "name": "Kemeja", "price": price, "quantity": 2}]
    })
}

fn configure_snap(cfg: &mut ServiceConfig) {
    let mut gateway = MockGateway::new();
    gateway
        .expect_create_checkout_session()
        .withf(|req| {
            req.order_id.as_str() == "ORD-1" &&
                req.callbacks.finish == "https://shop.example/ok" &&
                req.items.len() == 1 &&
                req.items[0].category == DEFAULT_ITEM_CATEGORY &&
                req.customer.phone.is_empty()
        })
        .times(1)
        .returning(|_| {
            Ok(CheckoutSession {
                token: "66e4fa55-fdac-4ef9-91b5-733b97d1b862".into(),
                redirect_url: Some("https://app.sandbox.midtrans.com/snap/v2/vtweb/66e4fa55".into()),
            })
        });
    gateway_scope(cfg, gateway);
}

#[actix_web::test]
async fn create_snap_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/payment/create-snap-token", snap_body(75_000), configure_snap).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!({"status": true, "token": "66e4fa55-fdac-4ef9-91b5-733b97d1b862"}));
}

fn configure_snap_never_called(cfg: &mut ServiceConfig) {
    let mut gateway = MockGateway::new();
    gateway.expect_create_checkout_session().never();
    gateway_scope(cfg, gateway);
}

#[actix_web::test]
async fn create_snap_token_amount_mismatch() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/payment/create-snap-token", snap_body(70_000), configure_snap_never_called)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        parse(&body),
        json!({"status": false, "message": "gross_amount (150000) is not equal to the sum of item_details (140000)"})
    );
}

#[actix_web::test]
async fn create_snap_token_without_items() {
    let _ = env_logger::try_init().ok();
    let mut req = snap_body(75_000);
    req["item_details"] = json!([]);
    let (status, body) =
        post_request("/payment/create-snap-token", req, configure_snap_never_called).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse(&body), json!({"status": false, "message": "item_details must be a non-empty list"}));
}

#[actix_web::test]
async fn create_snap_token_without_first_name() {
    let _ = env_logger::try_init().ok();
    let mut req = snap_body(75_000);
    req["customer_details"] = json!({"email": "budi@example.com"});
    let (status, body) =
        post_request("/payment/create-snap-token", req, configure_snap_never_called).await.expect("Request failed");
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse(&body), json!({"status": false, "message": "customer_details.first_name is required"}));
}
