use actix_web::{http::StatusCode, web, web::ServiceConfig};
use midtrans_tools::signature::signature_key;
use mpg_common::{Rupiah, Secret};
use mpg_payment_engine::{
    db_types::{NewTransaction, OrderId, OrderStatusType, TransactionStatus},
    events::EventProducers,
    payment_objects::VerifiedStatus,
    traits::{GatewayError, PaymentGatewayError, ReconciledOrder},
    PaymentFlowApi,
};
use serde_json::{json, Value};

use super::{
    helpers::{order, post_request, transaction_from},
    mocks::{MockDatabase, MockGateway},
};
use crate::{middleware::SignatureMiddlewareFactory, routes::NotificationRoute};

const SERVER_KEY: &str = "SB-Mid-server-TEST-ONLY";

fn notification_scope(cfg: &mut ServiceConfig, db: MockDatabase, gateway: MockGateway, signature_checks: bool) {
    let api = PaymentFlowApi::new(db, gateway, EventProducers::default());
    let scope = web::scope("/payment/notification")
        .wrap(SignatureMiddlewareFactory::new(Secret::new(SERVER_KEY.to_string()), signature_checks))
        .service(NotificationRoute::<MockDatabase, MockGateway>::new());
    cfg.service(scope).app_data(web::Data::new(api));
}

fn payload(order_id: &str, status: &str) -> Value {
    let signature = signature_key(order_id, "200", "150000.00", SERVER_KEY);
    json!({
        "transaction_time": "2024-08-01 10:05:00",
        "transaction_status": status,
        "transaction_id": "tx-1",
        "status_code": "200",
        "signature_key": signature,
        "payment_type": "bank_transfer",
        "order_id": order_id,
        "gross_amount": "150000.00",
        "fraud_status": "accept"
    })
}

fn verified(order_id: &OrderId, status: &str) -> VerifiedStatus {
    VerifiedStatus {
        order_id: order_id.clone(),
        transaction_id: Some("tx-1".into()),
        transaction_status: TransactionStatus::from(status),
        fraud_status: Some("accept".into()),
        payment_type: Some("bank_transfer".into()),
        gross_amount: Some(Rupiah::from(150_000)),
        raw: json!({"order_id": order_id.as_str(), "transaction_status": status}),
    }
}

fn reconciled(update: NewTransaction) -> ReconciledOrder {
    let status = update.order_status();
    let order = order(update.order_id.as_str(), status);
    ReconciledOrder {
        transaction: transaction_from(update),
        order,
        previous_status: OrderStatusType::MenungguKonfirmasi,
        created: true,
    }
}

fn parse(body: &str) -> Value {
    serde_json::from_str(body).expect("Response is not JSON")
}

fn settling_gateway() -> MockGateway {
    let mut gateway = MockGateway::new();
    // The status in the payload is ignored. The gateway always reports settlement.
    gateway
        .expect_verify_notification()
        .returning(|p: &Value| Ok(verified(&OrderId::from(p["order_id"].as_str().unwrap_or_default()), "settlement")));
    gateway
}

fn configure_settlement(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_reconcile_transaction()
        .withf(|update| {
            update.order_id.as_str() == "ORD-1" &&
                update.transaction_status == TransactionStatus::Settlement &&
                update.fraud_status.as_deref() == Some("accept") &&
                update.amount == Rupiah::from(150_000)
        })
        .times(1)
        .returning(|update| Ok(reconciled(update)));
    notification_scope(cfg, db, settling_gateway(), false);
}

#[actix_web::test]
async fn settlement_notification() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/payment/notification", payload("ORD-1", "deny"), configure_settlement)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!({"status": true}));
}

fn configure_unknown_order(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_reconcile_transaction()
        .times(1)
        .returning(|update| Err(PaymentGatewayError::OrderNotFound(update.order_id)));
    notification_scope(cfg, db, settling_gateway(), false);
}

#[actix_web::test]
async fn notification_for_unknown_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/payment/notification", payload("ORD-2", "settlement"), configure_unknown_order)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(parse(&body), json!({"status": false, "message": "Order #ORD-2 does not exist"}));
}

fn configure_unverifiable(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_reconcile_transaction().never();
    let mut gateway = MockGateway::new();
    gateway.expect_verify_notification().times(1).returning(|_| {
        Err(GatewayError::UnverifiedNotification("The notification does not carry an order_id".into()))
    });
    notification_scope(cfg, db, gateway, false);
}

#[actix_web::test]
async fn unverifiable_notification() {
    let _ = env_logger::try_init().ok();
    let (status, body) =
        post_request("/payment/notification", json!({"transaction_status": "settlement"}), configure_unverifiable)
            .await
            .expect("Request failed");
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        parse(&body),
        json!({
            "status": false,
            "message": "The notification could not be verified. The notification does not carry an order_id"
        })
    );
}

fn configure_signed(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_reconcile_transaction().times(1).returning(|update| Ok(reconciled(update)));
    notification_scope(cfg, db, settling_gateway(), true);
}

fn configure_signed_never_called(cfg: &mut ServiceConfig) {
    let mut db = MockDatabase::new();
    db.expect_reconcile_transaction().never();
    let mut gateway = MockGateway::new();
    gateway.expect_verify_notification().never();
    notification_scope(cfg, db, gateway, true);
}

#[actix_web::test]
async fn signed_notification() {
    let _ = env_logger::try_init().ok();
    let (status, body) = post_request("/payment/notification", payload("ORD-1", "settlement"), configure_signed)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body), json!({"status": true}));
}

#[actix_web::test]
async fn tampered_notification() {
    let _ = env_logger::try_init().ok();
    let mut body = payload("ORD-1", "settlement");
    body["gross_amount"] = json!("1.00");
    let err = post_request("/payment/notification", body, configure_signed_never_called)
        .await
        .expect_err("Request should have been rejected");
    assert_eq!(err, "Invalid notification signature");
}

#[actix_web::test]
async fn unsigned_notification() {
    let _ = env_logger::try_init().ok();
    let mut body = payload("ORD-1", "settlement");
    body.as_object_mut().unwrap().remove("signature_key");
    let err = post_request("/payment/notification", body, configure_signed_never_called)
        .await
        .expect_err("Request should have been rejected");
    assert_eq!(err, "Invalid notification signature");
}
