use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
        Mutex,
    },
};

use mpg_common::Rupiah;
use mpg_payment_engine::{
    db_types::{OrderId, TransactionStatus},
    payment_objects::{ChargeReceipt, CheckoutSession, CheckoutSessionRequest, NewCharge, VerifiedStatus},
    GatewayError,
    PaymentGateway,
};
use serde_json::{json, Value};

/// An in-memory gateway. Statuses are only ever read from what the test has recorded with [`FakeGateway::set_status`],
/// never from the notification payload.
#[derive(Debug, Clone, Default)]
pub struct FakeGateway {
    statuses: Arc<Mutex<HashMap<String, Value>>>,
    charges: Arc<AtomicUsize>,
    last_checkout: Arc<Mutex<Option<CheckoutSessionRequest>>>,
    reject_charges: bool,
}

impl FakeGateway {
    pub fn rejecting_charges() -> Self {
        Self { reject_charges: true, ..Default::default() }
    }

    pub fn set_status(&self, order_id: &str, transaction_status: &str, fraud_status: Option<&str>) {
        let record = json!({
            "status_code": "200",
            "transaction_id": format!("tx-{order_id}"),
            "order_id": order_id,
            "gross_amount": "150000.00",
            "payment_type": "bank_transfer",
            "transaction_status": transaction_status,
            "fraud_status": fraud_status,
        });
        self.statuses.lock().unwrap().insert(order_id.to_string(), record);
    }

    pub fn charge_count(&self) -> usize {
        self.charges.load(Ordering::SeqCst)
    }

    /// The most recent checkout session request the gateway received, if any.
    pub fn last_checkout(&self) -> Option<CheckoutSessionRequest> {
        self.last_checkout.lock().unwrap().clone()
    }

    fn status_record(&self, order_id: &str) -> Option<Value> {
        self.statuses.lock().unwrap().get(order_id).cloned()
    }
}

fn opt_str(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(Value::as_str).map(String::from)
}

impl PaymentGateway for FakeGateway {
    async fn charge(&self, charge: &NewCharge) -> Result<ChargeReceipt, GatewayError> {
        self.charges.fetch_add(1, Ordering::SeqCst);
        if self.reject_charges {
            return Err(GatewayError::Rejected { status: 400, message: "Payment channel is not activated".into() });
        }
        let order_id = charge.order_id.as_str();
        let response = json!({
            "status_code": "201",
            "transaction_id": format!("tx-{order_id}"),
            "order_id": order_id,
            "gross_amount": charge.gross_amount.value().to_string(),
            "transaction_status": "pending",
        });
        Ok(ChargeReceipt {
            transaction_id: Some(format!("tx-{order_id}")),
            transaction_status: TransactionStatus::Pending,
            payment_type: None,
            fraud_status: None,
            response,
        })
    }

    async fn verify_notification(&self, payload: &Value) -> Result<VerifiedStatus, GatewayError> {
        let order_id = opt_str(payload, "order_id")
            .ok_or_else(|| GatewayError::UnverifiedNotification("order_id is missing".into()))?;
        let record = self
            .status_record(&order_id)
            .ok_or_else(|| GatewayError::Rejected { status: 404, message: "Transaction doesn't exist.".into() })?;
        let gross_amount = opt_str(&record, "gross_amount").and_then(|s| s.parse::<Rupiah>().ok());
        Ok(VerifiedStatus {
            order_id: OrderId::from(order_id),
            transaction_id: opt_str(&record, "transaction_id"),
            transaction_status: TransactionStatus::from(opt_str(&record, "transaction_status").unwrap_or_default()),
            fraud_status: opt_str(&record, "fraud_status"),
            payment_type: opt_str(&record, "payment_type"),
            gross_amount,
            raw: record,
        })
    }

    async fn transaction_status(&self, order_id: &OrderId) -> Result<Value, GatewayError> {
        self.status_record(order_id.as_str())
            .ok_or_else(|| GatewayError::Rejected { status: 404, message: "Transaction doesn't exist.".into() })
    }

    async fn create_checkout_session(&self, request: &CheckoutSessionRequest) -> Result<CheckoutSession, GatewayError> {
        *self.last_checkout.lock().unwrap() = Some(request.clone());
        Ok(CheckoutSession { token: format!("snap-{}", request.order_id.as_str()), redirect_url: None })
    }
}
