use std::fmt::Debug;

use log::*;
use serde_json::Value;

use crate::{
    db_types::{NewTransaction, OrderStatusType},
    events::{EventProducers, OrderAnnulledEvent, OrderPaidEvent},
    mpe_api::{errors::PaymentFlowError, payment_objects::ChargeRequest},
    traits::{PaymentGateway, PaymentGatewayDatabase, ReconciledOrder},
};

/// `PaymentFlowApi` is the primary API for payment flows that change local state: charging orders, and reconciling
/// gateway notifications.
pub struct PaymentFlowApi<B, G> {
    db: B,
    gateway: G,
    producers: EventProducers,
}

impl<B, G> Debug for PaymentFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi")
    }
}

impl<B, G> PaymentFlowApi<B, G> {
    pub fn new(db: B, gateway: G, producers: EventProducers) -> Self {
        Self { db, gateway, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut B {
        &mut self.db
    }
}

impl<B, G> PaymentFlowApi<B, G>
where
    B: PaymentGatewayDatabase,
    G: PaymentGateway,
{
    /// Charges an existing order through the gateway and records the resulting transaction.
    ///
    /// The order must exist before the gateway is contacted. The gateway's response is returned unmodified.
    ///
    /// ## Failure modes:
    /// - `order_id` or `gross_amount` missing: [`PaymentFlowError::ValidationError`].
    /// - No such order: [`PaymentFlowError::OrderNotFound`]. The gateway is not called.
    /// - The gateway rejects the charge: [`PaymentFlowError::GatewayError`]. Nothing is stored.
    /// - The charge succeeded but could not be recorded (e.g. the order already has a transaction):
    ///   [`PaymentFlowError::PersistenceError`]. A later notification for the order will still reconcile it.
    pub async fn charge(&self, request: ChargeRequest) -> Result<Value, PaymentFlowError> {
        let charge = request.validate()?;
        let order_id = charge.order_id.clone();
        trace!("🔄️💳️ Charge requested for order {order_id}");
        let order = self
            .db
            .fetch_order_by_order_id(&order_id)
            .await?
            .ok_or_else(|| PaymentFlowError::OrderNotFound(order_id.clone()))?;
        debug!("🔄️💳️ Charging order {order_id} ({}) for {}", order.status, charge.gross_amount);
        let receipt = self.gateway.charge(&charge).await.map_err(|e| {
            warn!("🔄️💳️ Gateway rejected the charge for order {order_id}. {e}");
            e
        })?;
        let transaction = NewTransaction {
            order_id: order_id.clone(),
            amount: charge.gross_amount,
            payment_type: charge.payment_type.or(receipt.payment_type).unwrap_or_default(),
            transaction_status: receipt.transaction_status,
            transaction_id: receipt.transaction_id.unwrap_or_default(),
            fraud_status: receipt.fraud_status,
            payment_response: receipt.response.to_string(),
        };
        let saved = self.db.insert_transaction(transaction).await.map_err(|e| {
            error!("🔄️💳️ Order {order_id} was charged, but the transaction could not be recorded. {e}");
            e
        })?;
        info!("🔄️💳️ Order {order_id} charged. Transaction status: {}", saved.transaction_status);
        Ok(receipt.response)
    }

    /// Reconciles a gateway notification against local state.
    ///
    /// The payload is only used to ask the gateway for a verified status record. The transaction record for the order
    /// is then upserted, and the order status updated, in one unit of work. Repeating a notification is harmless.
    ///
    /// Subscribers are notified when the order moves into `Sudah_Dibayar` or `Dibatalkan`.
    pub async fn reconcile_notification(&self, payload: Value) -> Result<ReconciledOrder, PaymentFlowError> {
        let status = self.gateway.verify_notification(&payload).await.map_err(|e| {
            warn!("🔄️📨️ Could not verify notification. {e}");
            e
        })?;
        info!(
            "🔄️📨️ Transaction notification received. Order {}. Transaction status: {}. Fraud status: {}",
            status.order_id,
            status.transaction_status,
            status.fraud_status.as_deref().unwrap_or("none")
        );
        let update = status.into_transaction();
        let result = self.db.reconcile_transaction(update).await?;
        debug!(
            "🔄️📨️ Order {} reconciled. {} -> {}. Transaction record {}.",
            result.order.order_id,
            result.previous_status,
            result.order.status,
            if result.created { "created" } else { "updated" }
        );
        self.call_status_change_hooks(&result).await;
        Ok(result)
    }

    async fn call_status_change_hooks(&self, result: &ReconciledOrder) {
        if !result.status_changed() {
            return;
        }
        match result.order.status {
            OrderStatusType::SudahDibayar => {
                for emitter in &self.producers.order_paid_producer {
                    debug!("🔄️📦️ Notifying order paid hook subscribers");
                    emitter.publish_event(OrderPaidEvent::new(result.order.clone())).await;
                }
            },
            OrderStatusType::Dibatalkan => {
                for emitter in &self.producers.order_annulled_producer {
                    debug!("🔄️📦️ Notifying order annulled hook subscribers");
                    emitter.publish_event(OrderAnnulledEvent::new(result.order.clone())).await;
                }
            },
            OrderStatusType::MenungguKonfirmasi => {},
        }
    }
}
