use std::fmt::Debug;

use log::*;
use serde_json::Value;

use crate::{
    db_types::OrderId,
    mpe_api::{
        errors::PaymentFlowError,
        payment_objects::{CheckoutCallbacks, CheckoutRequest, CheckoutSession},
    },
    traits::PaymentGateway,
};

/// `GatewayApi` covers the flows that only talk to the gateway and leave local state alone.
pub struct GatewayApi<G> {
    gateway: G,
    callbacks: CheckoutCallbacks,
}

impl<G> Debug for GatewayApi<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GatewayApi ({:?})", self.callbacks)
    }
}

impl<G> GatewayApi<G> {
    pub fn new(gateway: G, callbacks: CheckoutCallbacks) -> Self {
        Self { gateway, callbacks }
    }

    pub fn callbacks(&self) -> &CheckoutCallbacks {
        &self.callbacks
    }
}

impl<G: PaymentGateway> GatewayApi<G> {
    /// Validates the request and creates a hosted checkout session for it. The configured redirect callbacks are
    /// always used.
    ///
    /// Invalid requests never reach the gateway.
    pub async fn create_checkout_session(&self, request: CheckoutRequest) -> Result<CheckoutSession, PaymentFlowError> {
        let request = request.validate(&self.callbacks).map_err(|e| {
            debug!("🔄️🛒️ Checkout request rejected. {e}");
            e
        })?;
        trace!("🔄️🛒️ Creating checkout session: {request:?}");
        let session = self.gateway.create_checkout_session(&request).await?;
        info!("🔄️🛒️ Checkout session created for order {}", request.order_id);
        Ok(session)
    }

    /// Fetches the gateway's current status record for `order_id` and returns it unmodified.
    pub async fn payment_status(&self, order_id: &OrderId) -> Result<Value, PaymentFlowError> {
        trace!("🔄️🔍️ Fetching payment status for order {order_id}");
        let status = self.gateway.transaction_status(order_id).await?;
        Ok(status)
    }
}
