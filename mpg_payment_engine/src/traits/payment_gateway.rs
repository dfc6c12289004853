use serde_json::Value;
use thiserror::Error;

use crate::{
    db_types::OrderId,
    mpe_api::payment_objects::{ChargeReceipt, CheckoutSession, CheckoutSessionRequest, NewCharge, VerifiedStatus},
};

/// The remote payment processor.
///
/// Implementations are expected to be thin: they translate engine request objects to the processor's wire format
/// and back again, and do not retry.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Creates a charge. The receipt carries the processor's full response.
    async fn charge(&self, charge: &NewCharge) -> Result<ChargeReceipt, GatewayError>;

    /// Turns an untrusted notification payload into a status record the engine can act on. Implementations must
    /// not trust the status fields in `payload` itself.
    async fn verify_notification(&self, payload: &Value) -> Result<VerifiedStatus, GatewayError>;

    /// Fetches the current status of the transaction for `order_id`, exactly as the processor reports it.
    async fn transaction_status(&self, order_id: &OrderId) -> Result<Value, GatewayError>;

    /// Creates a hosted checkout session and returns its token.
    async fn create_checkout_session(&self, request: &CheckoutSessionRequest)
        -> Result<CheckoutSession, GatewayError>;
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Could not reach the payment gateway. {0}")]
    Unavailable(String),
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("The payment gateway sent a response that could not be understood. {0}")]
    InvalidResponse(String),
    #[error("The notification could not be verified. {0}")]
    UnverifiedNotification(String),
}
