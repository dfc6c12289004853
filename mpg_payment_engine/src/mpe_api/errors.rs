use thiserror::Error;

use crate::{
    db_types::OrderId,
    traits::{GatewayError, PaymentGatewayError},
};

#[derive(Debug, Clone, Error)]
pub enum PaymentFlowError {
    /// The request was malformed or incomplete. The message is meant for the caller.
    #[error("{0}")]
    ValidationError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("{0}")]
    GatewayError(#[from] GatewayError),
    #[error("Could not read or write payment records. {0}")]
    PersistenceError(String),
}

impl From<PaymentGatewayError> for PaymentFlowError {
    fn from(e: PaymentGatewayError) -> Self {
        match e {
            PaymentGatewayError::OrderNotFound(id) => Self::OrderNotFound(id),
            e => Self::PersistenceError(e.to_string()),
        }
    }
}
