use thiserror::Error;

use crate::db_types::{NewOrder, NewTransaction, Order, OrderId, OrderStatusType, Transaction};

/// The outcome of reconciling a verified gateway status against local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledOrder {
    /// The transaction record after the upsert.
    pub transaction: Transaction,
    /// The order after its status was updated.
    pub order: Order,
    /// The order status before reconciliation.
    pub previous_status: OrderStatusType,
    /// True if the transaction record was created by this reconciliation, false if an existing record was updated.
    pub created: bool,
}

impl ReconciledOrder {
    pub fn status_changed(&self) -> bool {
        self.previous_status != self.order.status
    }
}

/// This trait defines the behaviour that persistence backends must provide to support the payment engine.
///
/// Orders are created by the storefront ahead of payment. After that, the only way an order's status changes is
/// through [`Self::reconcile_transaction`].
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayDatabase {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Fetches the order with the given merchant order id, if it exists.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentGatewayError>;

    /// Stores a new order. This call is idempotent.
    /// Returns true in the second parameter if the order was inserted, or false if it already existed.
    async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), PaymentGatewayError>;

    /// Fetches the transaction record for the given order, if one exists.
    async fn fetch_transaction_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<Transaction>, PaymentGatewayError>;

    /// Records the first transaction for an order, typically straight after a charge was created.
    ///
    /// ## Failure modes:
    /// - If the order does not exist, [`PaymentGatewayError::OrderNotFound`] is returned.
    /// - If the order already has a transaction record, [`PaymentGatewayError::TransactionAlreadyExists`] is returned
    ///   and nothing is changed.
    async fn insert_transaction(&self, transaction: NewTransaction) -> Result<Transaction, PaymentGatewayError>;

    /// Brings local state in line with a verified gateway status, in a single atomic transaction:
    /// * The transaction record for the order is created, or if it exists, its status fields and stored response are
    ///   updated in place.
    /// * The order status is set to the status implied by the transaction status.
    ///
    /// Calling this repeatedly with the same data leaves exactly one transaction record with the same final values.
    /// If the order does not exist, nothing is written and [`PaymentGatewayError::OrderNotFound`] is returned.
    async fn reconcile_transaction(&self, update: NewTransaction) -> Result<ReconciledOrder, PaymentGatewayError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("We have an internal database engine (configuration/uptime etc.) : {0}")]
    DatabaseError(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Order {0} already has a transaction record")]
    TransactionAlreadyExists(OrderId),
}

impl From<sqlx::Error> for PaymentGatewayError {
    fn from(e: sqlx::Error) -> Self {
        PaymentGatewayError::DatabaseError(e.to_string())
    }
}
