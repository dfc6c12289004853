//! `SqliteDatabase` is the SQLite implementation of [`PaymentGatewayDatabase`].
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{new_pool, orders, transactions};
use crate::{
    db_types::{NewOrder, NewTransaction, Order, OrderId, Transaction},
    traits::{PaymentGatewayDatabase, PaymentGatewayError, ReconciledOrder},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, PaymentGatewayError> {
        let pool = new_pool(url, max_connections).await?;
        trace!("🗃️ Connected to {url}");
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Safe to call on every start.
    pub async fn run_migrations(&self) -> Result<(), PaymentGatewayError> {
        sqlx::migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PaymentGatewayError::DatabaseError(format!("Migrations failed. {e}")))?;
        debug!("🗃️ Database migrations complete");
        Ok(())
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), PaymentGatewayError> {
        let mut tx = self.pool.begin().await?;
        let result = orders::idempotent_insert(order, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn fetch_transaction_for_order(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<Transaction>, PaymentGatewayError> {
        let mut conn = self.pool.acquire().await?;
        let transaction = transactions::fetch_transaction_for_order(order_id, &mut conn).await?;
        Ok(transaction)
    }

    async fn insert_transaction(&self, transaction: NewTransaction) -> Result<Transaction, PaymentGatewayError> {
        let order_id = transaction.order_id.clone();
        let mut tx = self.pool.begin().await?;
        if orders::fetch_order_by_order_id(&order_id, &mut tx).await?.is_none() {
            return Err(PaymentGatewayError::OrderNotFound(order_id));
        }
        if transactions::fetch_transaction_for_order(&order_id, &mut tx).await?.is_some() {
            debug!("🗃️ Order {order_id} already has a transaction record. Insert skipped.");
            return Err(PaymentGatewayError::TransactionAlreadyExists(order_id));
        }
        let result = transactions::insert_transaction(transaction, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Transaction {} recorded for order {order_id}", result.id);
        Ok(result)
    }

    /// In a single atomic transaction:
    /// * checks that the order exists. If not, nothing is written.
    /// * upserts the transaction record for the order.
    /// * sets the order status implied by the transaction status.
    async fn reconcile_transaction(&self, update: NewTransaction) -> Result<ReconciledOrder, PaymentGatewayError> {
        let order_id = update.order_id.clone();
        let new_status = update.order_status();
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_order_id(&order_id, &mut tx)
            .await?
            .ok_or_else(|| PaymentGatewayError::OrderNotFound(order_id.clone()))?;
        let previous_status = order.status;
        let created = transactions::fetch_transaction_for_order(&order_id, &mut tx).await?.is_none();
        let transaction = transactions::upsert_transaction(update, &mut tx).await?;
        let order = orders::update_order_status(&order_id, new_status, &mut tx).await?;
        tx.commit().await?;
        debug!(
            "🗃️ Order {order_id} reconciled with transaction {} ({}). Status {previous_status} -> {}",
            transaction.id, transaction.transaction_status, order.status
        );
        Ok(ReconciledOrder { transaction, order, previous_status, created })
    }

    async fn close(&mut self) -> Result<(), PaymentGatewayError> {
        self.pool.close().await;
        Ok(())
    }
}
