use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewTransaction, OrderId, Transaction},
    traits::PaymentGatewayError,
};

pub async fn fetch_transaction_for_order(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    let tx = sqlx::query_as("SELECT * FROM transactions WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(tx)
}

/// Inserts a transaction record. Fails with a unique constraint violation if the order already has one; callers are
/// expected to check first.
pub async fn insert_transaction(
    transaction: NewTransaction,
    conn: &mut SqliteConnection,
) -> Result<Transaction, PaymentGatewayError> {
    let tx = sqlx::query_as(
        r#"
            INSERT INTO transactions (
                order_id,
                amount,
                payment_type,
                transaction_status,
                transaction_id,
                fraud_status,
                payment_response
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(transaction.order_id.as_str())
    .bind(transaction.amount.value())
    .bind(transaction.payment_type)
    .bind(transaction.transaction_status.as_str())
    .bind(transaction.transaction_id)
    .bind(transaction.fraud_status)
    .bind(transaction.payment_response)
    .fetch_one(conn)
    .await?;
    Ok(tx)
}

/// Creates the transaction record for the order, or brings the existing one up to date.
///
/// On conflict only the status fields and the stored response change. Amount, payment type and transaction id keep
/// the values they were first recorded with.
pub async fn upsert_transaction(
    transaction: NewTransaction,
    conn: &mut SqliteConnection,
) -> Result<Transaction, PaymentGatewayError> {
    trace!("🗃️ Upserting transaction for order {}: {}", transaction.order_id, transaction.transaction_status);
    let tx = sqlx::query_as(
        r#"
            INSERT INTO transactions (
                order_id,
                amount,
                payment_type,
                transaction_status,
                transaction_id,
                fraud_status,
                payment_response
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (order_id) DO UPDATE SET
                transaction_status = excluded.transaction_status,
                fraud_status = excluded.fraud_status,
                payment_response = excluded.payment_response,
                updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(transaction.order_id.as_str())
    .bind(transaction.amount.value())
    .bind(transaction.payment_type)
    .bind(transaction.transaction_status.as_str())
    .bind(transaction.transaction_id)
    .bind(transaction.fraud_status)
    .bind(transaction.payment_response)
    .fetch_one(conn)
    .await?;
    Ok(tx)
}
