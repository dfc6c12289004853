//! # SQLite database methods
//!
//! Plain functions that take a `&mut SqliteConnection`. Pass a pooled connection for one-off calls, or `&mut *tx` to
//! run several of them inside one transaction.
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

pub mod orders;
pub mod transactions;

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
