//! Midtrans Payment Engine
//!
//! The payment engine holds the provider-agnostic core of the Midtrans payment gateway integration. It knows how to
//! validate payment requests, how to turn a gateway transaction status into an order status, and how to keep the
//! local order and transaction records consistent with what the gateway reports.
//!
//! The library is divided into these sections:
//! 1. The data types that are persisted ([`mod@db_types`]), including the closed set of order statuses and the
//!    mapping from gateway transaction statuses onto them.
//! 2. The contracts for the two external collaborators ([`mod@traits`]): the persistence backend and the remote
//!    payment gateway.
//! 3. The public API ([`mod@mpe_api`]). [`PaymentFlowApi`] charges orders and reconciles notifications;
//!    [`GatewayApi`] creates checkout sessions and queries transaction status.
//! 4. A SQLite backend ([`SqliteDatabase`]), enabled by the default `sqlite` feature.
//!
//! The engine also emits events when an order becomes paid or is cancelled. Hooks for these can be registered via
//! [`events::EventHooks`].
pub mod db_types;
pub mod events;
pub mod mpe_api;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(all(feature = "sqlite", any(feature = "test_utils", test)))]
pub mod test_utils;

pub use mpe_api::{errors::PaymentFlowError, gateway_api::GatewayApi, payment_flow_api::PaymentFlowApi, payment_objects};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{GatewayError, PaymentGateway, PaymentGatewayDatabase, PaymentGatewayError, ReconciledOrder};
