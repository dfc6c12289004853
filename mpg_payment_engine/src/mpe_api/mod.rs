//! # Payment engine public API
//!
//! The `mpe_api` module exposes the programmatic API for the payment engine.
//!
//! * [`payment_flow_api`] handles the flows that touch local state: creating charges for existing orders, and
//!   reconciling gateway notifications against orders and their transaction records.
//! * [`gateway_api`] handles the flows that only talk to the gateway: creating checkout sessions and querying
//!   transaction status.
//!
//! [`payment_objects`] holds the request and response types, and the validation rules for incoming requests.
//!
//! # API usage
//!
//! An API instance is created by supplying the backends that implement the traits it needs:
//!
//! ```rust,ignore
//! use mpg_payment_engine::{events::EventProducers, PaymentFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = PaymentFlowApi::new(db, gateway, EventProducers::default());
//! let result = api.reconcile_notification(payload).await?;
//! ```

pub mod errors;
pub mod gateway_api;
pub mod payment_flow_api;
pub mod payment_objects;
