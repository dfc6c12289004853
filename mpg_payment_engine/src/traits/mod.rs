//! # Backend and gateway contracts
//!
//! The payment engine talks to two external collaborators, and each one sits behind a trait defined here:
//!
//! * [`PaymentGatewayDatabase`] is the persistence backend. It stores orders and their transaction records, and must
//!   be able to reconcile a transaction and its order in a single unit of work.
//! * [`PaymentGateway`] is the remote payment processor. It creates charges and checkout sessions, reports transaction
//!   status, and turns untrusted notification payloads into verified status records.
//!
//! The APIs in [`crate::mpe_api`] are generic over these traits, so tests (and alternative deployments) can substitute
//! either side.
mod payment_gateway;
mod payment_gateway_database;

pub use payment_gateway::{GatewayError, PaymentGateway};
pub use payment_gateway_database::{PaymentGatewayDatabase, PaymentGatewayError, ReconciledOrder};
