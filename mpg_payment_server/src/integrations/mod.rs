//! Adapters between the payment engine's traits and concrete gateway clients.
pub mod midtrans;
