//! # Midtrans tools
//!
//! A small client for the two Midtrans APIs the payment gateway talks to:
//! * the Core API (`/v2/charge`, `/v2/{id}/status`), used for direct charges, status queries, and for verifying
//!   incoming HTTP notifications, and
//! * the Snap API (`/snap/v1/transactions`), used to create checkout sessions for the Snap payment widget.
//!
//! Configuration is read from the environment. See [`MidtransConfig`].
mod api;
mod config;
mod error;

pub mod data_objects;
pub mod signature;

pub use api::MidtransApi;
pub use config::MidtransConfig;
pub use data_objects::{
    ChargeParameters,
    SnapCallbacks,
    SnapCustomerDetails,
    SnapItem,
    SnapParameters,
    SnapResponse,
    TransactionDetails,
    TransactionStatusResponse,
    VerifiedNotification,
};
pub use error::MidtransApiError;
