//! # Midtrans payment server
//! This crate hosts the HTTP server for the Midtrans payment gateway. It is responsible for:
//! * Charging existing orders through the Midtrans Core API.
//! * Creating Snap checkout tokens for the hosted payment page.
//! * Receiving Midtrans HTTP notifications and reconciling order status from them.
//! * Relaying the Midtrans status record for an order.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `POST /payment/charge`: Charges an order.
//! * `POST /payment/notification`: The Midtrans notification webhook.
//! * `GET /payment/status/{order_id}`: The Midtrans status record for an order.
//! * `POST /payment/create-snap-token`: Creates a Snap checkout token.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
