//! Data types that are persisted by the payment engine, and the conversions between them.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::*;
use mpg_common::Rupiah;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------        OrderId        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
/// The lifecycle state of an order, as far as payment is concerned.
///
/// The stored and serialized values are the ones the storefront already uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order exists, but no successful payment has been reported for it.
    #[default]
    #[sqlx(rename = "Menunggu_Konfirmasi")]
    #[serde(rename = "Menunggu_Konfirmasi")]
    MenungguKonfirmasi,
    /// The gateway has reported the payment as captured or settled.
    #[sqlx(rename = "Sudah_Dibayar")]
    #[serde(rename = "Sudah_Dibayar")]
    SudahDibayar,
    /// The gateway has reported the payment as denied, cancelled or expired.
    #[sqlx(rename = "Dibatalkan")]
    #[serde(rename = "Dibatalkan")]
    Dibatalkan,
}

impl OrderStatusType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatusType::MenungguKonfirmasi => "Menunggu_Konfirmasi",
            OrderStatusType::SudahDibayar => "Sudah_Dibayar",
            OrderStatusType::Dibatalkan => "Dibatalkan",
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Menunggu_Konfirmasi" => Ok(Self::MenungguKonfirmasi),
            "Sudah_Dibayar" => Ok(Self::SudahDibayar),
            "Dibatalkan" => Ok(Self::Dibatalkan),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

/// The reconciliation table. Every gateway status maps to exactly one order status; anything that is not a
/// successful or a failed payment leaves the order awaiting confirmation.
impl From<&TransactionStatus> for OrderStatusType {
    fn from(status: &TransactionStatus) -> Self {
        use TransactionStatus::*;
        match status {
            Capture | Settlement => OrderStatusType::SudahDibayar,
            Deny | Cancel | Expire => OrderStatusType::Dibatalkan,
            Pending => OrderStatusType::MenungguKonfirmasi,
            Authorize | Refund | PartialRefund | Chargeback | PartialChargeback | Failure => {
                debug!("Transaction status '{status}' does not change payment state. Awaiting confirmation.");
                OrderStatusType::MenungguKonfirmasi
            },
            Other(s) => {
                warn!("Unrecognised transaction status '{s}'. Treating the order as awaiting confirmation.");
                OrderStatusType::MenungguKonfirmasi
            },
        }
    }
}

//--------------------------------------  TransactionStatus    ---------------------------------------------------------
/// The `transaction_status` values the gateway reports. Values are matched exactly (case-sensitive); anything else is
/// kept verbatim in [`TransactionStatus::Other`] so that it can be stored and reported unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransactionStatus {
    Authorize,
    Capture,
    Settlement,
    Pending,
    Deny,
    Cancel,
    Expire,
    Failure,
    Refund,
    PartialRefund,
    Chargeback,
    PartialChargeback,
    Other(String),
}

impl TransactionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Authorize => "authorize",
            Self::Capture => "capture",
            Self::Settlement => "settlement",
            Self::Pending => "pending",
            Self::Deny => "deny",
            Self::Cancel => "cancel",
            Self::Expire => "expire",
            Self::Failure => "failure",
            Self::Refund => "refund",
            Self::PartialRefund => "partial_refund",
            Self::Chargeback => "chargeback",
            Self::PartialChargeback => "partial_chargeback",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for TransactionStatus {
    fn from(value: &str) -> Self {
        match value {
            "authorize" => Self::Authorize,
            "capture" => Self::Capture,
            "settlement" => Self::Settlement,
            "pending" => Self::Pending,
            "deny" => Self::Deny,
            "cancel" => Self::Cancel,
            "expire" => Self::Expire,
            "failure" => Self::Failure,
            "refund" => Self::Refund,
            "partial_refund" => Self::PartialRefund,
            "chargeback" => Self::Chargeback,
            "partial_chargeback" => Self::PartialChargeback,
            s => Self::Other(s.to_string()),
        }
    }
}

impl From<String> for TransactionStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TransactionStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransactionStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

//--------------------------------------        Order       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub customer_id: String,
    pub total_price: Rupiah,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: OrderStatusType,
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
/// An order as the storefront creates it, before any payment has been attempted.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub customer_id: String,
    pub total_price: Rupiah,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    pub fn new(order_id: OrderId, customer_id: String, total_price: Rupiah) -> Self {
        Self {
            order_id,
            customer_id,
            total_price,
            currency: mpg_common::RUPIAH_CURRENCY_CODE.to_string(),
            created_at: Utc::now(),
        }
    }
}

//--------------------------------------      Transaction      ---------------------------------------------------------
/// The locally recorded state of the gateway transaction for an order. There is at most one per order.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub order_id: OrderId,
    pub amount: Rupiah,
    pub payment_type: String,
    #[sqlx(try_from = "String")]
    pub transaction_status: TransactionStatus,
    pub transaction_id: String,
    pub fraud_status: Option<String>,
    /// The gateway response that produced the current state, serialized as JSON.
    pub payment_response: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------    NewTransaction     ---------------------------------------------------------
/// Everything needed to create, or bring up to date, the transaction record for an order.
///
/// When a record already exists, only `transaction_status`, `fraud_status` and `payment_response` are updated. The
/// amount, payment type and transaction id of the first record are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub order_id: OrderId,
    pub amount: Rupiah,
    pub payment_type: String,
    pub transaction_status: TransactionStatus,
    pub transaction_id: String,
    pub fraud_status: Option<String>,
    pub payment_response: String,
}

impl NewTransaction {
    /// The order status this transaction implies.
    pub fn order_status(&self) -> OrderStatusType {
        OrderStatusType::from(&self.transaction_status)
    }
}
