//! Request and response bodies, as Midtrans expects and returns them.
use mpg_common::Rupiah;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub order_id: String,
    pub gross_amount: Rupiah,
}

/// The body of a Core API `POST /v2/charge` call.
///
/// Payment-method specific blocks (`bank_transfer`, `echannel`, `credit_card`, ...) are carried in
/// `payment_options` and flattened into the top level of the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeParameters {
    pub transaction_details: TransactionDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_details: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_details: Option<Value>,
    #[serde(flatten)]
    pub payment_options: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapCustomerDetails {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub phone: String,
    pub billing_address: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapItem {
    pub id: String,
    pub price: Rupiah,
    pub quantity: i64,
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapCallbacks {
    pub finish: String,
    pub unfinish: String,
    pub error: String,
}

/// The body of a Snap API `POST /transactions` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapParameters {
    pub transaction_details: TransactionDetails,
    pub customer_details: SnapCustomerDetails,
    pub item_details: Vec<SnapItem>,
    pub callbacks: SnapCallbacks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapResponse {
    pub token: String,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

/// The fields of a transaction status record that the gateway acts upon. The full record is kept alongside in
/// [`VerifiedNotification::raw`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionStatusResponse {
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub gross_amount: Option<Rupiah>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub transaction_status: Option<String>,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub transaction_time: Option<String>,
}

/// A notification whose status has been re-fetched from the Core API, and can therefore be trusted.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedNotification {
    pub status: TransactionStatusResponse,
    pub raw: Value,
}
