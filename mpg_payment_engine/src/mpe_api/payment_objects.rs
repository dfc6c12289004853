use mpg_common::{
    helpers::{lenient_integer, string_or_number},
    Rupiah,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    db_types::{NewTransaction, OrderId, TransactionStatus},
    mpe_api::errors::PaymentFlowError,
};

/// The largest difference, in rupiah, tolerated between a checkout's gross amount and the sum of its items.
pub const AMOUNT_TOLERANCE: u64 = 1;
pub const DEFAULT_ITEM_CATEGORY: &str = "Clothing";
pub const DEFAULT_FINISH_URL: &str = "http://localhost:5173/payment/status/success";
pub const DEFAULT_UNFINISH_URL: &str = "http://localhost:5173/payment/status/pending";
pub const DEFAULT_ERROR_URL: &str = "http://localhost:5173/payment/status/failed";

//--------------------------------------      ChargeRequest     --------------------------------------------------------
/// A request to charge an existing order, as received from the storefront.
///
/// Customer and item details are passed to the gateway untouched. Any other top-level fields (e.g. `bank_transfer`)
/// are collected in `payment_options` and forwarded too.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChargeRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub gross_amount: Option<Rupiah>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub customer_details: Option<Value>,
    #[serde(default)]
    pub item_details: Option<Value>,
    #[serde(flatten)]
    pub payment_options: Map<String, Value>,
}

/// A validated charge, ready to be sent to the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCharge {
    pub order_id: OrderId,
    pub gross_amount: Rupiah,
    pub payment_type: Option<String>,
    pub customer_details: Option<Value>,
    pub item_details: Option<Value>,
    pub payment_options: Map<String, Value>,
}

impl ChargeRequest {
    pub fn validate(self) -> Result<NewCharge, PaymentFlowError> {
        let order_id = self.order_id.filter(|s| !s.trim().is_empty());
        let gross_amount = self.gross_amount.filter(|a| a.value() != 0);
        let (Some(order_id), Some(gross_amount)) = (order_id, gross_amount) else {
            return Err(PaymentFlowError::ValidationError("order_id and gross_amount are required".into()));
        };
        Ok(NewCharge {
            order_id: OrderId(order_id),
            gross_amount,
            payment_type: self.payment_type,
            customer_details: self.customer_details,
            item_details: self.item_details,
            payment_options: self.payment_options,
        })
    }
}

/// What the gateway reported back after creating a charge.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeReceipt {
    pub transaction_id: Option<String>,
    pub transaction_status: TransactionStatus,
    pub payment_type: Option<String>,
    pub fraud_status: Option<String>,
    /// The complete gateway response. This is what the caller receives.
    pub response: Value,
}

//--------------------------------------     VerifiedStatus     --------------------------------------------------------
/// A transaction status record obtained from the gateway's own verification routine.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedStatus {
    pub order_id: OrderId,
    pub transaction_id: Option<String>,
    pub transaction_status: TransactionStatus,
    pub fraud_status: Option<String>,
    pub payment_type: Option<String>,
    pub gross_amount: Option<Rupiah>,
    pub raw: Value,
}

impl VerifiedStatus {
    /// The transaction record this status implies. Missing values fall back to empty strings and a zero amount.
    pub fn into_transaction(self) -> NewTransaction {
        NewTransaction {
            order_id: self.order_id,
            amount: self.gross_amount.unwrap_or_default(),
            payment_type: self.payment_type.unwrap_or_default(),
            transaction_status: self.transaction_status,
            transaction_id: self.transaction_id.unwrap_or_default(),
            fraud_status: self.fraud_status.filter(|s| !s.is_empty()),
            payment_response: self.raw.to_string(),
        }
    }
}

//--------------------------------------    CheckoutRequest     --------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub billing_address: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemDetail {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Rupiah>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
}

/// A request for a hosted checkout session, as received from the storefront.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub gross_amount: Option<Rupiah>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub item_details: Option<Vec<ItemDetail>>,
}

/// Where the checkout widget sends the customer once payment succeeds, is left pending, or fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutCallbacks {
    pub finish: String,
    pub unfinish: String,
    pub error: String,
}

impl Default for CheckoutCallbacks {
    fn default() -> Self {
        Self {
            finish: DEFAULT_FINISH_URL.to_string(),
            unfinish: DEFAULT_UNFINISH_URL.to_string(),
            error: DEFAULT_ERROR_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutCustomer {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: String,
    pub billing_address: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutItem {
    pub id: String,
    pub name: String,
    pub price: Rupiah,
    pub quantity: i64,
    pub category: String,
}

/// A validated checkout session request, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionRequest {
    pub order_id: OrderId,
    pub gross_amount: Rupiah,
    pub customer: CheckoutCustomer,
    pub items: Vec<CheckoutItem>,
    pub callbacks: CheckoutCallbacks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub token: String,
    pub redirect_url: Option<String>,
}

fn validation_error<S: Into<String>>(msg: S) -> PaymentFlowError {
    PaymentFlowError::ValidationError(msg.into())
}

impl ItemDetail {
    fn validate(self, position: usize) -> Result<CheckoutItem, PaymentFlowError> {
        let incomplete = || validation_error(format!("Item {position} is incomplete. Required: id, name, price, quantity"));
        let id = self.id.filter(|s| !s.is_empty()).ok_or_else(incomplete)?;
        let name = self.name.filter(|s| !s.is_empty()).ok_or_else(incomplete)?;
        let price = self.price.filter(Rupiah::is_positive).ok_or_else(incomplete)?;
        let quantity = self.quantity.filter(|q| *q > 0).ok_or_else(incomplete)?;
        let category = self.category.filter(|s| !s.is_empty()).unwrap_or_else(|| DEFAULT_ITEM_CATEGORY.to_string());
        Ok(CheckoutItem { id, name, price, quantity, category })
    }
}

impl CheckoutRequest {
    /// Validates the request and applies defaults.
    ///
    /// Checks, in order: all four top-level fields are present; the item list is not empty; every item has an id,
    /// name, positive price and positive quantity; the items add up to the gross amount within [`AMOUNT_TOLERANCE`];
    /// the customer has a first name.
    pub fn validate(self, callbacks: &CheckoutCallbacks) -> Result<CheckoutSessionRequest, PaymentFlowError> {
        let order_id = self.order_id.filter(|s| !s.trim().is_empty());
        let gross_amount = self.gross_amount.filter(|a| a.value() != 0);
        let (Some(order_id), Some(gross_amount), Some(customer), Some(items)) =
            (order_id, gross_amount, self.customer_details, self.item_details)
        else {
            return Err(validation_error("order_id, gross_amount, customer_details and item_details are required"));
        };
        if items.is_empty() {
            return Err(validation_error("item_details must be a non-empty list"));
        }
        let items = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| item.validate(i + 1))
            .collect::<Result<Vec<_>, _>>()?;
        let item_total = items
            .iter()
            .try_fold(0i64, |total, item| item.price.value().checked_mul(item.quantity)?.checked_add(total))
            .ok_or_else(|| validation_error("The sum of item_details is too large"))?;
        if gross_amount.abs_diff(Rupiah::from(item_total)) > AMOUNT_TOLERANCE {
            return Err(validation_error(format!(
                "gross_amount ({}) is not equal to the sum of item_details ({item_total})",
                gross_amount.value()
            )));
        }
        let first_name = customer
            .first_name
            .filter(|s| !s.is_empty())
            .ok_or_else(|| validation_error("customer_details.first_name is required"))?;
        let customer = CheckoutCustomer {
            first_name,
            last_name: customer.last_name,
            email: customer.email,
            phone: customer.phone.unwrap_or_default(),
            billing_address: customer.billing_address.unwrap_or_else(|| Value::Object(Map::new())),
        };
        Ok(CheckoutSessionRequest {
            order_id: OrderId(order_id),
            gross_amount,
            customer,
            items,
            callbacks: callbacks.clone(),
        })
    }
}
