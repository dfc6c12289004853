//! Connects the payment engine to Midtrans.
//!
//! [`MidtransGateway`] implements the engine's [`PaymentGateway`] trait on top of [`MidtransApi`]. The conversion
//! functions in this module translate between engine request objects and Midtrans wire parameters.
use log::*;
use midtrans_tools::{
    ChargeParameters,
    MidtransApi,
    MidtransApiError,
    SnapCallbacks,
    SnapCustomerDetails,
    SnapItem,
    SnapParameters,
    TransactionDetails,
    TransactionStatusResponse,
    VerifiedNotification,
};
use mpg_payment_engine::{
    db_types::{OrderId, TransactionStatus},
    payment_objects::{ChargeReceipt, CheckoutSession, CheckoutSessionRequest, NewCharge, VerifiedStatus},
    GatewayError,
    PaymentGateway,
};
use serde_json::Value;

#[derive(Clone)]
pub struct MidtransGateway {
    api: MidtransApi,
}

impl MidtransGateway {
    pub fn new(api: MidtransApi) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &MidtransApi {
        &self.api
    }
}

impl PaymentGateway for MidtransGateway {
    async fn charge(&self, charge: &NewCharge) -> Result<ChargeReceipt, GatewayError> {
        let params = charge_parameters(charge);
        let response = self.api.charge(&params).await.map_err(gateway_error)?;
        charge_receipt(response)
    }

    async fn verify_notification(&self, payload: &Value) -> Result<VerifiedStatus, GatewayError> {
        let notification = self.api.notification(payload).await.map_err(gateway_error)?;
        verified_status(notification)
    }

    async fn transaction_status(&self, order_id: &OrderId) -> Result<Value, GatewayError> {
        self.api.transaction_status(order_id.as_str()).await.map_err(gateway_error)
    }

    async fn create_checkout_session(&self, request: &CheckoutSessionRequest) -> Result<CheckoutSession, GatewayError> {
        let params = snap_parameters(request);
        let response = self.api.create_snap_transaction(&params).await.map_err(gateway_error)?;
        Ok(CheckoutSession { token: response.token, redirect_url: response.redirect_url })
    }
}

pub fn gateway_error(e: MidtransApiError) -> GatewayError {
    match e {
        MidtransApiError::QueryError { status, message } => GatewayError::Rejected { status, message },
        MidtransApiError::RestRequestError(s) | MidtransApiError::Initialization(s) => GatewayError::Unavailable(s),
        MidtransApiError::RestResponseError(s) | MidtransApiError::JsonError(s) => GatewayError::InvalidResponse(s),
        MidtransApiError::InvalidNotification(s) => GatewayError::UnverifiedNotification(s),
    }
}

pub fn charge_parameters(charge: &NewCharge) -> ChargeParameters {
    ChargeParameters {
        transaction_details: TransactionDetails {
            order_id: charge.order_id.as_str().to_string(),
            gross_amount: charge.gross_amount,
        },
        payment_type: charge.payment_type.clone(),
        customer_details: charge.customer_details.clone(),
        item_details: charge.item_details.clone(),
        payment_options: charge.payment_options.clone(),
    }
}

pub fn charge_receipt(response: Value) -> Result<ChargeReceipt, GatewayError> {
    let status = serde_json::from_value::<TransactionStatusResponse>(response.clone())
        .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
    let transaction_status = status.transaction_status.map(TransactionStatus::from).unwrap_or_else(|| {
        warn!("Midtrans charge response had no transaction_status. Recording it as pending.");
        TransactionStatus::Pending
    });
    Ok(ChargeReceipt {
        transaction_id: status.transaction_id,
        transaction_status,
        payment_type: status.payment_type,
        fraud_status: status.fraud_status,
        response,
    })
}

pub fn verified_status(notification: VerifiedNotification) -> Result<VerifiedStatus, GatewayError> {
    let VerifiedNotification { status, raw } = notification;
    let order_id = status
        .order_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GatewayError::InvalidResponse("The status record has no order_id".into()))?;
    let transaction_status = TransactionStatus::from(status.transaction_status.unwrap_or_default());
    Ok(VerifiedStatus {
        order_id: OrderId::from(order_id),
        transaction_id: status.transaction_id,
        transaction_status,
        fraud_status: status.fraud_status,
        payment_type: status.payment_type,
        gross_amount: status.gross_amount,
        raw,
    })
}

pub fn snap_parameters(request: &CheckoutSessionRequest) -> SnapParameters {
    let customer = &request.customer;
    SnapParameters {
        transaction_details: TransactionDetails {
            order_id: request.order_id.as_str().to_string(),
            gross_amount: request.gross_amount,
        },
        customer_details: SnapCustomerDetails {
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            billing_address: customer.billing_address.clone(),
        },
        item_details: request
            .items
            .iter()
            .map(|item| SnapItem {
                id: item.id.clone(),
                price: item.price,
                quantity: item.quantity,
                name: item.name.clone(),
                category: item.category.clone(),
            })
            .collect(),
        callbacks: SnapCallbacks {
            finish: request.callbacks.finish.clone(),
            unfinish: request.callbacks.unfinish.clone(),
            error: request.callbacks.error.clone(),
        },
    }
}
