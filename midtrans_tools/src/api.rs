use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    config::MidtransConfig,
    data_objects::{ChargeParameters, SnapParameters, SnapResponse, TransactionStatusResponse, VerifiedNotification},
    MidtransApiError,
};

// Midtrans reports an expired transaction with status code 407. It is a valid status record, not an error.
const EXPIRED_STATUS_CODE: u16 = 407;

#[derive(Clone)]
pub struct MidtransApi {
    config: MidtransConfig,
    client: Arc<Client>,
}

impl MidtransApi {
    pub fn new(config: MidtransConfig) -> Result<Self, MidtransApiError> {
        let mut headers = HeaderMap::with_capacity(3);
        let credentials = base64::encode(format!("{}:", config.server_key.reveal()));
        let val = HeaderValue::from_str(&format!("Basic {credentials}"))
            .map_err(|e| MidtransApiError::Initialization(e.to_string()))?;
        headers.insert(AUTHORIZATION, val);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| MidtransApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &MidtransConfig {
        &self.config
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: String,
        body: Option<B>,
    ) -> Result<T, MidtransApiError> {
        trace!("Sending Midtrans request: {method} {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| MidtransApiError::RestRequestError(e.to_string()))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| MidtransApiError::RestResponseError(e.to_string()))?;
        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| extract_error_message(&v))
                .unwrap_or(text);
            return Err(MidtransApiError::QueryError { status: status.as_u16(), message });
        }
        trace!("Midtrans request successful. {status}");
        let value = serde_json::from_str::<Value>(&text).map_err(|e| MidtransApiError::JsonError(e.to_string()))?;
        check_status_code(&value)?;
        serde_json::from_value(value).map_err(|e| MidtransApiError::JsonError(e.to_string()))
    }

    pub fn core_url(&self, path: &str) -> String {
        format!("{}{path}", self.config.core_api_url())
    }

    pub fn snap_url(&self, path: &str) -> String {
        format!("{}{path}", self.config.snap_api_url())
    }

    /// Creates a Core API charge. The response is returned as-is; its shape depends on the payment type.
    pub async fn charge(&self, params: &ChargeParameters) -> Result<Value, MidtransApiError> {
        let order_id = &params.transaction_details.order_id;
        debug!("Charging order {order_id} for {}", params.transaction_details.gross_amount);
        let result = self.rest_query::<Value, _>(Method::POST, self.core_url("/v2/charge"), Some(params)).await?;
        info!("Charge created for order {order_id}");
        Ok(result)
    }

    /// Fetches the current status of a transaction. `id` may be the merchant order id or the Midtrans transaction id.
    pub async fn transaction_status(&self, id: &str) -> Result<Value, MidtransApiError> {
        debug!("Fetching transaction status for {id}");
        let path = format!("/v2/{id}/status");
        self.rest_query::<Value, ()>(Method::GET, self.core_url(&path), None).await
    }

    /// Verifies an HTTP notification by ignoring everything in it except the transaction identifier, and fetching the
    /// authoritative status record for that transaction from the Core API.
    pub async fn notification(&self, payload: &Value) -> Result<VerifiedNotification, MidtransApiError> {
        let id = payload["transaction_id"]
            .as_str()
            .or_else(|| payload["order_id"].as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                MidtransApiError::InvalidNotification("neither transaction_id nor order_id is present".to_string())
            })?;
        let raw = self.transaction_status(id).await?;
        let status = serde_json::from_value::<TransactionStatusResponse>(raw.clone())
            .map_err(|e| MidtransApiError::JsonError(e.to_string()))?;
        Ok(VerifiedNotification { status, raw })
    }

    /// Creates a Snap checkout session and returns its token.
    pub async fn create_snap_transaction(&self, params: &SnapParameters) -> Result<SnapResponse, MidtransApiError> {
        let order_id = &params.transaction_details.order_id;
        debug!("Creating Snap transaction for order {order_id}");
        let result = self.rest_query::<SnapResponse, _>(Method::POST, self.snap_url("/transactions"), Some(params)).await?;
        info!("Snap token created for order {order_id}");
        Ok(result)
    }
}

/// The Core API answers most business-level failures with HTTP 200 and an error `status_code` in the body.
fn check_status_code(body: &Value) -> Result<(), MidtransApiError> {
    let code = match &body["status_code"] {
        Value::String(s) => s.parse::<u16>().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        _ => None,
    };
    match code {
        Some(status) if status >= 400 && status != EXPIRED_STATUS_CODE => {
            let message = extract_error_message(body).unwrap_or_else(|| format!("Midtrans status code {status}"));
            Err(MidtransApiError::QueryError { status, message })
        },
        _ => Ok(()),
    }
}

fn extract_error_message(body: &Value) -> Option<String> {
    if let Some(messages) = body["error_messages"].as_array() {
        let joined = messages.iter().filter_map(|m| m.as_str()).collect::<Vec<_>>().join(", ");
        if !joined.is_empty() {
            return Some(joined);
        }
    }
    body["status_message"].as_str().map(String::from)
}
