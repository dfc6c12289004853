use thiserror::Error;

#[derive(Debug, Error)]
pub enum MidtransApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Midtrans rejected the request. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The notification did not identify a transaction: {0}")]
    InvalidNotification(String),
}
