use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The envelope every payment endpoint responds with. Fields that don't apply to a response are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonResponse {
    pub status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl JsonResponse {
    /// `{"status": true}`
    pub fn ok() -> Self {
        Self { status: true, ..Default::default() }
    }

    pub fn success<S: Display>(message: S) -> Self {
        Self { status: true, message: Some(message.to_string()), ..Default::default() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { status: false, message: Some(message.to_string()), ..Default::default() }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_token<S: Into<String>>(mut self, token: S) -> Self {
        self.token = Some(token.into());
        self
    }
}
