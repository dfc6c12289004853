use std::time::Duration;

use log::*;
use mpg_common::{helpers::parse_boolean_flag, Secret};

const SANDBOX_CORE_API_URL: &str = "https://api.sandbox.midtrans.com";
const PRODUCTION_CORE_API_URL: &str = "https://api.midtrans.com";
const SANDBOX_SNAP_API_URL: &str = "https://app.sandbox.midtrans.com/snap/v1";
const PRODUCTION_SNAP_API_URL: &str = "https://app.midtrans.com/snap/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct MidtransConfig {
    /// The merchant server key. Used for HTTP Basic auth against both APIs, and for notification signatures.
    pub server_key: Secret<String>,
    /// The client key is public. It is handed to front ends that embed the Snap widget.
    pub client_key: String,
    /// When false (the default), all calls go to the sandbox environment.
    pub is_production: bool,
    pub timeout: Duration,
}

impl Default for MidtransConfig {
    fn default() -> Self {
        Self {
            server_key: Secret::default(),
            client_key: String::default(),
            is_production: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl MidtransConfig {
    pub fn new_from_env_or_default() -> Self {
        let server_key = Secret::new(std::env::var("MPG_MIDTRANS_SERVER_KEY").unwrap_or_else(|_| {
            warn!("🪛️ MPG_MIDTRANS_SERVER_KEY not set. Every call to Midtrans will be rejected as unauthorized.");
            String::default()
        }));
        let client_key = std::env::var("MPG_MIDTRANS_CLIENT_KEY").unwrap_or_else(|_| {
            info!("🪛️ MPG_MIDTRANS_CLIENT_KEY not set.");
            String::default()
        });
        let is_production = parse_boolean_flag(std::env::var("MPG_MIDTRANS_PRODUCTION").ok(), false);
        if is_production {
            info!("🪛️ Midtrans is configured for PRODUCTION. Real money will move.");
        } else {
            info!("🪛️ Midtrans is configured for the sandbox environment.");
        }
        let timeout = std::env::var("MPG_MIDTRANS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid value for MPG_MIDTRANS_TIMEOUT_SECS ({s}). {e}. Using the default."))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        Self { server_key, client_key, is_production, timeout }
    }

    pub fn core_api_url(&self) -> &'static str {
        if self.is_production {
            PRODUCTION_CORE_API_URL
        } else {
            SANDBOX_CORE_API_URL
        }
    }

    pub fn snap_api_url(&self) -> &'static str {
        if self.is_production {
            PRODUCTION_SNAP_API_URL
        } else {
            SANDBOX_SNAP_API_URL
        }
    }
}
