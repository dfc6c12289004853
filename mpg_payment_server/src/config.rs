use std::env;

use log::*;
use midtrans_tools::MidtransConfig;
use mpg_common::helpers::parse_boolean_flag;
use mpg_payment_engine::payment_objects::{
    CheckoutCallbacks,
    DEFAULT_ERROR_URL,
    DEFAULT_FINISH_URL,
    DEFAULT_UNFINISH_URL,
};

const DEFAULT_MPG_HOST: &str = "127.0.0.1";
const DEFAULT_MPG_PORT: u16 = 8360;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Credentials and environment for the Midtrans APIs.
    pub midtrans: MidtransConfig,
    /// Where the Snap widget sends customers after a checkout attempt. These are never taken from the request.
    pub callbacks: CheckoutCallbacks,
    /// If true, notifications must carry a valid `signature_key` before they are reconciled.
    pub signature_checks: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MPG_HOST.to_string(),
            port: DEFAULT_MPG_PORT,
            database_url: String::default(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            midtrans: MidtransConfig::default(),
            callbacks: CheckoutCallbacks::default(),
            signature_checks: false,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MPG_HOST").ok().unwrap_or_else(|| DEFAULT_MPG_HOST.into());
        let port = env::var("MPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for MPG_PORT. {e} Using the default, {DEFAULT_MPG_PORT}, instead."
                    );
                    DEFAULT_MPG_PORT
                })
            })
            .unwrap_or(DEFAULT_MPG_PORT);
        let database_url = env::var("MPG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ MPG_DATABASE_URL is not set. Please set it to the URL for the payment database.");
            String::default()
        });
        let db_max_connections = env::var("MPG_DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| {
                s.parse::<u32>()
                    .map_err(|e| warn!("🪛️ Invalid value for MPG_DB_MAX_CONNECTIONS ({s}). {e}. Using the default."))
                    .ok()
            })
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
        let midtrans = MidtransConfig::new_from_env_or_default();
        let callbacks = callbacks_from_env();
        let signature_checks = parse_boolean_flag(env::var("MPG_SIGNATURE_CHECKS").ok(), false);
        if !signature_checks {
            info!(
                "🪛️ Notification signature checks are disabled. Notifications are still verified by re-fetching their \
                 status from Midtrans."
            );
        }
        Self { host, port, database_url, db_max_connections, midtrans, callbacks, signature_checks }
    }
}

fn callbacks_from_env() -> CheckoutCallbacks {
    let url = |var: &str, default: &str| {
        env::var(var).ok().filter(|s| !s.trim().is_empty()).unwrap_or_else(|| {
            debug!("🪛️ {var} is not set. Using {default}");
            default.to_string()
        })
    };
    CheckoutCallbacks {
        finish: url("MPG_CALLBACK_FINISH_URL", DEFAULT_FINISH_URL),
        unfinish: url("MPG_CALLBACK_UNFINISH_URL", DEFAULT_UNFINISH_URL),
        error: url("MPG_CALLBACK_ERROR_URL", DEFAULT_ERROR_URL),
    }
}
