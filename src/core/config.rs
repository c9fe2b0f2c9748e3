use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub ebay: EbayConfig,
    pub storage: StorageConfig,
    pub polling: PollingConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EbayConfig {
    pub app_id: String,
    pub cert_id: String,
    pub sandbox_mode: bool,
    pub oauth_url: String,
    pub browse_url: String,
    pub scope: String,
    pub marketplace_id: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub data_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    pub interval_hours: u64,
    pub search_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let sandbox_mode = env::var("EBAY_ENV")
            .unwrap_or_else(|_| "PRODUCTION".to_string())
            .to_uppercase()
            == "SANDBOX";

        Ok(Config {
            ebay: EbayConfig {
                app_id: env::var("EBAY_APP_ID").unwrap_or_else(|_| "sandbox_app_id".to_string()),
                cert_id: env::var("EBAY_CERT_ID")
                    .unwrap_or_else(|_| "sandbox_cert_id".to_string()),
                sandbox_mode,
                oauth_url: if sandbox_mode {
                    "https://api.sandbox.ebay.com/identity/v1/oauth2/token".to_string()
                } else {
                    "https://api.ebay.com/identity/v1/oauth2/token".to_string()
                },
                browse_url: if sandbox_mode {
                    "https://api.sandbox.ebay.com/buy/browse/v1/item_summary/search".to_string()
                } else {
                    "https://api.ebay.com/buy/browse/v1/item_summary/search".to_string()
                },
                scope: "https://api.ebay.com/oauth/api_scope".to_string(),
                marketplace_id: env::var("EBAY_MARKETPLACE_ID")
                    .unwrap_or_else(|_| "EBAY_GB".to_string()),
                request_timeout_secs: env::var("EBAY_REQUEST_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
            },
            storage: StorageConfig {
                data_file: env::var("DATA_FILE").unwrap_or_else(|_| "data.json".to_string()),
            },
            polling: PollingConfig {
                interval_hours: env::var("CHECK_INTERVAL_HOURS")
                    .unwrap_or_else(|_| "24".to_string())
                    .parse()
                    .unwrap_or(24),
                search_limit: env::var("SEARCH_RESULT_LIMIT")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            },
            server: ServerConfig {
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .unwrap_or(5000),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
        })
    }
}
