use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::RuntimeConfig;

use crate::config::validation::validate_secret;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub public_base_url: String,

    pub identity_base_url: String,
    pub identity_api_key: Option<String>,

    pub paypal_base_url: String,
    pub paypal_client_id: Option<String>,
    pub paypal_secret: Option<String>,

    pub notification_webhook_url: Option<String>,

    pub qr_signing_secret: String,

    /// Path the in-process store snapshots to; empty disables persistence.
    pub store_snapshot_path: Option<String>,

    pub undo_window_minutes: i64,
    pub default_utc_offset_minutes: i32,
    pub checkin_max_retries: u32,

    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3420".to_string(),
            public_base_url: "http://127.0.0.1:3420".to_string(),
            identity_base_url: "http://127.0.0.1:9099".to_string(),
            identity_api_key: None,
            paypal_base_url: "https://api-m.sandbox.paypal.com".to_string(),
            paypal_client_id: None,
            paypal_secret: None,
            notification_webhook_url: None,
            qr_signing_secret: String::new(),
            store_snapshot_path: Some("./entrada_store.json".to_string()),
            undo_window_minutes: 5,
            default_utc_offset_minutes: 60,
            checkin_max_retries: 3,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 15,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("ENTRADA_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let base_dir = file_path.parent();
        if !file_path.exists() {
            warn!("config.toml not found, using defaults");
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            config.resolve_paths(base_dir);
            config.normalize();
            config.validate()?;
            return Ok(config);
        }
        let content = fs::read_to_string(file_path).await?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        if let Some(key) = &self.identity_api_key {
            if key.trim().is_empty() {
                self.identity_api_key = None;
            }
        }
        if let Some(client_id) = &self.paypal_client_id {
            if client_id.trim().is_empty() {
                self.paypal_client_id = None;
            }
        }
        if let Some(secret) = &self.paypal_secret {
            if secret.trim().is_empty() {
                self.paypal_secret = None;
            }
        }
        if let Some(url) = &self.notification_webhook_url {
            if url.trim().is_empty() {
                self.notification_webhook_url = None;
            }
        }
        if let Some(path) = &self.store_snapshot_path {
            if path.trim().is_empty() {
                self.store_snapshot_path = None;
            }
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        if let Some(path) = &self.store_snapshot_path {
            self.store_snapshot_path = Some(resolve_path(base, path));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.public_base_url.trim().is_empty() {
            return Err(anyhow!("public_base_url must not be empty"));
        }
        validate_secret("qr_signing_secret", &self.qr_signing_secret)?;
        if self.undo_window_minutes < 1 {
            return Err(anyhow!("undo_window_minutes must be at least 1"));
        }
        if self.checkin_max_retries < 1 {
            return Err(anyhow!("checkin_max_retries must be at least 1"));
        }
        if self.default_utc_offset_minutes.abs() > 14 * 60 {
            return Err(anyhow!("default_utc_offset_minutes out of range"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            public_base_url: self.public_base_url.clone(),
            identity_base_url: self.identity_base_url.clone(),
            identity_api_key: self.identity_api_key.clone(),
            paypal_base_url: self.paypal_base_url.clone(),
            paypal_client_id: self.paypal_client_id.clone(),
            paypal_secret: self.paypal_secret.clone(),
            notification_webhook_url: self.notification_webhook_url.clone(),
            qr_signing_secret: self.qr_signing_secret.clone(),
            undo_window_minutes: self.undo_window_minutes,
            default_utc_offset_minutes: self.default_utc_offset_minutes,
            checkin_max_retries: self.checkin_max_retries,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("ENTRADA_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("ENTRADA_PUBLIC_BASE_URL") {
            self.public_base_url = value;
        }
        if let Ok(value) = env::var("ENTRADA_IDENTITY_BASE_URL") {
            self.identity_base_url = value;
        }
        if let Ok(value) = env::var("ENTRADA_IDENTITY_API_KEY") {
            self.identity_api_key = Some(value);
        }
        if let Ok(value) = env::var("ENTRADA_PAYPAL_BASE_URL") {
            self.paypal_base_url = value;
        }
        if let Ok(value) = env::var("ENTRADA_PAYPAL_CLIENT_ID") {
            self.paypal_client_id = Some(value);
        }
        if let Ok(value) = env::var("ENTRADA_PAYPAL_SECRET") {
            self.paypal_secret = Some(value);
        }
        if let Ok(value) = env::var("ENTRADA_NOTIFICATION_WEBHOOK_URL") {
            self.notification_webhook_url = Some(value);
        }
        if let Ok(value) = env::var("ENTRADA_QR_SIGNING_SECRET") {
            self.qr_signing_secret = value;
        }
        if let Ok(value) = env::var("ENTRADA_STORE_SNAPSHOT_PATH") {
            self.store_snapshot_path = Some(value);
        }
        if let Ok(value) = env::var("ENTRADA_UNDO_WINDOW_MINUTES") {
            if let Ok(parsed) = value.parse() {
                self.undo_window_minutes = parsed;
            }
        }
        if let Ok(value) = env::var("ENTRADA_DEFAULT_UTC_OFFSET_MINUTES") {
            if let Ok(parsed) = value.parse() {
                self.default_utc_offset_minutes = parsed;
            }
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let path = Path::new(value);
    if path.is_absolute() {
        value.to_string()
    } else {
        base.join(path).to_string_lossy().into_owned()
    }
}
