// Runtime configuration shared across layers

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub public_base_url: String,

    /// Auth backend REST endpoint plus its server key.
    pub identity_base_url: String,
    pub identity_api_key: Option<String>,

    pub paypal_base_url: String,
    pub paypal_client_id: Option<String>,
    pub paypal_secret: Option<String>,

    /// Webhook receiving ticket/recovery email jobs; unset disables
    /// notifications entirely.
    pub notification_webhook_url: Option<String>,

    /// Secret for HMAC-signed QR payloads.
    pub qr_signing_secret: String,

    pub undo_window_minutes: i64,
    /// Fallback timezone for events created without an explicit offset.
    pub default_utc_offset_minutes: i32,
    pub checkin_max_retries: u32,

    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

/// Capture result reported by the payment processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCapture {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_id: Option<String>,
}

impl PaymentCapture {
    pub fn is_completed(&self) -> bool {
        self.status.eq_ignore_ascii_case("COMPLETED")
    }
}
