// PayPal payment adapter
// OAuth client-credentials then order capture. Capture is treated as
// idempotent by order id: a repeated capture that PayPal rejects with
// ORDER_ALREADY_CAPTURED reports a completed payment instead of an
// error, so retried checkout calls cannot strand a paid order.

use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use backend_domain::ports::PaymentProcessor;
use backend_domain::{PaymentCapture, RuntimeConfig};

pub struct PaypalPaymentProcessor {
    http: Client,
    base_url: String,
    client_id: String,
    secret: String,
}

#[derive(Deserialize)]
struct OauthResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct CaptureResponse {
    status: String,
    #[serde(default)]
    purchase_units: Vec<PurchaseUnit>,
}

#[derive(Deserialize)]
struct PurchaseUnit {
    #[serde(default)]
    payments: Option<Payments>,
}

#[derive(Deserialize)]
struct Payments {
    #[serde(default)]
    captures: Vec<CaptureDetail>,
}

#[derive(Deserialize)]
struct CaptureDetail {
    id: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    issue: String,
}

impl PaypalPaymentProcessor {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let client_id = config
            .paypal_client_id
            .clone()
            .ok_or_else(|| anyhow!("paypal_client_id is not configured"))?;
        let secret = config
            .paypal_secret
            .clone()
            .ok_or_else(|| anyhow!("paypal_secret is not configured"))?;
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds.max(3)))
            .build()?;
        Ok(Self {
            http,
            base_url: config.paypal_base_url.trim_end_matches('/').to_string(),
            client_id,
            secret,
        })
    }

    async fn access_token(&self) -> Result<String> {
        let response = self
            .http
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .basic_auth(&self.client_id, Some(&self.secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?
            .error_for_status()?;
        let oauth: OauthResponse = response.json().await?;
        Ok(oauth.access_token)
    }
}

/// Stands in when PayPal credentials are absent (local development,
/// courtesy-only deployments). Every capture fails cleanly.
#[derive(Default)]
pub struct UnconfiguredPayments;

impl UnconfiguredPayments {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaymentProcessor for UnconfiguredPayments {
    async fn capture(&self, order_id: &str) -> Result<PaymentCapture> {
        Err(anyhow!(
            "payment processor is not configured; cannot capture order {order_id}"
        ))
    }
}

#[async_trait]
impl PaymentProcessor for PaypalPaymentProcessor {
    async fn capture(&self, order_id: &str) -> Result<PaymentCapture> {
        let token = self.access_token().await?;
        let response = self
            .http
            .post(format!(
                "{}/v2/checkout/orders/{}/capture",
                self.base_url, order_id
            ))
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .body("{}")
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            let error: ErrorResponse = response.json().await.unwrap_or(ErrorResponse {
                details: Vec::new(),
            });
            if error
                .details
                .iter()
                .any(|detail| detail.issue == "ORDER_ALREADY_CAPTURED")
            {
                return Ok(PaymentCapture {
                    status: "COMPLETED".to_string(),
                    capture_id: None,
                });
            }
            return Err(anyhow!("paypal capture rejected for order {order_id}"));
        }

        let capture: CaptureResponse = response.error_for_status()?.json().await?;
        let capture_id = capture
            .purchase_units
            .first()
            .and_then(|unit| unit.payments.as_ref())
            .and_then(|payments| payments.captures.first())
            .map(|detail| detail.id.clone());
        Ok(PaymentCapture {
            status: capture.status,
            capture_id,
        })
    }
}
