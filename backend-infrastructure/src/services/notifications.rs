// Outbound notification jobs
// Ticket and recovery emails are delegated to a webhook worker that
// owns templating and delivery. Everything here is fire-and-forget:
// a lost notification never unwinds the write that triggered it.

use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use backend_domain::ports::NotificationSender;
use backend_domain::{RuntimeConfig, Ticket};

#[derive(Default)]
pub struct WebhookNotificationSender;

impl WebhookNotificationSender {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationSender for WebhookNotificationSender {
    fn spawn_ticket_email(&self, config: RuntimeConfig, tickets: Vec<Ticket>) {
        if config.notification_webhook_url.is_none() {
            debug!("notification webhook unset, skipping ticket email");
            return;
        }
        tokio::spawn(async move {
            if let Err(err) = send_ticket_email(&config, &tickets).await {
                warn!("ticket email webhook failed: {err}");
            }
        });
    }

    fn spawn_recovery_email(&self, config: RuntimeConfig, email: String) {
        if config.notification_webhook_url.is_none() {
            debug!("notification webhook unset, skipping recovery email");
            return;
        }
        tokio::spawn(async move {
            if let Err(err) = send_recovery_email(&config, &email).await {
                warn!("recovery email webhook failed: {err}");
            }
        });
    }
}

async fn send_ticket_email(config: &RuntimeConfig, tickets: &[Ticket]) -> Result<()> {
    let Some(url) = &config.notification_webhook_url else {
        return Ok(());
    };
    let payload = json!({
        "kind": "ticket_email",
        "order_id": tickets.first().map(|ticket| ticket.order_id.clone()),
        "recipient": tickets.first().map(|ticket| ticket.customer_email.clone()),
        "ticket_ids": tickets.iter().map(|ticket| ticket.id.clone()).collect::<Vec<_>>(),
        "public_base_url": config.public_base_url,
    });
    post_json(config, url, payload).await
}

async fn send_recovery_email(config: &RuntimeConfig, email: &str) -> Result<()> {
    let Some(url) = &config.notification_webhook_url else {
        return Ok(());
    };
    let payload = json!({
        "kind": "recovery_email",
        "recipient": email,
        "public_base_url": config.public_base_url,
    });
    post_json(config, url, payload).await
}

async fn post_json(config: &RuntimeConfig, url: &str, payload: serde_json::Value) -> Result<()> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_seconds.max(3)))
        .build()?;
    client
        .post(url)
        .json(&payload)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}
