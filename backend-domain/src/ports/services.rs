use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{PaymentCapture, RuntimeConfig, Ticket};
use crate::value_objects::AuthenticatedUser;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// None when the token is invalid or expired.
    async fn verify_token(&self, bearer: &str) -> anyhow::Result<Option<AuthenticatedUser>>;
    /// None when no account exists for the email.
    async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<String>>;
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> anyhow::Result<String>;
    async fn create_custom_token(&self, uid: &str) -> anyhow::Result<String>;
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// At-least-once from clients; implementations map "already captured"
    /// responses to a completed capture.
    async fn capture(&self, order_id: &str) -> anyhow::Result<PaymentCapture>;
}

/// Fire-and-forget side effects. Failures are logged by implementations,
/// never surfaced to callers.
pub trait NotificationSender: Send + Sync {
    fn spawn_ticket_email(&self, config: RuntimeConfig, tickets: Vec<Ticket>);
    fn spawn_recovery_email(&self, config: RuntimeConfig, email: String);
}

/// Injected so the undo window is testable with a pinned clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
