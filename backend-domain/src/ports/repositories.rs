use async_trait::async_trait;

use crate::entities::{Event, Ticket, TicketLog, TicketType};

/// Outcome of an optimistic concurrent update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    Updated,
    /// Stored revision no longer matches; the caller must re-read and retry.
    Conflict,
    Missing,
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn get(&self, id: &str) -> anyhow::Result<Option<Event>>;
    async fn insert(&self, event: &Event) -> anyhow::Result<()>;
    async fn list_published(&self) -> anyhow::Result<Vec<Event>>;
}

#[async_trait]
pub trait TicketTypeRepository: Send + Sync {
    async fn get(&self, id: &str) -> anyhow::Result<Option<TicketType>>;
    async fn insert(&self, ticket_type: &TicketType) -> anyhow::Result<()>;
    /// Best-effort sales counter; callers must not fail issuance on error.
    async fn increment_sold_count(&self, id: &str, quantity: u32) -> anyhow::Result<()>;
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn get(&self, id: &str) -> anyhow::Result<Option<Ticket>>;
    async fn find_by_qr_id(&self, qr_id: &str) -> anyhow::Result<Option<Ticket>>;
    async fn find_by_order_id(&self, order_id: &str) -> anyhow::Result<Vec<Ticket>>;
    async fn find_by_user(&self, uid: &str) -> anyhow::Result<Vec<Ticket>>;
    /// Matches on lowercase-normalized customer email.
    async fn find_by_customer_email(&self, email: &str) -> anyhow::Result<Vec<Ticket>>;
    /// Same match restricted to tickets with no bound user.
    async fn find_unbound_by_customer_email(&self, email: &str) -> anyhow::Result<Vec<Ticket>>;
    async fn find_by_event(&self, event_id: &str) -> anyhow::Result<Vec<Ticket>>;
    async fn find_courtesy(&self) -> anyhow::Result<Vec<Ticket>>;
    /// All-or-nothing: either every ticket is persisted or none.
    async fn insert_batch(&self, tickets: &[Ticket]) -> anyhow::Result<()>;
    /// Writes `ticket` (with its revision already bumped) only if the
    /// stored revision equals `expected_revision`.
    async fn compare_and_update(
        &self,
        expected_revision: u64,
        ticket: &Ticket,
    ) -> anyhow::Result<CasOutcome>;
}

#[async_trait]
pub trait TicketLogRepository: Send + Sync {
    async fn append(&self, entry: &TicketLog) -> anyhow::Result<()>;
    async fn list_for_ticket(&self, ticket_id: &str) -> anyhow::Result<Vec<TicketLog>>;
}
