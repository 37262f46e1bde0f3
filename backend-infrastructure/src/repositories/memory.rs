// Document store
// In-process collections guarded by a single RwLock, with an optional
// JSON snapshot on disk so restarts keep their data. Batch inserts and
// ticket updates are atomic: the whole mutation happens inside one
// write-lock critical section, so readers never observe partial state.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::warn;

use backend_domain::ports::{
    CasOutcome, EventRepository, TicketLogRepository, TicketRepository, TicketTypeRepository,
};
use backend_domain::{Event, Ticket, TicketLog, TicketType};

#[derive(Debug, Default)]
struct Collections {
    events: HashMap<String, Event>,
    ticket_types: HashMap<String, TicketType>,
    tickets: HashMap<String, Ticket>,
    ticket_logs: Vec<TicketLog>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreSnapshot {
    #[serde(default)]
    events: Vec<Event>,
    #[serde(default)]
    ticket_types: Vec<TicketType>,
    #[serde(default)]
    tickets: Vec<Ticket>,
    #[serde(default)]
    ticket_logs: Vec<TicketLog>,
}

pub struct MemoryStore {
    inner: RwLock<Collections>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Collections::default()),
            snapshot_path: None,
        }
    }

    /// Open the store, loading an existing snapshot when one is present.
    pub async fn open(snapshot_path: Option<&str>) -> Result<Self> {
        let Some(path) = snapshot_path else {
            return Ok(Self::new());
        };
        let path = PathBuf::from(path);
        let mut collections = Collections::default();
        if path.exists() {
            let content = fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading snapshot {}", path.display()))?;
            let snapshot: StoreSnapshot = serde_json::from_str(&content)
                .with_context(|| format!("parsing snapshot {}", path.display()))?;
            for event in snapshot.events {
                collections.events.insert(event.id.clone(), event);
            }
            for ticket_type in snapshot.ticket_types {
                collections
                    .ticket_types
                    .insert(ticket_type.id.clone(), ticket_type);
            }
            for ticket in snapshot.tickets {
                collections.tickets.insert(ticket.id.clone(), ticket);
            }
            collections.ticket_logs = snapshot.ticket_logs;
        }
        Ok(Self {
            inner: RwLock::new(collections),
            snapshot_path: Some(path),
        })
    }

    /// Best-effort persistence after a mutation; a failed write is
    /// logged and the in-memory state stays authoritative.
    async fn persist(&self) {
        let Some(path) = &self.snapshot_path else {
            return;
        };
        let snapshot = {
            let collections = self.inner.read().await;
            StoreSnapshot {
                events: collections.events.values().cloned().collect(),
                ticket_types: collections.ticket_types.values().cloned().collect(),
                tickets: collections.tickets.values().cloned().collect(),
                ticket_logs: collections.ticket_logs.clone(),
            }
        };
        let content = match serde_json::to_string(&snapshot) {
            Ok(content) => content,
            Err(err) => {
                warn!("snapshot serialization failed: {err}");
                return;
            }
        };
        if let Err(err) = fs::write(path, content).await {
            warn!("snapshot write to {} failed: {err}", path.display());
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<Event>> {
        Ok(self.inner.read().await.events.get(id).cloned())
    }

    async fn insert(&self, event: &Event) -> Result<()> {
        self.inner
            .write()
            .await
            .events
            .insert(event.id.clone(), event.clone());
        self.persist().await;
        Ok(())
    }

    async fn list_published(&self) -> Result<Vec<Event>> {
        Ok(self
            .inner
            .read()
            .await
            .events
            .values()
            .filter(|event| event.published)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TicketTypeRepository for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<TicketType>> {
        Ok(self.inner.read().await.ticket_types.get(id).cloned())
    }

    async fn insert(&self, ticket_type: &TicketType) -> Result<()> {
        self.inner
            .write()
            .await
            .ticket_types
            .insert(ticket_type.id.clone(), ticket_type.clone());
        self.persist().await;
        Ok(())
    }

    async fn increment_sold_count(&self, id: &str, quantity: u32) -> Result<()> {
        {
            let mut collections = self.inner.write().await;
            let ticket_type = match collections.ticket_types.get_mut(id) {
                Some(ticket_type) => ticket_type,
                None => bail!("ticket type {id} not found"),
            };
            ticket_type.sold_count += u64::from(quantity);
        }
        self.persist().await;
        Ok(())
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<Ticket>> {
        Ok(self.inner.read().await.tickets.get(id).cloned())
    }

    async fn find_by_qr_id(&self, qr_id: &str) -> Result<Option<Ticket>> {
        Ok(self
            .inner
            .read()
            .await
            .tickets
            .values()
            .find(|ticket| ticket.qr_id == qr_id)
            .cloned())
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Vec<Ticket>> {
        Ok(self
            .inner
            .read()
            .await
            .tickets
            .values()
            .filter(|ticket| ticket.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn find_by_user(&self, uid: &str) -> Result<Vec<Ticket>> {
        Ok(self
            .inner
            .read()
            .await
            .tickets
            .values()
            .filter(|ticket| ticket.user_id.as_deref() == Some(uid))
            .cloned()
            .collect())
    }

    async fn find_by_customer_email(&self, email: &str) -> Result<Vec<Ticket>> {
        Ok(self
            .inner
            .read()
            .await
            .tickets
            .values()
            .filter(|ticket| ticket.customer_email == email)
            .cloned()
            .collect())
    }

    async fn find_unbound_by_customer_email(&self, email: &str) -> Result<Vec<Ticket>> {
        Ok(self
            .inner
            .read()
            .await
            .tickets
            .values()
            .filter(|ticket| ticket.user_id.is_none() && ticket.customer_email == email)
            .cloned()
            .collect())
    }

    async fn find_by_event(&self, event_id: &str) -> Result<Vec<Ticket>> {
        Ok(self
            .inner
            .read()
            .await
            .tickets
            .values()
            .filter(|ticket| ticket.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn find_courtesy(&self) -> Result<Vec<Ticket>> {
        Ok(self
            .inner
            .read()
            .await
            .tickets
            .values()
            .filter(|ticket| ticket.is_courtesy)
            .cloned()
            .collect())
    }

    async fn insert_batch(&self, tickets: &[Ticket]) -> Result<()> {
        {
            let mut collections = self.inner.write().await;
            // validate the whole batch before the first insert
            for (index, ticket) in tickets.iter().enumerate() {
                if collections.tickets.contains_key(&ticket.id)
                    || tickets[..index].iter().any(|other| other.id == ticket.id)
                {
                    bail!("duplicate ticket id {}", ticket.id);
                }
                let qr_taken = collections
                    .tickets
                    .values()
                    .any(|other| other.qr_id == ticket.qr_id)
                    || tickets[..index].iter().any(|other| other.qr_id == ticket.qr_id);
                if qr_taken {
                    bail!("duplicate qr id {}", ticket.qr_id);
                }
            }
            for ticket in tickets {
                collections.tickets.insert(ticket.id.clone(), ticket.clone());
            }
        }
        self.persist().await;
        Ok(())
    }

    async fn compare_and_update(
        &self,
        expected_revision: u64,
        ticket: &Ticket,
    ) -> Result<CasOutcome> {
        let outcome = {
            let mut collections = self.inner.write().await;
            match collections.tickets.get(&ticket.id) {
                None => CasOutcome::Missing,
                Some(current) if current.revision != expected_revision => CasOutcome::Conflict,
                Some(_) => {
                    collections.tickets.insert(ticket.id.clone(), ticket.clone());
                    CasOutcome::Updated
                }
            }
        };
        if outcome == CasOutcome::Updated {
            self.persist().await;
        }
        Ok(outcome)
    }
}

#[async_trait]
impl TicketLogRepository for MemoryStore {
    async fn append(&self, entry: &TicketLog) -> Result<()> {
        self.inner.write().await.ticket_logs.push(entry.clone());
        self.persist().await;
        Ok(())
    }

    async fn list_for_ticket(&self, ticket_id: &str) -> Result<Vec<TicketLog>> {
        Ok(self
            .inner
            .read()
            .await
            .ticket_logs
            .iter()
            .filter(|entry| entry.ticket_id == ticket_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::{AccessType, TicketStatus};
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
    }

    fn ticket(id: &str) -> Ticket {
        Ticket {
            id: id.to_string(),
            qr_id: format!("qr-{id}"),
            order_id: "o1".to_string(),
            event_id: "ev1".to_string(),
            ticket_type_id: "tt1".to_string(),
            user_id: None,
            customer_name: "Ana".to_string(),
            customer_email: "a@x.com".to_string(),
            customer_phone: None,
            attendee_name: None,
            attendee_email: None,
            attendee_phone: None,
            status: TicketStatus::Purchased,
            is_courtesy: false,
            courtesy_type: None,
            price: 2500,
            currency: "EUR".to_string(),
            authorized_days: vec![date("2026-06-01")],
            used_days: Vec::new(),
            last_checkin: None,
            last_checkin_by: None,
            last_checkin_day: None,
            can_undo_until: None,
            linked_at: None,
            linked_via: None,
            orphan_recovery_data: None,
            created_at: Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap(),
            revision: 0,
        }
    }

    #[tokio::test]
    async fn batch_insert_is_all_or_nothing() {
        let store = MemoryStore::new();
        store.insert_batch(&[ticket("t3")]).await.expect("seed");

        // third ticket collides with the existing one
        let batch: Vec<Ticket> = vec![
            ticket("t1"),
            ticket("t2"),
            ticket("t3"),
            ticket("t4"),
            ticket("t5"),
        ];
        let err = store.insert_batch(&batch).await.expect_err("rejected");
        assert!(err.to_string().contains("t3"));

        let remaining = store.find_by_order_id("o1").await.expect("query");
        assert_eq!(remaining.len(), 1, "no partial batch may persist");
    }

    #[tokio::test]
    async fn compare_and_update_rejects_stale_revisions() {
        let store = MemoryStore::new();
        store.insert_batch(&[ticket("t1")]).await.expect("seed");

        let mut first = ticket("t1");
        first.status = TicketStatus::Configured;
        first.revision = 1;
        assert_eq!(
            store.compare_and_update(0, &first).await.expect("cas"),
            CasOutcome::Updated
        );

        // a writer still holding revision 0 must lose
        let mut stale = ticket("t1");
        stale.status = TicketStatus::Used;
        stale.revision = 1;
        assert_eq!(
            store.compare_and_update(0, &stale).await.expect("cas"),
            CasOutcome::Conflict
        );

        let mut missing = ticket("t9");
        missing.revision = 1;
        assert_eq!(
            store.compare_and_update(0, &missing).await.expect("cas"),
            CasOutcome::Missing
        );
    }

    #[tokio::test]
    async fn unbound_email_query_skips_bound_tickets() {
        let store = MemoryStore::new();
        let mut bound = ticket("t1");
        bound.user_id = Some("u1".to_string());
        let unbound = ticket("t2");
        store.insert_batch(&[bound, unbound]).await.expect("seed");

        let matches = store
            .find_unbound_by_customer_email("a@x.com")
            .await
            .expect("query");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "t2");
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "entrada-store-{}.json",
            Uuid::new_v4().simple()
        ));
        let path_str = path.to_string_lossy().into_owned();

        {
            let store = MemoryStore::open(Some(&path_str)).await.expect("open");
            store.insert_batch(&[ticket("t1")]).await.expect("insert");
            store
                .increment_sold_count("tt1", 1)
                .await
                .expect_err("unknown ticket type");
        }
        let reopened = MemoryStore::open(Some(&path_str)).await.expect("reopen");
        let restored = TicketRepository::get(&reopened, "t1")
            .await
            .expect("get")
            .expect("ticket");
        assert_eq!(restored.qr_id, "qr-t1");

        let _ = tokio::fs::remove_file(&path).await;
    }
}
