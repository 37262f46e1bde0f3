// In-memory fakes for command/query tests. The deployable store lives
// in backend-infrastructure; these stay deliberately small.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use backend_domain::ports::{
    CasOutcome, Clock, EventRepository, IdentityProvider, NotificationSender, PaymentProcessor,
    TicketLogRepository, TicketRepository, TicketTypeRepository,
};
use backend_domain::{
    AccessType, AuthenticatedUser, Event, OrphanRecoveryData, PaymentCapture, RecoveryStatus,
    Role, RuntimeConfig, Ticket, TicketLog, TicketStatus, TicketType,
};

use crate::{AppState, Metrics};

pub fn test_user(uid: &str, email: &str, roles: &[Role]) -> AuthenticatedUser {
    AuthenticatedUser {
        uid: uid.to_string(),
        email: email.to_string(),
        roles: roles.to_vec(),
    }
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
}

#[derive(Default)]
pub struct FakeStore {
    events: RwLock<HashMap<String, Event>>,
    ticket_types: RwLock<HashMap<String, TicketType>>,
    tickets: RwLock<HashMap<String, Ticket>>,
    logs: RwLock<Vec<TicketLog>>,
    conflict_once: AtomicBool,
}

impl FakeStore {
    /// Force the next compare_and_update to report a conflict, as if a
    /// concurrent writer had won the race.
    pub fn conflict_next_cas(&self) {
        self.conflict_once.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventRepository for FakeStore {
    async fn get(&self, id: &str) -> anyhow::Result<Option<Event>> {
        Ok(self.events.read().await.get(id).cloned())
    }

    async fn insert(&self, event: &Event) -> anyhow::Result<()> {
        self.events
            .write()
            .await
            .insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn list_published(&self) -> anyhow::Result<Vec<Event>> {
        Ok(self
            .events
            .read()
            .await
            .values()
            .filter(|event| event.published)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TicketTypeRepository for FakeStore {
    async fn get(&self, id: &str) -> anyhow::Result<Option<TicketType>> {
        Ok(self.ticket_types.read().await.get(id).cloned())
    }

    async fn insert(&self, ticket_type: &TicketType) -> anyhow::Result<()> {
        self.ticket_types
            .write()
            .await
            .insert(ticket_type.id.clone(), ticket_type.clone());
        Ok(())
    }

    async fn increment_sold_count(&self, id: &str, quantity: u32) -> anyhow::Result<()> {
        let mut types = self.ticket_types.write().await;
        let ticket_type = types
            .get_mut(id)
            .ok_or_else(|| anyhow!("ticket type {id} not found"))?;
        ticket_type.sold_count += u64::from(quantity);
        Ok(())
    }
}

#[async_trait]
impl TicketRepository for FakeStore {
    async fn get(&self, id: &str) -> anyhow::Result<Option<Ticket>> {
        Ok(self.tickets.read().await.get(id).cloned())
    }

    async fn find_by_qr_id(&self, qr_id: &str) -> anyhow::Result<Option<Ticket>> {
        Ok(self
            .tickets
            .read()
            .await
            .values()
            .find(|ticket| ticket.qr_id == qr_id)
            .cloned())
    }

    async fn find_by_order_id(&self, order_id: &str) -> anyhow::Result<Vec<Ticket>> {
        Ok(self
            .tickets
            .read()
            .await
            .values()
            .filter(|ticket| ticket.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn find_by_user(&self, uid: &str) -> anyhow::Result<Vec<Ticket>> {
        Ok(self
            .tickets
            .read()
            .await
            .values()
            .filter(|ticket| ticket.user_id.as_deref() == Some(uid))
            .cloned()
            .collect())
    }

    async fn find_by_customer_email(&self, email: &str) -> anyhow::Result<Vec<Ticket>> {
        Ok(self
            .tickets
            .read()
            .await
            .values()
            .filter(|ticket| ticket.customer_email == email)
            .cloned()
            .collect())
    }

    async fn find_unbound_by_customer_email(&self, email: &str) -> anyhow::Result<Vec<Ticket>> {
        Ok(self
            .tickets
            .read()
            .await
            .values()
            .filter(|ticket| ticket.user_id.is_none() && ticket.customer_email == email)
            .cloned()
            .collect())
    }

    async fn find_by_event(&self, event_id: &str) -> anyhow::Result<Vec<Ticket>> {
        Ok(self
            .tickets
            .read()
            .await
            .values()
            .filter(|ticket| ticket.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn find_courtesy(&self) -> anyhow::Result<Vec<Ticket>> {
        Ok(self
            .tickets
            .read()
            .await
            .values()
            .filter(|ticket| ticket.is_courtesy)
            .cloned()
            .collect())
    }

    async fn insert_batch(&self, tickets: &[Ticket]) -> anyhow::Result<()> {
        let mut stored = self.tickets.write().await;
        for (index, ticket) in tickets.iter().enumerate() {
            if stored.contains_key(&ticket.id)
                || tickets[..index].iter().any(|other| other.id == ticket.id)
            {
                bail!("duplicate ticket id {}", ticket.id);
            }
        }
        for ticket in tickets {
            stored.insert(ticket.id.clone(), ticket.clone());
        }
        Ok(())
    }

    async fn compare_and_update(
        &self,
        expected_revision: u64,
        ticket: &Ticket,
    ) -> anyhow::Result<CasOutcome> {
        if self.conflict_once.swap(false, Ordering::SeqCst) {
            return Ok(CasOutcome::Conflict);
        }
        let mut stored = self.tickets.write().await;
        match stored.get(&ticket.id) {
            None => Ok(CasOutcome::Missing),
            Some(current) if current.revision != expected_revision => Ok(CasOutcome::Conflict),
            Some(_) => {
                stored.insert(ticket.id.clone(), ticket.clone());
                Ok(CasOutcome::Updated)
            }
        }
    }
}

#[async_trait]
impl TicketLogRepository for FakeStore {
    async fn append(&self, entry: &TicketLog) -> anyhow::Result<()> {
        self.logs.write().await.push(entry.clone());
        Ok(())
    }

    async fn list_for_ticket(&self, ticket_id: &str) -> anyhow::Result<Vec<TicketLog>> {
        Ok(self
            .logs
            .read()
            .await
            .iter()
            .filter(|entry| entry.ticket_id == ticket_id)
            .cloned()
            .collect())
    }
}

pub struct StubPayments {
    status: Mutex<String>,
    calls: AtomicU64,
}

impl Default for StubPayments {
    fn default() -> Self {
        Self {
            status: Mutex::new("COMPLETED".to_string()),
            calls: AtomicU64::new(0),
        }
    }
}

impl StubPayments {
    pub fn set_status(&self, status: &str) {
        *self.status.lock().expect("lock") = status.to_string();
    }

    pub fn capture_calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentProcessor for StubPayments {
    async fn capture(&self, _order_id: &str) -> anyhow::Result<PaymentCapture> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PaymentCapture {
            status: self.status.lock().expect("lock").clone(),
            capture_id: Some("cap-1".to_string()),
        })
    }
}

pub struct StubIdentity {
    users: Mutex<HashMap<String, String>>,
    fail_create: AtomicBool,
    seq: AtomicU64,
}

impl Default for StubIdentity {
    fn default() -> Self {
        let users =
            HashMap::from([("registered@x.com".to_string(), "uid-ana".to_string())]);
        Self {
            users: Mutex::new(users),
            fail_create: AtomicBool::new(false),
            seq: AtomicU64::new(0),
        }
    }
}

impl StubIdentity {
    pub fn fail_creations(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    /// The account pre-registered in every test identity backend.
    pub fn seeded_user(&self) -> AuthenticatedUser {
        test_user("uid-ana", "registered@x.com", &[])
    }
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn verify_token(&self, bearer: &str) -> anyhow::Result<Option<AuthenticatedUser>> {
        // tokens look like "token:<uid>:<email>"
        let mut parts = bearer.splitn(3, ':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some("token"), Some(uid), Some(email)) => {
                Ok(Some(test_user(uid, email, &[])))
            }
            _ => Ok(None),
        }
    }

    async fn get_user_by_email(&self, email: &str) -> anyhow::Result<Option<String>> {
        Ok(self.users.lock().expect("lock").get(email).cloned())
    }

    async fn create_user(
        &self,
        email: &str,
        _password: &str,
        _display_name: &str,
    ) -> anyhow::Result<String> {
        if self.fail_create.load(Ordering::SeqCst) {
            bail!("identity backend unavailable");
        }
        let mut users = self.users.lock().expect("lock");
        if users.contains_key(email) {
            bail!("email already registered");
        }
        let uid = format!("uid-{}", self.seq.fetch_add(1, Ordering::SeqCst));
        users.insert(email.to_string(), uid.clone());
        Ok(uid)
    }

    async fn create_custom_token(&self, uid: &str) -> anyhow::Result<String> {
        Ok(format!("custom-{uid}"))
    }
}

#[derive(Default)]
pub struct RecordingNotifications {
    ticket_emails: AtomicU64,
    recovery_emails: AtomicU64,
}

impl RecordingNotifications {
    pub fn ticket_emails(&self) -> u64 {
        self.ticket_emails.load(Ordering::SeqCst)
    }

    pub fn recovery_emails(&self) -> u64 {
        self.recovery_emails.load(Ordering::SeqCst)
    }
}

impl NotificationSender for RecordingNotifications {
    fn spawn_ticket_email(&self, _config: RuntimeConfig, _tickets: Vec<Ticket>) {
        self.ticket_emails.fetch_add(1, Ordering::SeqCst);
    }

    fn spawn_recovery_email(&self, _config: RuntimeConfig, _email: String) {
        self.recovery_emails.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at_rfc3339(s: &str) -> Self {
        Self {
            now: Mutex::new(parse_rfc3339(s)),
        }
    }

    pub fn set_rfc3339(&self, s: &str) {
        *self.now.lock().expect("lock") = parse_rfc3339(s);
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().expect("lock");
        *now += Duration::seconds(secs);
    }
}

fn parse_rfc3339(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("timestamp")
        .with_timezone(&Utc)
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("lock")
    }
}

pub struct TestBackend {
    pub store: Arc<FakeStore>,
    pub payments: Arc<StubPayments>,
    pub identity: Arc<StubIdentity>,
    pub notifications: Arc<RecordingNotifications>,
    pub clock: Arc<FixedClock>,
}

impl TestBackend {
    pub async fn ticket_count(&self) -> usize {
        self.store.tickets.read().await.len()
    }

    pub async fn get_ticket(&self, id: &str) -> Ticket {
        self.store
            .tickets
            .read()
            .await
            .get(id)
            .cloned()
            .expect("ticket")
    }

    pub async fn tickets_for_user(&self, uid: &str) -> Vec<Ticket> {
        self.store
            .tickets
            .read()
            .await
            .values()
            .filter(|ticket| ticket.user_id.as_deref() == Some(uid))
            .cloned()
            .collect()
    }

    pub async fn logs_for(&self, ticket_id: &str) -> Vec<TicketLog> {
        self.store
            .logs
            .read()
            .await
            .iter()
            .filter(|entry| entry.ticket_id == ticket_id)
            .cloned()
            .collect()
    }

    pub fn conflict_next_cas(&self) {
        self.store.conflict_next_cas();
    }

    async fn seed(&self, user_id: Option<&str>, email: &str, recovery: bool) -> Ticket {
        let ticket = Ticket {
            id: Uuid::new_v4().simple().to_string(),
            qr_id: Uuid::new_v4().simple().to_string(),
            order_id: Uuid::new_v4().simple().to_string(),
            event_id: "ev1".to_string(),
            ticket_type_id: "tt1".to_string(),
            user_id: user_id.map(str::to_string),
            customer_name: "Ana".to_string(),
            customer_email: email.to_lowercase(),
            customer_phone: None,
            attendee_name: None,
            attendee_email: None,
            attendee_phone: None,
            status: TicketStatus::Purchased,
            is_courtesy: false,
            courtesy_type: None,
            price: 2500,
            currency: "EUR".to_string(),
            authorized_days: vec![
                date("2026-06-01"),
                date("2026-06-02"),
                date("2026-06-03"),
            ],
            used_days: Vec::new(),
            last_checkin: None,
            last_checkin_by: None,
            last_checkin_day: None,
            can_undo_until: None,
            linked_at: None,
            linked_via: None,
            orphan_recovery_data: recovery.then(|| OrphanRecoveryData {
                target_email: email.to_lowercase(),
                recovery_status: RecoveryStatus::Pending,
                provenance: "purchase".to_string(),
                recovered_at: None,
                linked_to_user: None,
            }),
            created_at: parse_rfc3339("2026-05-01T12:00:00Z"),
            revision: 0,
        };
        self.store
            .tickets
            .write()
            .await
            .insert(ticket.id.clone(), ticket.clone());
        ticket
    }

    pub async fn seed_ticket(&self, uid: &str, email: &str) -> Ticket {
        self.seed(Some(uid), email, false).await
    }

    pub async fn seed_guest_ticket(&self, email: &str) -> Ticket {
        self.seed(None, email, true).await
    }

    pub async fn seed_configured_ticket(&self, uid: &str, email: &str) -> Ticket {
        let ticket = self.seed(Some(uid), email, false).await;
        self.configure(&ticket.id, "Marta").await;
        self.get_ticket(&ticket.id).await
    }

    pub async fn configure(&self, ticket_id: &str, attendee: &str) {
        let mut tickets = self.store.tickets.write().await;
        let ticket = tickets.get_mut(ticket_id).expect("ticket");
        ticket.attendee_name = Some(attendee.to_string());
        ticket.status = TicketStatus::Configured;
        ticket.revision += 1;
    }
}

pub async fn test_state() -> (AppState, Arc<TestBackend>) {
    let store = Arc::new(FakeStore::default());
    let payments = Arc::new(StubPayments::default());
    let identity = Arc::new(StubIdentity::default());
    let notifications = Arc::new(RecordingNotifications::default());
    let clock = Arc::new(FixedClock::at_rfc3339("2026-06-01T10:00:00Z"));

    let event = Event {
        id: "ev1".to_string(),
        name: "Feria del Disco".to_string(),
        slug: "feria-del-disco".to_string(),
        location: "Valencia".to_string(),
        start_date: date("2026-06-01"),
        end_date: date("2026-06-03"),
        utc_offset_minutes: 0,
        published: true,
    };
    EventRepository::insert(store.as_ref(), &event)
        .await
        .expect("seed event");

    let base = TicketType {
        id: "tt1".to_string(),
        event_id: "ev1".to_string(),
        name: "General".to_string(),
        access_type: AccessType::AllDays,
        available_days: Vec::new(),
        price: 2500,
        currency: "EUR".to_string(),
        is_courtesy: false,
        sold_count: 0,
    };
    TicketTypeRepository::insert(store.as_ref(), &base)
        .await
        .expect("seed ticket type");
    let mut specific = base.clone();
    specific.id = "tts".to_string();
    specific.name = "Días sueltos".to_string();
    specific.access_type = AccessType::SpecificDays;
    specific.available_days = vec![date("2026-06-01"), date("2026-06-03")];
    TicketTypeRepository::insert(store.as_ref(), &specific)
        .await
        .expect("seed ticket type");
    let mut single = base.clone();
    single.id = "tta".to_string();
    single.name = "Un día".to_string();
    single.access_type = AccessType::AnySingleDay;
    TicketTypeRepository::insert(store.as_ref(), &single)
        .await
        .expect("seed ticket type");
    let mut courtesy = base.clone();
    courtesy.id = "ttc".to_string();
    courtesy.name = "Cortesía".to_string();
    courtesy.price = 0;
    courtesy.is_courtesy = true;
    TicketTypeRepository::insert(store.as_ref(), &courtesy)
        .await
        .expect("seed ticket type");

    let config = RuntimeConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        public_base_url: "http://127.0.0.1:0".to_string(),
        identity_base_url: "http://identity.invalid".to_string(),
        identity_api_key: None,
        paypal_base_url: "http://paypal.invalid".to_string(),
        paypal_client_id: None,
        paypal_secret: None,
        notification_webhook_url: None,
        qr_signing_secret: "test-secret".to_string(),
        undo_window_minutes: 5,
        default_utc_offset_minutes: 0,
        checkin_max_retries: 3,
        max_body_bytes: 1024 * 1024,
        request_timeout_seconds: 10,
    };

    let state = AppState {
        config,
        event_repo: store.clone(),
        ticket_type_repo: store.clone(),
        ticket_repo: store.clone(),
        ticket_log_repo: store.clone(),
        identity: identity.clone(),
        payments: payments.clone(),
        notifications: notifications.clone(),
        clock: clock.clone(),
        metrics: Arc::new(Metrics::default()),
    };
    let backend = Arc::new(TestBackend {
        store,
        payments,
        identity,
        notifications,
        clock,
    });
    (state, backend)
}
