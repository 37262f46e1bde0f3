use std::sync::Arc;

use backend_domain::ports::{
    Clock, EventRepository, IdentityProvider, NotificationSender, PaymentProcessor,
    TicketLogRepository, TicketRepository, TicketTypeRepository,
};
use backend_domain::RuntimeConfig;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub event_repo: Arc<dyn EventRepository>,
    pub ticket_type_repo: Arc<dyn TicketTypeRepository>,
    pub ticket_repo: Arc<dyn TicketRepository>,
    pub ticket_log_repo: Arc<dyn TicketLogRepository>,
    pub identity: Arc<dyn IdentityProvider>,
    pub payments: Arc<dyn PaymentProcessor>,
    pub notifications: Arc<dyn NotificationSender>,
    pub clock: Arc<dyn Clock>,
    pub metrics: Arc<Metrics>,
}
