// Ticket audit log entity
// Append-only; one entry per check-in state transition.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketLogAction {
    Checkin,
    UndoCheckin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketLog {
    pub id: String,
    pub ticket_id: String,
    pub qr_id: String,
    pub event_id: String,
    pub action: TicketLogAction,
    pub day: NaiveDate,
    pub performed_by: String,
    pub performed_at: DateTime<Utc>,
}
