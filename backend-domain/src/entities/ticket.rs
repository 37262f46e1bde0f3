// Ticket entity
// One admission unit: one event, one ticket type, a day-scoped
// authorization set and its consumption state.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{RecoveryStatus, TicketStatus};

/// Sidecar kept while a ticket has no bound user and auto-linking is
/// wanted. Retained after recovery for audit, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrphanRecoveryData {
    pub target_email: String,
    pub recovery_status: RecoveryStatus,
    /// How issuance happened: "purchase" or "courtesy:<type>".
    pub provenance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovered_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_to_user: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    /// Opaque scan token, unique per ticket.
    pub qr_id: String,
    /// Shared by every ticket issued in the same purchase or grant.
    pub order_id: String,
    pub event_id: String,
    pub ticket_type_id: String,

    /// None means unbound (guest purchase or unmatched courtesy grant).
    pub user_id: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendee_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendee_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendee_phone: Option<String>,

    pub status: TicketStatus,
    pub is_courtesy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courtesy_type: Option<String>,
    pub price: i64,
    pub currency: String,

    /// Days this ticket grants entry to, computed once at issuance.
    pub authorized_days: Vec<NaiveDate>,
    /// Days already consumed. Invariant: subset of `authorized_days`,
    /// no duplicates.
    #[serde(default)]
    pub used_days: Vec<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checkin: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checkin_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checkin_day: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_undo_until: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_via: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orphan_recovery_data: Option<OrphanRecoveryData>,

    pub created_at: DateTime<Utc>,
    /// Bumped on every write; compare_and_update rejects stale revisions.
    #[serde(default)]
    pub revision: u64,
}

impl Ticket {
    pub fn attendee_ready(&self) -> bool {
        self.attendee_name
            .as_deref()
            .map(|name| !name.trim().is_empty())
            .unwrap_or(false)
    }

    /// Record a check-in for `day`. The caller has already validated the
    /// access policy; this only applies the bookkeeping.
    pub fn apply_checkin(
        &mut self,
        day: NaiveDate,
        operator_uid: &str,
        now: DateTime<Utc>,
        undo_deadline: DateTime<Utc>,
    ) {
        if !self.used_days.contains(&day) {
            self.used_days.push(day);
            self.used_days.sort();
        }
        self.status = TicketStatus::Used;
        self.last_checkin = Some(now);
        self.last_checkin_by = Some(operator_uid.to_string());
        self.last_checkin_day = Some(day);
        self.can_undo_until = Some(undo_deadline);
    }

    /// Reverse the last check-in for `day`: remove the consumed day and
    /// clear all four bookkeeping fields together.
    pub fn apply_undo(&mut self, day: NaiveDate) {
        self.used_days.retain(|used| *used != day);
        self.last_checkin = None;
        self.last_checkin_by = None;
        self.last_checkin_day = None;
        self.can_undo_until = None;
        if self.used_days.is_empty() {
            self.status = TicketStatus::Configured;
        }
    }
}
