// Ticket status value object

use serde::{Deserialize, Serialize};

/// Ticket-level lifecycle status. Per-day usage is tracked on the ticket
/// via `used_days`; `Used` only records that at least one check-in happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Purchased,
    // historical documents carry "generated" for the same state
    #[serde(alias = "generated")]
    Configured,
    Used,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Purchased => "purchased",
            TicketStatus::Configured => "configured",
            TicketStatus::Used => "used",
        }
    }

    /// A ticket can be scanned once the attendee has been configured.
    pub fn scannable(&self) -> bool {
        matches!(self, TicketStatus::Configured | TicketStatus::Used)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStatus {
    Pending,
    Recovered,
    Expired,
}
