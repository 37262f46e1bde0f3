// Request/response shapes for the operation surface

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backend_domain::{Ticket, TicketStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartItem {
    pub ticket_type_id: String,
    pub quantity: u32,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureOrderRequest {
    /// The payment processor's order id; also the issued order's id.
    pub order_id: String,
    pub event_id: String,
    pub customer: ContactInfo,
    pub items: Vec<CartItem>,
    /// Unauthenticated buyers get an account created for them unless
    /// they opted out of it at checkout.
    #[serde(default = "default_true")]
    pub create_account: bool,
}

/// How ownership was resolved during a self-checkout purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountOutcome {
    /// Caller was already authenticated; tickets bound to their uid.
    Bound,
    /// An account was created synchronously during checkout.
    Created,
    /// No account; orphan recovery armed for the customer email.
    Guest,
    /// Account creation failed; purchase proceeded as guest.
    CreationFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaptureOrderResponse {
    pub tickets: Vec<Ticket>,
    /// True when the order id had already been fulfilled; no new
    /// tickets were created and no second capture was attempted.
    pub already_issued: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountOutcome>,
    /// Sign-in token for a synchronously created account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourtesyIssueRequest {
    pub event_id: String,
    pub ticket_type_id: String,
    pub requester: ContactInfo,
    /// staff, press, vip, ...
    pub courtesy_type: String,
    pub quantity: u32,
    #[serde(default = "default_true")]
    pub auto_link: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourtesyIssueResponse {
    pub tickets: Vec<Ticket>,
    /// Set when the requester already had an account and the grant was
    /// bound immediately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_uid: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CourtesyStats {
    pub total: usize,
    pub pending: usize,
    pub configured: usize,
    pub used: usize,
    pub by_type: HashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourtesyListResponse {
    pub tickets: Vec<Ticket>,
    pub stats: CourtesyStats,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttendeeUpdate {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckinAction {
    Checkin,
    Undo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckinRequest {
    /// Signed QR payload or raw qr_id.
    pub qr: String,
    pub action: CheckinAction,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckinView {
    pub ticket: Ticket,
    pub event_name: String,
    pub can_undo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_undo_until: Option<DateTime<Utc>>,
}

/// Pre-scan display. Deliberately carries no contact or payment data.
#[derive(Debug, Clone, Serialize)]
pub struct PublicQrView {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
}

impl PublicQrView {
    pub fn invalid() -> Self {
        Self {
            valid: false,
            event_name: None,
            attendee_name: None,
            status: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkOutcome {
    pub linked_count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EventTicketCounts {
    pub total: usize,
    pub pending: usize,
    pub configured: usize,
    pub used: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventTicketsResponse {
    pub tickets: Vec<Ticket>,
    pub counts: EventTicketCounts,
}
