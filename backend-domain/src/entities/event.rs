// Event entity

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An event with an inclusive calendar-day range.
///
/// `utc_offset_minutes` anchors the event to a fixed local timezone;
/// "today" for check-in purposes is always derived event-local.
/// Events referenced by tickets are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub utc_offset_minutes: i32,
    pub published: bool,
}
