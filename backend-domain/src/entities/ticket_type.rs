// Ticket type entity

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::value_objects::AccessType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketType {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub access_type: AccessType,
    /// Only meaningful for `AccessType::SpecificDays`.
    #[serde(default)]
    pub available_days: Vec<NaiveDate>,
    /// Price in minor units of `currency`.
    pub price: i64,
    pub currency: String,
    pub is_courtesy: bool,
    pub sold_count: u64,
}
