// Access type value object

use serde::{Deserialize, Serialize};

/// Policy governing which calendar days a ticket authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    AllDays,
    SpecificDays,
    AnySingleDay,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::AllDays => "all_days",
            AccessType::SpecificDays => "specific_days",
            AccessType::AnySingleDay => "any_single_day",
        }
    }
}

impl From<&str> for AccessType {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "specific_days" => AccessType::SpecificDays,
            "any_single_day" => AccessType::AnySingleDay,
            _ => AccessType::AllDays,
        }
    }
}
