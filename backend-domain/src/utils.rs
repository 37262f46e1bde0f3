use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};

/// Every calendar day from `start` to `end` inclusive. Empty when the
/// range is inverted.
pub fn day_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut day = start;
    while day <= end {
        days.push(day);
        match day.checked_add_signed(Duration::days(1)) {
            Some(next) => day = next,
            None => break,
        }
    }
    days
}

/// The current calendar day as seen from the event's fixed UTC offset.
/// All day comparisons in check-in are event-local.
pub fn today_for_event(now_utc: DateTime<Utc>, utc_offset_minutes: i32) -> NaiveDate {
    let offset = FixedOffset::east_opt(utc_offset_minutes * 60)
        .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());
    now_utc.with_timezone(&offset).date_naive()
}

/// Emails are matched case-insensitively everywhere.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn format_days(days: &[NaiveDate]) -> String {
    days.iter()
        .map(|day| day.format("%Y-%m-%d").to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
