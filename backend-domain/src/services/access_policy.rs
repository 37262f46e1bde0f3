// Access policy evaluation
// Decides whether a scan may consume a day on a ticket, and which day.

use chrono::NaiveDate;
use thiserror::Error;

use crate::entities::{Event, TicketType};
use crate::utils::{day_range, format_days};
use crate::value_objects::AccessType;

/// Why a scan was rejected. Each variant carries enough to build an
/// operator-readable message without consulting logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyRejection {
    #[error("ticket already checked in today")]
    AlreadyCheckedInToday,
    #[error("single-use ticket already redeemed on {used_on}")]
    AlreadyUsed { used_on: NaiveDate },
    #[error("ticket not valid today; valid days: {}", format_days(.authorized))]
    NotAuthorizedToday { authorized: Vec<NaiveDate> },
}

/// Decide whether a check-in is permitted for `today` and which day it
/// consumes. `authorized_days` is the set computed at issuance; the
/// event-window check has already happened upstream.
pub fn evaluate(
    access_type: AccessType,
    authorized_days: &[NaiveDate],
    used_days: &[NaiveDate],
    today: NaiveDate,
) -> Result<NaiveDate, PolicyRejection> {
    // Rejected regardless of access type.
    if used_days.contains(&today) {
        return Err(PolicyRejection::AlreadyCheckedInToday);
    }
    match access_type {
        AccessType::AllDays | AccessType::SpecificDays => {
            if authorized_days.contains(&today) {
                Ok(today)
            } else {
                Err(PolicyRejection::NotAuthorizedToday {
                    authorized: authorized_days.to_vec(),
                })
            }
        }
        AccessType::AnySingleDay => {
            // First use wins: any consumed day exhausts the ticket.
            if let Some(used_on) = used_days.first() {
                return Err(PolicyRejection::AlreadyUsed { used_on: *used_on });
            }
            if authorized_days.contains(&today) {
                Ok(today)
            } else {
                Err(PolicyRejection::NotAuthorizedToday {
                    authorized: authorized_days.to_vec(),
                })
            }
        }
    }
}

/// The days a ticket of this type grants entry to, fixed at issuance.
///
/// `AnySingleDay` populates the full event range as candidate days; the
/// single use is consumed by whichever day is scanned first.
pub fn authorized_days_for(ticket_type: &TicketType, event: &Event) -> Vec<NaiveDate> {
    match ticket_type.access_type {
        AccessType::AllDays | AccessType::AnySingleDay => {
            day_range(event.start_date, event.end_date)
        }
        AccessType::SpecificDays => ticket_type.available_days.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
    }

    fn days(specs: &[&str]) -> Vec<NaiveDate> {
        specs.iter().map(|s| date(s)).collect()
    }

    #[test]
    fn all_days_allows_unused_day_in_range() {
        let authorized = days(&["2026-01-01", "2026-01-02", "2026-01-03"]);
        let consumed = evaluate(AccessType::AllDays, &authorized, &[], date("2026-01-02"))
            .expect("allowed");
        assert_eq!(consumed, date("2026-01-02"));
    }

    #[test]
    fn all_days_rejects_day_outside_range() {
        let authorized = days(&["2026-01-01", "2026-01-02"]);
        let err = evaluate(AccessType::AllDays, &authorized, &[], date("2026-01-05"))
            .expect_err("rejected");
        assert!(matches!(err, PolicyRejection::NotAuthorizedToday { .. }));
    }

    #[test]
    fn specific_days_rejects_gap_day() {
        let authorized = days(&["2026-01-01", "2026-01-03"]);
        let err = evaluate(
            AccessType::SpecificDays,
            &authorized,
            &[],
            date("2026-01-02"),
        )
        .expect_err("rejected");
        match err {
            PolicyRejection::NotAuthorizedToday { authorized } => {
                assert_eq!(authorized, days(&["2026-01-01", "2026-01-03"]));
            }
            other => panic!("unexpected rejection: {other:?}"),
        }
    }

    #[test]
    fn specific_days_allows_listed_day() {
        let authorized = days(&["2026-01-01", "2026-01-03"]);
        let consumed = evaluate(
            AccessType::SpecificDays,
            &authorized,
            &[],
            date("2026-01-03"),
        )
        .expect("allowed");
        assert_eq!(consumed, date("2026-01-03"));
    }

    #[test]
    fn any_single_day_rejects_after_first_use() {
        let authorized = days(&[
            "2026-01-01",
            "2026-01-02",
            "2026-01-03",
            "2026-01-04",
            "2026-01-05",
        ]);
        let used = days(&["2026-01-01"]);
        let err = evaluate(
            AccessType::AnySingleDay,
            &authorized,
            &used,
            date("2026-01-03"),
        )
        .expect_err("rejected");
        assert_eq!(
            err,
            PolicyRejection::AlreadyUsed {
                used_on: date("2026-01-01")
            }
        );
    }

    #[test]
    fn any_single_day_allows_first_use_on_any_day() {
        let authorized = days(&["2026-01-01", "2026-01-02", "2026-01-03"]);
        let consumed = evaluate(
            AccessType::AnySingleDay,
            &authorized,
            &[],
            date("2026-01-03"),
        )
        .expect("allowed");
        assert_eq!(consumed, date("2026-01-03"));
    }

    #[test]
    fn same_day_rescan_is_rejected_for_every_access_type() {
        let authorized = days(&["2026-01-01", "2026-01-02"]);
        let used = days(&["2026-01-01"]);
        for access_type in [
            AccessType::AllDays,
            AccessType::SpecificDays,
            AccessType::AnySingleDay,
        ] {
            let err = evaluate(access_type, &authorized, &used, date("2026-01-01"))
                .expect_err("rejected");
            assert_eq!(err, PolicyRejection::AlreadyCheckedInToday);
        }
    }

    #[test]
    fn rejection_message_names_valid_days() {
        let err = PolicyRejection::NotAuthorizedToday {
            authorized: days(&["2026-01-01", "2026-01-03"]),
        };
        assert_eq!(
            err.to_string(),
            "ticket not valid today; valid days: 2026-01-01, 2026-01-03"
        );
    }

    #[test]
    fn authorized_days_follow_access_type() {
        let event = Event {
            id: "ev1".to_string(),
            name: "Feria".to_string(),
            slug: "feria".to_string(),
            location: "Madrid".to_string(),
            start_date: date("2026-01-01"),
            end_date: date("2026-01-03"),
            utc_offset_minutes: 60,
            published: true,
        };
        let mut ticket_type = TicketType {
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
        assert_eq!(
            authorized_days_for(&ticket_type, &event),
            days(&["2026-01-01", "2026-01-02", "2026-01-03"])
        );

        ticket_type.access_type = AccessType::SpecificDays;
        ticket_type.available_days = days(&["2026-01-02"]);
        assert_eq!(
            authorized_days_for(&ticket_type, &event),
            days(&["2026-01-02"])
        );

        ticket_type.access_type = AccessType::AnySingleDay;
        assert_eq!(
            authorized_days_for(&ticket_type, &event),
            days(&["2026-01-01", "2026-01-02", "2026-01-03"])
        );
    }
}
