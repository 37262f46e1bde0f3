// Check-in state machine
// Validates a scanned ticket against the event window, its readiness
// and the access policy, then consumes a day (or reverses the last
// consumption within the undo window). The read-validate-write cycle
// runs under optimistic concurrency: two scanners racing on the same
// ticket cannot both succeed.

use chrono::Duration;
use tracing::error;
use uuid::Uuid;

use backend_domain::{
    access_policy, today_for_event, AuthenticatedUser, CasOutcome, Event, PolicyRejection, Ticket,
    TicketLog, TicketLogAction,
};

use crate::dtos::CheckinView;
use crate::{qr_tokens, AppError, AppState};

pub async fn check_in(
    state: &AppState,
    operator: &AuthenticatedUser,
    qr: &str,
) -> Result<CheckinView, AppError> {
    let qr_id = qr_tokens::resolve_qr_id(&state.config.qr_signing_secret, qr)?;

    let mut attempts = 0;
    loop {
        let ticket = state
            .ticket_repo
            .find_by_qr_id(&qr_id)
            .await
            .map_err(AppError::Internal)?
            .ok_or(AppError::NotFound("ticket"))?;
        let event = state
            .event_repo
            .get(&ticket.event_id)
            .await
            .map_err(AppError::Internal)?
            .ok_or(AppError::NotFound("event"))?;

        if let Err(err) = validate_scan(state, &ticket, &event) {
            state.metrics.record_rejected_scan();
            return Err(err);
        }

        let now = state.clock.now();
        let today = today_for_event(now, event.utc_offset_minutes);
        let ticket_type = state
            .ticket_type_repo
            .get(&ticket.ticket_type_id)
            .await
            .map_err(AppError::Internal)?
            .ok_or(AppError::NotFound("ticket type"))?;
        let day = match access_policy::evaluate(
            ticket_type.access_type,
            &ticket.authorized_days,
            &ticket.used_days,
            today,
        ) {
            Ok(day) => day,
            Err(rejection) => {
                state.metrics.record_rejected_scan();
                return Err(policy_error(rejection));
            }
        };

        let undo_deadline = now + Duration::minutes(state.config.undo_window_minutes);
        let expected = ticket.revision;
        let mut updated = ticket;
        updated.apply_checkin(day, &operator.uid, now, undo_deadline);
        updated.revision = expected + 1;

        match state
            .ticket_repo
            .compare_and_update(expected, &updated)
            .await
            .map_err(AppError::Internal)?
        {
            CasOutcome::Updated => {
                append_log(state, &updated, TicketLogAction::Checkin, day, operator).await;
                state.metrics.record_checkin();
                return Ok(CheckinView {
                    ticket: updated,
                    event_name: event.name,
                    can_undo: true,
                    can_undo_until: Some(undo_deadline),
                });
            }
            CasOutcome::Missing => return Err(AppError::NotFound("ticket")),
            CasOutcome::Conflict => {
                // Another scanner got there first; re-validate from the
                // fresh state so the second scan fails loudly instead of
                // double-consuming the day.
                attempts += 1;
                if attempts >= state.config.checkin_max_retries {
                    return Err(AppError::Conflict(
                        "ticket is being scanned concurrently".to_string(),
                    ));
                }
            }
        }
    }
}

pub async fn undo_check_in(
    state: &AppState,
    operator: &AuthenticatedUser,
    qr: &str,
) -> Result<CheckinView, AppError> {
    let qr_id = qr_tokens::resolve_qr_id(&state.config.qr_signing_secret, qr)?;

    let mut attempts = 0;
    loop {
        let ticket = state
            .ticket_repo
            .find_by_qr_id(&qr_id)
            .await
            .map_err(AppError::Internal)?
            .ok_or(AppError::NotFound("ticket"))?;
        let event = state
            .event_repo
            .get(&ticket.event_id)
            .await
            .map_err(AppError::Internal)?
            .ok_or(AppError::NotFound("event"))?;

        let now = state.clock.now();
        let deadline = ticket.can_undo_until.ok_or(AppError::NothingToUndo)?;
        if now > deadline {
            return Err(AppError::UndoExpired);
        }
        if ticket.last_checkin_by.as_deref() != Some(operator.uid.as_str()) {
            return Err(AppError::UnauthorizedUndo);
        }
        let today = today_for_event(now, event.utc_offset_minutes);
        let day = match ticket.last_checkin_day {
            Some(day) if day == today => day,
            _ => return Err(AppError::NothingToUndo),
        };

        let expected = ticket.revision;
        let mut updated = ticket;
        updated.apply_undo(day);
        updated.revision = expected + 1;

        match state
            .ticket_repo
            .compare_and_update(expected, &updated)
            .await
            .map_err(AppError::Internal)?
        {
            CasOutcome::Updated => {
                append_log(state, &updated, TicketLogAction::UndoCheckin, day, operator).await;
                state.metrics.record_undo();
                return Ok(CheckinView {
                    ticket: updated,
                    event_name: event.name,
                    can_undo: false,
                    can_undo_until: None,
                });
            }
            CasOutcome::Missing => return Err(AppError::NotFound("ticket")),
            CasOutcome::Conflict => {
                attempts += 1;
                if attempts >= state.config.checkin_max_retries {
                    return Err(AppError::Conflict(
                        "ticket is being modified concurrently".to_string(),
                    ));
                }
            }
        }
    }
}

/// Readiness and event-window checks (steps shared by every scan).
fn validate_scan(state: &AppState, ticket: &Ticket, event: &Event) -> Result<(), AppError> {
    if !ticket.status.scannable() || !ticket.attendee_ready() {
        return Err(AppError::NotConfigured);
    }
    let today = today_for_event(state.clock.now(), event.utc_offset_minutes);
    if today < event.start_date {
        return Err(AppError::EventNotStarted);
    }
    if today > event.end_date {
        return Err(AppError::EventEnded);
    }
    Ok(())
}

fn policy_error(rejection: PolicyRejection) -> AppError {
    match rejection {
        PolicyRejection::AlreadyCheckedInToday => AppError::AlreadyCheckedInToday,
        PolicyRejection::AlreadyUsed { .. } => AppError::AlreadyUsed(rejection.to_string()),
        PolicyRejection::NotAuthorizedToday { .. } => {
            AppError::NotAuthorizedToday(rejection.to_string())
        }
    }
}

/// The audit trail is append-only and best-effort: a failed append must
/// not unwind a check-in that already happened.
async fn append_log(
    state: &AppState,
    ticket: &Ticket,
    action: TicketLogAction,
    day: chrono::NaiveDate,
    operator: &AuthenticatedUser,
) {
    let entry = TicketLog {
        id: Uuid::new_v4().simple().to_string(),
        ticket_id: ticket.id.clone(),
        qr_id: ticket.qr_id.clone(),
        event_id: ticket.event_id.clone(),
        action,
        day,
        performed_by: operator.uid.clone(),
        performed_at: state.clock.now(),
    };
    if let Err(err) = state.ticket_log_repo.append(&entry).await {
        error!("audit log append failed for ticket {}: {err}", ticket.id);
    }
}
