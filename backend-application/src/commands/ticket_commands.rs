// Per-ticket attendee configuration

use backend_domain::{normalize_email, AuthenticatedUser, CasOutcome, Role, Ticket, TicketStatus};

use crate::dtos::AttendeeUpdate;
use crate::{AppError, AppState};

/// Set who will actually attend with this ticket and mark it ready for
/// scanning. Reconfiguration is allowed until the ticket has been used.
pub async fn configure_attendee(
    state: &AppState,
    caller: &AuthenticatedUser,
    ticket_id: &str,
    update: AttendeeUpdate,
) -> Result<Ticket, AppError> {
    if update.name.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "attendee name must not be empty".to_string(),
        ));
    }

    let mut attempts = 0;
    loop {
        let ticket = state
            .ticket_repo
            .get(ticket_id)
            .await
            .map_err(AppError::Internal)?
            .ok_or(AppError::NotFound("ticket"))?;
        authorize_owner(caller, &ticket)?;
        if ticket.status == TicketStatus::Used {
            return Err(AppError::Conflict(
                "ticket already used; attendee can no longer change".to_string(),
            ));
        }

        let expected = ticket.revision;
        let mut updated = ticket;
        updated.attendee_name = Some(update.name.trim().to_string());
        updated.attendee_email = update.email.as_deref().map(normalize_email);
        updated.attendee_phone = update.phone.clone();
        updated.status = TicketStatus::Configured;
        updated.revision = expected + 1;

        match state
            .ticket_repo
            .compare_and_update(expected, &updated)
            .await
            .map_err(AppError::Internal)?
        {
            CasOutcome::Updated => return Ok(updated),
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

fn authorize_owner(caller: &AuthenticatedUser, ticket: &Ticket) -> Result<(), AppError> {
    if caller.has_role(Role::Admin) {
        return Ok(());
    }
    if ticket.user_id.as_deref() == Some(caller.uid.as_str()) {
        return Ok(());
    }
    // Unbound guest tickets may be configured by the matching email
    // before recovery linking has run.
    if ticket.user_id.is_none() && ticket.customer_email == normalize_email(&caller.email) {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "ticket belongs to another user".to_string(),
    ))
}
