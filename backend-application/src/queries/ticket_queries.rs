// Ticket read models: grouped user views, door lists, public lookup

use std::collections::HashMap;

use tracing::error;

use backend_domain::{
    grouping, normalize_email, today_for_event, AuthenticatedUser, Event, EventGroup, Role,
    TicketStatus,
};

use crate::dtos::{EventTicketCounts, EventTicketsResponse, PublicQrView};
use crate::{qr_tokens, AppError, AppState};

/// A user's tickets as the Event -> Order -> Ticket tree the storefront
/// renders. Falls back to the caller's own email so guest purchases
/// that have not been linked yet still show up for their owner.
pub async fn get_user_tickets(
    state: &AppState,
    caller: &AuthenticatedUser,
    uid: &str,
) -> Result<Vec<EventGroup>, AppError> {
    if caller.uid != uid && !caller.has_role(Role::Admin) {
        return Err(AppError::Forbidden(
            "cannot read another user's tickets".to_string(),
        ));
    }

    let mut tickets = state
        .ticket_repo
        .find_by_user(uid)
        .await
        .map_err(AppError::Internal)?;
    if tickets.is_empty() && caller.uid == uid {
        tickets = state
            .ticket_repo
            .find_by_customer_email(&normalize_email(&caller.email))
            .await
            .map_err(AppError::Internal)?;
    }

    let mut events: HashMap<String, Event> = HashMap::new();
    for ticket in &tickets {
        if events.contains_key(&ticket.event_id) {
            continue;
        }
        match state.event_repo.get(&ticket.event_id).await {
            Ok(Some(event)) => {
                events.insert(event.id.clone(), event);
            }
            Ok(None) => {
                error!("ticket {} references missing event {}", ticket.id, ticket.event_id);
            }
            Err(err) => return Err(AppError::Internal(err)),
        }
    }

    let today = today_for_event(state.clock.now(), state.config.default_utc_offset_minutes);
    Ok(grouping::group_tickets(tickets, &events, today))
}

/// Unauthenticated pre-scan display. Never leaks contact or payment
/// data; an unknown or tampered payload just reads as invalid.
pub async fn public_qr_lookup(state: &AppState, qr: &str) -> Result<PublicQrView, AppError> {
    let qr_id = match qr_tokens::resolve_qr_id(&state.config.qr_signing_secret, qr) {
        Ok(qr_id) => qr_id,
        Err(AppError::InvalidInput(_)) => return Ok(PublicQrView::invalid()),
        Err(err) => return Err(err),
    };
    let ticket = match state
        .ticket_repo
        .find_by_qr_id(&qr_id)
        .await
        .map_err(AppError::Internal)?
    {
        Some(ticket) => ticket,
        None => return Ok(PublicQrView::invalid()),
    };
    let event_name = state
        .event_repo
        .get(&ticket.event_id)
        .await
        .map_err(AppError::Internal)?
        .map(|event| event.name);

    Ok(PublicQrView {
        valid: true,
        event_name,
        attendee_name: ticket.attendee_name,
        status: Some(ticket.status),
    })
}

/// Door list for an event with per-status counts.
pub async fn list_event_tickets(
    state: &AppState,
    event_id: &str,
) -> Result<EventTicketsResponse, AppError> {
    state
        .event_repo
        .get(event_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::NotFound("event"))?;
    let tickets = state
        .ticket_repo
        .find_by_event(event_id)
        .await
        .map_err(AppError::Internal)?;

    let mut counts = EventTicketCounts {
        total: tickets.len(),
        ..EventTicketCounts::default()
    };
    for ticket in &tickets {
        match ticket.status {
            TicketStatus::Purchased => counts.pending += 1,
            TicketStatus::Configured => counts.configured += 1,
            TicketStatus::Used => counts.used += 1,
        }
    }

    Ok(EventTicketsResponse { tickets, counts })
}
