// Courtesy (complimentary) ticket issuance for staff, press and VIPs

use tracing::warn;
use uuid::Uuid;

use backend_domain::{normalize_email, ResolvedIdentity, TicketStatus};

use crate::commands::issuance::{self, TicketBatchSpec};
use crate::dtos::{
    CourtesyIssueRequest, CourtesyIssueResponse, CourtesyListResponse, CourtesyStats,
};
use crate::{AppError, AppState};

pub const MAX_COURTESY_QUANTITY: u32 = 10;

/// Grant courtesy tickets to a requester.
///
/// Identity is resolved against the *requester's* email at grant time:
/// an existing account binds immediately, otherwise the tickets stay
/// unbound with recovery data armed so a later registration auto-links.
/// Attendee fields always start blank regardless of resolution.
pub async fn issue_courtesy(
    state: &AppState,
    payload: CourtesyIssueRequest,
) -> Result<CourtesyIssueResponse, AppError> {
    if payload.quantity < 1 || payload.quantity > MAX_COURTESY_QUANTITY {
        return Err(AppError::InvalidInput(format!(
            "quantity must be between 1 and {MAX_COURTESY_QUANTITY}"
        )));
    }
    if payload.courtesy_type.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "courtesy_type must not be empty".to_string(),
        ));
    }
    issuance::validate_contact(&payload.requester)?;

    let event = state
        .event_repo
        .get(&payload.event_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::NotFound("event"))?;
    let ticket_type = state
        .ticket_type_repo
        .get(&payload.ticket_type_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::NotFound("ticket type"))?;
    if ticket_type.event_id != event.id {
        return Err(AppError::InvalidInput(format!(
            "ticket type {} does not belong to event {}",
            ticket_type.id, event.id
        )));
    }

    let email = normalize_email(&payload.requester.email);
    let identity = match state.identity.get_user_by_email(&email).await {
        Ok(Some(uid)) => ResolvedIdentity::Bound { uid },
        Ok(None) => ResolvedIdentity::Guest {
            email: email.clone(),
        },
        Err(err) => {
            // Lookup failure degrades to the unbound path; recovery
            // still links once the account shows up.
            warn!("identity lookup failed for {email}: {err}");
            ResolvedIdentity::Guest {
                email: email.clone(),
            }
        }
    };
    let linked_uid = identity.uid().map(str::to_string);

    let courtesy_type = payload.courtesy_type.trim().to_lowercase();
    let order_id = Uuid::new_v4().simple().to_string();
    let now = state.clock.now();
    let spec = TicketBatchSpec {
        event: &event,
        order_id: &order_id,
        customer: &payload.requester,
        identity: &identity,
        auto_link: payload.auto_link,
        courtesy_type: Some(&courtesy_type),
        now,
    };
    let tickets = issuance::build_tickets(&spec, &[(ticket_type.clone(), payload.quantity)]);
    state
        .ticket_repo
        .insert_batch(&tickets)
        .await
        .map_err(AppError::Internal)?;

    if let Err(err) = state
        .ticket_type_repo
        .increment_sold_count(&ticket_type.id, payload.quantity)
        .await
    {
        warn!("sold count increment failed for {}: {}", ticket_type.id, err);
    }
    state
        .notifications
        .spawn_ticket_email(state.config.clone(), tickets.clone());
    state.metrics.record_courtesy(tickets.len());

    Ok(CourtesyIssueResponse {
        tickets,
        linked_uid,
    })
}

pub async fn list_courtesy(state: &AppState) -> Result<CourtesyListResponse, AppError> {
    let tickets = state
        .ticket_repo
        .find_courtesy()
        .await
        .map_err(AppError::Internal)?;

    let mut stats = CourtesyStats {
        total: tickets.len(),
        ..CourtesyStats::default()
    };
    for ticket in &tickets {
        match ticket.status {
            TicketStatus::Purchased => stats.pending += 1,
            TicketStatus::Configured => stats.configured += 1,
            TicketStatus::Used => stats.used += 1,
        }
        let courtesy_type = ticket
            .courtesy_type
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        *stats.by_type.entry(courtesy_type).or_insert(0) += 1;
    }

    Ok(CourtesyListResponse { tickets, stats })
}
