use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use backend_application::commands::{recovery_commands, ticket_commands};
use backend_application::dtos::{AttendeeUpdate, LinkOutcome};
use backend_application::queries::ticket_queries;
use backend_application::AppState;
use backend_domain::{EventGroup, Role, Ticket};

use crate::error::HttpError;
use crate::middleware::{authenticate, require_role};

/// Grouped Event -> Order -> Ticket tree for one user. Self or admin.
pub async fn get_user_tickets(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(uid): Path<String>,
) -> Result<Json<Vec<EventGroup>>, HttpError> {
    let user = authenticate(&state, &headers).await?;
    let groups = ticket_queries::get_user_tickets(&state, &user, &uid).await?;
    Ok(Json(groups))
}

pub async fn configure_attendee(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(ticket_id): Path<String>,
    Json(payload): Json<AttendeeUpdate>,
) -> Result<Json<Ticket>, HttpError> {
    let user = authenticate(&state, &headers).await?;
    let ticket = ticket_commands::configure_attendee(&state, &user, &ticket_id, payload).await?;
    Ok(Json(ticket))
}

/// Run orphan recovery for the calling account. Invoked by the client
/// right after sign-up or sign-in; never fails the caller's flow.
pub async fn link_account(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LinkOutcome>, HttpError> {
    let user = authenticate(&state, &headers).await?;
    let outcome = recovery_commands::link_orphan_tickets(&state, &user.uid, &user.email).await;
    Ok(Json(outcome))
}

pub async fn list_event_tickets(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<String>,
) -> Result<Json<backend_application::dtos::EventTicketsResponse>, HttpError> {
    let user = authenticate(&state, &headers).await?;
    require_role(&user, &[Role::Admin, Role::Gestor])?;
    let response = ticket_queries::list_event_tickets(&state, &event_id).await?;
    Ok(Json(response))
}
