use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use backend_application::commands::checkin_commands;
use backend_application::dtos::{CheckinAction, CheckinRequest, CheckinView, PublicQrView};
use backend_application::queries::ticket_queries;
use backend_application::AppState;
use backend_domain::Role;

use crate::error::HttpError;
use crate::middleware::{authenticate, require_role};

/// Door scan: check in or undo, by signed QR payload or raw qr_id.
pub async fn checkin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CheckinRequest>,
) -> Result<Json<CheckinView>, HttpError> {
    let operator = authenticate(&state, &headers).await?;
    require_role(&operator, &[Role::Admin, Role::Gestor, Role::Comprobador])?;
    let view = match payload.action {
        CheckinAction::Checkin => checkin_commands::check_in(&state, &operator, &payload.qr).await?,
        CheckinAction::Undo => {
            checkin_commands::undo_check_in(&state, &operator, &payload.qr).await?
        }
    };
    Ok(Json(view))
}

/// Unauthenticated pre-scan lookup; minimal fields, no PII beyond the
/// attendee and event names.
pub async fn public_qr_lookup(
    State(state): State<AppState>,
    Path(qr): Path<String>,
) -> Result<Json<PublicQrView>, HttpError> {
    let view = ticket_queries::public_qr_lookup(&state, &qr).await?;
    Ok(Json(view))
}
