use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use backend_application::commands::purchase_commands;
use backend_application::dtos::{CaptureOrderRequest, CaptureOrderResponse};
use backend_application::AppState;

use crate::error::HttpError;
use crate::middleware::maybe_authenticate;

/// Post-payment capture and issuance. Public: the buyer may or may not
/// be signed in.
pub async fn capture_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CaptureOrderRequest>,
) -> Result<Json<CaptureOrderResponse>, HttpError> {
    let caller = maybe_authenticate(&state, &headers).await?;
    let response = purchase_commands::capture_order(&state, caller.as_ref(), payload).await?;
    Ok(Json(response))
}
