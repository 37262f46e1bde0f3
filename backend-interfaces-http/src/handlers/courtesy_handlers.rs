use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use backend_application::commands::courtesy_commands;
use backend_application::dtos::{
    CourtesyIssueRequest, CourtesyIssueResponse, CourtesyListResponse,
};
use backend_application::AppState;
use backend_domain::Role;

use crate::error::HttpError;
use crate::middleware::{authenticate, require_role};

pub async fn issue_courtesy(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CourtesyIssueRequest>,
) -> Result<Json<CourtesyIssueResponse>, HttpError> {
    let user = authenticate(&state, &headers).await?;
    require_role(&user, &[Role::Admin, Role::Gestor])?;
    let response = courtesy_commands::issue_courtesy(&state, payload).await?;
    Ok(Json(response))
}

pub async fn list_courtesy(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CourtesyListResponse>, HttpError> {
    let user = authenticate(&state, &headers).await?;
    require_role(&user, &[Role::Admin, Role::Gestor])?;
    let response = courtesy_commands::list_courtesy(&state).await?;
    Ok(Json(response))
}
