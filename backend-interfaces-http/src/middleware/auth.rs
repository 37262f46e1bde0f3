// Bearer authentication and role guards

use axum::http::HeaderMap;
use tracing::warn;

use backend_application::{AppError, AppState};
use backend_domain::{AuthenticatedUser, Role};

use crate::error::HttpError;

pub fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let prefix = "Bearer ";
    if !value.starts_with(prefix) {
        return None;
    }
    let token = value[prefix.len()..].trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// Verify the bearer token against the identity provider.
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, HttpError> {
    match maybe_authenticate(state, headers).await? {
        Some(user) => Ok(user),
        None => Err(HttpError(AppError::Unauthorized)),
    }
}

/// Like `authenticate`, but an absent header is not an error. Used by
/// the public checkout endpoint where a signed-in buyer is optional.
pub async fn maybe_authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<AuthenticatedUser>, HttpError> {
    let Some(token) = extract_bearer(headers) else {
        return Ok(None);
    };
    match state.identity.verify_token(&token).await {
        Ok(verified) => Ok(verified),
        Err(err) => {
            warn!("token verification failed: {err}");
            Err(HttpError(AppError::Unauthorized))
        }
    }
}

pub fn require_role(user: &AuthenticatedUser, roles: &[Role]) -> Result<(), HttpError> {
    if user.has_any_role(roles) {
        Ok(())
    } else {
        Err(HttpError(AppError::Forbidden(format!(
            "requires one of: {}",
            roles
                .iter()
                .map(|role| role.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))))
    }
}
