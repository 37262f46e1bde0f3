use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use backend_application::AppError;

/// HTTP projection of an application error: a stable machine-readable
/// code plus the operator-facing detail string.
#[derive(Debug)]
pub struct HttpError(pub AppError);

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        HttpError(value)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

fn status_and_code(err: &AppError) -> (StatusCode, &'static str) {
    match err {
        AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
        AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
        AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
        AppError::NotConfigured => (StatusCode::CONFLICT, "not_configured"),
        AppError::EventNotStarted => (StatusCode::CONFLICT, "event_not_started"),
        AppError::EventEnded => (StatusCode::CONFLICT, "event_ended"),
        AppError::NotAuthorizedToday(_) => (StatusCode::CONFLICT, "not_authorized_today"),
        AppError::AlreadyUsed(_) => (StatusCode::CONFLICT, "already_used"),
        AppError::AlreadyCheckedInToday => (StatusCode::CONFLICT, "already_checked_in_today"),
        AppError::UndoExpired => (StatusCode::CONFLICT, "undo_expired"),
        AppError::UnauthorizedUndo => (StatusCode::CONFLICT, "unauthorized_undo"),
        AppError::NothingToUndo => (StatusCode::CONFLICT, "nothing_to_undo"),
        AppError::PaymentNotCompleted(_) => (StatusCode::PAYMENT_REQUIRED, "payment_not_completed"),
        AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
        AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, code) = status_and_code(&self.0);
        // internal causes are logged, never shown to callers
        let details = match &self.0 {
            AppError::Internal(err) => {
                error!("internal error: {err:#}");
                None
            }
            other => Some(other.to_string()),
        };
        (status, Json(ErrorBody { error: code, details })).into_response()
    }
}
