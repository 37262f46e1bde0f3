use thiserror::Error;

/// Application-level failures. Validation variants carry the detail an
/// operator needs to resolve the situation at the front desk; internal
/// causes are never exposed downstream.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("ticket not configured for check-in")]
    NotConfigured,
    #[error("event has not started yet")]
    EventNotStarted,
    #[error("event already ended")]
    EventEnded,
    #[error("not valid today: {0}")]
    NotAuthorizedToday(String),
    #[error("already used: {0}")]
    AlreadyUsed(String),
    #[error("already checked in today")]
    AlreadyCheckedInToday,
    #[error("undo window expired")]
    UndoExpired,
    #[error("only the operator who checked in may undo")]
    UnauthorizedUndo,
    #[error("nothing to undo today")]
    NothingToUndo,
    #[error("payment not completed: {0}")]
    PaymentNotCompleted(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
