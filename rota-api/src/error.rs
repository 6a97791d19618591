use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rota_booking::{FinalizeError, PaymentError, SeatClaimError, TicketError};
use rota_core::StoreError;
use serde_json::json;

/// HTTP-facing error. Domain errors convert into it below, so handlers can
/// use `?` and the status mapping lives in one place.
#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            },
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SeatTaken { .. } => AppError::ConflictError(err.to_string()),
            StoreError::NotFound(_) => AppError::NotFoundError(err.to_string()),
            StoreError::Backend(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl From<SeatClaimError> for AppError {
    fn from(err: SeatClaimError) -> Self {
        match err {
            SeatClaimError::OutOfRange { .. } => AppError::ValidationError(err.to_string()),
            SeatClaimError::AlreadyTaken { .. } => AppError::ConflictError(err.to_string()),
            SeatClaimError::UnknownPassenger(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl From<FinalizeError> for AppError {
    fn from(err: FinalizeError) -> Self {
        match err {
            FinalizeError::EmptyDraft
            | FinalizeError::MissingSeat { .. }
            | FinalizeError::SeatOutOfRange { .. }
            | FinalizeError::DuplicateSeatInDraft { .. }
            | FinalizeError::InvalidInstallments(_)
            | FinalizeError::SettingsNotLoaded => AppError::ValidationError(err.to_string()),
            FinalizeError::SeatConflict { .. } => AppError::ConflictError(err.to_string()),
            // Orphaned reservation shell left behind; already logged at
            // error level by the finalizer.
            FinalizeError::RollbackFailed { .. } => {
                AppError::InternalServerError(err.to_string())
            }
            FinalizeError::Store(err) => err.into(),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Cancelled => AppError::ConflictError(err.to_string()),
            PaymentError::Store(err) => err.into(),
        }
    }
}

impl From<TicketError> for AppError {
    fn from(err: TicketError) -> Self {
        match err {
            TicketError::NotConfirmed { .. } => AppError::ConflictError(err.to_string()),
            TicketError::UnknownPassenger(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}
