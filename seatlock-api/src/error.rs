use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use seatlock_core::{ConflictReason, RegistryError};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFoundError(String),
    #[error("{0}")]
    ConflictError(String),
    #[error("{0}")]
    ForbiddenError(String),
    #[error("{0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            // Clients of this API expect 400 for every refused transition
            AppError::ConflictError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::ForbiddenError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Validation(_) => AppError::ValidationError("User ID required.".to_string()),
            RegistryError::NotFound(_) => AppError::NotFoundError("Seat not found.".to_string()),
            RegistryError::Conflict { reason, .. } => AppError::ConflictError(
                match reason {
                    ConflictReason::AlreadyBooked => "Seat already booked.",
                    ConflictReason::LockedByAnotherUser => "Seat is already locked by another user.",
                    ConflictReason::NotLocked => "Seat is not locked yet.",
                }
                .to_string(),
            ),
            RegistryError::Forbidden { .. } => AppError::ForbiddenError(
                "You cannot confirm this seat; it's locked by another user.".to_string(),
            ),
            RegistryError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (RegistryError::Validation("empty".into()), StatusCode::BAD_REQUEST),
            (RegistryError::NotFound(42), StatusCode::NOT_FOUND),
            (
                RegistryError::Conflict { seat_id: 1, reason: ConflictReason::AlreadyBooked },
                StatusCode::BAD_REQUEST,
            ),
            (RegistryError::Forbidden { seat_id: 1 }, StatusCode::FORBIDDEN),
            (RegistryError::Internal("overflow".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[tokio::test]
    async fn test_internal_error_body_is_generic() {
        let response = AppError::from(RegistryError::Internal("clock overflow at seat 3".into()))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "success": false, "message": "Internal Server Error" }));
    }
}
