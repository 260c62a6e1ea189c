use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use seatlock_core::{SeatId, SeatSnapshot};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatActionRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockResponse {
    pub success: bool,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfirmResponse {
    pub success: bool,
    pub message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/seats", get(list_seats))
        .route("/api/seats/{id}", get(get_seat))
        .route("/api/seats/{id}/lock", post(lock_seat))
        .route("/api/seats/{id}/confirm", post(confirm_seat))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/seats
pub async fn list_seats(State(state): State<AppState>) -> Json<DataResponse<Vec<SeatSnapshot>>> {
    Json(DataResponse {
        success: true,
        data: state.registry.list_seats(),
    })
}

/// GET /api/seats/{id}
pub async fn get_seat(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<DataResponse<SeatSnapshot>>, AppError> {
    let seat_id = parse_seat_id(&raw_id)?;
    let seat = state.registry.get_seat(seat_id)?;

    Ok(Json(DataResponse { success: true, data: seat }))
}

/// POST /api/seats/{id}/lock
/// Lock a seat for the requesting user, or refresh their existing lock
pub async fn lock_seat(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<SeatActionRequest>, JsonRejection>,
) -> Result<Json<LockResponse>, AppError> {
    let user_id = require_user_id(body)?;
    let seat_id = parse_seat_id(&raw_id)?;

    let expires_at = state.registry.lock_seat(seat_id, &user_id)?;
    let seconds = state.registry.lock_duration().as_secs();

    Ok(Json(LockResponse {
        success: true,
        message: format!("Seat {} locked successfully for {} seconds.", seat_id, seconds),
        expires_at,
    }))
}

/// POST /api/seats/{id}/confirm
/// Turn the caller's lock into a booking
pub async fn confirm_seat(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<SeatActionRequest>, JsonRejection>,
) -> Result<Json<ConfirmResponse>, AppError> {
    let user_id = require_user_id(body)?;
    let seat_id = parse_seat_id(&raw_id)?;

    state.registry.confirm_seat(seat_id, &user_id)?;
    tracing::info!("Seat {} confirmed", seat_id);

    Ok(Json(ConfirmResponse {
        success: true,
        message: format!("Seat {} successfully booked!", seat_id),
    }))
}

fn parse_seat_id(raw: &str) -> Result<SeatId, AppError> {
    raw.trim()
        .parse::<SeatId>()
        .map_err(|_| AppError::ValidationError("Invalid seat ID.".to_string()))
}

fn require_user_id(body: Result<Json<SeatActionRequest>, JsonRejection>) -> Result<String, AppError> {
    let user_id = match body {
        Ok(Json(req)) => req.user_id,
        Err(rejection) => {
            tracing::debug!("Rejected seat request body: {}", rejection);
            None
        }
    };

    user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::ValidationError("User ID required.".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seat_id() {
        assert_eq!(parse_seat_id("3").unwrap(), 3);
        assert!(matches!(parse_seat_id("abc"), Err(AppError::ValidationError(_))));
        assert!(matches!(parse_seat_id("-1"), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_request_body_accepts_camel_case() {
        let req: SeatActionRequest = serde_json::from_str(r#"{"userId":"u-1"}"#).unwrap();
        assert_eq!(req.user_id.as_deref(), Some("u-1"));

        let req: SeatActionRequest = serde_json::from_str("{}").unwrap();
        assert!(req.user_id.is_none());
    }
}
