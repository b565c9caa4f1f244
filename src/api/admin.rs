use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use ulid::Ulid;

use crate::engine::EngineError;

use super::auth::AdminUser;
use super::dto::{AdminBookingDto, UserDto, VenueDto};
use super::{ApiError, AppState};

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
) -> impl IntoResponse {
    let users = state.engine.list_users();
    Json(users.iter().map(UserDto::from).collect::<Vec<_>>())
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Path(id): Path<Ulid>,
) -> Result<impl IntoResponse, ApiError> {
    state.engine.delete_user(id).await.map_err(|e| match e {
        EngineError::NotFound(_) => ApiError::new(StatusCode::NOT_FOUND, "User not found"),
        other => other.into(),
    })?;
    Ok(Json(serde_json::json!({ "message": "User deleted" })))
}

pub async fn list_venues(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
) -> impl IntoResponse {
    let venues = state.engine.list_venues().await;
    Json(venues.iter().map(VenueDto::from).collect::<Vec<_>>())
}

pub async fn delete_venue(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Path(id): Path<Ulid>,
) -> Result<impl IntoResponse, ApiError> {
    state.engine.delete_venue(id, None).await?;
    Ok(Json(serde_json::json!({ "message": "Venue deleted" })))
}

/// The full audit trail: every admission attempt, accepted and
/// conflict-flagged, joined with venue and user.
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
) -> impl IntoResponse {
    let entries = state.engine.all_bookings().await;
    Json(entries.iter().map(AdminBookingDto::from).collect::<Vec<_>>())
}

pub async fn analytics(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
) -> impl IntoResponse {
    let counts = state.engine.analytics();
    Json(serde_json::json!({
        "userCount": counts.user_count,
        "venueCount": counts.venue_count,
    }))
}
