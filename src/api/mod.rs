//! HTTP surface.
//!
//! Thin axum handlers over the engine. Routes mirror the public API:
//!
//! - `POST /api/auth/register`, `POST /api/auth/login`
//! - `GET/POST /api/venues`, `GET /api/venues/my`,
//!   `GET/PUT/DELETE /api/venues/{id}`
//! - `POST /api/bookings`, `POST /api/bookings/quote`,
//!   `GET /api/bookings/my`
//! - `GET /api/admin/users|venues|bookings|analytics`,
//!   `DELETE /api/admin/users/{id}`, `DELETE /api/admin/venues/{id}`
//! - `GET /health`

pub mod admin;
pub mod auth;
pub mod bookings;
mod dto;
mod error;
pub mod venues;

pub use error::ApiError;

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::AuthGate;
use crate::engine::Engine;

/// Application state shared across handlers.
pub struct AppState {
    pub engine: Arc<Engine>,
    pub auth: AuthGate,
}

pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/venues", get(venues::list).post(venues::create))
        .route("/api/venues/my", get(venues::mine))
        .route(
            "/api/venues/{id}",
            get(venues::get_one).put(venues::update).delete(venues::remove),
        )
        .route("/api/bookings", post(bookings::create))
        .route("/api/bookings/quote", post(bookings::quote))
        .route("/api/bookings/my", get(bookings::mine))
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/{id}", delete(admin::delete_user))
        .route("/api/admin/venues", get(admin::list_venues))
        .route("/api/admin/venues/{id}", delete(admin::delete_venue))
        .route("/api/admin/bookings", get(admin::list_bookings))
        .route("/api/admin/analytics", get(admin::analytics))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "venued"
    }))
}
