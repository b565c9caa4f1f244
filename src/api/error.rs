use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::auth::AuthError;
use crate::engine::EngineError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn server_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Venue not found"),
            EngineError::EmailTaken(_) => Self::bad_request("Email already registered"),
            EngineError::Conflict(reason) => Self::new(StatusCode::CONFLICT, reason.message()),
            EngineError::Forbidden(msg) => Self::forbidden(msg),
            EngineError::DayRateUnavailable(_) => Self::bad_request("Venue has no daily rate"),
            EngineError::LimitExceeded(msg) => Self::new(StatusCode::UNPROCESSABLE_ENTITY, msg),
            EngineError::JournalError(detail) => {
                // Infrastructure failure: log the detail, leak nothing
                tracing::error!("journal failure: {detail}");
                Self::server_error()
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, err.to_string())
    }
}
