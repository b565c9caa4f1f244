use std::sync::Arc;

use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use ulid::Ulid;

use crate::auth::{AuthError, AuthGate, Claims, hash_password, verify_password};
use crate::model::{Role, User, UserProfile, now_ms};
use crate::observability;

use super::dto::UserDto;
use super::{ApiError, AppState};

/// Any authenticated subject. The one gate every protected endpoint
/// passes through.
pub struct AuthUser(pub Claims);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let token = AuthGate::bearer(header).map_err(auth_failure)?;
        let claims = state.auth.verify(token).map_err(auth_failure)?;
        Ok(AuthUser(claims))
    }
}

/// An authenticated admin.
pub struct AdminUser(pub Claims);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if claims.role != Role::Admin {
            return Err(ApiError::forbidden("Admins only"));
        }
        Ok(AdminUser(claims))
    }
}

fn auth_failure(err: AuthError) -> ApiError {
    metrics::counter!(observability::AUTH_FAILURES_TOTAL).increment(1);
    err.into()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.role == Role::Admin {
        return Err(ApiError::forbidden("Admin accounts cannot self-register"));
    }
    let password_hash = hash_password(&body.password).map_err(|_| ApiError::server_error())?;
    let user = User {
        id: Ulid::new(),
        first_name: body.first_name,
        last_name: body.last_name,
        phone: body.phone,
        email: body.email,
        password_hash,
        role: body.role,
        created_at: now_ms(),
    };
    state.engine.register_user(user).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "User registered successfully" })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(user) = state.engine.user_by_email(&body.email) else {
        return Err(invalid_credentials());
    };
    if !verify_password(&body.password, &user.password_hash) {
        return Err(invalid_credentials());
    }
    let token = state
        .auth
        .issue(user.id, user.role)
        .map_err(|_| ApiError::server_error())?;
    tracing::info!(email = %user.email, role = ?user.role, "login");
    Ok(Json(serde_json::json!({
        "token": token,
        "user": UserDto::from(&UserProfile::from(&user)),
    })))
}

fn invalid_credentials() -> ApiError {
    metrics::counter!(observability::AUTH_FAILURES_TOTAL).increment(1);
    ApiError::bad_request("Invalid credentials")
}
