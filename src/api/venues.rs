use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use ulid::Ulid;

use crate::model::{Money, Role, Venue, VenuePatch, now_ms};

use super::auth::AuthUser;
use super::dto::VenueDto;
use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueBody {
    pub name: String,
    pub location: String,
    pub capacity: u32,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
    pub price_per_hour: Money,
    pub price_per_day: Option<Money>,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenuePatchBody {
    pub name: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<u32>,
    pub amenities: Option<BTreeSet<String>>,
    pub price_per_hour: Option<Money>,
    pub price_per_day: Option<Money>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl From<VenuePatchBody> for VenuePatch {
    fn from(b: VenuePatchBody) -> Self {
        Self {
            name: b.name,
            location: b.location,
            capacity: b.capacity,
            amenities: b.amenities,
            price_per_hour: b.price_per_hour,
            price_per_day: b.price_per_day,
            description: b.description,
            image: b.image,
        }
    }
}

pub async fn list(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let venues = state.engine.list_venues().await;
    Json(venues.iter().map(VenueDto::from).collect::<Vec<_>>())
}

pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Ulid>,
) -> Result<impl IntoResponse, ApiError> {
    let venue = state
        .engine
        .get_venue(id)
        .await
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "Venue not found"))?;
    Ok(Json(VenueDto::from(&venue)))
}

pub async fn mine(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    if claims.role != Role::VenueOwner {
        return Err(ApiError::forbidden("Only venue owners can view their venues"));
    }
    let venues = state.engine.venues_by_owner(claims.sub).await;
    Ok(Json(venues.iter().map(VenueDto::from).collect::<Vec<_>>()))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(body): Json<VenueBody>,
) -> Result<impl IntoResponse, ApiError> {
    if claims.role != Role::VenueOwner {
        return Err(ApiError::forbidden("Only venue owners can add venues"));
    }
    let venue = Venue {
        id: Ulid::new(),
        name: body.name,
        location: body.location,
        capacity: body.capacity,
        amenities: body.amenities,
        price_per_hour: body.price_per_hour,
        price_per_day: body.price_per_day,
        description: body.description,
        image: body.image,
        owner: claims.sub,
        verified: false,
        created_at: now_ms(),
    };
    let venue = state.engine.create_venue(venue).await?;
    Ok((StatusCode::CREATED, Json(VenueDto::from(&venue))))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Ulid>,
    Json(body): Json<VenuePatchBody>,
) -> Result<impl IntoResponse, ApiError> {
    if claims.role != Role::VenueOwner {
        return Err(ApiError::forbidden("Only venue owners can edit venues"));
    }
    let venue = state.engine.update_venue(id, claims.sub, body.into()).await?;
    Ok(Json(VenueDto::from(&venue)))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Ulid>,
) -> Result<impl IntoResponse, ApiError> {
    if claims.role != Role::VenueOwner {
        return Err(ApiError::forbidden("Only venue owners can delete venues"));
    }
    state.engine.delete_venue(id, Some(claims.sub)).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
