use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use ulid::Ulid;

use crate::model::{
    BookingKind, BookingRequest, DaySpan, Money, QuoteRequest, TimeSlot,
};

use super::auth::AuthUser;
use super::dto::{BookingDto, PopulatedBookingDto, QuoteDto, TIME_FMT};
use super::{ApiError, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingTypeTag {
    Hour,
    Day,
}

/// The submission wire format: kind tag plus the kind's fields, with the
/// caller-derived counts and total. Times are `HH:MM` strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingBody {
    pub venue_id: Ulid,
    pub booking_type: BookingTypeTag,
    pub date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub days: Option<u32>,
    pub hours: Option<u32>,
    pub total: Money,
}

fn parse_time(s: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(s, TIME_FMT).map_err(|_| ApiError::bad_request("Invalid time"))
}

/// Assemble the kind from the flat wire fields, rejecting submissions
/// that miss their kind's field-group or invert the range.
fn booking_kind(body: &CreateBookingBody) -> Result<BookingKind, ApiError> {
    match body.booking_type {
        BookingTypeTag::Hour => {
            let (Some(date), Some(start), Some(end), Some(hours)) =
                (body.date, &body.start_time, &body.end_time, body.hours)
            else {
                return Err(ApiError::bad_request("Missing hourly booking fields"));
            };
            let start = parse_time(start)?;
            let end = parse_time(end)?;
            if start >= end {
                return Err(ApiError::bad_request("Invalid time range"));
            }
            Ok(BookingKind::Hour {
                slot: TimeSlot::new(date, start, end),
                hours,
            })
        }
        BookingTypeTag::Day => {
            let (Some(start), Some(end), Some(days)) = (body.date, body.end_date, body.days)
            else {
                return Err(ApiError::bad_request("Missing daily booking fields"));
            };
            if start > end {
                return Err(ApiError::bad_request("Invalid date range"));
            }
            Ok(BookingKind::Day {
                span: DaySpan::new(start, end),
                days,
            })
        }
    }
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(body): Json<CreateBookingBody>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = booking_kind(&body)?;
    let request = BookingRequest {
        kind,
        total: body.total,
    };
    let booking = state
        .engine
        .attempt_booking(body.venue_id, claims.sub, request)
        .await?;
    Ok((StatusCode::CREATED, Json(BookingDto::from(&booking))))
}

/// The requester-side estimate, priced by the same module admission
/// records trust. Public: rates are public venue data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBody {
    pub venue_id: Ulid,
    pub booking_type: BookingTypeTag,
    pub date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

pub async fn quote(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QuoteBody>,
) -> Result<impl IntoResponse, ApiError> {
    let request = match body.booking_type {
        BookingTypeTag::Hour => {
            let (Some(start), Some(end)) = (&body.start_time, &body.end_time) else {
                return Err(ApiError::bad_request("Missing hourly booking fields"));
            };
            QuoteRequest::Hour {
                start: parse_time(start)?,
                end: parse_time(end)?,
            }
        }
        BookingTypeTag::Day => {
            let (Some(start), Some(end)) = (body.date, body.end_date) else {
                return Err(ApiError::bad_request("Missing daily booking fields"));
            };
            QuoteRequest::Day { start, end }
        }
    };
    let quote = state.engine.quote(body.venue_id, request).await?;
    Ok(Json(QuoteDto::from(quote)))
}

pub async fn mine(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let views = state.engine.bookings_for_user(claims.sub).await;
    Ok(Json(
        views.iter().map(PopulatedBookingDto::from).collect::<Vec<_>>(),
    ))
}
