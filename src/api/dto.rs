//! Wire representations: camelCase field names, flat booking records,
//! `HH:MM` times.

use chrono::NaiveDate;
use serde::Serialize;
use ulid::Ulid;

use crate::engine::Quote;
use crate::model::*;

pub const TIME_FMT: &str = "%H:%M";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueDto {
    pub id: Ulid,
    pub name: String,
    pub location: String,
    pub capacity: u32,
    pub amenities: Vec<String>,
    pub price_per_hour: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_day: Option<Money>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub owner: Ulid,
    pub verified: bool,
    pub created_at: Ms,
}

impl From<&Venue> for VenueDto {
    fn from(v: &Venue) -> Self {
        Self {
            id: v.id,
            name: v.name.clone(),
            location: v.location.clone(),
            capacity: v.capacity,
            amenities: v.amenities.iter().cloned().collect(),
            price_per_hour: v.price_per_hour,
            price_per_day: v.price_per_day,
            description: v.description.clone(),
            image: v.image.clone(),
            owner: v.owner,
            verified: v.verified,
            created_at: v.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Ulid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub role: Role,
    pub created_at: Ms,
}

impl From<&UserProfile> for UserDto {
    fn from(u: &UserProfile) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            phone: u.phone.clone(),
            email: u.email.clone(),
            role: u.role,
            created_at: u.created_at,
        }
    }
}

/// The kind-dependent booking fields, flattened for the wire. `user` and
/// `venue` are added by the concrete DTOs below because joined views
/// replace them with documents.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCore {
    pub id: Ulid,
    pub booking_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    pub total: Money,
    pub conflict: bool,
    pub created_at: Ms,
}

impl From<&Booking> for BookingCore {
    fn from(b: &Booking) -> Self {
        let mut core = Self {
            id: b.id,
            booking_type: "hour",
            date: None,
            end_date: None,
            start_time: None,
            end_time: None,
            hours: None,
            days: None,
            total: b.total,
            conflict: b.conflict,
            created_at: b.created_at,
        };
        match b.kind {
            BookingKind::Hour { slot, hours } => {
                core.date = Some(slot.date);
                core.start_time = Some(slot.start.format(TIME_FMT).to_string());
                core.end_time = Some(slot.end.format(TIME_FMT).to_string());
                core.hours = Some(hours);
            }
            BookingKind::Day { span, days } => {
                core.booking_type = "day";
                core.date = Some(span.start);
                core.end_date = Some(span.end);
                core.days = Some(days);
            }
        }
        core
    }
}

#[derive(Debug, Serialize)]
pub struct BookingDto {
    #[serde(flatten)]
    pub core: BookingCore,
    pub user: Ulid,
    pub venue: Ulid,
}

impl From<&Booking> for BookingDto {
    fn from(b: &Booking) -> Self {
        Self {
            core: BookingCore::from(b),
            user: b.user,
            venue: b.venue,
        }
    }
}

/// A booking with its venue document joined in — the requester's view.
#[derive(Debug, Serialize)]
pub struct PopulatedBookingDto {
    #[serde(flatten)]
    pub core: BookingCore,
    pub user: Ulid,
    pub venue: Option<VenueDto>,
}

impl From<&BookingView> for PopulatedBookingDto {
    fn from(view: &BookingView) -> Self {
        Self {
            core: BookingCore::from(&view.booking),
            user: view.booking.user,
            venue: view.venue.as_ref().map(VenueDto::from),
        }
    }
}

/// A ledger row with venue and user joined — the admin audit view.
#[derive(Debug, Serialize)]
pub struct AdminBookingDto {
    #[serde(flatten)]
    pub core: BookingCore,
    pub user: Option<UserDto>,
    pub venue: Option<VenueDto>,
}

impl From<&LedgerEntry> for AdminBookingDto {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            core: BookingCore::from(&entry.booking),
            user: entry.user.as_ref().map(UserDto::from),
            venue: entry.venue.as_ref().map(VenueDto::from),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    pub total: Money,
}

impl From<Quote> for QuoteDto {
    fn from(q: Quote) -> Self {
        match q {
            Quote::Hourly { hours, total } => Self {
                hours: Some(hours),
                days: None,
                total,
            },
            Quote::Daily { days, total } => Self {
                hours: None,
                days: Some(days),
                total,
            },
        }
    }
}
