use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds — wall-clock timestamps only.
pub type Ms = i64;

pub fn now_ms() -> Ms {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as Ms
}

/// Monetary amount in whole currency units. Rates may be fractional;
/// hourly totals are ceiled to the next unit before they are recorded.
pub type Money = f64;

/// Closed calendar-date interval `[start, end]` — both endpoint dates
/// are occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DaySpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start <= end, "DaySpan start must not be after end");
        Self { start, end }
    }

    /// Closed-interval overlap: sharing an endpoint date counts.
    pub fn overlaps(&self, other: &DaySpan) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Same-day time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        debug_assert!(start < end, "TimeSlot start must be before end");
        Self { date, start, end }
    }

    /// Half-open overlap on the same date — a slot ending exactly when
    /// another starts does not overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.date == other.date && self.start < other.end && other.start < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    VenueOwner,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Ulid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: Ms,
}

/// A user as exposed to clients — everything but the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Ulid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub role: Role,
    pub created_at: Ms,
}

impl From<&User> for UserProfile {
    fn from(u: &User) -> Self {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: Ulid,
    pub name: String,
    pub location: String,
    /// Attendee headcount, not concurrency.
    pub capacity: u32,
    pub amenities: BTreeSet<String>,
    pub price_per_hour: Money,
    /// Absent means the venue cannot be priced by the day.
    pub price_per_day: Option<Money>,
    pub description: String,
    pub image: Option<String>,
    pub owner: Ulid,
    pub verified: bool,
    pub created_at: Ms,
}

/// Partial venue update — `None` leaves the field untouched. The
/// `verified` flag is deliberately absent: owners cannot set it.
#[derive(Debug, Clone, Default)]
pub struct VenuePatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<u32>,
    pub amenities: Option<BTreeSet<String>>,
    pub price_per_hour: Option<Money>,
    pub price_per_day: Option<Money>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// What was booked. Exactly one field-group exists per booking, matching
/// the tag — the enum makes the invariant structural.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BookingKind {
    /// An hourly slot on a single date, with the caller-derived hour count.
    Hour { slot: TimeSlot, hours: u32 },
    /// A daily range (closed interval), with the caller-derived day count.
    Day { span: DaySpan, days: u32 },
}

impl BookingKind {
    pub fn is_hourly(&self) -> bool {
        matches!(self, BookingKind::Hour { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub user: Ulid,
    pub venue: Ulid,
    pub kind: BookingKind,
    pub total: Money,
    /// True marks a rejected-request audit record. Such a row never
    /// occupies the venue calendar.
    pub conflict: bool,
    pub created_at: Ms,
}

/// An admission request as submitted. The derived count inside `kind`
/// and the `total` are the caller's claim, recorded as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub kind: BookingKind,
    pub total: Money,
}

/// A prospective booking to be priced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuoteRequest {
    Hour { start: NaiveTime, end: NaiveTime },
    Day { start: NaiveDate, end: NaiveDate },
}

/// The journal record format — one flat variant per state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    UserRegistered { user: User },
    UserDeleted { id: Ulid },
    VenueCreated { venue: Venue },
    VenueUpdated { venue: Venue },
    VenueDeleted { id: Ulid },
    BookingRecorded { booking: Booking },
}

// ── Query result types ───────────────────────────────────────────

/// A booking joined with its venue; the venue may have been deleted
/// since the booking was recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingView {
    pub booking: Booking,
    pub venue: Option<Venue>,
}

/// Admin view of a ledger row: venue and user both joined.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    pub booking: Booking,
    pub venue: Option<Venue>,
    pub user: Option<UserProfile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Analytics {
    pub user_count: usize,
    pub venue_count: usize,
}
