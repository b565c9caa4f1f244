use ulid::Ulid;

use crate::model::*;

use super::pricing::{self, Quote};
use super::{Engine, EngineError};

impl Engine {
    pub async fn list_venues(&self) -> Vec<Venue> {
        let states = self.venue_states();
        let mut venues = Vec::with_capacity(states.len());
        for state in states {
            venues.push(state.read().await.venue.clone());
        }
        venues.sort_by_key(|v| v.id);
        venues
    }

    pub async fn get_venue(&self, id: Ulid) -> Option<Venue> {
        let state = self.venue_state(&id)?;
        let guard = state.read().await;
        Some(guard.venue.clone())
    }

    pub async fn venues_by_owner(&self, owner: Ulid) -> Vec<Venue> {
        let mut venues: Vec<Venue> = Vec::new();
        for state in self.venue_states() {
            let guard = state.read().await;
            if guard.venue.owner == owner {
                venues.push(guard.venue.clone());
            }
        }
        venues.sort_by_key(|v| v.id);
        venues
    }

    /// Price a prospective booking with the canonical arithmetic. Fails
    /// `NotFound` for a missing venue and `DayRateUnavailable` when a
    /// daily quote is asked of a venue that has no daily rate.
    pub async fn quote(&self, venue_id: Ulid, request: QuoteRequest) -> Result<Quote, EngineError> {
        let venue = self
            .get_venue(venue_id)
            .await
            .ok_or(EngineError::NotFound(venue_id))?;
        match request {
            QuoteRequest::Hour { start, end } => {
                let hours = pricing::billable_hours(start, end);
                Ok(Quote::Hourly {
                    hours,
                    total: pricing::hourly_total(hours, venue.price_per_hour),
                })
            }
            QuoteRequest::Day { start, end } => {
                let rate = venue
                    .price_per_day
                    .ok_or(EngineError::DayRateUnavailable(venue_id))?;
                let days = pricing::billable_days(start, end);
                Ok(Quote::Daily {
                    days,
                    total: pricing::daily_total(days, rate),
                })
            }
        }
    }

    /// The requester's own ledger rows in creation order, venue joined.
    /// Conflict-flagged attempts are included — the requester can see
    /// what was rejected.
    pub async fn bookings_for_user(&self, user: Ulid) -> Vec<BookingView> {
        let mut views = Vec::new();
        for booking in self.ledger_snapshot() {
            if booking.user != user {
                continue;
            }
            let venue = self.get_venue(booking.venue).await;
            views.push(BookingView { booking, venue });
        }
        views
    }

    /// Every ledger row, accepted and rejected, in creation order —
    /// the admin audit view. Venue and user joins are optional because
    /// either may have been deleted since.
    pub async fn all_bookings(&self) -> Vec<LedgerEntry> {
        let mut entries = Vec::new();
        for booking in self.ledger_snapshot() {
            let venue = self.get_venue(booking.venue).await;
            let user = self.user_entry(&booking.user).map(|u| UserProfile::from(&u));
            entries.push(LedgerEntry { booking, venue, user });
        }
        entries
    }

    pub fn list_users(&self) -> Vec<UserProfile> {
        self.users_snapshot()
            .iter()
            .map(UserProfile::from)
            .collect()
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        let id = self.user_id_for_email(email)?;
        self.user_entry(&id)
    }

    pub fn user_profile(&self, id: Ulid) -> Option<UserProfile> {
        self.user_entry(&id).map(|u| UserProfile::from(&u))
    }

    pub fn analytics(&self) -> Analytics {
        Analytics {
            user_count: self.user_count(),
            venue_count: self.venue_count(),
        }
    }
}
