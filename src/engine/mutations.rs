use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::observability;

use super::admission::{conflict_reason, find_conflict};
use super::{Engine, EngineError, JournalCommand};

use tokio::sync::oneshot;

impl Engine {
    /// Register a new user. Emails are unique; the caller supplies the
    /// password hash — the engine never sees plaintext credentials.
    pub async fn register_user(&self, user: User) -> Result<User, EngineError> {
        if self.user_count() >= MAX_USERS {
            return Err(EngineError::LimitExceeded("too many users"));
        }
        if user.email.len() > MAX_EMAIL_LEN {
            return Err(EngineError::LimitExceeded("email too long"));
        }
        if user.first_name.len() > MAX_NAME_LEN || user.last_name.len() > MAX_NAME_LEN {
            return Err(EngineError::LimitExceeded("name too long"));
        }
        if user.phone.len() > MAX_PHONE_LEN {
            return Err(EngineError::LimitExceeded("phone too long"));
        }
        if self.user_id_for_email(&user.email).is_some() {
            return Err(EngineError::EmailTaken(user.email));
        }

        let event = Event::UserRegistered { user: user.clone() };
        self.journal_append(&event).await?;
        self.insert_user(user.clone());
        Ok(user)
    }

    pub async fn delete_user(&self, id: Ulid) -> Result<(), EngineError> {
        if self.user_entry(&id).is_none() {
            return Err(EngineError::NotFound(id));
        }
        let event = Event::UserDeleted { id };
        self.journal_append(&event).await?;
        self.remove_user(&id);
        Ok(())
    }

    pub async fn create_venue(&self, venue: Venue) -> Result<Venue, EngineError> {
        if self.venue_count() >= MAX_VENUES {
            return Err(EngineError::LimitExceeded("too many venues"));
        }
        validate_venue_fields(
            &venue.name,
            &venue.location,
            &venue.description,
            venue.image.as_deref(),
            &venue.amenities,
        )?;

        let event = Event::VenueCreated { venue: venue.clone() };
        self.journal_append(&event).await?;
        self.insert_venue(venue.clone());
        Ok(venue)
    }

    /// Patch a venue. Fails `NotFound` when the venue is missing or is not
    /// owned by `requester` — ownership is not disclosed to non-owners.
    pub async fn update_venue(
        &self,
        id: Ulid,
        requester: Ulid,
        patch: VenuePatch,
    ) -> Result<Venue, EngineError> {
        let state = self.venue_state(&id).ok_or(EngineError::NotFound(id))?;
        let mut guard = state.write().await;
        if guard.venue.owner != requester {
            return Err(EngineError::NotFound(id));
        }

        let mut venue = guard.venue.clone();
        if let Some(name) = patch.name {
            venue.name = name;
        }
        if let Some(location) = patch.location {
            venue.location = location;
        }
        if let Some(capacity) = patch.capacity {
            venue.capacity = capacity;
        }
        if let Some(amenities) = patch.amenities {
            venue.amenities = amenities;
        }
        if let Some(rate) = patch.price_per_hour {
            venue.price_per_hour = rate;
        }
        if let Some(rate) = patch.price_per_day {
            venue.price_per_day = Some(rate);
        }
        if let Some(description) = patch.description {
            venue.description = description;
        }
        if let Some(image) = patch.image {
            venue.image = Some(image);
        }
        validate_venue_fields(
            &venue.name,
            &venue.location,
            &venue.description,
            venue.image.as_deref(),
            &venue.amenities,
        )?;

        let event = Event::VenueUpdated { venue: venue.clone() };
        self.journal_append(&event).await?;
        guard.venue = venue.clone();
        Ok(venue)
    }

    /// Delete a venue. `requester = Some(owner)` enforces ownership (the
    /// owner route); `None` is the admin path and deletes unconditionally.
    /// Ledger rows for the venue are kept — bookings are never deleted.
    pub async fn delete_venue(&self, id: Ulid, requester: Option<Ulid>) -> Result<(), EngineError> {
        let state = self.venue_state(&id).ok_or(EngineError::NotFound(id))?;
        if let Some(owner) = requester {
            let guard = state.read().await;
            if guard.venue.owner != owner {
                return Err(EngineError::NotFound(id));
            }
        }

        let event = Event::VenueDeleted { id };
        self.journal_append(&event).await?;
        self.remove_venue(&id);
        Ok(())
    }

    /// The admission decision procedure. Every call that resolves a venue
    /// appends exactly one ledger row: accepted requests land on the
    /// calendar with `conflict = false`, rejected ones are journaled with
    /// `conflict = true` for the audit trail and reported as an error.
    ///
    /// The venue write lock is held across check and insert, so two
    /// concurrent requests for the same slot cannot both be accepted.
    pub async fn attempt_booking(
        &self,
        venue_id: Ulid,
        requester: Ulid,
        request: BookingRequest,
    ) -> Result<Booking, EngineError> {
        let started = std::time::Instant::now();
        let state = self
            .venue_state(&venue_id)
            .ok_or(EngineError::NotFound(venue_id))?;
        let mut guard = state.write().await;
        if guard.calendar.len() >= MAX_BOOKINGS_PER_VENUE {
            return Err(EngineError::LimitExceeded("too many bookings on venue"));
        }

        let booking = Booking {
            id: Ulid::new(),
            user: requester,
            venue: venue_id,
            kind: request.kind,
            total: request.total,
            conflict: false,
            created_at: now_ms(),
        };

        let outcome = match find_conflict(&guard.calendar, &request.kind) {
            Some(_blocking) => {
                let rejected = Booking {
                    conflict: true,
                    ..booking
                };
                self.journal_append(&Event::BookingRecorded {
                    booking: rejected.clone(),
                })
                .await?;
                self.record_in_ledger(rejected);
                metrics::counter!(observability::ADMISSIONS_TOTAL, "outcome" => "conflict")
                    .increment(1);
                Err(EngineError::Conflict(conflict_reason(&request.kind)))
            }
            None => {
                self.journal_append(&Event::BookingRecorded {
                    booking: booking.clone(),
                })
                .await?;
                guard.calendar.push(booking.clone());
                self.record_in_ledger(booking.clone());
                metrics::counter!(observability::ADMISSIONS_TOTAL, "outcome" => "accepted")
                    .increment(1);
                Ok(booking)
            }
        };
        metrics::histogram!(observability::ADMISSION_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        outcome
    }

    /// Rewrite the journal with only the events needed to recreate the
    /// current state: users, live venues, then every ledger row. Venues
    /// come before bookings so replay can rebuild calendars.
    pub async fn compact_journal(&self) -> Result<(), EngineError> {
        let mut events = Vec::new();

        for user in self.users_snapshot() {
            events.push(Event::UserRegistered { user });
        }

        let mut venues = Vec::new();
        for state in self.venue_states() {
            venues.push(state.read().await.venue.clone());
        }
        venues.sort_by_key(|v| v.id);
        for venue in venues {
            events.push(Event::VenueCreated { venue });
        }

        for booking in self.ledger_snapshot() {
            events.push(Event::BookingRecorded { booking });
        }

        let (tx, rx) = oneshot::channel();
        self.journal_tx
            .send(JournalCommand::Compact { events, response: tx })
            .await
            .map_err(|_| EngineError::JournalError("journal writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::JournalError("journal writer dropped response".into()))?
            .map_err(|e| EngineError::JournalError(e.to_string()))
    }
}

fn validate_venue_fields(
    name: &str,
    location: &str,
    description: &str,
    image: Option<&str>,
    amenities: &std::collections::BTreeSet<String>,
) -> Result<(), EngineError> {
    if name.len() > MAX_NAME_LEN {
        return Err(EngineError::LimitExceeded("venue name too long"));
    }
    if location.len() > MAX_LOCATION_LEN {
        return Err(EngineError::LimitExceeded("location too long"));
    }
    if description.len() > MAX_DESCRIPTION_LEN {
        return Err(EngineError::LimitExceeded("description too long"));
    }
    if image.is_some_and(|url| url.len() > MAX_IMAGE_URL_LEN) {
        return Err(EngineError::LimitExceeded("image url too long"));
    }
    if amenities.len() > MAX_AMENITIES {
        return Err(EngineError::LimitExceeded("too many amenities"));
    }
    if amenities.iter().any(|a| a.len() > MAX_AMENITY_LEN) {
        return Err(EngineError::LimitExceeded("amenity too long"));
    }
    Ok(())
}
