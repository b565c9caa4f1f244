mod admission;
mod error;
pub mod pricing;
mod mutations;
mod queries;

pub use error::{ConflictReason, EngineError};
pub use pricing::Quote;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{RwLock, mpsc, oneshot};
use ulid::Ulid;

use crate::ledger::Journal;
use crate::model::*;
use crate::observability;

/// A venue document plus its active calendar. The calendar holds
/// accepted bookings only — conflict-flagged ledger rows never appear
/// here, so they cannot block later requests.
#[derive(Debug, Clone)]
pub struct VenueState {
    pub venue: Venue,
    pub calendar: Vec<Booking>,
}

impl VenueState {
    fn new(venue: Venue) -> Self {
        Self {
            venue,
            calendar: Vec::new(),
        }
    }
}

pub type SharedVenueState = Arc<RwLock<VenueState>>;

// ── Group-commit journal channel ─────────────────────────────

pub(super) enum JournalCommand {
    Append {
        event: Event,
        response: oneshot::Sender<io::Result<()>>,
    },
    Compact {
        events: Vec<Event>,
        response: oneshot::Sender<io::Result<()>>,
    },
    AppendsSinceCompact {
        response: oneshot::Sender<u64>,
    },
}

/// Background task that owns the journal and batches appends for group
/// commit:
/// 1. Block until the first Append arrives.
/// 2. Buffer it (no fsync).
/// 3. Drain all immediately available Appends (the batch window).
/// 4. Single flush_sync for the whole batch.
/// 5. Respond to all senders.
async fn journal_writer_loop(mut journal: Journal, mut rx: mpsc::Receiver<JournalCommand>) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            JournalCommand::Append { event, response } => {
                let mut batch = vec![(event, response)];

                // Drain all immediately available appends
                loop {
                    match rx.try_recv() {
                        Ok(JournalCommand::Append { event, response }) => {
                            batch.push((event, response));
                        }
                        Ok(other) => {
                            // Flush the current batch first, then handle the
                            // non-append command
                            flush_and_respond(&mut journal, &mut batch);
                            handle_non_append(&mut journal, other);
                            break;
                        }
                        Err(_) => break, // channel empty — flush batch
                    }
                }

                if !batch.is_empty() {
                    flush_and_respond(&mut journal, &mut batch);
                }
            }
            other => handle_non_append(&mut journal, other),
        }
    }
}

fn flush_and_respond(
    journal: &mut Journal,
    batch: &mut Vec<(Event, oneshot::Sender<io::Result<()>>)>,
) {
    metrics::histogram!(observability::JOURNAL_FLUSH_BATCH_SIZE).record(batch.len() as f64);
    let flush_start = std::time::Instant::now();
    let result = flush_batch(journal, batch);
    metrics::histogram!(observability::JOURNAL_FLUSH_DURATION_SECONDS)
        .record(flush_start.elapsed().as_secs_f64());
    for (_, tx) in batch.drain(..) {
        let r = match &result {
            Ok(()) => Ok(()),
            Err(e) => Err(io::Error::new(e.kind(), e.to_string())),
        };
        let _ = tx.send(r);
    }
}

fn flush_batch(
    journal: &mut Journal,
    batch: &[(Event, oneshot::Sender<io::Result<()>>)],
) -> io::Result<()> {
    let mut append_err: Option<io::Error> = None;
    for (event, _) in batch {
        if let Err(e) = journal.append_buffered(event) {
            append_err = Some(e);
            break;
        }
    }
    // Always flush — even on append error — so partially buffered bytes
    // don't leak into the next batch (callers were told this batch failed).
    let flush_err = journal.flush_sync().err();
    if let Some(e) = append_err {
        return Err(e);
    }
    if let Some(e) = flush_err {
        return Err(e);
    }
    Ok(())
}

fn handle_non_append(journal: &mut Journal, cmd: JournalCommand) {
    match cmd {
        JournalCommand::Compact { events, response } => {
            let result = Journal::write_compact_file(journal.path(), &events)
                .and_then(|()| journal.swap_compact_file());
            let _ = response.send(result);
        }
        JournalCommand::AppendsSinceCompact { response } => {
            let _ = response.send(journal.appends_since_compact());
        }
        JournalCommand::Append { .. } => unreachable!(),
    }
}

// ── Engine ───────────────────────────────────────────────────

pub struct Engine {
    /// Live venue documents and their calendars.
    venues: DashMap<Ulid, SharedVenueState>,
    users: DashMap<Ulid, User>,
    /// Unique-email index: email → user id.
    email_index: DashMap<String, Ulid>,
    /// Every admission attempt ever journaled, accepted or rejected.
    /// Rows outlive venue deletion and are never removed.
    ledger: DashMap<Ulid, Booking>,
    journal_tx: mpsc::Sender<JournalCommand>,
}

impl Engine {
    pub fn new(journal_path: PathBuf) -> io::Result<Self> {
        let events = Journal::replay(&journal_path)?;
        let journal = Journal::open(&journal_path)?;
        let (journal_tx, journal_rx) = mpsc::channel(4096);
        tokio::spawn(journal_writer_loop(journal, journal_rx));

        let engine = Self {
            venues: DashMap::new(),
            users: DashMap::new(),
            email_index: DashMap::new(),
            ledger: DashMap::new(),
            journal_tx,
        };

        // Replay — we're the sole owner of these Arcs, so try_write always
        // succeeds instantly. Never use blocking_write here because this may
        // run inside an async context.
        for event in &events {
            engine.apply_replayed(event);
        }

        metrics::gauge!(observability::VENUES_ACTIVE).set(engine.venues.len() as f64);
        metrics::gauge!(observability::USERS_ACTIVE).set(engine.users.len() as f64);

        Ok(engine)
    }

    fn apply_replayed(&self, event: &Event) {
        match event {
            Event::UserRegistered { user } => {
                self.email_index.insert(user.email.clone(), user.id);
                self.users.insert(user.id, user.clone());
            }
            Event::UserDeleted { id } => {
                if let Some((_, user)) = self.users.remove(id) {
                    self.email_index.remove(&user.email);
                }
            }
            Event::VenueCreated { venue } => {
                self.venues
                    .insert(venue.id, Arc::new(RwLock::new(VenueState::new(venue.clone()))));
            }
            Event::VenueUpdated { venue } => {
                if let Some(entry) = self.venues.get(&venue.id) {
                    let state = entry.value().clone();
                    let mut guard = state.try_write().expect("replay: uncontended write");
                    guard.venue = venue.clone();
                }
            }
            Event::VenueDeleted { id } => {
                self.venues.remove(id);
            }
            Event::BookingRecorded { booking } => {
                if !booking.conflict
                    && let Some(entry) = self.venues.get(&booking.venue)
                {
                    let state = entry.value().clone();
                    let mut guard = state.try_write().expect("replay: uncontended write");
                    guard.calendar.push(booking.clone());
                }
                self.ledger.insert(booking.id, booking.clone());
            }
        }
    }

    /// Write an event to the journal via the background group-commit writer.
    pub(super) async fn journal_append(&self, event: &Event) -> Result<(), EngineError> {
        let (tx, rx) = oneshot::channel();
        self.journal_tx
            .send(JournalCommand::Append {
                event: event.clone(),
                response: tx,
            })
            .await
            .map_err(|_| EngineError::JournalError("journal writer shut down".into()))?;
        rx.await
            .map_err(|_| EngineError::JournalError("journal writer dropped response".into()))?
            .map_err(|e| EngineError::JournalError(e.to_string()))
    }

    pub fn venue_state(&self, id: &Ulid) -> Option<SharedVenueState> {
        self.venues.get(id).map(|e| e.value().clone())
    }

    pub(super) fn venue_states(&self) -> Vec<SharedVenueState> {
        self.venues.iter().map(|e| e.value().clone()).collect()
    }

    pub(super) fn venue_count(&self) -> usize {
        self.venues.len()
    }

    pub(super) fn user_count(&self) -> usize {
        self.users.len()
    }

    pub(super) fn users_snapshot(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by_key(|u| u.id);
        users
    }

    pub(super) fn ledger_snapshot(&self) -> Vec<Booking> {
        let mut rows: Vec<Booking> = self.ledger.iter().map(|e| e.value().clone()).collect();
        // Ulids are time-ordered — id order is creation order
        rows.sort_by_key(|b| b.id);
        rows
    }

    pub(super) fn user_entry(&self, id: &Ulid) -> Option<User> {
        self.users.get(id).map(|e| e.value().clone())
    }

    pub(super) fn user_id_for_email(&self, email: &str) -> Option<Ulid> {
        self.email_index.get(email).map(|e| *e.value())
    }

    pub(super) fn insert_user(&self, user: User) {
        self.email_index.insert(user.email.clone(), user.id);
        self.users.insert(user.id, user);
        metrics::gauge!(observability::USERS_ACTIVE).set(self.users.len() as f64);
    }

    pub(super) fn remove_user(&self, id: &Ulid) -> Option<User> {
        let (_, user) = self.users.remove(id)?;
        self.email_index.remove(&user.email);
        metrics::gauge!(observability::USERS_ACTIVE).set(self.users.len() as f64);
        Some(user)
    }

    pub(super) fn insert_venue(&self, venue: Venue) {
        self.venues
            .insert(venue.id, Arc::new(RwLock::new(VenueState::new(venue))));
        metrics::gauge!(observability::VENUES_ACTIVE).set(self.venues.len() as f64);
    }

    pub(super) fn remove_venue(&self, id: &Ulid) -> Option<SharedVenueState> {
        let removed = self.venues.remove(id).map(|(_, state)| state);
        metrics::gauge!(observability::VENUES_ACTIVE).set(self.venues.len() as f64);
        removed
    }

    pub(super) fn record_in_ledger(&self, booking: Booking) {
        self.ledger.insert(booking.id, booking);
    }

    pub fn ledger_booking(&self, id: &Ulid) -> Option<Booking> {
        self.ledger.get(id).map(|e| e.value().clone())
    }

    pub async fn journal_appends_since_compact(&self) -> u64 {
        let (tx, rx) = oneshot::channel();
        if self
            .journal_tx
            .send(JournalCommand::AppendsSinceCompact { response: tx })
            .await
            .is_err()
        {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}
