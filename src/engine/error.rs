use ulid::Ulid;

/// Which overlap rule rejected the request — only the message text differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    OverlappingDates,
    OverlappingTime,
}

impl ConflictReason {
    pub fn message(&self) -> &'static str {
        match self {
            ConflictReason::OverlappingDates => "Booking conflict: overlapping dates.",
            ConflictReason::OverlappingTime => "Booking conflict: overlapping time.",
        }
    }
}

#[derive(Debug)]
pub enum EngineError {
    NotFound(Ulid),
    EmailTaken(String),
    Conflict(ConflictReason),
    Forbidden(&'static str),
    DayRateUnavailable(Ulid),
    LimitExceeded(&'static str),
    JournalError(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::EmailTaken(email) => write!(f, "email already registered: {email}"),
            EngineError::Conflict(reason) => write!(f, "{}", reason.message()),
            EngineError::Forbidden(msg) => write!(f, "{msg}"),
            EngineError::DayRateUnavailable(id) => {
                write!(f, "venue {id} has no daily rate")
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            EngineError::JournalError(e) => write!(f, "journal error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}
