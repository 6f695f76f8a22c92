use crate::model::{BookingId, BookingStatus, Conflict};
use crate::store::StoreError;

#[derive(Debug)]
pub enum EngineError {
    /// End not after start, start in the past on create, or a date range
    /// wider than the expansion cap.
    InvalidInterval(&'static str),
    NotesTooLong(usize),
    /// A weekly-template entry that can never match a date.
    InvalidSlot(&'static str),
    /// The requested interval collides with existing bookings; carries them.
    ResourceUnavailable(Vec<Conflict>),
    NotFound(BookingId),
    /// Edit attempted on a booking in a terminal state.
    BookingNotModifiable(BookingStatus),
    InvalidStateTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    /// Storage failure, passed through unmodified.
    Backend(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidInterval(msg) => write!(f, "invalid interval: {msg}"),
            EngineError::NotesTooLong(len) => {
                write!(
                    f,
                    "notes too long: {len} > {}",
                    crate::limits::MAX_NOTES_LEN
                )
            }
            EngineError::InvalidSlot(msg) => write!(f, "invalid weekly slot: {msg}"),
            EngineError::ResourceUnavailable(conflicts) => {
                write!(
                    f,
                    "resource unavailable: {} conflicting booking(s)",
                    conflicts.len()
                )
            }
            EngineError::NotFound(id) => write!(f, "booking not found: {id}"),
            EngineError::BookingNotModifiable(status) => {
                write!(f, "booking cannot be modified in status {status}")
            }
            EngineError::InvalidStateTransition { from, to } => {
                write!(f, "illegal status transition {from} -> {to}")
            }
            EngineError::Backend(e) => write!(f, "backend error: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => EngineError::NotFound(id),
            StoreError::Backend(msg) => EngineError::Backend(msg),
        }
    }
}
