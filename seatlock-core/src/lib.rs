pub mod clock;
pub mod seat;
pub mod registry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use registry::{RegistrySettings, SeatRegistry, MAX_LOCK_DURATION};
pub use seat::{Seat, SeatId, SeatSnapshot, SeatState, SeatStatus};

/// Why a seat refused the requested transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    AlreadyBooked,
    LockedByAnotherUser,
    NotLocked,
}

impl std::fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictReason::AlreadyBooked => write!(f, "already booked"),
            ConflictReason::LockedByAnotherUser => write!(f, "locked by another user"),
            ConflictReason::NotLocked => write!(f, "not locked"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Seat not found: {0}")]
    NotFound(SeatId),
    #[error("Seat {seat_id} conflict: {reason}")]
    Conflict {
        seat_id: SeatId,
        reason: ConflictReason,
    },
    #[error("Seat {seat_id} is locked by another user")]
    Forbidden { seat_id: SeatId },
    #[error("Internal registry error: {0}")]
    Internal(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
