use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ConflictReason, RegistryError, RegistryResult};

pub type SeatId = u32;

/// Seat status as it appears on the wire
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Locked,
    Booked,
}

/// Lock metadata lives inside the `Locked` variant, so a seat can never carry
/// a holder or expiry while available or booked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatState {
    Available,
    Locked {
        user_id: String,
        expires_at: DateTime<Utc>,
    },
    Booked,
}

#[derive(Debug, Clone)]
pub struct Seat {
    id: SeatId,
    state: SeatState,
}

impl Seat {
    pub fn new(id: SeatId) -> Self {
        Self {
            id,
            state: SeatState::Available,
        }
    }

    pub fn id(&self) -> SeatId {
        self.id
    }

    pub(crate) fn state(&self) -> &SeatState {
        &self.state
    }

    pub fn status(&self) -> SeatStatus {
        match self.state {
            SeatState::Available => SeatStatus::Available,
            SeatState::Locked { .. } => SeatStatus::Locked,
            SeatState::Booked => SeatStatus::Booked,
        }
    }

    /// A lock is stale once `now` reaches its expiry instant.
    pub(crate) fn is_lock_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(&self.state, SeatState::Locked { expires_at, .. } if *expires_at <= now)
    }

    /// Transition: Locked → Available when the lock has expired
    pub(crate) fn release_if_expired(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_lock_expired(now) {
            self.state = SeatState::Available;
            true
        } else {
            false
        }
    }

    /// Transition: Available → Locked, or Locked → Locked for the current holder
    pub(crate) fn lock(&mut self, user_id: &str, expires_at: DateTime<Utc>) -> RegistryResult<()> {
        match &self.state {
            SeatState::Booked => return Err(self.conflict(ConflictReason::AlreadyBooked)),
            SeatState::Locked { user_id: holder, .. } if holder != user_id => {
                return Err(self.conflict(ConflictReason::LockedByAnotherUser));
            }
            SeatState::Available | SeatState::Locked { .. } => {}
        }

        self.state = SeatState::Locked {
            user_id: user_id.to_string(),
            expires_at,
        };
        Ok(())
    }

    /// Transition: Locked → Booked, only for the current holder
    pub(crate) fn confirm(&mut self, user_id: &str) -> RegistryResult<()> {
        match &self.state {
            SeatState::Available => return Err(self.conflict(ConflictReason::NotLocked)),
            SeatState::Booked => return Err(self.conflict(ConflictReason::AlreadyBooked)),
            SeatState::Locked { user_id: holder, .. } if holder != user_id => {
                return Err(RegistryError::Forbidden { seat_id: self.id });
            }
            SeatState::Locked { .. } => {}
        }

        self.state = SeatState::Booked;
        Ok(())
    }

    pub fn snapshot(&self) -> SeatSnapshot {
        let (locked_by, lock_expire_at) = match self.state() {
            SeatState::Locked { user_id, expires_at } => (Some(user_id.clone()), Some(*expires_at)),
            SeatState::Available | SeatState::Booked => (None, None),
        };

        SeatSnapshot {
            id: self.id,
            status: self.status(),
            locked_by,
            lock_expire_at,
        }
    }

    fn conflict(&self, reason: ConflictReason) -> RegistryError {
        RegistryError::Conflict {
            seat_id: self.id,
            reason,
        }
    }
}

/// Point-in-time copy of a seat record, safe to hand out of the registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeatSnapshot {
    pub id: SeatId,
    pub status: SeatStatus,
    pub locked_by: Option<String>,
    pub lock_expire_at: Option<DateTime<Utc>>,
}
