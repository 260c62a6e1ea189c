use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::seat::{Seat, SeatId, SeatSnapshot};
use crate::{RegistryError, RegistryResult};

/// Longest lock a registry will hand out.
pub const MAX_LOCK_DURATION: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Startup parameters for a [`SeatRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrySettings {
    pub total_seats: u32,
    pub lock_duration: Duration,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            total_seats: 10,
            lock_duration: Duration::from_secs(60),
        }
    }
}

/// In-memory authority over a fixed set of seats.
///
/// A single mutex guards the whole table. Every operation sweeps expired
/// locks and then performs its read-modify-write inside the same critical
/// section, so callers never see a half-applied transition and concurrent
/// lock attempts on one seat are strictly ordered.
pub struct SeatRegistry {
    seats: Mutex<Vec<Seat>>,
    total_seats: usize,
    lock_duration: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl SeatRegistry {
    pub fn new(settings: RegistrySettings) -> RegistryResult<Self> {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: RegistrySettings, clock: Arc<dyn Clock>) -> RegistryResult<Self> {
        if settings.total_seats == 0 {
            return Err(RegistryError::Validation(
                "total seats must be positive".to_string(),
            ));
        }
        if settings.lock_duration.is_zero() {
            return Err(RegistryError::Validation(
                "lock duration must be positive".to_string(),
            ));
        }
        if settings.lock_duration > MAX_LOCK_DURATION {
            return Err(RegistryError::Validation(format!(
                "lock duration must not exceed {} seconds",
                MAX_LOCK_DURATION.as_secs()
            )));
        }
        let lock_duration = chrono::Duration::from_std(settings.lock_duration)
            .map_err(|e| RegistryError::Validation(format!("lock duration out of range: {}", e)))?;
        if clock.now().checked_add_signed(lock_duration).is_none() {
            return Err(RegistryError::Validation(
                "lock duration overflows the clock".to_string(),
            ));
        }

        let seats: Vec<Seat> = (1..=settings.total_seats).map(Seat::new).collect();

        Ok(Self {
            total_seats: seats.len(),
            seats: Mutex::new(seats),
            lock_duration,
            clock,
        })
    }

    pub fn total_seats(&self) -> usize {
        self.total_seats
    }

    pub fn lock_duration(&self) -> Duration {
        // Constructed from a std Duration, so this cannot be negative.
        self.lock_duration.to_std().unwrap_or_default()
    }

    /// Snapshot of every seat, ordered by id, after purging stale locks.
    pub fn list_seats(&self) -> Vec<SeatSnapshot> {
        let mut seats = self.table();
        self.sweep_locked(&mut seats);
        seats.iter().map(Seat::snapshot).collect()
    }

    /// Snapshot of a single seat, after purging stale locks.
    pub fn get_seat(&self, seat_id: SeatId) -> RegistryResult<SeatSnapshot> {
        let mut seats = self.table();
        let index = Self::index_of(&seats, seat_id)?;
        self.sweep_locked(&mut seats);
        Ok(seats[index].snapshot())
    }

    /// Lock a seat for `user_id`, or refresh the lock that user already holds.
    /// Returns the new expiry instant.
    pub fn lock_seat(&self, seat_id: SeatId, user_id: &str) -> RegistryResult<DateTime<Utc>> {
        Self::require_user(user_id)?;

        let mut seats = self.table();
        let index = Self::index_of(&seats, seat_id)?;
        let now = self.sweep_locked(&mut seats);

        let expires_at = now.checked_add_signed(self.lock_duration).ok_or_else(|| {
            RegistryError::Internal(format!("lock expiry overflows clock at {}", now))
        })?;
        seats[index].lock(user_id, expires_at)?;

        debug!("Seat {} locked by {} until {}", seat_id, user_id, expires_at);
        Ok(expires_at)
    }

    /// Turn the caller's lock into a permanent booking.
    pub fn confirm_seat(&self, seat_id: SeatId, user_id: &str) -> RegistryResult<()> {
        Self::require_user(user_id)?;

        let mut seats = self.table();
        let index = Self::index_of(&seats, seat_id)?;
        self.sweep_locked(&mut seats);

        seats[index].confirm(user_id)?;

        debug!("Seat {} booked by {}", seat_id, user_id);
        Ok(())
    }

    /// Release every lock whose expiry has passed. Returns how many seats
    /// went back to available.
    pub fn sweep_expired_locks(&self) -> usize {
        let mut seats = self.table();
        let now = self.clock.now();
        Self::release_expired(&mut seats, now)
    }

    fn sweep_locked(&self, seats: &mut [Seat]) -> DateTime<Utc> {
        let now = self.clock.now();
        Self::release_expired(seats, now);
        now
    }

    fn release_expired(seats: &mut [Seat], now: DateTime<Utc>) -> usize {
        let mut released = 0;
        for seat in seats.iter_mut() {
            if seat.release_if_expired(now) {
                info!("Seat {} lock expired, released", seat.id());
                released += 1;
            }
        }
        released
    }

    fn table(&self) -> MutexGuard<'_, Vec<Seat>> {
        // Each transition is a single assignment, so a poisoned guard still
        // holds a consistent table.
        self.seats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn index_of(seats: &[Seat], seat_id: SeatId) -> RegistryResult<usize> {
        let index = (seat_id as usize)
            .checked_sub(1)
            .ok_or(RegistryError::NotFound(seat_id))?;
        if index < seats.len() {
            Ok(index)
        } else {
            Err(RegistryError::NotFound(seat_id))
        }
    }

    fn require_user(user_id: &str) -> RegistryResult<()> {
        if user_id.trim().is_empty() {
            return Err(RegistryError::Validation("user id is required".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for SeatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeatRegistry")
            .field("total_seats", &self.total_seats)
            .field("lock_duration", &self.lock_duration)
            .finish()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::seat::SeatStatus;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Lock(SeatId, u8),
        Confirm(SeatId, u8),
        Advance(i64),
        Sweep,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u32..6, 0u8..3).prop_map(|(s, u)| Op::Lock(s, u)),
            (0u32..6, 0u8..3).prop_map(|(s, u)| Op::Confirm(s, u)),
            (0i64..3000).prop_map(Op::Advance),
            Just(Op::Sweep),
        ]
    }

    proptest! {
        #[test]
        fn operations_preserve_seat_invariants(ops in proptest::collection::vec(op(), 1..64)) {
            let clock = Arc::new(ManualClock::default());
            let settings = RegistrySettings { total_seats: 5, lock_duration: Duration::from_secs(1) };
            let registry = SeatRegistry::with_clock(settings, clock.clone()).unwrap();
            let mut booked = std::collections::BTreeSet::new();

            for op in ops {
                match op {
                    Op::Lock(seat, user) => {
                        let result = registry.lock_seat(seat, &format!("u{}", user));
                        if booked.contains(&seat) {
                            prop_assert!(result.is_err());
                        }
                    }
                    Op::Confirm(seat, user) => {
                        if registry.confirm_seat(seat, &format!("u{}", user)).is_ok() {
                            prop_assert!(booked.insert(seat));
                        }
                    }
                    Op::Advance(ms) => clock.advance(chrono::Duration::milliseconds(ms)),
                    Op::Sweep => {
                        registry.sweep_expired_locks();
                    }
                }

                let now = clock.now();
                let seats = registry.list_seats();
                prop_assert_eq!(seats.len(), 5);
                for (index, seat) in seats.iter().enumerate() {
                    prop_assert_eq!(seat.id as usize, index + 1);
                    prop_assert_eq!(seat.status == SeatStatus::Booked, booked.contains(&seat.id));
                    match seat.status {
                        SeatStatus::Locked => {
                            prop_assert!(seat.locked_by.is_some());
                            prop_assert!(seat.lock_expire_at.map_or(false, |at| at > now));
                        }
                        _ => {
                            prop_assert!(seat.locked_by.is_none());
                            prop_assert!(seat.lock_expire_at.is_none());
                        }
                    }
                }
            }
        }
    }
}
