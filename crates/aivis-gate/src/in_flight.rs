//! At-most-one analysis run per brand.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use aivis_core::BrandId;

use crate::clock::{Clock, SystemClock};

/// Slots older than this are treated as abandoned and may be re-acquired.
pub const DEFAULT_IN_FLIGHT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy)]
struct Slot {
    started_at: Instant,
    token: u64,
}

#[derive(Debug, Default)]
struct RegistryState {
    slots: HashMap<BrandId, Slot>,
    next_token: u64,
}

#[derive(Debug)]
pub struct InFlightRegistry {
    timeout: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<RegistryState>,
}

impl InFlightRegistry {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self::with_clock(timeout, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(timeout: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            timeout,
            clock,
            state: Mutex::new(RegistryState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_live(&self, slot: Slot, now: Instant) -> bool {
        now.saturating_duration_since(slot.started_at) < self.timeout
    }

    fn acquire_token(&self, brand_id: BrandId) -> Option<u64> {
        let mut state = self.lock();
        let now = self.clock.now();

        if let Some(slot) = state.slots.get(&brand_id).copied() {
            if self.is_live(slot, now) {
                return None;
            }
            tracing::warn!(
                brand_id,
                held_secs = now.saturating_duration_since(slot.started_at).as_secs(),
                "reclaiming stale in-flight slot"
            );
        }

        let token = state.next_token;
        state.next_token += 1;
        state.slots.insert(
            brand_id,
            Slot {
                started_at: now,
                token,
            },
        );
        Some(token)
    }

    /// Claim the slot for `brand_id`. Returns `false` if a non-stale run holds it.
    pub fn try_acquire(&self, brand_id: BrandId) -> bool {
        self.acquire_token(brand_id).is_some()
    }

    /// Claim the slot and return a guard that releases it when dropped.
    ///
    /// The guard covers every exit path of the holder, including a future
    /// being dropped mid-await.
    #[must_use]
    pub fn acquire(&self, brand_id: BrandId) -> Option<InFlightGuard<'_>> {
        self.acquire_token(brand_id).map(|token| InFlightGuard {
            registry: self,
            brand_id,
            token,
        })
    }

    /// Free the slot for `brand_id` unconditionally.
    pub fn release(&self, brand_id: BrandId) {
        self.lock().slots.remove(&brand_id);
    }

    fn release_token(&self, brand_id: BrandId, token: u64) {
        let mut state = self.lock();
        // A stale slot may have been reclaimed by a newer run; leave that one alone.
        if state.slots.get(&brand_id).is_some_and(|s| s.token == token) {
            state.slots.remove(&brand_id);
        }
    }

    #[must_use]
    pub fn is_in_flight(&self, brand_id: BrandId) -> bool {
        let state = self.lock();
        let now = self.clock.now();
        state
            .slots
            .get(&brand_id)
            .is_some_and(|slot| self.is_live(*slot, now))
    }
}

/// Holds one brand's in-flight slot until dropped.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    registry: &'a InFlightRegistry,
    brand_id: BrandId,
    token: u64,
}

impl InFlightGuard<'_> {
    #[must_use]
    pub fn brand_id(&self) -> BrandId {
        self.brand_id
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.registry.release_token(self.brand_id, self.token);
    }
}
