//! Provider call rate limiting.
//!
//! A single [`RateLimiter`] enforces two limits at once: a minimum interval
//! between consecutive calls and a maximum number of calls per minute window.
//! Nothing here sleeps; callers check [`RateLimiter::can_proceed`] (or use
//! [`RateLimiter::try_record`]) and decide how to react.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::error::GateError;

const MINUTE: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct RateLimiterState {
    last_call: Option<Instant>,
    calls_in_current_minute: u32,
    minute_window_start: Instant,
}

/// Point-in-time view of a limiter, for status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    pub calls_this_minute: u32,
    pub max_calls_per_minute: u32,
    pub seconds_until_reset: u64,
    pub can_proceed: bool,
}

#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    max_calls_per_minute: u32,
    clock: Arc<dyn Clock>,
    state: Mutex<RateLimiterState>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(min_interval: Duration, max_calls_per_minute: u32) -> Self {
        Self::with_clock(min_interval, max_calls_per_minute, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(
        min_interval: Duration,
        max_calls_per_minute: u32,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let minute_window_start = clock.now();
        Self {
            min_interval,
            max_calls_per_minute,
            clock,
            state: Mutex::new(RateLimiterState {
                last_call: None,
                calls_in_current_minute: 0,
                minute_window_start,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RateLimiterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Calls counted against the current window; an expired window counts as empty.
    fn effective_calls(state: &RateLimiterState, now: Instant) -> u32 {
        if now.saturating_duration_since(state.minute_window_start) >= MINUTE {
            0
        } else {
            state.calls_in_current_minute
        }
    }

    fn wait_time(&self, state: &RateLimiterState, now: Instant) -> Duration {
        if Self::effective_calls(state, now) >= self.max_calls_per_minute {
            return (state.minute_window_start + MINUTE).saturating_duration_since(now);
        }

        match state.last_call {
            Some(last) => (last + self.min_interval).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    fn record_locked(state: &mut RateLimiterState, now: Instant) {
        if now.saturating_duration_since(state.minute_window_start) >= MINUTE {
            state.minute_window_start = now;
            state.calls_in_current_minute = 1;
        } else {
            state.calls_in_current_minute += 1;
        }
        state.last_call = Some(now);
    }

    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Whether a call may be dispatched right now. Does not change any state.
    #[must_use]
    pub fn can_proceed(&self) -> bool {
        let state = self.lock();
        self.wait_time(&state, self.clock.now()).is_zero()
    }

    /// Record that a call was just dispatched.
    ///
    /// Starts a fresh minute window when the previous one has expired.
    pub fn record_call(&self) {
        let mut state = self.lock();
        Self::record_locked(&mut state, self.clock.now());
    }

    /// Check and record under one lock, so concurrent callers cannot both
    /// pass the check for the last free slot.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::RateLimited`] with the suggested wait when either
    /// limit is currently exceeded. Nothing is recorded in that case.
    pub fn try_record(&self) -> Result<(), GateError> {
        let mut state = self.lock();
        let now = self.clock.now();
        let wait = self.wait_time(&state, now);
        if !wait.is_zero() {
            tracing::debug!(wait_ms = wait.as_millis(), "rate limiter rejected call");
            return Err(GateError::RateLimited { wait });
        }
        Self::record_locked(&mut state, now);
        Ok(())
    }

    /// How long until the next call would be admitted; zero if it would be now.
    #[must_use]
    pub fn time_until_next_allowed(&self) -> Duration {
        let state = self.lock();
        self.wait_time(&state, self.clock.now())
    }

    #[must_use]
    pub fn status(&self) -> RateLimitStatus {
        let state = self.lock();
        let now = self.clock.now();
        let calls = Self::effective_calls(&state, now);
        let seconds_until_reset = if calls == 0 {
            0
        } else {
            (state.minute_window_start + MINUTE)
                .saturating_duration_since(now)
                .as_secs()
        };
        RateLimitStatus {
            calls_this_minute: calls,
            max_calls_per_minute: self.max_calls_per_minute,
            seconds_until_reset,
            can_proceed: self.wait_time(&state, now).is_zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn limiter(min_interval_secs: u64, max_per_minute: u32) -> (RateLimiter, ManualClock) {
        let clock = ManualClock::new();
        let limiter = RateLimiter::with_clock(
            Duration::from_secs(min_interval_secs),
            max_per_minute,
            Arc::new(clock.clone()),
        );
        (limiter, clock)
    }

    #[test]
    fn fresh_limiter_allows_first_call() {
        let (limiter, _clock) = limiter(2, 10);
        assert!(limiter.can_proceed());
        assert_eq!(limiter.time_until_next_allowed(), Duration::ZERO);
    }

    #[test]
    fn can_proceed_does_not_mutate_state() {
        let (limiter, _clock) = limiter(2, 1);
        for _ in 0..5 {
            assert!(limiter.can_proceed());
        }
        assert_eq!(limiter.status().calls_this_minute, 0);
    }

    #[test]
    fn enforces_minimum_interval() {
        let (limiter, clock) = limiter(2, 10);
        limiter.record_call();
        assert!(!limiter.can_proceed());
        assert_eq!(limiter.time_until_next_allowed(), Duration::from_secs(2));

        clock.advance(Duration::from_millis(1500));
        assert!(!limiter.can_proceed());

        clock.advance(Duration::from_millis(500));
        assert!(limiter.can_proceed());
    }

    #[test]
    fn enforces_per_minute_ceiling() {
        let (limiter, clock) = limiter(1, 3);
        for _ in 0..3 {
            assert!(limiter.try_record().is_ok());
            clock.advance(Duration::from_secs(1));
        }
        // 3 calls in the first 3 seconds; ceiling reached.
        assert!(!limiter.can_proceed());
        assert_eq!(limiter.time_until_next_allowed(), Duration::from_secs(57));

        clock.advance(Duration::from_secs(57));
        assert!(limiter.can_proceed());
    }

    #[test]
    fn record_call_resets_counter_in_new_window() {
        let (limiter, clock) = limiter(0, 2);
        limiter.record_call();
        limiter.record_call();
        assert_eq!(limiter.status().calls_this_minute, 2);

        clock.advance(Duration::from_secs(61));
        limiter.record_call();
        assert_eq!(limiter.status().calls_this_minute, 1);
        assert!(limiter.can_proceed());
    }

    #[test]
    fn try_record_reports_wait_and_records_nothing_when_limited() {
        let (limiter, _clock) = limiter(2, 10);
        assert!(limiter.try_record().is_ok());

        let err = limiter.try_record().unwrap_err();
        assert_eq!(
            err,
            GateError::RateLimited {
                wait: Duration::from_secs(2)
            }
        );
        assert_eq!(limiter.status().calls_this_minute, 1);
    }

    #[test]
    fn status_reports_window_state() {
        let (limiter, clock) = limiter(2, 10);
        limiter.record_call();
        clock.advance(Duration::from_secs(20));

        let status = limiter.status();
        assert_eq!(status.calls_this_minute, 1);
        assert_eq!(status.max_calls_per_minute, 10);
        assert_eq!(status.seconds_until_reset, 40);
        assert!(status.can_proceed);
    }

    #[test]
    fn concurrent_try_record_admits_only_ceiling() {
        let (limiter, _clock) = limiter(0, 5);
        let limiter = Arc::new(limiter);
        let handles: Vec<_> = (0..20)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || limiter.try_record().is_ok())
            })
            .collect();
        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(admitted, 5);
    }
}
