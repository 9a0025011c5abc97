//! The rate_limit module guards course generation with a per-identity fixed window.
//!
//! Each identity may be admitted `max_requests` times per window of `window`
//! length. A window starts with the first request of an identity and is
//! replaced, not extended, by the first request after it ends. Because windows
//! reset at fixed boundaries, up to twice `max_requests` requests can be
//! admitted across the boundary of two consecutive windows.
//!
//! State lives in a [`WindowStore`] and is not persisted.

pub mod clock;
pub mod store;

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, warn};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::constants::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW};
pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{MemoryWindowStore, RateWindow, WindowStore};

/// Limits applied to every identity.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Result of an admission check.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Admission {
    /// The request may proceed; `remaining` more requests fit in the window.
    Admitted { remaining: u32 },
    /// The quota is spent until the current window ends.
    Rejected { retry_after: Duration },
}

impl Admission {
    /// Returns `true` for [`Admission::Admitted`].
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }
}

/// Fixed-window rate limiter over an injectable window store and clock.
pub struct RateLimiter<S = MemoryWindowStore, C = SystemClock> {
    config: RateLimitConfig,
    window: TimeDelta,
    store: S,
    clock: C,
    /// Serializes read-modify-write cycles; holds the time of the next sweep.
    next_sweep: Mutex<Option<DateTime<Utc>>>,
}

impl RateLimiter {
    /// Creates a limiter backed by an in-memory store and the system clock.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_parts(config, MemoryWindowStore::new(), SystemClock)
    }
}

impl<S: WindowStore, C: Clock> RateLimiter<S, C> {
    /// Creates a limiter over the given store and clock.
    pub fn with_parts(config: RateLimitConfig, store: S, clock: C) -> Self {
        let window = TimeDelta::from_std(config.window).unwrap_or(TimeDelta::MAX);
        RateLimiter {
            config,
            window,
            store,
            clock,
            next_sweep: Mutex::new(None),
        }
    }

    /// Returns the window store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Admits or rejects one request of `identity`.
    pub fn admit(&self, identity: &str) -> bool {
        self.check(identity).is_admitted()
    }

    /// Admits or rejects one request of `identity`, reporting the remaining
    /// quota or the time until the window ends.
    ///
    /// A rejected request leaves the stored window untouched.
    pub fn check(&self, identity: &str) -> Admission {
        let mut next_sweep = self
            .next_sweep
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = self.clock.now();
        self.sweep(now, &mut next_sweep);

        let window = match self.store.get(identity) {
            Some(window) if !window.is_expired(now) => window,
            _ => {
                debug!("Opening rate limit window for {identity}");
                self.store.set(RateWindow {
                    identity: identity.to_owned(),
                    count: 1,
                    window_end: now
                        .checked_add_signed(self.window)
                        .unwrap_or(DateTime::<Utc>::MAX_UTC),
                });
                return Admission::Admitted {
                    remaining: self.config.max_requests.saturating_sub(1),
                };
            }
        };

        if window.count >= self.config.max_requests {
            let retry_after = (window.window_end - now).to_std().unwrap_or(Duration::ZERO);
            warn!(
                "Rate limit exceeded for {identity}, retry after {}s",
                retry_after.as_secs()
            );
            return Admission::Rejected { retry_after };
        }

        let count = window.count + 1;
        self.store.set(RateWindow { count, ..window });
        Admission::Admitted {
            remaining: self.config.max_requests.saturating_sub(count),
        }
    }

    /// Evicts expired windows at most once per window length.
    fn sweep(&self, now: DateTime<Utc>, next_sweep: &mut Option<DateTime<Utc>>) {
        match *next_sweep {
            Some(at) if now < at => {}
            Some(_) => {
                let evicted = self.store.evict_expired(now);
                if evicted > 0 {
                    debug!("Swept {evicted} expired rate limit windows");
                }
                *next_sweep = now.checked_add_signed(self.window);
            }
            None => *next_sweep = now.checked_add_signed(self.window),
        }
    }
}
