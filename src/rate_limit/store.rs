//! Storage of per-identity rate limit windows.

use chrono::{DateTime, Utc};
use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::constants::DEFAULT_STORE_CAPACITY;

/// Request counter of one identity within its current window.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RateWindow {
    pub identity: String,
    /// Requests admitted in this window.
    pub count: u32,
    pub window_end: DateTime<Utc>,
}

impl RateWindow {
    /// A window is expired once `now` is past its end.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.window_end
    }
}

/// Backing table of rate limit windows.
///
/// The limiter serializes its own read-modify-write cycles, so implementations
/// only need each single call to be atomic.
pub trait WindowStore: Send + Sync {
    /// Returns the window stored for `identity`.
    fn get(&self, identity: &str) -> Option<RateWindow>;

    /// Stores `window` under its identity, replacing any previous one.
    fn set(&self, window: RateWindow);

    /// Drops windows that are expired at `now` and returns how many were dropped.
    fn evict_expired(&self, _now: DateTime<Utc>) -> usize {
        0
    }
}

/// In-process window table bounded to `capacity` identities.
///
/// Inserting a new identity into a full table evicts the window that ends
/// first. Expired windows always end before live ones, so a live window is only
/// evicted when every tracked window is live; that identity then starts over
/// with a fresh quota.
#[derive(Debug)]
pub struct MemoryWindowStore {
    windows: Mutex<HashMap<String, RateWindow>>,
    capacity: usize,
}

impl MemoryWindowStore {
    /// Creates a store with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_STORE_CAPACITY)
    }

    /// Creates a store tracking at most `capacity` identities.
    pub fn with_capacity(capacity: usize) -> Self {
        MemoryWindowStore {
            windows: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    /// Number of identities currently tracked.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, RateWindow>> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryWindowStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowStore for MemoryWindowStore {
    fn get(&self, identity: &str) -> Option<RateWindow> {
        self.lock().get(identity).cloned()
    }

    fn set(&self, window: RateWindow) {
        let mut windows = self.lock();
        if windows.len() >= self.capacity && !windows.contains_key(&window.identity) {
            let oldest = windows
                .values()
                .min_by_key(|stored| stored.window_end)
                .map(|stored| stored.identity.clone());
            if let Some(oldest) = oldest {
                debug!("Rate limit table at capacity {}, evicting {oldest}", self.capacity);
                windows.remove(&oldest);
            }
        }
        windows.insert(window.identity.clone(), window);
    }

    fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let mut windows = self.lock();
        let before = windows.len();
        windows.retain(|_, window| !window.is_expired(now));
        before - windows.len()
    }
}
