//! Time-Bounded Key-Value Store
//!
//! An externally injected store for short-lived values, replacing ambient
//! process memory so multi-instance deployments can swap in a shared backend
//! behind the same surface. Expired entries are swept explicitly on every
//! read; nothing lingers past its deadline.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// In-memory store whose entries vanish after a fixed time-to-live.
///
/// Reads sweep expired entries before looking up, so expiry holds even
/// without a background task.
pub struct ExpiringStore<V> {
    entries: Mutex<HashMap<String, Entry<V>>>,
    ttl: Duration,
}

impl<V> ExpiringStore<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Insert a value under `key`, replacing any previous entry
    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    /// Remove and return the live value under `key`
    pub fn take(&self, key: &str) -> Option<V> {
        self.take_at(key, Instant::now())
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.len_at(Instant::now())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Clock-parameterized internals keep expiry deterministic under test.

    fn insert_at(&self, key: impl Into<String>, value: V, now: Instant) {
        let mut entries = self.lock();
        sweep(&mut entries, now);
        entries.insert(
            key.into(),
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    fn take_at(&self, key: &str, now: Instant) -> Option<V> {
        let mut entries = self.lock();
        sweep(&mut entries, now);
        entries.remove(key).map(|entry| entry.value)
    }

    fn len_at(&self, now: Instant) -> usize {
        let mut entries = self.lock();
        sweep(&mut entries, now);
        entries.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Clone> ExpiringStore<V> {
    /// Return the live value under `key` without consuming it
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<V> {
        let mut entries = self.lock();
        sweep(&mut entries, now);
        entries.get(key).map(|entry| entry.value.clone())
    }
}

/// Drop every entry at or past its deadline
fn sweep<V>(entries: &mut HashMap<String, Entry<V>>, now: Instant) {
    entries.retain(|_, entry| entry.expires_at > now);
}
