//! Round-Scoped Idempotency Cache
//!
//! Best-effort, process-local cache that makes repeated sync calls for the
//! same round safe to retry. Keys are (user, round, knowledge id); values
//! are the timestamp of first successful processing. The cache is owned by
//! the sync engine instance, not module-global state, and takes its clock
//! through a trait so tests can drive time deterministically.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

/// Retention window for seen keys
const RETENTION_HOURS: i64 = 24;

/// Eviction kicks in above this many entries
const MAX_ENTRIES: usize = 4_000;

/// After an eviction only this many most-recently-seen entries survive
const TRIM_TO_ENTRIES: usize = 3_000;

/// Time source for the cache
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Bounded, time-aware seen/mark cache.
///
/// Not a cross-process guarantee: it only prevents duplicate writes within a
/// single process's uptime for a given round.
pub struct RoundCache {
    entries: Mutex<HashMap<String, DateTime<Utc>>>,
    clock: Arc<dyn Clock>,
}

impl RoundCache {
    /// Cache on the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Cache on an injected clock (deterministic tests)
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Composite idempotency key for (user, round, knowledge id)
    pub fn key(user_id: &str, round_id: &str, knowledge_id: &str) -> String {
        format!("{}:{}:{}", user_id, round_id, knowledge_id)
    }

    /// Whether `key` was marked within the retention window
    pub fn seen(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let now = self.clock.now();
        Self::evict_locked(&mut entries, now);
        entries.contains_key(key)
    }

    /// Record `key` as processed. A key already present keeps its original
    /// first-seen timestamp.
    pub fn mark(&self, key: &str) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let now = self.clock.now();
        Self::evict_locked(&mut entries, now);
        entries.entry(key.to_string()).or_insert(now);
    }

    /// Apply the eviction discipline without touching any key
    pub fn evict(&self) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let now = self.clock.now();
        Self::evict_locked(&mut entries, now);
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Purge entries older than the retention window; if the cache is still
    /// over capacity, keep only the most-recently-seen entries.
    fn evict_locked(entries: &mut HashMap<String, DateTime<Utc>>, now: DateTime<Utc>) {
        let cutoff = now - Duration::hours(RETENTION_HOURS);
        entries.retain(|_, seen_at| *seen_at > cutoff);

        if entries.len() > MAX_ENTRIES {
            let mut by_age: Vec<(String, DateTime<Utc>)> =
                entries.drain().collect();
            by_age.sort_by(|a, b| b.1.cmp(&a.1));
            by_age.truncate(TRIM_TO_ENTRIES);
            entries.extend(by_age);
        }
    }
}

impl Default for RoundCache {
    fn default() -> Self {
        Self::new()
    }
}
