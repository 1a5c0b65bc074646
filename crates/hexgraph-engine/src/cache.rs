//! Memoizing cache for per-record tuple blocks.

use hexgraph_core::error::Result;
use hexgraph_core::schema::CachePolicy;
use hexgraph_core::tuple::Hextuple;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// Compute-if-absent storage for tuple lists.
pub trait TupleCache: Send + Sync {
    /// Return the stored tuples for `key`, or run `compute` and store its
    /// result. Errors are returned and never stored.
    fn fetch(
        &self,
        key: &str,
        policy: &CachePolicy,
        compute: &mut dyn FnMut() -> Result<Vec<Hextuple>>,
    ) -> Result<Arc<Vec<Hextuple>>>;
}

struct Entry {
    tuples: Arc<Vec<Hextuple>>,
    stored_at: Instant,
    policy: CachePolicy,
    refreshing: bool,
}

enum State {
    Fresh,
    /// Expired but inside the race-condition grace window.
    Stale,
    Expired,
}

impl Entry {
    fn state(&self, now: Instant) -> State {
        let age = now.saturating_duration_since(self.stored_at);
        if age < self.policy.ttl {
            State::Fresh
        } else if age < self.policy.ttl + self.policy.race_condition_ttl {
            State::Stale
        } else {
            State::Expired
        }
    }
}

type Clock = Arc<dyn Fn() -> Instant + Send + Sync>;

/// In-process [`TupleCache`].
///
/// Two callers racing on a missing key may both compute; the first value
/// stored wins and the second caller gets it back. While an expired entry is
/// inside its grace window, one caller recomputes and the others keep
/// reading the old value.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Clock,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_clock(Arc::new(Instant::now))
    }
}

impl fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TupleCache for MemoryCache {
    fn fetch(
        &self,
        key: &str,
        policy: &CachePolicy,
        compute: &mut dyn FnMut() -> Result<Vec<Hextuple>>,
    ) -> Result<Arc<Vec<Hextuple>>> {
        {
            let mut entries = self.lock();
            if let Some(entry) = entries.get_mut(key) {
                match entry.state((self.clock)()) {
                    State::Fresh => {
                        tracing::debug!(key, "tuple cache hit");
                        return Ok(Arc::clone(&entry.tuples));
                    }
                    State::Stale if entry.refreshing => {
                        tracing::debug!(key, "tuple cache serving stale entry");
                        return Ok(Arc::clone(&entry.tuples));
                    }
                    State::Stale => entry.refreshing = true,
                    State::Expired => {}
                }
            }
        }

        tracing::debug!(key, "tuple cache miss");
        let computed = match compute() {
            Ok(tuples) => Arc::new(tuples),
            Err(err) => {
                if let Some(entry) = self.lock().get_mut(key) {
                    entry.refreshing = false;
                }
                return Err(err);
            }
        };

        let now = (self.clock)();
        let mut entries = self.lock();
        if let Some(entry) = entries.get(key)
            && matches!(entry.state(now), State::Fresh)
        {
            // Another caller stored first.
            return Ok(Arc::clone(&entry.tuples));
        }
        entries.insert(
            key.to_string(),
            Entry {
                tuples: Arc::clone(&computed),
                stored_at: now,
                policy: *policy,
                refreshing: false,
            },
        );
        Ok(computed)
    }
}
