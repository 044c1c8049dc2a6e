use crate::clock::{Clock, MonotonicClock};

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// An in-process map whose entries expire `ttl` after insertion.
///
/// Expired entries are swept out on every access. [`get_or_fetch`] adds
/// single-flight coalescing: concurrent callers for the same missing key
/// block on one fetch instead of racing their own; if the fetch fails, the
/// next waiter in line runs its own fetch rather than inheriting the error.
///
/// The map lock is never held while a fetch closure runs.
///
/// [`get_or_fetch`]: TimedCache::get_or_fetch
pub struct TimedCache<K, V> {
    state: Mutex<State<K, V>>,
    fetch_done: Condvar,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

struct State<K, V> {
    entries: HashMap<K, Entry<V>>,
    inflight: HashSet<K>,
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

impl<K, V> TimedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(MonotonicClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(State {
                entries: HashMap::new(),
                inflight: HashSet::new(),
            }),
            fetch_done: Condvar::new(),
            clock,
            ttl,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut state = self.state.lock().unwrap();
        self.sweep(&mut state);
        state.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        let expires_at = self.clock.now() + self.ttl;
        let mut state = self.state.lock().unwrap();
        self.sweep(&mut state);
        state.entries.insert(key, Entry { value, expires_at });
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let mut state = self.state.lock().unwrap();
        self.sweep(&mut state);
        state.entries.remove(key).map(|entry| entry.value)
    }

    /// Return the fresh cached value for `key`, or run `fetch` to produce
    /// one, caching it on success. At most one fetch for a given key is in
    /// flight at a time; other callers block until it settles.
    pub fn get_or_fetch<F>(&self, key: K, fetch: F) -> strata_core::Result<V>
    where
        F: FnOnce() -> strata_core::Result<V>,
    {
        let mut fetch = Some(fetch);
        loop {
            let mut state = self.state.lock().unwrap();
            self.sweep(&mut state);
            if let Some(entry) = state.entries.get(&key) {
                return Ok(entry.value.clone());
            }
            if state.inflight.contains(&key) {
                // Wake-ups re-check the map; if the flight failed, the
                // entry is absent and this caller becomes the fetcher.
                let _released = self.fetch_done.wait(state).unwrap();
                continue;
            }
            state.inflight.insert(key.clone());
            drop(state);

            // Only the fetcher path consumes the closure, and it returns
            // before looping.
            let result = (fetch.take().unwrap())();

            let mut state = self.state.lock().unwrap();
            state.inflight.remove(&key);
            if let Ok(value) = &result {
                let expires_at = self.clock.now() + self.ttl;
                state.entries.insert(
                    key,
                    Entry {
                        value: value.clone(),
                        expires_at,
                    },
                );
            }
            drop(state);
            self.fetch_done.notify_all();
            return result;
        }
    }

    fn sweep(&self, state: &mut State<K, V>) {
        let now = self.clock.now();
        state.entries.retain(|_, entry| now < entry.expires_at);
    }
}

impl<K, V> std::fmt::Debug for TimedCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
