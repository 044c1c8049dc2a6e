use super::ObjInner;
use crate::value::Value;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

/// Per-model weak identity cache: at most one live instance per id.
///
/// Entries are weak, so an instance lives exactly as long as external
/// handles do. The lock is only ever held around map reads and writes,
/// never across a backend call, so foreign-key resolution can recurse into
/// other models (or this one) without deadlocking.
pub(crate) struct IdentityCache {
    entries: Mutex<HashMap<Value, Weak<ObjInner>>>,
}

// Pruning kicks in once the map holds this many entries; dead weak refs
// are dropped before growing further.
const PRUNE_THRESHOLD: usize = 256;

impl IdentityCache {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn get(&self, id: &Value) -> Option<Arc<ObjInner>> {
        let entries = self.entries.lock().unwrap();
        entries.get(id).and_then(Weak::upgrade)
    }

    /// Insert a freshly constructed instance, unless another thread won
    /// the race for this id in the meantime; the loser's candidate is
    /// discarded and the winner's instance returned.
    pub(crate) fn insert_or_reuse(&self, id: Value, candidate: Arc<ObjInner>) -> Arc<ObjInner> {
        let mut entries = self.entries.lock().unwrap();
        if let Some(existing) = entries.get(&id).and_then(Weak::upgrade) {
            tracing::trace!(id = %id, "discarding raced construction");
            return existing;
        }
        if entries.len() >= PRUNE_THRESHOLD {
            entries.retain(|_, weak| weak.strong_count() > 0);
        }
        entries.insert(id, Arc::downgrade(&candidate));
        candidate
    }

    #[cfg(test)]
    pub(crate) fn live_len(&self) -> usize {
        let entries = self.entries.lock().unwrap();
        entries
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}
