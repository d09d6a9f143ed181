use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::error::ConditionError;
use crate::models::Condition;
use crate::traits::{MemoryQuota, UnboundedQuota};

/// The set of committed conditions, deduplicated by structural equality.
/// Writers serialize on the mutex; committed entries are handed out as
/// `Arc`s and never mutated in place, so readers need no lock at all.
pub struct ConditionStore {
    entries: Mutex<HashMap<u64, Vec<Arc<Condition>>>>,
    quota: Arc<dyn MemoryQuota>,
}

impl Default for ConditionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionStore {
    pub fn new() -> Self {
        Self::with_quota(Arc::new(UnboundedQuota))
    }

    pub fn with_quota(quota: Arc<dyn MemoryQuota>) -> Self {
        ConditionStore {
            entries: Mutex::new(HashMap::new()),
            quota,
        }
    }

    /// Commit a freshly parsed condition: merge with an equal entry if one
    /// exists, otherwise admit it under the memory quota. On any failure
    /// the candidate is dropped and the store is left unchanged.
    pub fn commit(&self, candidate: Condition) -> Result<Arc<Condition>, ConditionError> {
        let key = structural_key(&candidate);
        let mut entries = self.entries.lock()?;
        if let Some(existing) = entries
            .get(&key)
            .and_then(|bucket| bucket.iter().find(|entry| ***entry == candidate))
        {
            debug!(
                event = "Condition",
                phase = "Commit",
                shared = true,
                clauses = candidate.len()
            );
            return Ok(Arc::clone(existing));
        }
        let bytes = candidate.byte_size();
        if !self.quota.claim(bytes) {
            warn!(
                event = "Condition",
                phase = "Commit",
                bytes,
                "memory quota exceeded"
            );
            return Err(ConditionError::QuotaExceeded(bytes));
        }
        let shared = Arc::new(candidate);
        entries.entry(key).or_default().push(Arc::clone(&shared));
        debug!(
            event = "Condition",
            phase = "Commit",
            shared = false,
            clauses = shared.len()
        );
        Ok(shared)
    }

    /// Drop a rule's reference to a shared condition. When the caller holds
    /// the last reference outside the store, the entry is removed and its
    /// bytes returned to the quota; the storage itself is freed when the
    /// final `Arc` goes out of scope.
    pub fn release(&self, shared: Arc<Condition>) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        // Two counts: the caller's and the store's. Anything above that is
        // another live rule.
        if Arc::strong_count(&shared) != 2 {
            return;
        }
        let key = structural_key(&shared);
        if let Some(bucket) = entries.get_mut(&key) {
            let before = bucket.len();
            bucket.retain(|entry| !Arc::ptr_eq(entry, &shared));
            if bucket.len() < before {
                self.quota.release(shared.byte_size());
            }
            if bucket.is_empty() {
                entries.remove(&key);
            }
        }
    }

    /// Number of committed entries.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .map(|entries| entries.values().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn structural_key(condition: &Condition) -> u64 {
    let mut hasher = DefaultHasher::new();
    condition.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::traits::FixedQuota;

    #[test]
    fn test_commit_merges_equal_conditions() {
        let store = ConditionStore::new();
        let a = store.commit(parse("task.uid=1000").unwrap()).unwrap();
        let b = store.commit(parse("task.uid=1000").unwrap()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(Arc::strong_count(&a), 3);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_commit_keeps_distinct_conditions_apart() {
        let store = ConditionStore::new();
        let a = store.commit(parse("task.uid=1000").unwrap()).unwrap();
        let b = store.commit(parse("task.uid!=1000").unwrap()).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_quota_rejection_leaves_store_unchanged() {
        let probe = parse("task.uid=1000").unwrap().byte_size();
        let quota = Arc::new(FixedQuota::new(probe));
        let store = ConditionStore::with_quota(quota.clone());

        let a = store.commit(parse("task.uid=1000").unwrap()).unwrap();
        assert_eq!(store.len(), 1);

        let err = store.commit(parse("task.gid=100").unwrap()).unwrap_err();
        assert!(matches!(err, ConditionError::QuotaExceeded(_)));
        assert_eq!(store.len(), 1);

        // A duplicate costs nothing.
        let b = store.commit(parse("task.uid=1000").unwrap()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(quota.used(), probe);
    }

    #[test]
    fn test_release_removes_last_reference() {
        let store = ConditionStore::new();
        let a = store.commit(parse("task.uid=1000").unwrap()).unwrap();
        let b = store.commit(parse("task.gid=100").unwrap()).unwrap();
        assert_eq!(store.len(), 2);

        store.release(a);
        assert_eq!(store.len(), 1);

        // An outstanding clone keeps the entry alive.
        let b_clone = Arc::clone(&b);
        store.release(b);
        assert_eq!(store.len(), 1);
        store.release(b_clone);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_release_returns_quota_budget() {
        let probe = parse("task.uid=1000").unwrap().byte_size();
        let quota = Arc::new(FixedQuota::new(probe));
        let store = ConditionStore::with_quota(quota.clone());

        let a = store.commit(parse("task.uid=1000").unwrap()).unwrap();
        assert!(store.commit(parse("task.gid=100").unwrap()).is_err());

        store.release(a);
        assert_eq!(quota.used(), 0);
        assert!(store.commit(parse("task.gid=100").unwrap()).is_ok());
    }
}
