use std::sync::atomic::{AtomicUsize, Ordering};

use crate::request::MiniStat;

/// Source of filesystem metadata for one path argument of a request.
///
/// Implementations stat whatever object the path refers to; this library
/// never walks the filesystem itself. `parent_stat` covers the containing
/// directory entry and must release any transient handle it takes before
/// returning.
pub trait StatSource {
    /// Metadata of the object itself, or `None` if it cannot be read.
    fn stat(&self) -> Option<MiniStat>;

    /// Metadata of the parent directory entry, default none.
    fn parent_stat(&self) -> Option<MiniStat> {
        None
    }
}

/// Policy memory accounting consulted before a new condition is admitted
/// into the store.
pub trait MemoryQuota: Send + Sync {
    /// Reserve `bytes` for a new entry. Returning false rejects the entry.
    fn claim(&self, bytes: usize) -> bool;

    /// Return `bytes` held by an entry that has been dropped.
    fn release(&self, _bytes: usize) {}
}

/// Quota that admits everything.
#[derive(Debug, Default)]
pub struct UnboundedQuota;

impl MemoryQuota for UnboundedQuota {
    fn claim(&self, _bytes: usize) -> bool {
        true
    }
}

/// Fixed byte budget shared by every entry of a store.
#[derive(Debug)]
pub struct FixedQuota {
    limit: usize,
    used: AtomicUsize,
}

impl FixedQuota {
    pub fn new(limit: usize) -> Self {
        FixedQuota {
            limit,
            used: AtomicUsize::new(0),
        }
    }

    /// Bytes currently claimed.
    pub fn used(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }
}

impl MemoryQuota for FixedQuota {
    fn claim(&self, bytes: usize) -> bool {
        let mut used = self.used.load(Ordering::Relaxed);
        loop {
            let Some(next) = used.checked_add(bytes) else {
                return false;
            };
            if next > self.limit {
                return false;
            }
            match self
                .used
                .compare_exchange_weak(used, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return true,
                Err(current) => used = current,
            }
        }
    }

    fn release(&self, bytes: usize) {
        self.used.fetch_sub(bytes, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_quota_admits_everything() {
        assert!(UnboundedQuota.claim(usize::MAX));
    }

    #[test]
    fn test_fixed_quota_claims_up_to_limit() {
        let quota = FixedQuota::new(100);
        assert!(quota.claim(60));
        assert!(quota.claim(40));
        assert_eq!(quota.used(), 100);
        assert!(!quota.claim(1));
    }

    #[test]
    fn test_fixed_quota_release_returns_budget() {
        let quota = FixedQuota::new(100);
        assert!(quota.claim(100));
        assert!(!quota.claim(50));
        quota.release(100);
        assert!(quota.claim(50));
        assert_eq!(quota.used(), 50);
    }

    #[test]
    fn test_fixed_quota_rejects_overflow() {
        let quota = FixedQuota::new(usize::MAX);
        assert!(quota.claim(usize::MAX));
        assert!(!quota.claim(1));
    }
}
