//! Balance Cache (C4) — read-through cache for current balances.
//!
//! Logical key `inventory:{user}:{section}:{item}:{collection}:{quality}`
//! (spec.md §4.4) backed by an in-process `DashMap`, the same
//! already-a-teacher-dependency structure used for the identifier catalog
//! (`catalog::cache::ClassifierCache`). Cache unavailability is never fatal:
//! a lookup that can't find (or can't trust) an entry is just a miss —
//! correctness always falls back to `BalanceEngine::current_balance`
//! recomputing from the log (spec.md §4.5).

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::item_key::ItemKey;

struct Entry {
    value: i64,
    expires_at: Instant,
}

pub struct BalanceCache {
    entries: DashMap<ItemKey, Entry>,
    default_ttl: Duration,
}

impl BalanceCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn get(&self, item_key: &ItemKey) -> Option<i64> {
        let entry = self.entries.get(item_key)?;
        if entry.expires_at > Instant::now() {
            Some(entry.value)
        } else {
            None
        }
    }

    pub fn set(&self, item_key: ItemKey, value: i64, ttl: Duration) {
        self.entries.insert(
            item_key,
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Deletes every key belonging to `user_id` (spec.md §4.4: "prefix
    /// matches `inventory:{user}:*`"). Broad by design (spec.md §9,
    /// "Cache coherence") — a single write invalidates the whole user
    /// rather than just the touched ItemKeys.
    pub fn invalidate_user(&self, user_id: i64) {
        self.entries.retain(|key, _| key.user_id != user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(user_id: i64, item_id: u128) -> ItemKey {
        ItemKey::new(user_id, 1, uuid::Uuid::from_u128(item_id), None, None)
    }

    #[test]
    fn miss_on_empty_cache() {
        let cache = BalanceCache::new(Duration::from_secs(60));
        assert_eq!(cache.get(&key(1, 1)), None);
    }

    #[test]
    fn set_then_get_within_ttl() {
        let cache = BalanceCache::new(Duration::from_secs(60));
        cache.set(key(1, 1), 42, Duration::from_secs(60));
        assert_eq!(cache.get(&key(1, 1)), Some(42));
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let cache = BalanceCache::new(Duration::from_secs(60));
        cache.set(key(1, 1), 42, Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get(&key(1, 1)), None);
    }

    #[test]
    fn invalidate_user_drops_only_that_users_keys() {
        let cache = BalanceCache::new(Duration::from_secs(60));
        cache.set(key(1, 1), 10, Duration::from_secs(60));
        cache.set(key(1, 2), 20, Duration::from_secs(60));
        cache.set(key(2, 1), 99, Duration::from_secs(60));

        cache.invalidate_user(1);

        assert_eq!(cache.get(&key(1, 1)), None);
        assert_eq!(cache.get(&key(1, 2)), None);
        assert_eq!(cache.get(&key(2, 1)), Some(99));
    }
}
