//! `ItemKey` — the five-tuple balance bucket shared by every component.
//!
//! Not persisted on its own (spec.md §3.1); it is the unit every arithmetic
//! operation, cache entry and row lock is keyed by.

use std::cmp::Ordering;
use std::fmt;

use uuid::Uuid;

/// `{user, section, item, collection, quality}`.
///
/// `item` is the Item entity's own identifier (spec.md §3.1), a UUID rather
/// than a classifier-backed int — class/type are metadata looked up
/// separately, not part of the key. `collection` and `quality` are optional
/// classifiers — most items aren't governed by either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemKey {
    pub user_id: i64,
    pub section_id: i32,
    pub item_id: Uuid,
    pub collection_id: Option<i32>,
    pub quality_id: Option<i32>,
}

impl ItemKey {
    pub fn new(
        user_id: i64,
        section_id: i32,
        item_id: Uuid,
        collection_id: Option<i32>,
        quality_id: Option<i32>,
    ) -> Self {
        Self {
            user_id,
            section_id,
            item_id,
            collection_id,
            quality_id,
        }
    }

    /// Same ItemKey in a different section — used to build the debit/credit
    /// pair of a reservation.
    pub fn with_section(&self, section_id: i32) -> Self {
        Self {
            section_id,
            ..*self
        }
    }

    /// Deterministic comparison tuple. `executor::execute_batch` processes
    /// and appends a batch's ItemKeys in this order (spec.md §9, "Transaction
    /// discipline") so two concurrent multi-item batches touching the same
    /// keys always contend for them in the same order, the same property
    /// per-ItemKey row locks would give a lock-based implementation.
    fn lock_order_tuple(&self) -> (i64, i32, Uuid, i32, i32) {
        (
            self.user_id,
            self.section_id,
            self.item_id,
            self.collection_id.unwrap_or(-1),
            self.quality_id.unwrap_or(-1),
        )
    }
}

impl PartialOrd for ItemKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ItemKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.lock_order_tuple().cmp(&other.lock_order_tuple())
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "user={} section={} item={} collection={:?} quality={:?}",
            self.user_id, self.section_id, self.item_id, self.collection_id, self.quality_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_order_is_deterministic_and_total() {
        let item_a = Uuid::from_u128(1);
        let item_b = Uuid::from_u128(2);
        let a = ItemKey::new(1, 1, item_a, None, None);
        let b = ItemKey::new(1, 1, item_b, None, None);
        let c = ItemKey::new(1, 2, item_a, None, None);
        let mut keys = vec![c, b, a];
        keys.sort();
        assert_eq!(keys, vec![a, b, c]);
    }

    #[test]
    fn with_section_preserves_rest_of_key() {
        let key = ItemKey::new(1, 1, Uuid::from_u128(7), Some(3), Some(9));
        let moved = key.with_section(2);
        assert_eq!(moved.section_id, 2);
        assert_eq!(moved.item_id, key.item_id);
        assert_eq!(moved.collection_id, key.collection_id);
        assert_eq!(moved.quality_id, key.quality_id);
    }
}
