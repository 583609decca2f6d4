//! TTL cache for classifier maps.
//!
//! The teacher's `gateway::cache` wraps `AssetManager`/`SymbolManager` loads
//! with the `cached` proc-macro for a flat 5s TTL with no eviction hook.
//! Spec.md §4.1 needs an explicit `invalidate(classifier_code)`, which the
//! proc-macro form can't express, so this is a small hand-rolled
//! `DashMap`-backed cache instead — still in-process, still the teacher's
//! preferred style of keeping hot reference data off the database's critical
//! path.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::repository::ClassifierMaps;

struct Entry {
    maps: Arc<ClassifierMaps>,
    expires_at: Instant,
}

pub struct ClassifierCache {
    entries: DashMap<String, Entry>,
    ttl: Duration,
}

impl ClassifierCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, classifier_code: &str) -> Option<Arc<ClassifierMaps>> {
        let entry = self.entries.get(classifier_code)?;
        if entry.expires_at > Instant::now() {
            Some(entry.maps.clone())
        } else {
            None
        }
    }

    pub fn set(&self, classifier_code: &str, maps: ClassifierMaps) -> Arc<ClassifierMaps> {
        let maps = Arc::new(maps);
        self.entries.insert(
            classifier_code.to_string(),
            Entry {
                maps: maps.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        maps
    }

    pub fn invalidate(&self, classifier_code: &str) {
        self.entries.remove(classifier_code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn sample_maps() -> ClassifierMaps {
        let mut code_to_id = FxHashMap::default();
        code_to_id.insert("main".to_string(), 1);
        let mut id_to_code = FxHashMap::default();
        id_to_code.insert(1, "main".to_string());
        ClassifierMaps {
            code_to_id,
            id_to_code,
        }
    }

    #[test]
    fn set_then_get_hits_within_ttl() {
        let cache = ClassifierCache::new(Duration::from_secs(60));
        cache.set("inventory_section", sample_maps());
        assert!(cache.get("inventory_section").is_some());
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let cache = ClassifierCache::new(Duration::from_millis(0));
        cache.set("inventory_section", sample_maps());
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("inventory_section").is_none());
    }

    #[test]
    fn invalidate_drops_both_directions() {
        let cache = ClassifierCache::new(Duration::from_secs(60));
        cache.set("inventory_section", sample_maps());
        cache.invalidate("inventory_section");
        assert!(cache.get("inventory_section").is_none());
    }
}
