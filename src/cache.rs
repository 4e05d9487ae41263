use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// How long a cached list/detail page stays valid.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Cache key built from the entity type and the normalized filter set.
/// Filters are sorted by name so `?a=1&b=2` and `?b=2&a=1` share an
/// entry, and read paths cannot invent ad hoc key strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    entity: &'static str,
    filters: Vec<(String, String)>,
}

impl CacheKey {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            filters: Vec::new(),
        }
    }

    pub fn filter(mut self, name: &str, value: impl ToString) -> Self {
        let value = value.to_string();
        match self.filters.binary_search_by(|(n, _)| n.as_str().cmp(name)) {
            Ok(pos) => self.filters[pos] = (name.to_string(), value),
            Err(pos) => self.filters.insert(pos, (name.to_string(), value)),
        }
        self
    }

    pub fn filter_opt(self, name: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.filter(name, v),
            None => self,
        }
    }
}

struct Entry {
    inserted_at: Instant,
    ttl: Duration,
    value: Value,
}

/// In-process response cache for list/detail reads. Purely an
/// availability/latency optimization: every write path must call
/// `invalidate` for the entity types it touched, and correctness never
/// depends on a hit.
#[derive(Clone, Default)]
pub struct ResponseCache {
    entries: Arc<DashMap<CacheKey, Entry>>,
}

impl ResponseCache {
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let entry = self.entries.get(key)?;
        if entry.inserted_at.elapsed() > entry.ttl {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    pub fn put<T: Serialize>(&self, key: CacheKey, value: &T) {
        self.put_with_ttl(key, value, DEFAULT_TTL)
    }

    pub fn put_with_ttl<T: Serialize>(&self, key: CacheKey, value: &T, ttl: Duration) {
        let Ok(value) = serde_json::to_value(value) else {
            return;
        };
        self.entries.insert(
            key,
            Entry {
                inserted_at: Instant::now(),
                ttl,
                value,
            },
        );
    }

    /// Drop every cached page for one entity type. Called synchronously
    /// after a successful write to that type.
    pub fn invalidate(&self, entity: &'static str) {
        self.entries.retain(|key, _| key.entity != entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Page {
        items: Vec<String>,
    }

    fn page(items: &[&str]) -> Page {
        Page {
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn filter_order_does_not_matter() {
        let a = CacheKey::new("products").filter("page", 1).filter("q", "x");
        let b = CacheKey::new("products").filter("q", "x").filter("page", 1);
        assert_eq!(a, b);
    }

    #[test]
    fn hit_after_put_miss_after_invalidate() {
        let cache = ResponseCache::default();
        let key = CacheKey::new("products").filter("page", 1);

        assert_eq!(cache.get::<Page>(&key), None);
        cache.put(key.clone(), &page(&["a"]));
        assert_eq!(cache.get::<Page>(&key), Some(page(&["a"])));

        cache.invalidate("products");
        assert_eq!(cache.get::<Page>(&key), None);
    }

    #[test]
    fn invalidate_is_scoped_to_entity() {
        let cache = ResponseCache::default();
        let products = CacheKey::new("products");
        let brands = CacheKey::new("brands");
        cache.put(products.clone(), &page(&["p"]));
        cache.put(brands.clone(), &page(&["b"]));

        cache.invalidate("products");
        assert_eq!(cache.get::<Page>(&products), None);
        assert_eq!(cache.get::<Page>(&brands), Some(page(&["b"])));
    }

    #[test]
    fn expired_entries_miss() {
        let cache = ResponseCache::default();
        let key = CacheKey::new("products");
        cache.put_with_ttl(key.clone(), &page(&["a"]), Duration::from_secs(0));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get::<Page>(&key), None);
    }
}
