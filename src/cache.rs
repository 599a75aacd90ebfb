//! In-memory response cache with lazy TTL expiry.

use base64::Engine as _;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Bytes of subject content that are encoded verbatim into a cache key.
const KEY_PREFIX_BYTES: usize = 64;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.stored_at + self.ttl
    }
}

/// Maps a derived key to a previously computed JSON result.
///
/// Entries are only evicted when a lookup finds them stale.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl ResponseCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        match entries.get(key) {
            Some(entry) if entry.is_fresh(now) => Some(entry.value.clone()),
            Some(_) => {
                tracing::debug!("Cache entry expired: {}", key);
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: String, value: Value) {
        self.put_with_ttl(key, value, self.default_ttl);
    }

    pub fn put_with_ttl(&self, key: String, value: Value, ttl: Duration) {
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
            ttl,
        };
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, entry);
    }

    /// Number of stored entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Derive a cache key from the operation kind, target language and subject.
///
/// The readable part is a base64 encoding of a bounded prefix; the length and a
/// digest of the whole subject keep subjects that share a prefix apart.
pub fn cache_key(operation: &str, language: &str, subject: &[u8]) -> String {
    let prefix = &subject[..subject.len().min(KEY_PREFIX_BYTES)];
    let encoded = base64::engine::general_purpose::STANDARD_NO_PAD.encode(prefix);

    let mut hasher = DefaultHasher::new();
    subject.hash(&mut hasher);

    format!(
        "{}:{}:{}:{}:{:016x}",
        operation,
        language,
        encoded,
        subject.len(),
        hasher.finish()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl_and_miss_after() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.put("k".to_string(), json!({"a": 1}));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("k"), Some(json!({"a": 1})));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("k"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_evicted_on_lookup_only() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        cache.put("k".to_string(), json!(1));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(cache.len(), 1);
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_with_ttl_overrides_default() {
        let cache = ResponseCache::default();
        cache.put_with_ttl("short".to_string(), json!("v"), Duration::from_secs(5));

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(cache.get("short").is_none());
    }

    #[test]
    fn test_cache_key_is_deterministic() {
        assert_eq!(
            cache_key("brand", "en", b"Stripe"),
            cache_key("brand", "en", b"Stripe")
        );
    }

    #[test]
    fn test_cache_key_separates_operation_and_language() {
        let base = cache_key("brand", "en", b"Stripe");
        assert_ne!(base, cache_key("trends", "en", b"Stripe"));
        assert_ne!(base, cache_key("brand", "fr", b"Stripe"));
    }

    #[test]
    fn test_cache_key_separates_subjects_with_shared_prefix() {
        let mut a = vec![0x89, 0x50, 0x4E, 0x47];
        a.extend(std::iter::repeat(0u8).take(200));
        let mut b = a.clone();
        b.push(1);
        let mut c = a.clone();
        *c.last_mut().unwrap() = 9;

        assert_ne!(cache_key("audit", "en", &a), cache_key("audit", "en", &b));
        assert_ne!(cache_key("audit", "en", &a), cache_key("audit", "en", &c));
    }
}
