//! Per-session view of one cache provider.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use crate::cache::coordinator::Generation;
use crate::cache::provider::{CacheProvider, ProviderHandle};
use crate::error::Result;

/// Memoizes diff results for one provider identity within one session.
///
/// Finished diffs are persisted through the provider, keyed by the hashes of
/// both documents and the digest of the configuration they were diffed under. Intermediate results the diff engine computes over token
/// slices live in a session-local memo that is dropped together with the
/// cache when the token sequences change.
pub struct DiffCache {
    provider: ProviderHandle,
    generation: Generation,
    memo: RwLock<AHashMap<String, Arc<str>>>,
}

impl DiffCache {
    /// Create a cache for `provider`, valid for `generation`.
    pub fn new(provider: ProviderHandle, generation: Generation) -> Self {
        DiffCache {
            provider,
            generation,
            memo: RwLock::new(AHashMap::new()),
        }
    }

    /// The provider this cache writes through to.
    pub fn provider(&self) -> &ProviderHandle {
        &self.provider
    }

    /// Generation of the token sequences this cache was created for.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether a diff of `old_text` against `new_text` is stored for the
    /// configuration with digest `config_digest`.
    pub fn contains(&self, old_text: &str, new_text: &str, config_digest: &str) -> bool {
        self.backend()
            .contains(&Self::hash_key(old_text, new_text, config_digest))
    }

    /// Fetch the stored diff of `old_text` against `new_text`.
    pub fn fetch(&self, old_text: &str, new_text: &str, config_digest: &str) -> Option<String> {
        self.backend()
            .fetch(&Self::hash_key(old_text, new_text, config_digest))
    }

    /// Store the diff of `old_text` against `new_text`.
    pub fn save(
        &self,
        old_text: &str,
        new_text: &str,
        config_digest: &str,
        content: &str,
    ) -> Result<()> {
        self.backend()
            .save(&Self::hash_key(old_text, new_text, config_digest), content)
    }

    /// Return the memoized value for `key`, computing and storing it on a miss.
    pub fn memoize<F>(&self, key: &str, compute: F) -> Result<Arc<str>>
    where
        F: FnOnce() -> Result<String>,
    {
        if let Some(value) = self.memo.read().get(key) {
            return Ok(Arc::clone(value));
        }

        let value: Arc<str> = Arc::from(compute()?);
        let mut memo = self.memo.write();
        // Another caller may have filled the slot while we computed.
        let stored = memo.entry(key.to_string()).or_insert(value);
        Ok(Arc::clone(stored))
    }

    /// Number of memoized entries.
    pub fn memo_len(&self) -> usize {
        self.memo.read().len()
    }

    /// Provider key for a pair of documents diffed under one configuration.
    pub fn hash_key(old_text: &str, new_text: &str, config_digest: &str) -> String {
        let mut key = hex::encode(Sha256::digest(old_text.as_bytes()));
        key.push_str(&hex::encode(Sha256::digest(new_text.as_bytes())));
        key.push_str(config_digest);
        key
    }

    fn backend(&self) -> &dyn CacheProvider {
        self.provider.provider().as_ref()
    }
}

impl std::fmt::Debug for DiffCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffCache")
            .field("provider", &self.provider)
            .field("generation", &self.generation)
            .field("memo_len", &self.memo_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::provider::MemoryCacheProvider;

    #[test]
    fn test_save_and_fetch() {
        let cache = DiffCache::new(ProviderHandle::register(MemoryCacheProvider::new()), 0);
        assert!(!cache.contains("old", "new", "c1"));

        cache
            .save("old", "new", "c1", "<del>old</del><ins>new</ins>")
            .unwrap();
        assert!(cache.contains("old", "new", "c1"));
        assert!(!cache.contains("new", "old", "c1"));
        assert!(!cache.contains("old", "new", "c2"));
        assert_eq!(
            cache.fetch("old", "new", "c1").as_deref(),
            Some("<del>old</del><ins>new</ins>")
        );
    }

    #[test]
    fn test_hash_key_separates_documents() {
        let key = DiffCache::hash_key("ab", "c", "");
        assert_eq!(key.len(), 128);
        assert_ne!(key, DiffCache::hash_key("a", "bc", ""));
        assert_ne!(
            DiffCache::hash_key("a", "b", "c1"),
            DiffCache::hash_key("a", "b", "c2")
        );
    }

    #[test]
    fn test_memoize_computes_once() {
        let cache = DiffCache::new(ProviderHandle::register(MemoryCacheProvider::new()), 3);
        let mut calls = 0;

        let first = cache
            .memoize("0..4", || {
                calls += 1;
                Ok("slice".to_string())
            })
            .unwrap();
        let second = cache
            .memoize("0..4", || {
                calls += 1;
                Ok("other".to_string())
            })
            .unwrap();

        assert_eq!(&*first, "slice");
        assert_eq!(&*second, "slice");
        assert_eq!(calls, 1);
        assert_eq!(cache.memo_len(), 1);
        assert_eq!(cache.generation(), 3);
    }
}
