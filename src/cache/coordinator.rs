//! Session-scoped mapping from provider identity to cache instance.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::cache::diff_cache::DiffCache;
use crate::cache::provider::{ProviderHandle, ProviderId};

/// Counter advanced every time a token sequence is replaced.
pub type Generation = u64;

/// Result of a cache lookup.
#[derive(Clone, Debug)]
pub struct CacheLookup {
    /// The cache for the requested provider identity.
    pub cache: Arc<DiffCache>,

    /// True when the token sequences changed since this provider's cache was
    /// last handed out, i.e. previously cached slice results were discarded.
    pub sequences_changed: bool,
}

/// Hands out at most one [`DiffCache`] per provider identity per session.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use htmldiff_tokens::cache::{CacheCoordinator, MemoryCacheProvider, ProviderHandle};
///
/// let coordinator = CacheCoordinator::new();
/// let provider = ProviderHandle::register(MemoryCacheProvider::new());
///
/// let first = coordinator.get_cache(&provider);
/// let second = coordinator.get_cache(&provider);
/// assert!(Arc::ptr_eq(&first.cache, &second.cache));
///
/// coordinator.advance_generation();
/// let third = coordinator.get_cache(&provider);
/// assert!(third.sequences_changed);
/// assert!(!Arc::ptr_eq(&first.cache, &third.cache));
/// ```
#[derive(Debug, Default)]
pub struct CacheCoordinator {
    generation: AtomicU64,
    caches: Mutex<AHashMap<ProviderId, Arc<DiffCache>>>,
}

impl CacheCoordinator {
    /// Create a coordinator at generation zero with no caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current generation.
    pub fn generation(&self) -> Generation {
        self.generation.load(Ordering::Acquire)
    }

    /// Record that a token sequence was replaced. Returns the new generation.
    pub fn advance_generation(&self) -> Generation {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Get the cache for `provider`, creating it on first access.
    ///
    /// A cache created under an older generation is replaced by a fresh one
    /// and the lookup reports `sequences_changed`.
    pub fn get_cache(&self, provider: &ProviderHandle) -> CacheLookup {
        let mut caches = self.caches.lock();
        let generation = self.generation();

        let existing = caches.get(&provider.id());
        if let Some(cache) = existing
            && cache.generation() == generation
        {
            return CacheLookup {
                cache: Arc::clone(cache),
                sequences_changed: false,
            };
        }

        let sequences_changed = existing.is_some();
        debug!(
            provider = %provider.id(),
            generation,
            stale = sequences_changed,
            "creating diff cache"
        );
        let cache = Arc::new(DiffCache::new(provider.clone(), generation));
        caches.insert(provider.id(), Arc::clone(&cache));
        CacheLookup {
            cache,
            sequences_changed,
        }
    }

    /// Whether `cache` was created for an older generation.
    pub fn is_stale(&self, cache: &DiffCache) -> bool {
        cache.generation() != self.generation()
    }

    /// Number of provider identities with a cache.
    pub fn len(&self) -> usize {
        self.caches.lock().len()
    }

    /// Whether no cache has been created yet.
    pub fn is_empty(&self) -> bool {
        self.caches.lock().is_empty()
    }

    /// Drop every cache, as at the end of a session.
    pub fn clear(&self) {
        self.caches.lock().clear();
    }
}
