//! Cache providers and their identities.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::error::Result;

/// Storage backend for memoized diff results.
///
/// Implementations are supplied by the caller (an on-disk store, a shared
/// key-value service, ...). Keys and values are opaque strings.
pub trait CacheProvider: Send + Sync {
    /// Fetch the value stored under `key`.
    fn fetch(&self, key: &str) -> Option<String>;

    /// Whether a value is stored under `key`.
    fn contains(&self, key: &str) -> bool {
        self.fetch(key).is_some()
    }

    /// Store `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Get the name of this provider (for debugging and logging).
    fn name(&self) -> &'static str;
}

/// In-process provider backed by a hash map.
#[derive(Debug, Default)]
pub struct MemoryCacheProvider {
    entries: RwLock<AHashMap<String, String>>,
}

impl MemoryCacheProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl CacheProvider for MemoryCacheProvider {
    fn fetch(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

static NEXT_PROVIDER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity assigned when a provider is registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(u64);

impl ProviderId {
    /// The raw identifier.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "provider-{}", self.0)
    }
}

/// A registered cache provider.
///
/// Clones share the identity; each call to [`ProviderHandle::register`] or
/// [`ProviderHandle::from_arc`] creates a new one, even for the same
/// underlying provider value. Equality compares identities only.
///
/// # Examples
///
/// ```
/// use htmldiff_tokens::cache::{MemoryCacheProvider, ProviderHandle};
///
/// let a = ProviderHandle::register(MemoryCacheProvider::new());
/// let b = ProviderHandle::register(MemoryCacheProvider::new());
///
/// assert_eq!(a, a.clone());
/// assert_ne!(a, b);
/// ```
#[derive(Clone)]
pub struct ProviderHandle {
    id: ProviderId,
    provider: Arc<dyn CacheProvider>,
}

impl ProviderHandle {
    /// Register a provider and assign it a fresh identity.
    pub fn register<P: CacheProvider + 'static>(provider: P) -> Self {
        Self::from_arc(Arc::new(provider))
    }

    /// Register a shared provider and assign it a fresh identity.
    pub fn from_arc(provider: Arc<dyn CacheProvider>) -> Self {
        ProviderHandle {
            id: ProviderId(NEXT_PROVIDER_ID.fetch_add(1, Ordering::Relaxed)),
            provider,
        }
    }

    /// The identity of this handle.
    pub fn id(&self) -> ProviderId {
        self.id
    }

    /// The underlying provider.
    pub fn provider(&self) -> &Arc<dyn CacheProvider> {
        &self.provider
    }
}

impl PartialEq for ProviderHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ProviderHandle {}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("id", &self.id)
            .field("provider", &self.provider.name())
            .finish()
    }
}
