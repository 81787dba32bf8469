//! Diff-result caching scoped by cache-provider identity.
//!
//! An externally supplied [`CacheProvider`](provider::CacheProvider) is
//! registered once as a [`ProviderHandle`](provider::ProviderHandle), which
//! gives it a stable identity. Within a diff session the
//! [`CacheCoordinator`](coordinator::CacheCoordinator) maps each identity to
//! exactly one [`DiffCache`](diff_cache::DiffCache). Two providers with equal
//! settings are still distinct handles and get distinct caches.
//!
//! Replacing either token sequence advances the coordinator's generation;
//! a cache created under an older generation is stale and is replaced on
//! the next lookup, which reports `sequences_changed`.

pub mod coordinator;
pub mod diff_cache;
pub mod provider;

pub use coordinator::{CacheCoordinator, CacheLookup, Generation};
pub use diff_cache::DiffCache;
pub use provider::{CacheProvider, MemoryCacheProvider, ProviderHandle, ProviderId};
