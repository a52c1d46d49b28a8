// ============================================================
// Layer 6 — Memoizing Storage Decorator
// ============================================================
// Wraps any Storage and remembers what it has already asked the
// backend, so repeated `get`s for the same key are answered
// locally.
//
//   get(key)           → cached answer if any, otherwise read the
//                        backend and cache what it said, including
//                        "absent"
//   update(key, value) → write through, then drop the cached entry
//   remove(key)        → delegate, then drop the cached entry
//
// The backend stays the authority. The cache has no TTL, no size
// bound, and never evicts on its own; mutations only invalidate.
//
// Three lookup states matter: never asked, asked and absent,
// asked and present. `lookup` returns them as CacheLookup.
//
// Concurrency: no lock is held while the backend runs, so a slow
// backend never stalls hits on other keys. Every invalidation bumps
// a generation counter under the write lock; a miss notes the
// generation before reading the backend and only caches its answer
// if no invalidation happened in between. A `get` racing a mutation
// may return the old or the new value, but once the mutation has
// returned no stale answer stays cached.
//
// Reference: Rust Book §16.3 (Shared-State Concurrency)
//            parking_lot::RwLock documentation

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use parking_lot::RwLock;

use crate::infra::storage::{Storage, StorageResult};

/// A backend answer held by the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Cached<V> {
    Absent,
    Present(V),
}

impl<V: Clone> Cached<V> {
    fn from_lookup(value: Option<V>) -> Self {
        match value {
            Some(v) => Self::Present(v),
            None    => Self::Absent,
        }
    }

    fn to_option(&self) -> Option<V> {
        match self {
            Self::Present(v) => Some(v.clone()),
            Self::Absent     => None,
        }
    }
}

/// What the cache knows about a key, without touching the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup<V> {
    /// The backend has not been asked about this key since the last
    /// mutation through this layer
    NotCached,

    /// The backend said there is no value
    CachedAbsent,

    /// The backend returned this value
    CachedPresent(V),
}

struct CacheState<K, V> {
    entries:    HashMap<K, Cached<V>>,
    generation: u64,
}

/// Read-through / write-invalidate cache over a Storage.
pub struct MemoizeStorage<S, K, V> {
    inner: S,
    cache: RwLock<CacheState<K, V>>,
}

impl<S, K, V> MemoizeStorage<S, K, V>
where
    S: Storage<K, V>,
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RwLock::new(CacheState { entries: HashMap::new(), generation: 0 }),
        }
    }

    /// Inspect the cache for `key`.
    pub fn lookup(&self, key: &K) -> CacheLookup<V> {
        match self.cache.read().entries.get(key) {
            None                       => CacheLookup::NotCached,
            Some(Cached::Absent)       => CacheLookup::CachedAbsent,
            Some(Cached::Present(v))   => CacheLookup::CachedPresent(v.clone()),
        }
    }

    /// Number of keys with a cached answer.
    pub fn cached_len(&self) -> usize {
        self.cache.read().entries.len()
    }

    /// Forget everything. For callers that know the backend was
    /// changed behind this layer's back.
    pub fn invalidate_all(&self) {
        let mut state = self.cache.write();
        state.generation = state.generation.wrapping_add(1);
        state.entries.clear();
    }

    fn invalidate(&self, key: &K) {
        let mut state = self.cache.write();
        state.generation = state.generation.wrapping_add(1);
        state.entries.remove(key);
    }

    /// The wrapped storage.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S, K, V> Storage<K, V> for MemoizeStorage<S, K, V>
where
    S: Storage<K, V>,
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> StorageResult<Option<V>> {
        let generation = {
            let state = self.cache.read();
            if let Some(cached) = state.entries.get(key) {
                return Ok(cached.to_option());
            }
            state.generation
        };

        // errors are propagated and never cached
        let value = self.inner.get(key)?;

        let mut state = self.cache.write();
        if state.generation == generation {
            state.entries.insert(key.clone(), Cached::from_lookup(value.clone()));
        }
        Ok(value)
    }

    // the key is invalidated even when the backend call fails
    fn update(&self, key: K, value: V) -> StorageResult<()> {
        let result = self.inner.update(key.clone(), value);
        self.invalidate(&key);
        result
    }

    fn remove(&self, key: &K) -> StorageResult<Option<V>> {
        let result = self.inner.remove(key);
        self.invalidate(key);
        result
    }
}

impl<S: fmt::Debug, K, V> fmt::Debug for MemoizeStorage<S, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoizeStorage")
            .field("inner", &self.inner)
            .field("cached", &self.cache.read().entries.len())
            .finish()
    }
}
