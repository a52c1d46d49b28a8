// ============================================================
// Layer 6 — In-Memory Storage
// ============================================================
// A HashMap behind a parking_lot RwLock. No persistence, no
// eviction: the table grows with the number of distinct keys.
// Bounding it is a job for a different backend.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use parking_lot::RwLock;

use crate::infra::storage::{Storage, StorageResult};

/// Process-lifetime key → value table.
pub struct InMemoryStorage<K, V> {
    data: RwLock<HashMap<K, V>>,
}

impl<K, V> InMemoryStorage<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self { data: RwLock::new(HashMap::new()) }
    }

    /// Start from an existing table, e.g. models loaded at startup.
    pub fn with_data(data: HashMap<K, V>) -> Self {
        Self { data: RwLock::new(data) }
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.data.read().contains_key(key)
    }
}

impl<K, V> Default for InMemoryStorage<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for InMemoryStorage<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStorage")
            .field("entries", &self.data.read().len())
            .finish()
    }
}

impl<K, V> Storage<K, V> for InMemoryStorage<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> StorageResult<Option<V>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn update(&self, key: K, value: V) -> StorageResult<()> {
        self.data.write().insert(key, value);
        Ok(())
    }

    fn remove(&self, key: &K) -> StorageResult<Option<V>> {
        Ok(self.data.write().remove(key))
    }
}
