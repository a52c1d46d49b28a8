// ============================================================
// Layer 6 — Storage Contract
// ============================================================
// Key-addressed persistence for trained models (or anything
// else). A key maps to at most one value at any time.
//
//   get(key)           → the value, or None
//   update(key, value) → replaces any existing value
//   remove(key)        → the removed value, or None
//
// Methods take &self: the service layer is shared across request
// handlers, so every backend owns its synchronization.
//
// Backend failures are returned as StorageError and are NOT
// recovered by the decorators or the service layer; they surface
// to the transport as a fault for that request. No layer above a
// backend retries.
//
// Reference: Rust Book §10.2 (Traits), §16.3 (Shared State)

use std::sync::Arc;

use thiserror::Error;

use crate::infra::codec::CodecError;

/// Failure of a storage backend or of the codec around it.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend itself failed (I/O, network, ...)
    #[error("storage backend failure: {message}")]
    Backend { message: String },

    /// A stored payload could not be encoded or decoded
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl StorageError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend { message: message.into() }
    }
}

/// Result alias used by every storage implementation.
pub type StorageResult<T> = Result<T, StorageError>;

/// Key → value mapping with pluggable backends.
pub trait Storage<K, V>: Send + Sync {
    /// Look up the value stored under `key`.
    fn get(&self, key: &K) -> StorageResult<Option<V>>;

    /// Store `value` under `key`, replacing any previous value.
    fn update(&self, key: K, value: V) -> StorageResult<()>;

    /// Delete the value under `key`, returning it if there was one.
    fn remove(&self, key: &K) -> StorageResult<Option<V>>;
}

impl<K, V, S> Storage<K, V> for Arc<S>
where
    S: Storage<K, V> + ?Sized,
{
    fn get(&self, key: &K) -> StorageResult<Option<V>> {
        (**self).get(key)
    }

    fn update(&self, key: K, value: V) -> StorageResult<()> {
        (**self).update(key, value)
    }

    fn remove(&self, key: &K) -> StorageResult<Option<V>> {
        (**self).remove(key)
    }
}

impl<K, V, S> Storage<K, V> for Box<S>
where
    S: Storage<K, V> + ?Sized,
{
    fn get(&self, key: &K) -> StorageResult<Option<V>> {
        (**self).get(key)
    }

    fn update(&self, key: K, value: V) -> StorageResult<()> {
        (**self).update(key, value)
    }

    fn remove(&self, key: &K) -> StorageResult<Option<V>> {
        (**self).remove(key)
    }
}
