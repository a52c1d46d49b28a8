// ============================================================
// Layer 6 — Serializing Storage Decorator
// ============================================================
// Presents a bytes-oriented backend (Storage<K, Vec<u8>>) as a
// typed Storage<K, V> by running every value through a Codec.
//
//   get / remove → decode the payload, if there is one
//   update       → encode, then write through
//
// Absent stays absent without touching the codec. Codec failures
// come back as StorageError::Codec.

use std::fmt;
use std::marker::PhantomData;

use crate::infra::codec::Codec;
use crate::infra::storage::{Storage, StorageResult};

pub struct SerializedStorage<S, C, V> {
    inner:   S,
    codec:   C,
    _marker: PhantomData<fn() -> V>,
}

impl<S, C, V> SerializedStorage<S, C, V> {
    pub fn new(inner: S, codec: C) -> Self {
        Self {
            inner,
            codec,
            _marker: PhantomData,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn decode(&self, payload: Option<Vec<u8>>) -> StorageResult<Option<V>>
    where
        C: Codec<V>,
    {
        match payload {
            Some(bytes) => Ok(Some(self.codec.decode(&bytes)?)),
            None        => Ok(None),
        }
    }
}

impl<S, C, V, K> Storage<K, V> for SerializedStorage<S, C, V>
where
    S: Storage<K, Vec<u8>>,
    C: Codec<V>,
{
    fn get(&self, key: &K) -> StorageResult<Option<V>> {
        let payload = self.inner.get(key)?;
        self.decode(payload)
    }

    fn update(&self, key: K, value: V) -> StorageResult<()> {
        let payload = self.codec.encode(&value)?;
        self.inner.update(key, payload)
    }

    fn remove(&self, key: &K) -> StorageResult<Option<V>> {
        let payload = self.inner.remove(key)?;
        self.decode(payload)
    }
}

impl<S: fmt::Debug, C: fmt::Debug, V> fmt::Debug for SerializedStorage<S, C, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializedStorage")
            .field("inner", &self.inner)
            .field("codec", &self.codec)
            .finish()
    }
}
