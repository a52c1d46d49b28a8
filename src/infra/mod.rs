// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Where trained models live, and how the process is configured.
//
//   storage.rs    — The Storage<K, V> contract every backend meets
//   in_memory.rs  — HashMap behind a RwLock; the default backend
//   memoize.rs    — Read-through cache over any Storage, including
//                   remembered misses
//   codec.rs      — Value <-> bytes conversion (JSON by default)
//   serialized.rs — Adapts a byte-valued Storage to typed values
//                   through a Codec
//   config.rs     — Listen address from defaults and environment
//
// The decorators compose, e.g.
//   MemoizeStorage(SerializedStorage(InMemoryStorage<K, Vec<u8>>))
// and the result is still a Storage<K, V>.

pub mod codec;
pub mod config;
pub mod in_memory;
pub mod memoize;
pub mod serialized;
pub mod storage;
