// ============================================================
// Layer 3 — Request / Response Protocol
// ============================================================
// Immutable values exchanged with the service layer.
//
// Each operation has a request struct and a closed response enum.
// Not-found is an ordinary variant, not an error: callers match
// exhaustively and the compiler rejects a forgotten case.
//
//   train   → Success | Error
//   predict → Success | NotFound | Error
//   remove  → Success | NotFound
//
// Reference: Rust Book §6 (Enums and Pattern Matching)

use anyhow::Error;

// ─── Requests ─────────────────────────────────────────────────────────────────

/// Train a model from `input` and store it under `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainRequest<K, I> {
    pub key:   K,
    pub input: I,
}

impl<K, I> TrainRequest<K, I> {
    pub fn new(key: impl Into<K>, input: I) -> Self {
        Self { key: key.into(), input }
    }
}

/// Run the model stored under `key` on `input`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictRequest<K, I> {
    pub key:   K,
    pub input: I,
}

impl<K, I> PredictRequest<K, I> {
    pub fn new(key: impl Into<K>, input: I) -> Self {
        Self { key: key.into(), input }
    }
}

/// Evict the model stored under `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveRequest<K> {
    pub key: K,
}

impl<K> RemoveRequest<K> {
    pub fn new(key: impl Into<K>) -> Self {
        Self { key: key.into() }
    }
}

// ─── Responses ────────────────────────────────────────────────────────────────

/// Outcome of a train request.
#[derive(Debug)]
pub enum TrainResponse<K> {
    /// The model was built and written to storage
    Success { key: K },

    /// The trainer failed; storage was not touched
    Error { key: K, cause: Error },
}

impl<K> TrainResponse<K> {
    pub fn key(&self) -> &K {
        match self {
            Self::Success { key } | Self::Error { key, .. } => key,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Outcome of a predict request.
#[derive(Debug)]
pub enum PredictResponse<K, O> {
    /// The model ran and produced `output`
    Success { key: K, output: O },

    /// No model is stored under `key`
    NotFound { key: K },

    /// The model raised while predicting
    Error { key: K, cause: Error },
}

impl<K, O> PredictResponse<K, O> {
    pub fn key(&self) -> &K {
        match self {
            Self::Success { key, .. } | Self::NotFound { key } | Self::Error { key, .. } => key,
        }
    }

    /// The prediction output, if there was one.
    pub fn output(&self) -> Option<&O> {
        match self {
            Self::Success { output, .. } => Some(output),
            Self::NotFound { .. } | Self::Error { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Outcome of a remove request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveResponse<K> {
    /// A model was stored under `key` and has been evicted
    Success { key: K },

    /// Nothing was stored under `key`
    NotFound { key: K },
}

impl<K> RemoveResponse<K> {
    pub fn key(&self) -> &K {
        match self {
            Self::Success { key } | Self::NotFound { key } => key,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
