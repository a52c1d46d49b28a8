// ============================================================
// Layer 2 — Service Capabilities
// ============================================================
// A service is not one monolithic type. It is described by which
// of three narrow capabilities it implements:
//
//   TrainingService   — train(TrainRequest)     → TrainResponse
//   PredictionService — predict(PredictRequest) → PredictResponse
//   RemovingService   — remove(RemoveRequest)   → RemoveResponse
//
// ModelService is the composition-time view: the transport asks it
// once, while wiring endpoints, which capabilities exist. A static
// single-model deployment therefore never exposes train or remove.
//
// Every operation returns Result<Response, StorageError>:
//   - user-code failures (trainer / model errors and panics) are
//     converted here into the Error variants, never propagated
//   - storage failures are NOT caught and come back as Err
//
// Reference: Rust Book §17.2 (Trait Objects)
//            Rust Book §9 (Error Handling)

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::domain::protocol::{
    PredictRequest, PredictResponse, RemoveRequest, RemoveResponse, TrainRequest, TrainResponse,
};
use crate::infra::storage::StorageResult;

// ─── Capabilities ─────────────────────────────────────────────────────────────

/// Build models and store them under caller-supplied keys.
pub trait TrainingService<K, I>: Send + Sync {
    fn train(&self, request: TrainRequest<K, I>) -> StorageResult<TrainResponse<K>>;
}

/// Answer predictions against a stored model.
pub trait PredictionService<K, I, O>: Send + Sync {
    fn predict(&self, request: PredictRequest<K, I>) -> StorageResult<PredictResponse<K, O>>;
}

/// Evict stored models.
pub trait RemovingService<K>: Send + Sync {
    fn remove(&self, request: RemoveRequest<K>) -> StorageResult<RemoveResponse<K>>;
}

/// Which capabilities a service supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub train:   bool,
    pub predict: bool,
    pub remove:  bool,
}

/// How callers address models on a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Addressing {
    /// Every request names its model by key
    Keyed,

    /// There is exactly one model; the key is synthesized
    Unkeyed,
}

// ─── ModelService ─────────────────────────────────────────────────────────────
/// Composition-time view of a service.
///
/// Each query hands back the service as the matching capability, or
/// `None` if it does not have it. Queries take `Arc<Self>` so the
/// returned handle can be stored by the transport for the lifetime
/// of the server.
pub trait ModelService<K, TI, PI, PO>: Send + Sync + 'static {
    fn training(self: Arc<Self>) -> Option<Arc<dyn TrainingService<K, TI>>> {
        None
    }

    fn prediction(self: Arc<Self>) -> Option<Arc<dyn PredictionService<K, PI, PO>>> {
        None
    }

    fn removing(self: Arc<Self>) -> Option<Arc<dyn RemovingService<K>>> {
        None
    }

    fn addressing(&self) -> Addressing {
        Addressing::Keyed
    }

    fn capabilities(self: Arc<Self>) -> Capabilities {
        Capabilities {
            train:   Arc::clone(&self).training().is_some(),
            predict: Arc::clone(&self).prediction().is_some(),
            remove:  self.removing().is_some(),
        }
    }
}

// ─── User-code boundary ───────────────────────────────────────────────────────

/// Run user trainer / model code, turning a panic into an ordinary
/// error so it is reported like any other failure.
pub(crate) fn guard<T>(operation: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result)   => result,
        Err(payload) => Err(anyhow!("{operation} panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_passes_results_through() {
        assert_eq!(guard("op", || Ok(3)).unwrap(), 3);
        let err = guard::<i32>("op", || Err(anyhow!("bad input"))).unwrap_err();
        assert_eq!(err.to_string(), "bad input");
    }

    #[test]
    fn test_guard_converts_panics() {
        let err = guard::<i32>("train", || panic!("weights exploded")).unwrap_err();
        assert_eq!(err.to_string(), "train panicked: weights exploded");

        let code = 7;
        let err = guard::<i32>("predict", || panic!("code {code}")).unwrap_err();
        assert_eq!(err.to_string(), "predict panicked: code 7");
    }

    /// A service with no capabilities at all.
    struct Inert;

    impl ModelService<String, (), (), ()> for Inert {}

    #[test]
    fn test_default_service_has_no_capabilities() {
        let service = Arc::new(Inert);
        assert_eq!(Arc::clone(&service).capabilities(), Capabilities::default());
        assert_eq!(service.addressing(), Addressing::Keyed);
    }
}
