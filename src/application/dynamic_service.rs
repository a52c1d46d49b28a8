// ============================================================
// Layer 2 — Dynamic Model Service
// ============================================================
// Multi-model serving: a Trainer plus a Storage, with every
// request addressed by a caller-supplied key.
//
//   train   → trainer.train(input), then storage.update(key, model)
//             trainer failure: TrainResponse::Error, storage untouched
//   predict → storage.get(key), then model.predict(input)
//             absent: NotFound, model failure: PredictResponse::Error
//   remove  → storage.remove(key)
//             absent: NotFound
//
// Concurrent train calls on one key are last-writer-wins; the
// service adds no ordering on top of the storage's own per-call
// atomicity.

use std::fmt;
use std::sync::Arc;

use crate::application::service::{
    guard, ModelService, PredictionService, RemovingService, TrainingService,
};
use crate::domain::model::{SharedModel, Trainer};
use crate::domain::protocol::{
    PredictRequest, PredictResponse, RemoveRequest, RemoveResponse, TrainRequest, TrainResponse,
};
use crate::infra::storage::{Storage, StorageResult};

/// Train / predict / remove over a shared storage.
pub struct DynamicModelService<T, S> {
    trainer: T,
    storage: S,
}

impl<T, S> DynamicModelService<T, S>
where
    T: Trainer,
{
    pub fn new(trainer: T, storage: S) -> Self {
        Self { trainer, storage }
    }

    pub fn trainer(&self) -> &T {
        &self.trainer
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<T, S> fmt::Debug for DynamicModelService<T, S>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicModelService")
            .field("trainer", &std::any::type_name::<T>())
            .field("storage", &self.storage)
            .finish()
    }
}

impl<T, S, K> TrainingService<K, T::TrainInput> for DynamicModelService<T, S>
where
    T: Trainer,
    S: Storage<K, SharedModel<T::PredictInput, T::PredictOutput>>,
    K: Clone + fmt::Debug,
{
    fn train(&self, request: TrainRequest<K, T::TrainInput>) -> StorageResult<TrainResponse<K>> {
        let TrainRequest { key, input } = request;

        let model = match guard("train", || self.trainer.train(input)) {
            Ok(model) => model,
            Err(cause) => {
                tracing::warn!(key = ?key, error = %cause, "training failed");
                return Ok(TrainResponse::Error { key, cause });
            }
        };

        self.storage.update(key.clone(), model)?;
        tracing::debug!(key = ?key, "model trained and stored");

        Ok(TrainResponse::Success { key })
    }
}

impl<T, S, K> PredictionService<K, T::PredictInput, T::PredictOutput> for DynamicModelService<T, S>
where
    T: Trainer,
    S: Storage<K, SharedModel<T::PredictInput, T::PredictOutput>>,
    K: fmt::Debug,
{
    fn predict(
        &self,
        request: PredictRequest<K, T::PredictInput>,
    ) -> StorageResult<PredictResponse<K, T::PredictOutput>> {
        let PredictRequest { key, input } = request;

        let Some(model) = self.storage.get(&key)? else {
            tracing::debug!(key = ?key, "no model to predict with");
            return Ok(PredictResponse::NotFound { key });
        };

        match guard("predict", || model.predict(input)) {
            Ok(output) => {
                tracing::debug!(key = ?key, "prediction served");
                Ok(PredictResponse::Success { key, output })
            }
            Err(cause) => {
                tracing::warn!(key = ?key, error = %cause, "prediction failed");
                Ok(PredictResponse::Error { key, cause })
            }
        }
    }
}

impl<T, S, K> RemovingService<K> for DynamicModelService<T, S>
where
    T: Trainer,
    S: Storage<K, SharedModel<T::PredictInput, T::PredictOutput>>,
    K: fmt::Debug,
{
    fn remove(&self, request: RemoveRequest<K>) -> StorageResult<RemoveResponse<K>> {
        let RemoveRequest { key } = request;

        match self.storage.remove(&key)? {
            Some(_) => {
                tracing::debug!(key = ?key, "model removed");
                Ok(RemoveResponse::Success { key })
            }
            None => Ok(RemoveResponse::NotFound { key }),
        }
    }
}

impl<T, S, K> ModelService<K, T::TrainInput, T::PredictInput, T::PredictOutput>
    for DynamicModelService<T, S>
where
    T: Trainer + 'static,
    T::TrainInput: 'static,
    T::PredictInput: 'static,
    T::PredictOutput: 'static,
    S: Storage<K, SharedModel<T::PredictInput, T::PredictOutput>> + 'static,
    K: Clone + fmt::Debug + 'static,
{
    fn training(self: Arc<Self>) -> Option<Arc<dyn TrainingService<K, T::TrainInput>>> {
        Some(self)
    }

    fn prediction(
        self: Arc<Self>,
    ) -> Option<Arc<dyn PredictionService<K, T::PredictInput, T::PredictOutput>>> {
        Some(self)
    }

    fn removing(self: Arc<Self>) -> Option<Arc<dyn RemovingService<K>>> {
        Some(self)
    }
}
