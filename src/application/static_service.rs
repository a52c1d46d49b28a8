// ============================================================
// Layer 2 — Static Model Service
// ============================================================
// Single-model serving: one model, fixed at construction, trained
// once outside the request path (typically from a file at
// startup). Only the prediction capability exists, so train and
// remove endpoints are never exposed for it.
//
// Requests still carry a key so they share the protocol types with
// the dynamic service. The key plays no part in dispatch and is
// echoed back in the response; the transport synthesizes "".

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::service::{guard, Addressing, ModelService, PredictionService};
use crate::domain::model::{SharedModel, Trainer};
use crate::domain::protocol::{PredictRequest, PredictResponse};
use crate::infra::storage::StorageResult;

/// Predict-only service over a single model.
pub struct StaticModelService<I, O> {
    model: SharedModel<I, O>,
}

impl<I, O> StaticModelService<I, O> {
    pub fn new(model: SharedModel<I, O>) -> Self {
        Self { model }
    }

    /// Train the one model up front. A trainer failure here is a
    /// startup failure, so it is returned as an error.
    pub fn train_once<T>(trainer: &T, input: T::TrainInput) -> Result<Self>
    where
        T: Trainer<PredictInput = I, PredictOutput = O>,
    {
        let model = guard("train", || trainer.train(input))
            .context("failed to train the static model")?;
        tracing::info!(trainer = std::any::type_name::<T>(), "static model trained");
        Ok(Self::new(model))
    }

    pub fn model(&self) -> &SharedModel<I, O> {
        &self.model
    }
}

impl<I, O> fmt::Debug for StaticModelService<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticModelService")
            .field("input", &std::any::type_name::<I>())
            .field("output", &std::any::type_name::<O>())
            .finish()
    }
}

impl<K, I, O> PredictionService<K, I, O> for StaticModelService<I, O>
where
    K: fmt::Debug,
{
    fn predict(&self, request: PredictRequest<K, I>) -> StorageResult<PredictResponse<K, O>> {
        let PredictRequest { key, input } = request;

        match guard("predict", || self.model.predict(input)) {
            Ok(output) => Ok(PredictResponse::Success { key, output }),
            Err(cause) => {
                tracing::warn!(key = ?key, error = %cause, "prediction failed");
                Ok(PredictResponse::Error { key, cause })
            }
        }
    }
}

impl<K, TI, I, O> ModelService<K, TI, I, O> for StaticModelService<I, O>
where
    K: fmt::Debug + 'static,
    TI: 'static,
    I: 'static,
    O: 'static,
{
    fn prediction(self: Arc<Self>) -> Option<Arc<dyn PredictionService<K, I, O>>> {
        Some(self)
    }

    fn addressing(&self) -> Addressing {
        Addressing::Unkeyed
    }
}
