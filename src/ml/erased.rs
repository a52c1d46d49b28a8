// ============================================================
// Layer 5 — JSON Type Erasure
// ============================================================
// The transport speaks JSON and cannot be generic over every
// user trainer. JsonTrainer / JsonModel wrap a typed Trainer /
// Model so that all three of its types become serde_json::Value:
//
//   JsonTrainer::train   Value → T::TrainInput → train → JsonModel
//   JsonModel::predict   Value → I → predict → O → Value
//
// A payload that does not decode into the declared type is a
// failure of that operation (a train or predict error), not a
// framework fault.
//
// TypeDescriptor records the name of each erased type so it can
// still be reported (describe endpoint, startup logs).
//
// An InputCheck tests a payload against a declared input type
// without calling any user code. Transports run it first so a
// malformed request is rejected as the caller's fault.

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::domain::model::{Model, SharedModel, Trainer};

/// A trainer speaking JSON on every side.
pub type ErasedTrainer = Arc<dyn Trainer<TrainInput = Value, PredictInput = Value, PredictOutput = Value>>;

/// A model speaking JSON on both sides.
pub type ErasedModel = SharedModel<Value, Value>;

// ─── TypeDescriptor ───────────────────────────────────────────────────────────
/// Name of a type whose static identity was erased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    name: &'static str,
}

impl TypeDescriptor {
    pub fn of<T: ?Sized>() -> Self {
        Self { name: type_name::<T>() }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl Serialize for TypeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

// ─── Input checks ─────────────────────────────────────────────────────────────

/// A payload that does not decode into the declared input type.
#[derive(Debug, Error)]
#[error("input is not a valid {expected}: {message}")]
pub struct InputError {
    pub expected: TypeDescriptor,
    pub message:  String,
}

/// Tests a JSON payload against one declared input type.
pub type InputCheck = fn(&Value) -> Result<(), InputError>;

/// The InputCheck for `T`.
pub fn check_input<T: DeserializeOwned>(value: &Value) -> Result<(), InputError> {
    T::deserialize(value).map(drop).map_err(|e| InputError {
        expected: TypeDescriptor::of::<T>(),
        message:  e.to_string(),
    })
}

// ─── JsonTrainer ──────────────────────────────────────────────────────────────
/// Wraps a typed trainer behind JSON inputs and outputs.
pub struct JsonTrainer<T> {
    inner: T,
}

impl<T> JsonTrainer<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> Trainer for JsonTrainer<T>
where
    T: Trainer,
    T::TrainInput: DeserializeOwned,
    T::PredictInput: DeserializeOwned + 'static,
    T::PredictOutput: Serialize + 'static,
{
    type TrainInput    = Value;
    type PredictInput  = Value;
    type PredictOutput = Value;

    fn train(&self, input: Value) -> Result<ErasedModel> {
        let input: T::TrainInput = serde_json::from_value(input).with_context(|| {
            format!("training input is not a valid {}", type_name::<T::TrainInput>())
        })?;

        let model = self.inner.train(input)?;
        Ok(Arc::new(JsonModel::new(model)))
    }
}

// ─── JsonModel ────────────────────────────────────────────────────────────────
/// Wraps a typed model behind JSON input and output.
pub struct JsonModel<I, O> {
    inner: SharedModel<I, O>,
}

impl<I, O> JsonModel<I, O> {
    pub fn new(inner: SharedModel<I, O>) -> Self {
        Self { inner }
    }
}

impl<I, O> Model for JsonModel<I, O>
where
    I: DeserializeOwned,
    O: Serialize,
{
    type Input  = Value;
    type Output = Value;

    fn predict(&self, input: Value) -> Result<Value> {
        let input: I = serde_json::from_value(input)
            .with_context(|| format!("prediction input is not a valid {}", type_name::<I>()))?;

        let output = self.inner.predict(input)?;

        serde_json::to_value(output)
            .with_context(|| format!("cannot encode {} as JSON", type_name::<O>()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    use crate::domain::model::FnModel;

    #[derive(Debug, Deserialize)]
    struct Line {
        slope:     f64,
        intercept: f64,
    }

    #[derive(Debug, Serialize)]
    struct Estimate {
        y: f64,
    }

    struct LineTrainer;

    impl Trainer for LineTrainer {
        type TrainInput    = Line;
        type PredictInput  = f64;
        type PredictOutput = Estimate;

        fn train(&self, line: Line) -> Result<SharedModel<f64, Estimate>> {
            Ok(FnModel::shared(move |x: f64| Ok(Estimate { y: line.slope * x + line.intercept })))
        }
    }

    #[test]
    fn test_json_round_trip_through_typed_trainer() {
        let trainer = JsonTrainer::new(LineTrainer);
        let model   = trainer.train(json!({"slope": 2.0, "intercept": 1.0})).unwrap();
        assert_eq!(model.predict(json!(3.0)).unwrap(), json!({"y": 7.0}));
    }

    #[test]
    fn test_bad_training_payload_is_a_train_error() {
        let trainer = JsonTrainer::new(LineTrainer);
        let err = match trainer.train(json!({"slope": "steep"})) {
            Err(e) => e,
            Ok(_)  => panic!("payload should not decode"),
        };
        assert!(err.to_string().contains("training input is not a valid"));
    }

    #[test]
    fn test_bad_prediction_payload_is_a_predict_error() {
        let trainer = JsonTrainer::new(LineTrainer);
        let model   = trainer.train(json!({"slope": 1.0, "intercept": 0.0})).unwrap();
        let err     = model.predict(json!("three")).unwrap_err();
        assert!(err.to_string().contains("prediction input is not a valid f64"));
    }

    #[test]
    fn test_input_check_names_the_expected_type() {
        assert!(check_input::<i64>(&json!(4)).is_ok());
        assert!(check_input::<Value>(&json!("anything")).is_ok());

        let err = check_input::<i64>(&json!("four")).unwrap_err();
        assert_eq!(err.expected, TypeDescriptor::of::<i64>());
        assert!(err.to_string().starts_with("input is not a valid i64: invalid type"));
    }

    #[test]
    fn test_type_descriptor_names() {
        assert_eq!(TypeDescriptor::of::<i64>().name(), "i64");
        assert_eq!(TypeDescriptor::of::<String>().to_string(), "alloc::string::String");
        assert_eq!(serde_json::to_value(TypeDescriptor::of::<u8>()).unwrap(), json!("u8"));
    }
}
