// ============================================================
// Layer 3 — Model / Trainer Contract
// ============================================================
// A Model exposes exactly one operation: predict.
// A Trainer is a factory that produces Models from a training
// input. Both are user-supplied; the rest of the crate only ever
// sees them through these two traits.
//
// The three types a Trainer declares (training input, prediction
// input, prediction output) appear in the signature of `train`,
// so a Trainer can never hand back a Model of the wrong shape.
//
// Failures inside user code are reported through anyhow::Result.
// The service layer turns them into typed error responses.
//
// Reference: Rust Book §10.2 (Traits), §17.2 (Trait Objects)

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::Result;

// ─── Model ────────────────────────────────────────────────────────────────────
/// A unit of inference logic.
///
/// `predict` must be a pure function of the model's internal state and
/// the input. Models are shared across threads, so any interior state
/// has to be `Send + Sync`.
pub trait Model: Send + Sync {
    /// What the model consumes
    type Input;

    /// What the model produces
    type Output;

    /// Run inference. An error here is a prediction failure, not a
    /// framework fault.
    fn predict(&self, input: Self::Input) -> Result<Self::Output>;
}

/// A trained model as stored and served.
///
/// Storage entries and in-flight predictions hold the same immutable
/// model, hence the `Arc`.
pub type SharedModel<I, O> = Arc<dyn Model<Input = I, Output = O>>;

// ─── Trainer ──────────────────────────────────────────────────────────────────
/// A factory producing Models from a training input.
pub trait Trainer: Send + Sync {
    /// Input accepted by `train`
    type TrainInput;

    /// Input accepted by the produced model's `predict`
    type PredictInput;

    /// Output returned by the produced model's `predict`
    type PredictOutput;

    /// Build a new model. Failure (invalid input, resource exhaustion)
    /// must be returned, never swallowed.
    fn train(
        &self,
        input: Self::TrainInput,
    ) -> Result<SharedModel<Self::PredictInput, Self::PredictOutput>>;
}

impl<T: Trainer + ?Sized> Trainer for Arc<T> {
    type TrainInput    = T::TrainInput;
    type PredictInput  = T::PredictInput;
    type PredictOutput = T::PredictOutput;

    fn train(
        &self,
        input: Self::TrainInput,
    ) -> Result<SharedModel<Self::PredictInput, Self::PredictOutput>> {
        (**self).train(input)
    }
}

impl<T: Trainer + ?Sized> Trainer for Box<T> {
    type TrainInput    = T::TrainInput;
    type PredictInput  = T::PredictInput;
    type PredictOutput = T::PredictOutput;

    fn train(
        &self,
        input: Self::TrainInput,
    ) -> Result<SharedModel<Self::PredictInput, Self::PredictOutput>> {
        (**self).train(input)
    }
}

// ─── FnModel ──────────────────────────────────────────────────────────────────
/// Adapts a closure into a Model, for trainers whose models are a
/// single captured computation.
///
/// Example:
///   let k = 3;
///   let model = FnModel::new(move |x: i64| Ok(k * x * x));
pub struct FnModel<F, I, O> {
    func:    F,
    _marker: PhantomData<fn(I) -> O>,
}

impl<F, I, O> FnModel<F, I, O>
where
    F: Fn(I) -> Result<O> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func, _marker: PhantomData }
    }

    /// Wrap straight into the shared form stored by services.
    pub fn shared(func: F) -> SharedModel<I, O>
    where
        F: 'static,
        I: 'static,
        O: 'static,
    {
        Arc::new(Self::new(func))
    }
}

impl<F, I, O> Model for FnModel<F, I, O>
where
    F: Fn(I) -> Result<O> + Send + Sync,
{
    type Input  = I;
    type Output = O;

    fn predict(&self, input: I) -> Result<O> {
        (self.func)(input)
    }
}

impl<F, I, O> fmt::Debug for FnModel<F, I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnModel")
            .field("input", &std::any::type_name::<I>())
            .field("output", &std::any::type_name::<O>())
            .finish()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    struct Doubler;

    impl Trainer for Doubler {
        type TrainInput    = i64;
        type PredictInput  = i64;
        type PredictOutput = i64;

        fn train(&self, offset: i64) -> Result<SharedModel<i64, i64>> {
            if offset < 0 {
                anyhow::bail!("offset must be non-negative, got {offset}");
            }
            Ok(FnModel::shared(move |x: i64| Ok(2 * x + offset)))
        }
    }

    #[test]
    fn test_trained_model_predicts() {
        let model = Doubler.train(1).unwrap();
        assert_eq!(model.predict(5).unwrap(), 11);
    }

    #[test]
    fn test_trainer_failure_is_returned() {
        let err = match Doubler.train(-1) {
            Err(e) => e,
            Ok(_)  => panic!("negative offset must be rejected"),
        };
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn test_arc_trainer_delegates() {
        let trainer = Arc::new(Doubler);
        let model   = trainer.train(0).unwrap();
        assert_eq!(model.predict(4).unwrap(), 8);
    }

    #[test]
    fn test_fn_model_propagates_errors() {
        let model = FnModel::new(|x: i64| {
            if x == 0 { anyhow::bail!("zero") } else { Ok(10 / x) }
        });
        assert_eq!(model.predict(5).unwrap(), 2);
        assert!(model.predict(0).is_err());
    }
}
