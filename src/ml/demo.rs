// ============================================================
// Layer 5 — Built-in Demo Trainers
// ============================================================
// Small trainers registered by EntrypointLoader::with_builtins so
// the binary can be tried without writing any code:
//
//   demo.square:ScaledSquareTrainer
//     train input:  k (integer, must be >= 0)
//     model:        x ↦ k · x²
//
//   demo.square:FileScaledSquareTrainer
//     train input:  path to a JSON file holding k
//     model:        same as above; meant for `run static`
//
//   demo.square:ConstantScaledSquareTrainer -a <k>
//     k fixed by the one entrypoint argument
//     train input:  a seed (integer, must be >= 0); it only gates
//                   training, the model ignores it
//     model:        x ↦ k · x²
//
// Only the constant trainer takes an entrypoint argument.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};

use crate::domain::model::{Model, SharedModel, Trainer};
use crate::ml::loader::{expect_no_args, EntrypointLoader, ResolveError};

pub const SCALED_SQUARE: &str      = "demo.square:ScaledSquareTrainer";
pub const FILE_SCALED_SQUARE: &str = "demo.square:FileScaledSquareTrainer";
pub const CONSTANT_SCALED_SQUARE: &str = "demo.square:ConstantScaledSquareTrainer";

/// x ↦ k · x²
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledSquareModel {
    k: i64,
}

impl Model for ScaledSquareModel {
    type Input  = i64;
    type Output = i64;

    fn predict(&self, x: i64) -> Result<i64> {
        x.checked_mul(x)
            .and_then(|sq| sq.checked_mul(self.k))
            .ok_or_else(|| anyhow!("{} * {x}^2 overflows i64", self.k))
    }
}

/// Trains a ScaledSquareModel from its scale k.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScaledSquareTrainer;

impl Trainer for ScaledSquareTrainer {
    type TrainInput    = i64;
    type PredictInput  = i64;
    type PredictOutput = i64;

    fn train(&self, k: i64) -> Result<SharedModel<i64, i64>> {
        if k < 0 {
            bail!("scale must be non-negative, got {k}");
        }
        Ok(Arc::new(ScaledSquareModel { k }))
    }
}

/// Reads k from a JSON file, then trains like ScaledSquareTrainer.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileScaledSquareTrainer {
    inner: ScaledSquareTrainer,
}

impl Trainer for FileScaledSquareTrainer {
    type TrainInput    = PathBuf;
    type PredictInput  = i64;
    type PredictOutput = i64;

    fn train(&self, path: PathBuf) -> Result<SharedModel<i64, i64>> {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("cannot read '{}'", path.display()))?;

        let k: i64 = serde_json::from_str(&raw)
            .with_context(|| format!("'{}' must contain a single integer", path.display()))?;

        self.inner.train(k)
    }
}

/// Trains x ↦ k · x² with k fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantScaledSquareTrainer {
    k: i64,
}

impl ConstantScaledSquareTrainer {
    pub fn new(k: i64) -> Result<Self> {
        if k < 0 {
            bail!("scale must be non-negative, got {k}");
        }
        Ok(Self { k })
    }

    /// Build from the entrypoint arguments: exactly one, the scale.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let [raw] = args else {
            bail!("expected one argument (the scale), got {}: {:?}", args.len(), args);
        };
        let k = raw
            .parse()
            .with_context(|| format!("scale must be an integer, got '{raw}'"))?;
        Self::new(k)
    }
}

impl Trainer for ConstantScaledSquareTrainer {
    type TrainInput    = i64;
    type PredictInput  = i64;
    type PredictOutput = i64;

    fn train(&self, seed: i64) -> Result<SharedModel<i64, i64>> {
        if seed < 0 {
            bail!("seed must be non-negative, got {seed}");
        }
        Ok(Arc::new(ScaledSquareModel { k: self.k }))
    }
}

/// Register the demo trainers on `loader`.
pub fn register(loader: &mut EntrypointLoader) -> Result<(), ResolveError> {
    loader
        .register(SCALED_SQUARE, |args: &[String]| {
            expect_no_args(args)?;
            Ok(ScaledSquareTrainer)
        })?
        .register(FILE_SCALED_SQUARE, |args: &[String]| {
            expect_no_args(args)?;
            Ok(FileScaledSquareTrainer::default())
        })?
        .register(CONSTANT_SCALED_SQUARE, ConstantScaledSquareTrainer::from_args)?;
    Ok(())
}
