// ============================================================
// Layer 5 — Entrypoint Loader
// ============================================================
// Turns a textual entrypoint reference plus positional string
// arguments into a ModuleInfo: the trainer to serve and the three
// types it declares.
//
// References look like `module.path:callable`, e.g.
//   demo.square:ScaledSquareTrainer
//
// Trainers are made available by registering a factory under a
// reference. Registration is generic over the concrete trainer
// type, so the three type descriptors are captured right there;
// nothing has to be recovered from the trainer afterwards.
//
//   load(reference, args)
//     1. parse the reference         → ResolveError::Malformed
//     2. find the registered factory → ResolveError::NotFound
//     3. call it with args           → ResolveError::Construction
//     4. ModuleInfo { types…, trainer }
//
// Every ResolveError is fatal at startup.
//
// Reference: Rust Book §13.1 (Closures), §17.2 (Trait Objects)

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::domain::model::Trainer;
use crate::ml::erased::{check_input, ErasedTrainer, InputCheck, JsonTrainer, TypeDescriptor};

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("malformed entrypoint '{reference}': expected 'module.path:callable'")]
    Malformed { reference: String },

    #[error("entrypoint '{reference}' not found (known: {})", .known.join(", "))]
    NotFound { reference: String, known: Vec<String> },

    #[error("entrypoint '{reference}' is already registered")]
    Duplicate { reference: String },

    #[error("entrypoint '{reference}' did not produce a trainer: {source:#}")]
    Construction {
        reference: String,
        #[source]
        source:    anyhow::Error,
    },
}

// ─── EntrypointRef ────────────────────────────────────────────────────────────
/// A parsed `module.path:callable` reference.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EntrypointRef {
    pub module:   String,
    pub callable: String,
}

impl EntrypointRef {
    pub fn parse(reference: &str) -> Result<Self, ResolveError> {
        let malformed = || ResolveError::Malformed { reference: reference.to_string() };

        let (module, callable) = reference.split_once(':').ok_or_else(malformed)?;

        let module_ok = !module.is_empty() && module.split('.').all(is_identifier);
        if !module_ok || !is_identifier(callable) {
            return Err(malformed());
        }

        Ok(Self {
            module:   module.to_string(),
            callable: callable.to_string(),
        })
    }
}

impl fmt::Display for EntrypointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.callable)
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

// ─── ModuleInfo ───────────────────────────────────────────────────────────────
/// A resolved trainer and the types it declares. Built once at
/// startup and only read afterwards.
///
/// The two checks validate request payloads against the declared
/// input types before any user code runs.
#[derive(Clone)]
pub struct ModuleInfo {
    pub train_input_type:    TypeDescriptor,
    pub predict_input_type:  TypeDescriptor,
    pub predict_output_type: TypeDescriptor,
    pub train_input_check:   InputCheck,
    pub predict_input_check: InputCheck,
    pub trainer:             ErasedTrainer,
}

impl ModuleInfo {
    /// Describe and erase a typed trainer.
    pub fn new<T>(trainer: T) -> Self
    where
        T: Trainer + 'static,
        T::TrainInput: DeserializeOwned + 'static,
        T::PredictInput: DeserializeOwned + 'static,
        T::PredictOutput: Serialize + 'static,
    {
        Self {
            train_input_type:    TypeDescriptor::of::<T::TrainInput>(),
            predict_input_type:  TypeDescriptor::of::<T::PredictInput>(),
            predict_output_type: TypeDescriptor::of::<T::PredictOutput>(),
            train_input_check:   check_input::<T::TrainInput>,
            predict_input_check: check_input::<T::PredictInput>,
            trainer:             Arc::new(JsonTrainer::new(trainer)),
        }
    }
}

impl fmt::Debug for ModuleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleInfo")
            .field("train_input_type", &self.train_input_type)
            .field("predict_input_type", &self.predict_input_type)
            .field("predict_output_type", &self.predict_output_type)
            .finish_non_exhaustive()
    }
}

// ─── EntrypointLoader ─────────────────────────────────────────────────────────

type Factory = Box<dyn Fn(&[String]) -> anyhow::Result<ModuleInfo> + Send + Sync>;

/// Registry of trainer factories addressed by entrypoint reference.
#[derive(Default)]
pub struct EntrypointLoader {
    entries: BTreeMap<EntrypointRef, Factory>,
}

impl EntrypointLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader pre-populated with the demo trainers.
    pub fn with_builtins() -> Result<Self, ResolveError> {
        let mut loader = Self::new();
        crate::ml::demo::register(&mut loader)?;
        Ok(loader)
    }

    /// Make a trainer factory available under `reference`.
    ///
    /// The factory receives the positional arguments given at load
    /// time and either builds the trainer or explains why it cannot.
    pub fn register<T, F>(&mut self, reference: &str, factory: F) -> Result<&mut Self, ResolveError>
    where
        F: Fn(&[String]) -> anyhow::Result<T> + Send + Sync + 'static,
        T: Trainer + 'static,
        T::TrainInput: DeserializeOwned + 'static,
        T::PredictInput: DeserializeOwned + 'static,
        T::PredictOutput: Serialize + 'static,
    {
        let parsed = EntrypointRef::parse(reference)?;
        if self.entries.contains_key(&parsed) {
            return Err(ResolveError::Duplicate { reference: reference.to_string() });
        }

        let erased: Factory = Box::new(move |args: &[String]| factory(args).map(ModuleInfo::new));
        self.entries.insert(parsed, erased);
        Ok(self)
    }

    /// Every registered reference, sorted.
    pub fn references(&self) -> Vec<String> {
        self.entries.keys().map(ToString::to_string).collect()
    }

    /// Resolve `reference` and build its trainer from `args`.
    pub fn load(&self, reference: &str, args: &[String]) -> Result<ModuleInfo, ResolveError> {
        let parsed = EntrypointRef::parse(reference)?;

        let factory = self.entries.get(&parsed).ok_or_else(|| ResolveError::NotFound {
            reference: reference.to_string(),
            known:     self.references(),
        })?;

        let info = factory(args).map_err(|source| ResolveError::Construction {
            reference: reference.to_string(),
            source,
        })?;

        tracing::info!(
            entrypoint    = %parsed,
            train_input   = %info.train_input_type,
            predict_input = %info.predict_input_type,
            predict_output = %info.predict_output_type,
            "entrypoint resolved"
        );

        Ok(info)
    }
}

impl fmt::Debug for EntrypointLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntrypointLoader")
            .field("entries", &self.references())
            .finish()
    }
}

/// Reject any positional arguments, for factories that take none.
pub fn expect_no_args(args: &[String]) -> anyhow::Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("expected no arguments, got {}: {:?}", args.len(), args)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use serde_json::json;

    use crate::domain::model::{FnModel, SharedModel};

    /// Adds a constant chosen at construction time.
    struct Offset(i64);

    impl Trainer for Offset {
        type TrainInput    = i64;
        type PredictInput  = i64;
        type PredictOutput = i64;

        fn train(&self, scale: i64) -> anyhow::Result<SharedModel<i64, i64>> {
            let offset = self.0;
            Ok(FnModel::shared(move |x: i64| Ok(scale * x + offset)))
        }
    }

    fn loader() -> EntrypointLoader {
        let mut loader = EntrypointLoader::new();
        loader
            .register("tests.offset:Offset", |args: &[String]| {
                let raw = args.first().context("missing offset argument")?;
                let offset = raw.parse().with_context(|| format!("bad offset '{raw}'"))?;
                Ok(Offset(offset))
            })
            .unwrap();
        loader
    }

    #[test]
    fn test_load_passes_arguments_and_describes_types() {
        let info = loader().load("tests.offset:Offset", &["10".to_string()]).unwrap();

        assert_eq!(info.train_input_type.name(), "i64");
        assert_eq!(info.predict_input_type.name(), "i64");
        assert_eq!(info.predict_output_type.name(), "i64");

        let model = info.trainer.train(json!(2)).unwrap();
        assert_eq!(model.predict(json!(5)).unwrap(), json!(20));

        assert!((info.train_input_check)(&json!(2)).is_ok());
        assert!((info.predict_input_check)(&json!("five")).is_err());
    }

    #[test]
    fn test_unknown_reference_lists_known_ones() {
        match loader().load("tests.offset:Missing", &[]) {
            Err(ResolveError::NotFound { known, .. }) => {
                assert_eq!(known, vec!["tests.offset:Offset".to_string()])
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_references() {
        for bad in ["", "no_colon", ":callable", "module:", "a..b:c", "mod:with space", "1mod:c"] {
            assert!(
                matches!(EntrypointRef::parse(bad), Err(ResolveError::Malformed { .. })),
                "'{bad}' should be malformed"
            );
        }
        let ok = EntrypointRef::parse("pkg.sub_mod:Trainer2").unwrap();
        assert_eq!(ok.module, "pkg.sub_mod");
        assert_eq!(ok.callable, "Trainer2");
        assert_eq!(ok.to_string(), "pkg.sub_mod:Trainer2");
    }

    #[test]
    fn test_factory_failure_is_a_construction_error() {
        let err = loader().load("tests.offset:Offset", &["ten".to_string()]).unwrap_err();
        assert!(matches!(err, ResolveError::Construction { .. }));
        assert!(err.to_string().contains("bad offset 'ten'"));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut loader = loader();
        let err = loader
            .register("tests.offset:Offset", |_: &[String]| Ok(Offset(0)))
            .unwrap_err();
        assert!(matches!(err, ResolveError::Duplicate { .. }));
    }

    #[test]
    fn test_expect_no_args() {
        assert!(expect_no_args(&[]).is_ok());
        assert!(expect_no_args(&["x".to_string()]).is_err());
    }
}
