// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// model-serve <ENTRYPOINT> [-a ARG]... run <dynamic|static ...> http
//
// The entrypoint is resolved first; a resolution failure stops the
// process before anything is served. The selected mode then picks
// the service composition:
//
//   dynamic → DynamicModelService over MemoizeStorage(InMemoryStorage)
//   static  → StaticModelService over one model trained at startup
//
// and the transport serves it. All business logic lives in the
// lower layers; this one only routes.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{parse_train_input, Commands, HttpArgs, Mode, Transport};

use crate::application::dynamic_service::DynamicModelService;
use crate::application::static_service::StaticModelService;
use crate::infra::in_memory::InMemoryStorage;
use crate::infra::memoize::MemoizeStorage;
use crate::ml::erased::ErasedModel;
use crate::ml::loader::{EntrypointLoader, ModuleInfo};
use crate::transport::http::{HttpServiceRunner, JsonService};
use crate::transport::ServiceRunner;

/// Storage used by dynamic deployments.
pub type JsonStorage = MemoizeStorage<InMemoryStorage<String, ErasedModel>, String, ErasedModel>;

#[derive(Parser, Debug)]
#[command(
    name = "model-serve",
    version,
    about = "Serve a model trainer as a train / predict / remove service."
)]
pub struct Cli {
    /// Trainer entrypoint, as module.path:callable
    pub entrypoint: String,

    /// Positional argument for the entrypoint; repeat for more
    #[arg(short = 'a', long = "entrypoint-arg", value_name = "ARG")]
    pub args: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Run against the built-in trainers.
    pub fn run(self) -> Result<()> {
        self.run_with(&EntrypointLoader::with_builtins()?)
    }

    /// Run against a caller-provided registry, for binaries that
    /// register their own trainers.
    pub fn run_with(self, loader: &EntrypointLoader) -> Result<()> {
        let module = loader.load(&self.entrypoint, &self.args)?;

        match self.command {
            Commands::Run(run) => match run.mode {
                Mode::Dynamic { transport } => {
                    let service = dynamic_service(&module);
                    serve(transport, &module, service)
                }
                Mode::Static { train_input, transport } => {
                    let service = static_service(&module, &train_input)?;
                    serve(transport, &module, service)
                }
            },
        }
    }
}

/// All three capabilities over a memoized in-memory store.
pub fn dynamic_service(module: &ModuleInfo) -> Arc<JsonService> {
    let storage: JsonStorage = MemoizeStorage::new(InMemoryStorage::new());
    Arc::new(DynamicModelService::new(Arc::clone(&module.trainer), storage))
}

/// Prediction only, over a model trained from `raw_input` now.
pub fn static_service(module: &ModuleInfo, raw_input: &str) -> Result<Arc<JsonService>> {
    let input   = parse_train_input(raw_input, module.train_input_check);
    let service = StaticModelService::train_once(&module.trainer, input)
        .with_context(|| format!("static training with input '{raw_input}' failed"))?;
    let service: Arc<JsonService> = Arc::new(service);
    Ok(service)
}

fn serve(transport: Transport, module: &ModuleInfo, service: Arc<JsonService>) -> Result<()> {
    match transport {
        Transport::Http(args) => serve_http(args, module, service),
    }
}

fn serve_http(args: HttpArgs, module: &ModuleInfo, service: Arc<JsonService>) -> Result<()> {
    let config = args.into_config()?;
    tracing::info!("Starting HTTP transport on {}:{}", config.host, config.port);

    let runner  = HttpServiceRunner::new(config, module, service);
    let runtime = tokio::runtime::Runtime::new().context("failed to start the tokio runtime")?;
    runtime.block_on(runner.start())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    use crate::ml::demo::{FILE_SCALED_SQUARE, SCALED_SQUARE};

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_dynamic_invocation() {
        let cli = Cli::try_parse_from([
            "model-serve", SCALED_SQUARE, "run", "dynamic", "http", "--port", "9000",
        ])
        .unwrap();

        assert_eq!(cli.entrypoint, SCALED_SQUARE);
        assert!(cli.args.is_empty());
        let Commands::Run(run) = cli.command;
        match run.mode {
            Mode::Dynamic { transport: Transport::Http(http) } => assert_eq!(http.port, Some(9000)),
            other => panic!("expected dynamic mode, got {other:?}"),
        }
    }

    #[test]
    fn test_parses_static_invocation_with_entrypoint_args() {
        let cli = Cli::try_parse_from([
            "model-serve", FILE_SCALED_SQUARE, "-a", "one", "--entrypoint-arg", "two",
            "run", "static", "k.json", "http",
        ])
        .unwrap();

        assert_eq!(cli.args, vec!["one".to_string(), "two".to_string()]);
        let Commands::Run(run) = cli.command;
        match run.mode {
            Mode::Static { train_input, .. } => assert_eq!(train_input, "k.json"),
            other => panic!("expected static mode, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_entrypoint_fails_before_serving() {
        let cli = Cli::try_parse_from(["model-serve", "nope.nope:Nothing", "run", "dynamic", "http"])
            .unwrap();
        let err = cli.run().unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_static_training_failure_fails_before_serving() {
        let module = EntrypointLoader::with_builtins().unwrap().load(SCALED_SQUARE, &[]).unwrap();
        let err = match static_service(&module, "-3") {
            Err(e) => e,
            Ok(_)  => panic!("negative scale must fail"),
        };
        assert!(format!("{err:#}").contains("scale must be non-negative"));
    }
}
