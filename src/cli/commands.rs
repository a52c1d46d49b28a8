// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// The subcommand tree below the entrypoint:
//
//   run dynamic http [--host H] [--port P]
//   run static <TRAIN_INPUT> http [--host H] [--port P]
//
// Reference: Rust Book §12 (Building a CLI Program)

use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::Value;

use crate::infra::config::ServerConfig;
use crate::ml::erased::InputCheck;

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the trainer
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(subcommand)]
    pub mode: Mode,
}

/// How models come into existence
#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Train, predict and remove any number of models by key
    Dynamic {
        #[command(subcommand)]
        transport: Transport,
    },

    /// Train one model at startup and only serve predictions
    Static {
        /// Training input, as JSON. Anything that is not JSON of the
        /// trainer's input type is taken as a string (e.g. a file path).
        train_input: String,

        #[command(subcommand)]
        transport: Transport,
    },
}

/// Wire protocol to serve on
#[derive(Subcommand, Debug)]
pub enum Transport {
    /// Serve over HTTP
    Http(HttpArgs),
}

/// Arguments for the `http` transport. Unset flags fall back to
/// MODEL_SERVE_HOST / MODEL_SERVE_PORT, then to 127.0.0.1:8080.
#[derive(Args, Debug, Default)]
pub struct HttpArgs {
    /// Address to listen on
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    pub port: Option<u16>,
}

impl HttpArgs {
    /// Environment-derived config with the flags applied on top.
    pub fn into_config(self) -> Result<ServerConfig> {
        let mut cfg = ServerConfig::from_env()?;
        if let Some(host) = self.host {
            cfg.host = host;
        }
        if let Some(port) = self.port {
            cfg.port = port;
        }
        Ok(cfg)
    }
}

/// Interpret a command-line training input: JSON if it parses and
/// passes `check`, otherwise the raw text as a JSON string. A bare
/// path such as `2024` therefore reaches a path-typed trainer intact.
pub fn parse_train_input(raw: &str, check: InputCheck) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) if check(&value).is_ok() => value,
        _ => Value::String(raw.to_string()),
    }
}
