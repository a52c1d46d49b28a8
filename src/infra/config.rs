// ============================================================
// Layer 6 — Runtime Configuration
// ============================================================
// Where the HTTP transport listens.
//
// Precedence, lowest first:
//   1. built-in defaults (127.0.0.1:8080)
//   2. MODEL_SERVE_HOST / MODEL_SERVE_PORT environment variables
//   3. CLI flags (applied by HttpArgs::into_config)
//
// Serialisable so it can be logged or written next to a
// deployment for later inspection.

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const HOST_ENV: &str = "MODEL_SERVE_HOST";
pub const PORT_ENV: &str = "MODEL_SERVE_PORT";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16  = 8080;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by whatever the environment sets.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();

        if let Ok(host) = env::var(HOST_ENV) {
            cfg.host = host;
        }
        if let Ok(port) = env::var(PORT_ENV) {
            cfg.port = port
                .parse()
                .with_context(|| format!("{PORT_ENV} must be a port number, got '{port}'"))?;
        }

        Ok(cfg)
    }

    /// The socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address '{}:{}'", self.host, self.port))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_address() {
        let addr = ServerConfig::default().socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_bad_host_is_rejected() {
        let cfg = ServerConfig { host: "not a host".to_string(), port: 1 };
        assert!(cfg.socket_addr().is_err());
    }

    #[test]
    fn test_config_reads_from_json() {
        let cfg: ServerConfig = serde_json::from_str(r#"{"host":"0.0.0.0","port":9000}"#).unwrap();
        assert_eq!(cfg.socket_addr().unwrap().port(), 9000);
    }
}
