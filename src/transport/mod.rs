// ============================================================
// Layer 4 — Transport
// ============================================================
// Binds service operations to a wire protocol. The transport
// owns no logic of its own: it asks the service which
// capabilities it has, wires one endpoint per capability, and
// translates each typed response into a protocol result.
//
//   http.rs — axum binding (PUT train, POST predict, DELETE remove)
//
// A ServiceRunner is started once and runs until its StopHandle
// fires or the process receives Ctrl-C.

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Notify;

/// HTTP binding built on axum
pub mod http;

/// A transport that serves a service until told to stop.
pub trait ServiceRunner {
    /// Serve until stopped.
    fn start(self) -> impl Future<Output = Result<()>> + Send;

    /// A handle that stops the runner from elsewhere.
    fn stop_handle(&self) -> StopHandle;
}

/// Cooperative stop signal for a running ServiceRunner.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    notify: Arc<Notify>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the runner to stop. Safe to call before the runner started
    /// waiting; the request is remembered.
    pub fn stop(&self) {
        self.notify.notify_one();
    }

    /// Resolves once `stop` has been called.
    pub async fn stopped(&self) {
        self.notify.notified().await;
    }
}
