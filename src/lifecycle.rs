//!
//! Start/stop/restart of the access daemon, used both as direct operator
//! commands and as the tail of a revoke.

use crate::error::BrokerError;
use crate::server::CapabilityServer;

/// Drives the daemon between its two states, `Stopped` and `Running`.
pub struct LifecycleController<'a, S: CapabilityServer> {
    server: &'a S,
}

impl<'a, S: CapabilityServer> LifecycleController<'a, S> {
    pub fn new(server: &'a S) -> Self {
        LifecycleController { server }
    }

    /// Starts the daemon. Under the real collaborator the daemon becomes the
    /// foreground program, so control does not come back to the broker's own
    /// exit path after a successful start.
    pub async fn start(&self) -> Result<(), BrokerError> {
        self.server.start().await
    }

    /// Stops the daemon. Always returns; stopping an already-stopped daemon
    /// is a benign no-op.
    pub async fn stop(&self) -> Result<(), BrokerError> {
        self.server.stop().await
    }

    /// Restart is stop followed by start, and inherits start's terminal
    /// semantics: callers must not expect to run further logic after a
    /// successful restart against the real daemon.
    pub async fn restart(&self) -> Result<(), BrokerError> {
        self.stop().await?;
        self.start().await
    }
}
