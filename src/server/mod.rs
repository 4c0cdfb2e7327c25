//!
//! The access-daemon collaborator: the store of service records this broker
//! creates, enumerates, and deletes.
//!
//! The broker never mutates a record in place and never retries a failed
//! call; every method here is attempted exactly once per command. Each call
//! is also a suspension point of the command pipeline (the only ones it
//! has).

use std::path::PathBuf;

use crate::error::BrokerError;

pub mod flapp;
pub use flapp::FlappDir;

// In-memory double for tests of the registrar and lifecycle logic.
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

/// The only service type this broker creates or recognises. Records of any
/// other type on the same daemon are left alone.
pub const RUN_COMMAND: &str = "run-command";

/// One persisted service record, owned by the daemon's store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ServiceRecord {
    /// Record identifier; also the secret path segment of its capability.
    pub swissnum: String,
    pub service_type: String,
    /// Broker-authored annotation, or whatever an unrelated tool stored.
    pub comment: String,
    pub command_args: Vec<String>,
    /// The record's full capability URL.
    pub furl: String,
}

/// Result of registering one service record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedService {
    pub furl: String,
    pub record_dir: PathBuf,
}

/// Contract of the access daemon (capability server) as consumed by the
/// broker.
#[async_trait::async_trait]
pub trait CapabilityServer {
    /// Whether the daemon directory has been provisioned.
    async fn is_provisioned(&self) -> bool;

    /// Provisions the daemon. Failure is fatal to the create pipeline: no
    /// record may be registered after a failed provision.
    async fn provision(&self) -> Result<(), BrokerError>;

    /// Registers one service record under `swissnum` and returns its
    /// capability URL.
    async fn add_service(
        &self,
        service_type: &str,
        command_args: &[String],
        comment: &str,
        swissnum: &str,
    ) -> Result<AddedService, BrokerError>;

    /// Enumerates every record in the store, including records this broker
    /// does not own.
    async fn list_services(&self) -> Result<Vec<ServiceRecord>, BrokerError>;

    /// Deletes every record whose swissnum starts with `prefix` and returns
    /// the removed swissnums. An empty prefix removes nothing.
    async fn remove_by_prefix(&self, prefix: &str) -> Result<Vec<String>, BrokerError>;

    /// Whether the daemon process is currently running.
    async fn is_running(&self) -> bool;

    /// Starts the daemon. Under the real collaborator the daemon becomes the
    /// foreground program, so a successful call does not hand control back
    /// to the broker's own exit path.
    async fn start(&self) -> Result<(), BrokerError>;

    /// Stops the daemon. Stopping an already-stopped daemon is a benign
    /// no-op.
    async fn stop(&self) -> Result<(), BrokerError>;
}
