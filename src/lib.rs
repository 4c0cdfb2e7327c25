#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(deprecated)]

//!
//! gitcap is a capability-URL broker for a single Git repository.
//!
//! It issues opaque, unguessable access tokens (FURLs) at one of two
//! privilege levels (read-only, read-write), persists each token as a named
//! service record on a long-running access daemon, and supports listing and
//! revoking individual tokens without affecting the rest. Possession of a
//! capability is authorization; the broker's job is the lifecycle, not the
//! transport.

// Shared enums (GrantKind, Operation) and the repository reference.
pub mod types;

// Swissnum allocation: the secret segment of every capability.
pub mod swissnum;

// Capability-URL derivation and parsing.
pub mod furl;

// Broker-authored record annotations: rendering and classification.
pub mod comment;

// Broker error types.
pub mod error;

// The access-daemon collaborator: trait, filesystem implementation, and the
// in-memory test double.
pub mod server;

// Capability lifecycle orchestration: create, list, revoke.
pub mod registrar;

// Daemon start/stop/restart.
pub mod lifecycle;

// Re-export the types a consumer touches for every command.
pub use error::BrokerError;
pub use registrar::{Grant, GrantEntry, ListOutcome, Revoked, ServiceRegistrar};
pub use types::{GrantKind, Operation, RepositoryRef};
