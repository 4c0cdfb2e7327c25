//!
//! Defines error types for the gitcap broker.

/// Represents errors that can occur while brokering capability URLs, from
/// argument validation through daemon provisioning and record storage.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// Malformed command or arguments. Reported to the operator, exit 1.
    #[error("usage error: {0}")]
    Usage(String),
    /// The access daemon could not be provisioned. Fatal: the create
    /// pipeline aborts before any grant is issued. Carries the
    /// collaborator's stderr verbatim.
    #[error("provisioning the access daemon failed: {stderr}")]
    Provisioning { stderr: String },
    /// The revoke target did not match any service record. The daemon is
    /// left untouched.
    #[error("no service record matches swissnum {0}")]
    NotFound(String),
    /// A derived-capability invariant was violated (e.g. a capability that
    /// does not end with its own swissnum).
    #[error("capability invariant violated: {0}")]
    Precondition(String),
    /// Starting or stopping the daemon failed.
    #[error("daemon control failed: {0}")]
    Daemon(String),
    /// Filesystem-level failure in the service-record store.
    #[error("service store I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A persisted service record could not be decoded.
    #[error("malformed service record: {0}")]
    Record(#[from] serde_json::Error),
}
