//!
//! Orchestrates the capability lifecycle against the access daemon: the
//! asynchronous create pipeline, revocation by prefix scan, and the listing
//! algorithm that reconstructs grants from raw service records.
//!
//! Every pipeline is a straight-line sequence of fallible steps; the only
//! suspension points are the collaborator calls, and the broker assumes
//! exclusive access to the record store for the duration of one command.

use std::collections::BTreeMap;

use crate::comment;
use crate::error::BrokerError;
use crate::furl;
use crate::lifecycle::LifecycleController;
use crate::server::{CapabilityServer, RUN_COMMAND};
use crate::swissnum::SwissnumAllocator;
use crate::types::{GrantKind, RepositoryRef};

/// Result of a successful `create`: the grant kind and the single shareable
/// base capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub kind: GrantKind,
    pub furl: String,
}

/// One grant as reconstructed by `list` from its operation records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantEntry {
    /// Base capability shared by the grant's operation records.
    pub furl: String,
    pub writable: bool,
    pub comment: Option<String>,
}

/// Outcome of `list`: either an explicit nothing-configured result or the
/// grants, sorted by base capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOutcome {
    NoneConfigured,
    Grants(Vec<GrantEntry>),
}

/// Outcome of a successful `revoke`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revoked {
    /// The swissnum extracted from the revoked capability.
    pub swissnum: String,
    /// Whether a running daemon was restarted to drop the revoked records.
    pub restarted: bool,
}

/// Capability lifecycle orchestrator. Holds the collaborator for the length
/// of one command invocation.
pub struct ServiceRegistrar<'a, S: CapabilityServer> {
    server: &'a S,
    allocator: SwissnumAllocator,
}

impl<'a, S: CapabilityServer> ServiceRegistrar<'a, S> {
    pub fn new(server: &'a S) -> Self {
        ServiceRegistrar {
            server,
            allocator: SwissnumAllocator::new(),
        }
    }

    /// Issues a new grant: provisions the daemon if needed, allocates one
    /// base swissnum, registers one record per operation, and derives the
    /// shareable base capability from the last operation registered.
    ///
    /// A mid-sequence registration failure leaves earlier records of this
    /// call in place; a later revoke of the base swissnum still removes them
    /// as a group.
    pub async fn create(
        &self,
        kind: GrantKind,
        user_comment: &str,
        repo: &RepositoryRef,
    ) -> Result<Grant, BrokerError> {
        if !self.server.is_provisioned().await {
            self.server.provision().await?;
        }

        let base = self.allocator.allocate();
        let annotation = comment::render(kind, &repo.display_path(), user_comment);

        let mut last: Option<(String, String)> = None;
        for op in kind.operations() {
            let op_swissnum = format!("{base}-{}", op.name());
            let args = op.command_args(repo);
            let added = self
                .server
                .add_service(RUN_COMMAND, &args, &annotation, &op_swissnum)
                .await?;
            tracing::debug!(swissnum = %op_swissnum, "registered operation record");
            last = Some((added.furl, op_swissnum));
        }

        // Both grant kinds carry at least one operation.
        let (last_furl, last_swissnum) = last.ok_or_else(|| {
            BrokerError::Precondition("grant kind issued no operations".to_string())
        })?;
        let base_furl = furl::derive_base(&last_furl, &last_swissnum, &base)?;
        Ok(Grant { kind, furl: base_furl })
    }

    /// Revokes the grant whose base (or operation) capability is `target`:
    /// every record whose swissnum extends the target's swissnum is removed
    /// as one group. If any record went away and the daemon is running, it
    /// is restarted so the revoked capability stops answering immediately.
    pub async fn revoke(&self, target: &str) -> Result<Revoked, BrokerError> {
        let swissnum = furl::swissnum_of(target);
        if swissnum.is_empty() {
            return Err(BrokerError::Usage(
                "capability carries no swissnum segment".to_string(),
            ));
        }

        let removed = self.server.remove_by_prefix(swissnum).await?;
        if removed.is_empty() {
            return Err(BrokerError::NotFound(swissnum.to_string()));
        }
        tracing::debug!(swissnum, count = removed.len(), "removed service records");

        let mut restarted = false;
        if self.server.is_running().await {
            // The daemon reloads its service table only across a restart; a
            // revoked record must stop answering immediately. Against the
            // real collaborator this call does not return.
            LifecycleController::new(self.server).restart().await?;
            restarted = true;
        }
        Ok(Revoked {
            swissnum: swissnum.to_string(),
            restarted,
        })
    }

    /// Reconstructs the configured grants from raw service records: keeps
    /// `run-command` records with a broker-authored comment, groups them by
    /// base capability, and returns the groups sorted. Records belonging to
    /// unrelated uses of the same daemon are silently skipped.
    pub async fn list(&self) -> Result<ListOutcome, BrokerError> {
        let records = self.server.list_services().await?;

        let mut grants: BTreeMap<String, GrantEntry> = BTreeMap::new();
        for record in records {
            if record.service_type != RUN_COMMAND {
                continue;
            }
            let Some(parsed) = comment::parse(&record.comment) else {
                continue;
            };
            let (_, base_furl) = furl::base_of_record(&record.swissnum, &record.furl);
            grants.entry(base_furl.clone()).or_insert(GrantEntry {
                furl: base_furl,
                writable: parsed.writable,
                comment: parsed.user_comment,
            });
        }

        if grants.is_empty() {
            Ok(ListOutcome::NoneConfigured)
        } else {
            Ok(ListOutcome::Grants(grants.into_values().collect()))
        }
    }
}
