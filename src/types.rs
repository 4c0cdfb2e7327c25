//!
//! Shared types for the broker: grant kinds, the per-grant operation set,
//! and the repository reference a command runs against.
//!
//! `GrantKind` is the source of truth for which operations a grant issues.
//! The `Operation` enum in turn owns everything operation-specific: the
//! swissnum suffix, the git command the daemon runs, and the fixed policy
//! flags persisted in the record's argument list.

use std::path::{Path, PathBuf};

use crate::error::BrokerError;

/// Privilege level of a grant. Privilege is binary: a capability is either
/// read-only or read-write, always for the whole repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum GrantKind {
    /// Fetch only.
    ReadOnly,
    /// Fetch and push.
    ReadWrite,
}

impl GrantKind {
    /// The sub-capability operations a grant of this kind issues. Every
    /// operation registered in one `create` call shares the grant's base
    /// swissnum.
    pub fn operations(self) -> &'static [Operation] {
        match self {
            GrantKind::ReadOnly => &[Operation::Fetch],
            GrantKind::ReadWrite => &[Operation::Fetch, Operation::Push],
        }
    }

    /// Whether this kind permits mutation of the repository.
    pub fn writable(self) -> bool {
        matches!(self, GrantKind::ReadWrite)
    }
}

impl TryFrom<&str> for GrantKind {
    type Error = BrokerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "read-only" => Ok(GrantKind::ReadOnly),
            "read-write" => Ok(GrantKind::ReadWrite),
            other => Err(BrokerError::Usage(format!(
                "unknown grant kind `{other}` (expected read-only or read-write)"
            ))),
        }
    }
}

impl std::fmt::Display for GrantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            GrantKind::ReadOnly => "read-only",
            GrantKind::ReadWrite => "read-write",
        })
    }
}

/// One remotely-invocable action a capability may authorise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Clone/fetch, served by `git-upload-pack`.
    Fetch,
    /// Push, served by `git-receive-pack`.
    Push,
}

impl Operation {
    /// Suffix appended to the base swissnum to form this operation's own
    /// independently-resolvable capability.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Fetch => "fetch",
            Operation::Push => "push",
        }
    }

    /// Git command the daemon runs when the capability is exercised.
    pub fn git_command(self) -> &'static str {
        match self {
            Operation::Fetch => "git-upload-pack",
            Operation::Push => "git-receive-pack",
        }
    }

    /// Fixed policy flags for this operation. Fetches are held to the strict
    /// pack protocol and a 600-second idle timeout; pushes carry none.
    pub fn policy_flags(self) -> &'static [&'static str] {
        match self {
            Operation::Fetch => &["--strict", "--timeout=600"],
            Operation::Push => &[],
        }
    }

    /// Full command-argument list persisted in this operation's service
    /// record: accept-input-on-stdin, working root `/`, the git command,
    /// policy flags, and finally the resolved repository path.
    pub fn command_args(self, repo: &RepositoryRef) -> Vec<String> {
        let mut args = vec![
            "--accept-stdin".to_string(),
            "/".to_string(),
            self.git_command().to_string(),
        ];
        args.extend(self.policy_flags().iter().map(|flag| flag.to_string()));
        args.push(repo.display_path());
        args
    }
}

/// The repository being shared: resolved location plus derived display name.
/// Immutable once resolved at command start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    path: PathBuf,
    name: String,
}

impl RepositoryRef {
    /// Resolves `dir` to its canonical location and derives the display name
    /// from the final path component.
    pub fn resolve(dir: &Path) -> Result<Self, BrokerError> {
        let path = dir.canonicalize()?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "repository".to_string());
        Ok(RepositoryRef { path, name })
    }

    /// Resolved repository location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name derived from the final path component.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Repository path as embedded in comments and record arguments.
    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    /// Default access-daemon directory for this repository.
    pub fn server_dir(&self) -> PathBuf {
        self.path.join(".git").join("flappserver")
    }
}
