//!
//! Filesystem-backed capability server rooted at one daemon directory.
//!
//! Layout under the server directory:
//!
//! ```text
//! furl.prefix        marker: provisioning is complete; its content is the
//!                    transport-info prefix every capability starts with
//! services/<swissnum>/
//!     service_type   record's service type ("run-command")
//!     comment        broker-authored annotation
//!     args.json      ordered command-argument list
//!     furl           the record's full capability URL
//! flappserver.pid    presence indicates the daemon is running
//! umask              optional; absence draws a file-permission warning
//! ```
//!
//! Provisioning and daemon start/stop shell out to the external
//! `flappserver` binary; record storage is manipulated directly.

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::error::BrokerError;

use super::{AddedService, CapabilityServer, ServiceRecord};

const FURL_PREFIX_FILE: &str = "furl.prefix";
const SERVICES_DIR: &str = "services";
const PID_FILE: &str = "flappserver.pid";
const UMASK_FILE: &str = "umask";

const SERVICE_TYPE_FILE: &str = "service_type";
const COMMENT_FILE: &str = "comment";
const ARGS_FILE: &str = "args.json";
const FURL_FILE: &str = "furl";

/// Default name of the external daemon-control binary, resolved via PATH.
pub const DEFAULT_DAEMON_BIN: &str = "flappserver";

/// Capability server backed by one on-disk daemon directory.
#[derive(Debug, Clone)]
pub struct FlappDir {
    dir: PathBuf,
    daemon_bin: String,
}

impl FlappDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FlappDir {
            dir: dir.into(),
            daemon_bin: DEFAULT_DAEMON_BIN.to_string(),
        }
    }

    /// Overrides the daemon-control binary, for tests and unusual installs.
    pub fn with_daemon_bin(dir: impl Into<PathBuf>, daemon_bin: impl Into<String>) -> Self {
        FlappDir {
            dir: dir.into(),
            daemon_bin: daemon_bin.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn services_dir(&self) -> PathBuf {
        self.dir.join(SERVICES_DIR)
    }

    /// Transport-info prefix read from the provisioning marker, normalised
    /// to end with `/` so a swissnum can be appended directly.
    fn furl_prefix(&self) -> Result<String, BrokerError> {
        let raw = std::fs::read_to_string(self.dir.join(FURL_PREFIX_FILE))?;
        let prefix = raw.trim();
        if prefix.ends_with('/') {
            Ok(prefix.to_string())
        } else {
            Ok(format!("{prefix}/"))
        }
    }

    fn read_record(&self, swissnum: String, dir: &Path) -> Result<ServiceRecord, BrokerError> {
        let service_type = std::fs::read_to_string(dir.join(SERVICE_TYPE_FILE))?
            .trim()
            .to_string();
        let comment = std::fs::read_to_string(dir.join(COMMENT_FILE))?;
        let command_args: Vec<String> =
            serde_json::from_slice(&std::fs::read(dir.join(ARGS_FILE))?)?;
        let furl = std::fs::read_to_string(dir.join(FURL_FILE))?.trim().to_string();
        Ok(ServiceRecord {
            swissnum,
            service_type,
            comment,
            command_args,
            furl,
        })
    }
}

#[async_trait::async_trait]
impl CapabilityServer for FlappDir {
    async fn is_provisioned(&self) -> bool {
        self.dir.join(FURL_PREFIX_FILE).exists()
    }

    async fn provision(&self) -> Result<(), BrokerError> {
        tracing::debug!(dir = %self.dir.display(), "provisioning access daemon");
        let output = Command::new(&self.daemon_bin)
            .arg("create")
            .arg(&self.dir)
            .output()
            .await
            .map_err(|e| BrokerError::Provisioning {
                stderr: format!("could not run {}: {e}", self.daemon_bin),
            })?;
        if !output.status.success() {
            return Err(BrokerError::Provisioning {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        // Safe-permission posture: the daemon records its umask choice in a
        // marker file. Absence is non-fatal but worth flagging.
        if !self.dir.join(UMASK_FILE).exists() {
            tracing::warn!(
                dir = %self.dir.display(),
                "daemon directory carries no umask marker; service records may \
                 be created with lax file permissions"
            );
        }
        Ok(())
    }

    async fn add_service(
        &self,
        service_type: &str,
        command_args: &[String],
        comment: &str,
        swissnum: &str,
    ) -> Result<AddedService, BrokerError> {
        let furl = format!("{}{}", self.furl_prefix()?, swissnum);
        let services = self.services_dir();
        std::fs::create_dir_all(&services)?;
        let record_dir = services.join(swissnum);
        std::fs::create_dir(&record_dir)?;
        std::fs::write(record_dir.join(SERVICE_TYPE_FILE), service_type)?;
        std::fs::write(record_dir.join(COMMENT_FILE), comment)?;
        std::fs::write(record_dir.join(ARGS_FILE), serde_json::to_vec(command_args)?)?;
        std::fs::write(record_dir.join(FURL_FILE), &furl)?;
        tracing::debug!(swissnum, "registered service record");
        Ok(AddedService { furl, record_dir })
    }

    async fn list_services(&self) -> Result<Vec<ServiceRecord>, BrokerError> {
        let services = self.services_dir();
        if !services.exists() {
            return Ok(Vec::new());
        }
        let mut records = Vec::new();
        for entry in std::fs::read_dir(&services)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let swissnum = entry.file_name().to_string_lossy().into_owned();
            records.push(self.read_record(swissnum, &entry.path())?);
        }
        records.sort_by(|a, b| a.swissnum.cmp(&b.swissnum));
        Ok(records)
    }

    async fn remove_by_prefix(&self, prefix: &str) -> Result<Vec<String>, BrokerError> {
        let services = self.services_dir();
        let mut removed = Vec::new();
        if prefix.is_empty() || !services.exists() {
            return Ok(removed);
        }
        for entry in std::fs::read_dir(&services)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(prefix) {
                std::fs::remove_dir_all(entry.path())?;
                removed.push(name);
            }
        }
        removed.sort();
        Ok(removed)
    }

    async fn is_running(&self) -> bool {
        self.dir.join(PID_FILE).exists()
    }

    async fn start(&self) -> Result<(), BrokerError> {
        tracing::debug!(dir = %self.dir.display(), "starting access daemon");
        let status = Command::new(&self.daemon_bin)
            .arg("start")
            .arg(&self.dir)
            .status()
            .await?;
        if !status.success() {
            return Err(BrokerError::Daemon(format!(
                "`{} start` exited with {status}",
                self.daemon_bin
            )));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), BrokerError> {
        if !self.is_running().await {
            tracing::debug!(dir = %self.dir.display(), "daemon already stopped");
            return Ok(());
        }
        let status = Command::new(&self.daemon_bin)
            .arg("stop")
            .arg(&self.dir)
            .status()
            .await?;
        if !status.success() {
            return Err(BrokerError::Daemon(format!(
                "`{} stop` exited with {status}",
                self.daemon_bin
            )));
        }
        Ok(())
    }
}
