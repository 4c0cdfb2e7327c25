//!
//! In-memory capability server for exercising registrar and lifecycle logic
//! without a daemon directory on disk. Test-only (behind the `test-utils`
//! feature), with injectable provisioning and registration failures and a
//! journal of lifecycle events.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::BrokerError;

use super::{AddedService, CapabilityServer, ServiceRecord};

/// Transport-info prefix used for every capability the double hands out.
pub const TEST_FURL_PREFIX: &str = "pb://tub@test.example:12345/";

#[derive(Debug, Default)]
struct MemoryState {
    provisioned: bool,
    running: bool,
    records: BTreeMap<String, ServiceRecord>,
    events: Vec<String>,
    fail_provision: bool,
    /// Fail the Nth `add_service` call (0-based) when set.
    fail_add_at: Option<usize>,
    adds_seen: usize,
}

/// Capability-server double backed by a `BTreeMap`.
#[derive(Debug, Default)]
pub struct MemoryServer {
    state: Mutex<MemoryState>,
}

impl MemoryServer {
    pub fn new() -> Self {
        MemoryServer::default()
    }

    /// A double that starts out already provisioned.
    pub fn provisioned() -> Self {
        let server = MemoryServer::new();
        server.state.lock().unwrap().provisioned = true;
        server
    }

    pub fn set_running(&self, running: bool) {
        self.state.lock().unwrap().running = running;
    }

    pub fn fail_provision(&self) {
        self.state.lock().unwrap().fail_provision = true;
    }

    pub fn fail_add_at(&self, index: usize) {
        self.state.lock().unwrap().fail_add_at = Some(index);
    }

    /// Swissnums currently in the store, sorted.
    pub fn swissnums(&self) -> Vec<String> {
        self.state.lock().unwrap().records.keys().cloned().collect()
    }

    pub fn record(&self, swissnum: &str) -> Option<ServiceRecord> {
        self.state.lock().unwrap().records.get(swissnum).cloned()
    }

    pub fn record_count(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }

    /// Registers a record as if some unrelated tool owned the daemon too.
    pub fn insert_foreign(&self, swissnum: &str, service_type: &str, comment: &str) {
        let mut state = self.state.lock().unwrap();
        let furl = format!("{TEST_FURL_PREFIX}{swissnum}");
        state.records.insert(
            swissnum.to_string(),
            ServiceRecord {
                swissnum: swissnum.to_string(),
                service_type: service_type.to_string(),
                comment: comment.to_string(),
                command_args: Vec::new(),
                furl,
            },
        );
    }

    /// Journal of provision/start/stop calls, in order.
    pub fn events(&self) -> Vec<String> {
        self.state.lock().unwrap().events.clone()
    }
}

#[async_trait::async_trait]
impl CapabilityServer for MemoryServer {
    async fn is_provisioned(&self) -> bool {
        self.state.lock().unwrap().provisioned
    }

    async fn provision(&self) -> Result<(), BrokerError> {
        let mut state = self.state.lock().unwrap();
        state.events.push("provision".to_string());
        if state.fail_provision {
            return Err(BrokerError::Provisioning {
                stderr: "injected provisioning failure".to_string(),
            });
        }
        state.provisioned = true;
        Ok(())
    }

    async fn add_service(
        &self,
        service_type: &str,
        command_args: &[String],
        comment: &str,
        swissnum: &str,
    ) -> Result<AddedService, BrokerError> {
        let mut state = self.state.lock().unwrap();
        let index = state.adds_seen;
        state.adds_seen += 1;
        if state.fail_add_at == Some(index) {
            return Err(BrokerError::Daemon("injected registration failure".to_string()));
        }
        let furl = format!("{TEST_FURL_PREFIX}{swissnum}");
        state.records.insert(
            swissnum.to_string(),
            ServiceRecord {
                swissnum: swissnum.to_string(),
                service_type: service_type.to_string(),
                comment: comment.to_string(),
                command_args: command_args.to_vec(),
                furl: furl.clone(),
            },
        );
        Ok(AddedService {
            furl,
            record_dir: PathBuf::from(format!("services/{swissnum}")),
        })
    }

    async fn list_services(&self) -> Result<Vec<ServiceRecord>, BrokerError> {
        Ok(self.state.lock().unwrap().records.values().cloned().collect())
    }

    async fn remove_by_prefix(&self, prefix: &str) -> Result<Vec<String>, BrokerError> {
        let mut state = self.state.lock().unwrap();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }
        let matched: Vec<String> = state
            .records
            .keys()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect();
        for name in &matched {
            state.records.remove(name);
        }
        Ok(matched)
    }

    async fn is_running(&self) -> bool {
        self.state.lock().unwrap().running
    }

    async fn start(&self) -> Result<(), BrokerError> {
        let mut state = self.state.lock().unwrap();
        state.events.push("start".to_string());
        state.running = true;
        Ok(())
    }

    async fn stop(&self) -> Result<(), BrokerError> {
        let mut state = self.state.lock().unwrap();
        state.events.push("stop".to_string());
        state.running = false;
        Ok(())
    }
}
