// ABOUTME: Test support utilities.
// ABOUTME: In-memory runtime, state store and port probe fakes for integration tests.

use async_trait::async_trait;
use kether::host::PortProbe;
use kether::resolve::RuntimeConfig;
use kether::runtime::{ContainerError, ContainerOps, ImageError, ImageOps};
use kether::state::{StateStore, StoreError};
use kether::types::{ContainerId, ImageRef};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("kether=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

// =============================================================================
// Ports
// =============================================================================

/// Every port can be bound.
#[allow(dead_code)]
pub struct FreePorts;

impl PortProbe for FreePorts {
    fn can_bind(&self, _port: u16) -> bool {
        true
    }
}

/// The listed ports are in use.
#[allow(dead_code)]
pub struct BusyPorts(pub BTreeSet<u16>);

impl PortProbe for BusyPorts {
    fn can_bind(&self, port: u16) -> bool {
        !self.0.contains(&port)
    }
}

// =============================================================================
// Runtime
// =============================================================================

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ImageExists(String),
    RegistryHasImage(String),
    Pull(String),
    Create(String),
    Start(String),
    RunAttached(String),
}

impl Call {
    fn is_mutating(&self) -> bool {
        matches!(
            self,
            Call::Pull(_) | Call::Create(_) | Call::Start(_) | Call::RunAttached(_)
        )
    }
}

/// Container runtime fake that records every call.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct FakeRuntime {
    local: BTreeSet<String>,
    registry: BTreeSet<String>,
    fail_pull: bool,
    fail_create: bool,
    empty_id: bool,
    fail_start: bool,
    exit_code: Option<i64>,
    calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local(mut self, image: &str) -> Self {
        self.local.insert(image.to_string());
        self
    }

    pub fn with_registry(mut self, image: &str) -> Self {
        self.registry.insert(image.to_string());
        self
    }

    pub fn failing_pull(mut self) -> Self {
        self.fail_pull = true;
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn returning_empty_id(mut self) -> Self {
        self.empty_id = true;
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Attached runs exit with `code`.
    pub fn exiting_with(mut self, code: i64) -> Self {
        self.exit_code = Some(code);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Calls that change anything on the runtime.
    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl ImageOps for FakeRuntime {
    async fn image_exists(&self, reference: &ImageRef) -> Result<bool, ImageError> {
        self.record(Call::ImageExists(reference.to_string()));
        Ok(self.local.contains(&reference.to_string()))
    }

    async fn registry_has_image(&self, reference: &ImageRef) -> Result<bool, ImageError> {
        self.record(Call::RegistryHasImage(reference.to_string()));
        Ok(self.registry.contains(&reference.to_string()))
    }

    async fn pull_image(&self, reference: &ImageRef) -> Result<(), ImageError> {
        self.record(Call::Pull(reference.to_string()));
        if self.fail_pull {
            return Err(ImageError::PullFailed(format!("{reference}: manifest unknown")));
        }
        Ok(())
    }
}

#[async_trait]
impl ContainerOps for FakeRuntime {
    async fn create_container(
        &self,
        config: &RuntimeConfig,
    ) -> Result<ContainerId, ContainerError> {
        let name = config.container_name().to_string();
        self.record(Call::Create(name.clone()));
        if self.fail_create {
            return Err(ContainerError::AlreadyExists(name));
        }
        if self.empty_id {
            return Ok(ContainerId::new(""));
        }
        Ok(ContainerId::new(format!("{name}-0123456789ab")))
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.record(Call::Start(id.to_string()));
        if self.fail_start {
            return Err(ContainerError::Runtime("port is already allocated".to_string()));
        }
        Ok(())
    }

    async fn run_container_attached(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.record(Call::RunAttached(id.to_string()));
        if self.fail_start {
            return Err(ContainerError::Runtime("port is already allocated".to_string()));
        }
        match self.exit_code {
            Some(code) if code != 0 => Err(ContainerError::Exited(code)),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// State store
// =============================================================================

/// Key-value store fake; writes can be made to fail.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct FakeStore {
    entries: Mutex<BTreeMap<String, String>>,
    writes: Mutex<Vec<(String, String)>>,
    fail_writes: AtomicBool,
}

#[allow(dead_code)]
impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    /// Successful writes, in order.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().clone()
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl StateStore for FakeStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("connection refused".to_string()));
        }
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        self.writes
            .lock()
            .push((key.to_string(), value.to_string()));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }
}
