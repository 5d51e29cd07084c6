// ABOUTME: Container operations trait for container runtimes.
// ABOUTME: Create a container from a resolved config and start it attached or detached.

use crate::resolve::RuntimeConfig;
use crate::types::ContainerId;
use async_trait::async_trait;

/// Container lifecycle operations used by a deployment.
#[async_trait]
pub trait ContainerOps: Send + Sync {
    /// Create a container from a resolved runtime configuration.
    async fn create_container(&self, config: &RuntimeConfig)
    -> Result<ContainerId, ContainerError>;

    /// Start a created container in the background.
    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError>;

    /// Start a created container in the foreground, streaming its output
    /// until it exits.
    async fn run_container_attached(&self, id: &ContainerId) -> Result<(), ContainerError>;
}

/// Errors from container operations.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("container not found: {0}")]
    NotFound(String),

    #[error("container already exists: {0}")]
    AlreadyExists(String),

    #[error("container already running: {0}")]
    AlreadyRunning(String),

    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("container exited with status {0}")]
    Exited(i64),

    #[error("runtime error: {0}")]
    Runtime(String),
}
