// ABOUTME: Error types for deployment operations.
// ABOUTME: Separates failed deployments from failures to record state.

use crate::runtime::{ContainerError, ImageError};
use crate::state::{Phase, StateError};
use crate::types::WorkloadName;

/// Errors that end a deployment attempt.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The workload must be registered before it can be deployed.
    #[error("workload {name} is {phase}, expected registered")]
    NotRegistered { name: WorkloadName, phase: Phase },

    /// No image candidate was available.
    #[error("no image reference resolved for {0}")]
    NoImage(WorkloadName),

    /// Image pull failed.
    #[error("failed to pull image: {0}")]
    ImagePullFailed(#[source] ImageError),

    /// Container creation failed.
    #[error("failed to create container: {0}")]
    ContainerCreateFailed(#[source] ContainerError),

    /// The runtime reported success but returned no container ID.
    #[error("failed to create container: runtime returned an empty container id")]
    EmptyContainerId,

    /// Container start failed.
    #[error("failed to start container: {0}")]
    ContainerStartFailed(#[source] ContainerError),

    /// Writing the deployment phase failed.
    #[error(transparent)]
    State(#[from] StateError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    /// The attempt never started; nothing was recorded.
    Precondition,
    /// A pipeline step failed; the phase was set to FailedToDeploy.
    Deployment,
    /// The state store could not be updated. The container may be running.
    StatePersistence,
    /// A phase change violated the lifecycle order.
    InvalidTransition,
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::NotRegistered { .. } => DeployErrorKind::Precondition,
            DeployError::NoImage(_)
            | DeployError::ImagePullFailed(_)
            | DeployError::ContainerCreateFailed(_)
            | DeployError::EmptyContainerId
            | DeployError::ContainerStartFailed(_) => DeployErrorKind::Deployment,
            DeployError::State(StateError::InvalidTransition { .. }) => {
                DeployErrorKind::InvalidTransition
            }
            DeployError::State(_) => DeployErrorKind::StatePersistence,
        }
    }
}
