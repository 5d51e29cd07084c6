// ABOUTME: Generic deployment struct parameterized by state marker.
// ABOUTME: Holds the resolved configuration and borrows the workload's state tracker.

use crate::descriptor::RunDescriptor;
use crate::resolve::RuntimeConfig;
use crate::state::DeploymentState;
use crate::types::{ContainerId, WorkloadName};

use super::state::{ContainerCreated, ContainerRunning, Start};

/// How the container is started once created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunMode {
    /// Skip the pull and rely on the local image.
    pub local_only: bool,
    /// Start in the background instead of streaming output until exit.
    pub detach: bool,
}

impl From<&RunDescriptor> for RunMode {
    fn from(run: &RunDescriptor) -> Self {
        Self {
            local_only: run.use_local_image_only,
            detach: run.detach,
        }
    }
}

/// A deployment in progress, parameterized by its current state.
///
/// Every failing transition records `FailedToDeploy` on the borrowed
/// tracker before returning, so the caller sees the final phase once the
/// deployment is dropped.
#[derive(Debug)]
pub struct Deployment<'a, S> {
    pub(crate) config: RuntimeConfig,
    pub(crate) mode: RunMode,
    pub(crate) tracker: &'a mut DeploymentState,
    pub(crate) state: S,
}

impl<'a> Deployment<'a, Start> {
    pub fn new(config: RuntimeConfig, mode: RunMode, tracker: &'a mut DeploymentState) -> Self {
        Deployment {
            config,
            mode,
            tracker,
            state: Start,
        }
    }
}

impl<S> Deployment<'_, S> {
    pub fn name(&self) -> &WorkloadName {
        self.config.container_name()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn tracker(&self) -> &DeploymentState {
        self.tracker
    }
}

impl Deployment<'_, ContainerCreated> {
    pub fn container_id(&self) -> &ContainerId {
        self.state.container_id()
    }
}

impl Deployment<'_, ContainerRunning> {
    pub fn container_id(&self) -> &ContainerId {
        self.state.container_id()
    }
}
