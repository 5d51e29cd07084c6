// ABOUTME: Deployment state marker types for the type state pattern.
// ABOUTME: States after creation carry the container ID they operate on.

use crate::types::ContainerId;

/// Initial state: configuration resolved, nothing touched yet.
/// Available actions: `pull_image()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Start;

/// Image present on the host (pulled, or local-only).
/// Available actions: `create_container()`
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePulled;

/// Container created but not started.
/// Available actions: `start_container()`
#[derive(Debug, Clone)]
pub struct ContainerCreated {
    pub(crate) container_id: ContainerId,
}

impl ContainerCreated {
    pub fn container_id(&self) -> &ContainerId {
        &self.container_id
    }
}

/// Container started (attached run finished, or detached and running).
/// Available actions: `finish()`
#[derive(Debug, Clone)]
pub struct ContainerRunning {
    pub(crate) container_id: ContainerId,
}

impl ContainerRunning {
    pub fn container_id(&self) -> &ContainerId {
        &self.container_id
    }
}
