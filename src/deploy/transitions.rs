// ABOUTME: State transition methods for deployment orchestration.
// ABOUTME: Each method consumes self; a failing step records FailedToDeploy before returning.

use crate::runtime::{ContainerOps, ImageOps};
use crate::state::{Phase, StateStore};
use crate::types::ContainerId;

use super::Deployment;
use super::error::DeployError;
use super::state::{ContainerCreated, ContainerRunning, ImagePulled, Start};

/// Result type for transitions. The tracker already holds the failed phase on `Err`.
pub type TransitionResult<'a, T> = Result<Deployment<'a, T>, DeployError>;

impl<'a, S> Deployment<'a, S> {
    fn advance<T>(self, state: T) -> Deployment<'a, T> {
        Deployment {
            config: self.config,
            mode: self.mode,
            tracker: self.tracker,
            state,
        }
    }

    /// Record the failure and hand the error back.
    ///
    /// A store error here is only logged; `tracker.is_persisted()` reports the
    /// stale store copy.
    async fn fail<St: StateStore + ?Sized>(self, store: &St, error: DeployError) -> DeployError {
        tracing::error!(name = %self.name(), error = %error, "deployment failed");

        if let Err(e) = self.tracker.set_phase(store, Phase::FailedToDeploy).await {
            tracing::error!(name = %self.name(), error = %e, "failed to record failed deployment");
        }

        error
    }
}

// =============================================================================
// Start -> ImagePulled
// =============================================================================

impl<'a> Deployment<'a, Start> {
    /// Pull the resolved image, unless the workload runs local images only.
    ///
    /// # Errors
    ///
    /// `DeployError::NoImage` when resolution found no candidate,
    /// `DeployError::ImagePullFailed` when the runtime rejects the pull.
    pub async fn pull_image<R, St>(self, runtime: &R, store: &St) -> TransitionResult<'a, ImagePulled>
    where
        R: ImageOps + ?Sized,
        St: StateStore + ?Sized,
    {
        if self.mode.local_only {
            tracing::info!(name = %self.name(), "local image only, skipping pull");
            return Ok(self.advance(ImagePulled));
        }

        let Some(image) = self.config.image().cloned() else {
            let error = DeployError::NoImage(self.name().clone());
            return Err(self.fail(store, error).await);
        };

        tracing::info!(image = %image, "pulling image");
        let pulled = runtime.pull_image(&image).await;
        match pulled {
            Ok(()) => Ok(self.advance(ImagePulled)),
            Err(e) => Err(self.fail(store, DeployError::ImagePullFailed(e)).await),
        }
    }
}

// =============================================================================
// ImagePulled -> ContainerCreated
// =============================================================================

impl<'a> Deployment<'a, ImagePulled> {
    /// Create the container from the resolved configuration.
    ///
    /// An empty container ID counts as a failed creation.
    pub async fn create_container<R, St>(
        self,
        runtime: &R,
        store: &St,
    ) -> TransitionResult<'a, ContainerCreated>
    where
        R: ContainerOps + ?Sized,
        St: StateStore + ?Sized,
    {
        if self.config.image().is_none() {
            let error = DeployError::NoImage(self.name().clone());
            return Err(self.fail(store, error).await);
        }

        let created = runtime.create_container(&self.config).await;
        match created {
            Ok(id) if id.is_empty() => Err(self.fail(store, DeployError::EmptyContainerId).await),
            Ok(container_id) => {
                tracing::info!(name = %self.name(), container = %container_id, "container created");
                Ok(self.advance(ContainerCreated { container_id }))
            }
            Err(e) => Err(self.fail(store, DeployError::ContainerCreateFailed(e)).await),
        }
    }
}

// =============================================================================
// ContainerCreated -> ContainerRunning
// =============================================================================

impl<'a> Deployment<'a, ContainerCreated> {
    /// Start the container.
    ///
    /// Detached workloads return once the container is started. Attached ones
    /// stream output and return when the container exits; a non-zero exit is
    /// a failure.
    pub async fn start_container<R, St>(
        self,
        runtime: &R,
        store: &St,
    ) -> TransitionResult<'a, ContainerRunning>
    where
        R: ContainerOps + ?Sized,
        St: StateStore + ?Sized,
    {
        let container_id = self.state.container_id.clone();

        let started = if self.mode.detach {
            runtime.start_container(&container_id).await
        } else {
            runtime.run_container_attached(&container_id).await
        };

        match started {
            Ok(()) => {
                tracing::info!(name = %self.name(), container = %container_id, detach = self.mode.detach, "container started");
                Ok(self.advance(ContainerRunning { container_id }))
            }
            Err(e) => Err(self.fail(store, DeployError::ContainerStartFailed(e)).await),
        }
    }
}

// =============================================================================
// ContainerRunning -> Deployed
// =============================================================================

impl Deployment<'_, ContainerRunning> {
    /// Record the deployment as complete.
    ///
    /// # Errors
    ///
    /// `DeployError::State` when the phase cannot be written. The container is
    /// running regardless, and the tracker holds `Deployed` unpersisted.
    pub async fn finish<St: StateStore + ?Sized>(self, store: &St) -> Result<ContainerId, DeployError> {
        self.tracker.set_phase(store, Phase::Deployed).await?;
        tracing::info!(name = %self.name(), container = %self.state.container_id, "deployment complete");
        Ok(self.state.container_id)
    }
}
