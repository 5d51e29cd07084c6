// ABOUTME: Deployment Orchestrator: registers a workload and drives pull, create, start.
// ABOUTME: Dry runs report the resolved configuration and touch neither runtime nor store.

use crate::descriptor::WorkloadDescriptor;
use crate::host::{HostPorts, PortProbe};
use crate::resolve::RuntimeConfig;
use crate::runtime::{ContainerOps, ImageOps};
use crate::state::{DeploymentState, Phase, StateError, StateStore};
use crate::types::{ContainerId, WorkloadName};

use super::deployment::{Deployment, RunMode};
use super::error::DeployError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeployOptions {
    /// Resolve and report only.
    pub dry_run: bool,
}

impl DeployOptions {
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// Nothing was created; the configuration that would have been used.
    DryRun(RuntimeConfig),
    Deployed { container_id: ContainerId },
}

/// Drives one deployment attempt against a runtime and a state store.
pub struct Orchestrator<'c, R: ?Sized, St: ?Sized> {
    runtime: &'c R,
    store: &'c St,
    options: DeployOptions,
}

impl<'c, R, St> Orchestrator<'c, R, St>
where
    R: ImageOps + ContainerOps + ?Sized,
    St: StateStore + ?Sized,
{
    pub fn new(runtime: &'c R, store: &'c St, options: DeployOptions) -> Self {
        Self {
            runtime,
            store,
            options,
        }
    }

    pub fn options(&self) -> DeployOptions {
        self.options
    }

    /// Create the tracker for `name` and record it as registered.
    ///
    /// A dry run returns the tracker still `Unregistered` without writing.
    pub async fn register(&self, name: &WorkloadName) -> Result<DeploymentState, StateError> {
        let mut state = DeploymentState::new(name.clone());
        if self.options.dry_run {
            tracing::debug!(name = %name, "dry run, skipping registration");
            return Ok(state);
        }

        state.set_phase(self.store, Phase::Registered).await?;
        Ok(state)
    }

    /// Resolve `descriptor` and run the deployment.
    pub async fn deploy<P: PortProbe>(
        &self,
        descriptor: &WorkloadDescriptor,
        host_ports: &HostPorts<P>,
        state: &mut DeploymentState,
    ) -> Result<DeployOutcome, DeployError> {
        let config = RuntimeConfig::resolve(descriptor, self.runtime, host_ports).await;
        self.run(config, RunMode::from(&descriptor.run), state).await
    }

    /// Run the pipeline for an already resolved configuration.
    ///
    /// The tracker must be `Registered`. On a failed step it ends in
    /// `FailedToDeploy`; on success in `Deployed`.
    pub async fn run(
        &self,
        config: RuntimeConfig,
        mode: RunMode,
        state: &mut DeploymentState,
    ) -> Result<DeployOutcome, DeployError> {
        if self.options.dry_run {
            report(&config, mode);
            return Ok(DeployOutcome::DryRun(config));
        }

        if state.phase() != Phase::Registered {
            return Err(DeployError::NotRegistered {
                name: state.name().clone(),
                phase: state.phase(),
            });
        }

        tracing::info!(name = %config.container_name(), "deploying");

        let container_id = Deployment::new(config, mode, state)
            .pull_image(self.runtime, self.store)
            .await?
            .create_container(self.runtime, self.store)
            .await?
            .start_container(self.runtime, self.store)
            .await?
            .finish(self.store)
            .await?;

        Ok(DeployOutcome::Deployed { container_id })
    }
}

fn report(config: &RuntimeConfig, mode: RunMode) {
    let image = config
        .image()
        .map(ToString::to_string)
        .unwrap_or_default();

    tracing::info!(name = %config.container_name(), "dry run");
    tracing::info!(image = %image, local_only = mode.local_only, detach = mode.detach, "image");
    tracing::info!(exposed_ports = ?config.exposed_ports(), "exposed ports");
    tracing::info!(port_bindings = ?config.port_bindings(), "port bindings");
    tracing::info!(volumes = ?config.volume_binds(), "volume binds");
    tracing::info!(command = ?config.command(), entrypoint = ?config.entrypoint(), "command");
    tracing::info!(networks = ?config.networks(), "networks");
}
