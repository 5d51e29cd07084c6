// ABOUTME: Bollard-based container runtime implementation.
// ABOUTME: Supports both Docker and Podman via Docker-compatible API.

use crate::resolve::RuntimeConfig;
use crate::runtime::error::ConnectionError;
use crate::runtime::traits::{ContainerError, ContainerOps, ImageError, ImageOps};
use crate::runtime::types::{RuntimeInfo, RuntimeType};
use crate::types::{ContainerId, ImageRef};
use async_trait::async_trait;
use bollard::Docker;
use bollard::container::LogOutput;
use bollard::models::{
    ContainerCreateBody, EndpointSettings, HostConfig, NetworkingConfig, PortBinding,
};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, LogsOptions, StartContainerOptions,
    WaitContainerOptions,
};
use futures::{Stream, StreamExt};
use std::collections::HashMap;
use tokio::io::{AsyncWrite, AsyncWriteExt};

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_image_pull_error(e: bollard::errors::Error, image_name: &str) -> ImageError {
    match &e {
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 404 =>
        {
            ImageError::NotFound(image_name.to_string())
        }
        _ => ImageError::PullFailed(format!("{}: {}", image_name, e)),
    }
}

fn map_container_create_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::ImageNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ContainerError::AlreadyExists(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 400 => ContainerError::InvalidConfig(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_start_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => ContainerError::AlreadyRunning(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_wait_error(e: bollard::errors::Error) -> ContainerError {
    match e {
        bollard::errors::Error::DockerContainerWaitError { code, .. } => {
            ContainerError::Exited(code)
        }
        other => map_container_start_error(other),
    }
}

/// Port keys carry a protocol; a bare number means TCP.
fn port_key(container_port: &str) -> String {
    if container_port.contains('/') {
        container_port.to_string()
    } else {
        format!("{}/tcp", container_port)
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

/// Translate a resolved configuration into the Docker API create body.
fn container_create_body(config: &RuntimeConfig, image: &ImageRef) -> ContainerCreateBody {
    let exposed_ports: Vec<String> = config.exposed_ports().iter().map(|p| port_key(p)).collect();

    let port_bindings: HashMap<String, Option<Vec<PortBinding>>> = config
        .port_bindings()
        .iter()
        .map(|(container_port, host_ports)| {
            let bindings = host_ports
                .iter()
                .map(|host_port| PortBinding {
                    host_ip: None,
                    host_port: Some(host_port.clone()),
                })
                .collect();
            (port_key(container_port), Some(bindings))
        })
        .collect();

    let mut host_config = HostConfig {
        binds: non_empty(config.volume_binds()),
        ..Default::default()
    };
    if !port_bindings.is_empty() {
        host_config.port_bindings = Some(port_bindings);
    }

    let networking_config = config.networks().filter(|n| !n.is_empty()).map(|networks| {
        let endpoints: HashMap<String, EndpointSettings> = networks
            .iter()
            .map(|(name, gateway)| {
                let settings = EndpointSettings {
                    gateway: (!gateway.is_empty()).then(|| gateway.clone()),
                    ..Default::default()
                };
                (name.clone(), settings)
            })
            .collect();
        NetworkingConfig {
            endpoints_config: Some(endpoints),
        }
    });

    // The runtime only honours an endpoint for the network the container
    // starts in.
    if let Some(network) = config.network_mode() {
        host_config.network_mode = Some(network.to_string());
    }

    ContainerCreateBody {
        image: Some(image.to_string()),
        exposed_ports: if exposed_ports.is_empty() {
            None
        } else {
            Some(exposed_ports)
        },
        cmd: non_empty(config.command()),
        entrypoint: non_empty(config.entrypoint()),
        host_config: Some(host_config),
        networking_config,
        ..Default::default()
    }
}

/// Route log chunks to `stdout`/`stderr`. Terminal write and flush failures
/// are logged, never fatal; stream errors end the copy.
async fn copy_output<S, O, E>(
    mut stream: S,
    stdout: &mut O,
    stderr: &mut E,
) -> Result<(), ContainerError>
where
    S: Stream<Item = Result<LogOutput, bollard::errors::Error>> + Unpin,
    O: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    while let Some(chunk) = stream.next().await {
        let write = match chunk.map_err(map_container_start_error)? {
            LogOutput::StdErr { message } => stderr.write_all(&message).await,
            LogOutput::StdOut { message }
            | LogOutput::Console { message }
            | LogOutput::StdIn { message } => stdout.write_all(&message).await,
        };
        if let Err(e) = write {
            tracing::debug!(error = %e, "failed to write container output");
        }
    }

    for flushed in [stdout.flush().await, stderr.flush().await] {
        if let Err(e) = flushed {
            tracing::debug!(error = %e, "failed to flush container output");
        }
    }
    Ok(())
}

// =============================================================================
// BollardRuntime
// =============================================================================

/// Container runtime implementation using bollard.
///
/// Supports both Docker and Podman via Docker-compatible API.
pub struct BollardRuntime {
    client: Docker,
    runtime_type: RuntimeType,
}

impl BollardRuntime {
    /// Create a new BollardRuntime from a Docker client.
    pub fn new(client: Docker, runtime_type: RuntimeType) -> Self {
        Self {
            client,
            runtime_type,
        }
    }

    /// Connect to a container runtime using detected runtime info.
    ///
    /// Use with `detect_local()` to find the socket.
    pub fn connect(info: &RuntimeInfo) -> Result<Self, ConnectionError> {
        let client =
            Docker::connect_with_unix(&info.socket_path, 120, bollard::API_DEFAULT_VERSION)
                .map_err(|e| ConnectionError(e.to_string()))?;
        Ok(Self::new(client, info.runtime_type))
    }

    /// Ping the runtime to check connectivity.
    pub async fn ping(&self) -> Result<(), ConnectionError> {
        self.client
            .ping()
            .await
            .map_err(|e| ConnectionError(e.to_string()))?;
        Ok(())
    }

    /// Get the runtime type (Docker or Podman).
    pub fn runtime_type(&self) -> RuntimeType {
        self.runtime_type
    }

    /// Copy container output to the terminal until the stream closes.
    async fn stream_output(&self, id: &ContainerId) -> Result<(), ContainerError> {
        let opts = LogsOptions {
            follow: true,
            stdout: true,
            stderr: true,
            tail: "all".to_string(),
            ..Default::default()
        };

        let stream = self.client.logs(id.as_str(), Some(opts));
        copy_output(stream, &mut tokio::io::stdout(), &mut tokio::io::stderr()).await
    }
}

#[async_trait]
impl ImageOps for BollardRuntime {
    async fn image_exists(&self, reference: &ImageRef) -> Result<bool, ImageError> {
        let image_name = reference.to_string();

        match self.client.inspect_image(&image_name).await {
            Ok(_) => Ok(true),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(false),
            Err(e) => Err(ImageError::Runtime(format!(
                "failed to inspect {}: {}",
                image_name, e
            ))),
        }
    }

    async fn registry_has_image(&self, reference: &ImageRef) -> Result<bool, ImageError> {
        let image_name = reference.to_string();

        match self.client.inspect_registry_image(&image_name, None).await {
            Ok(_) => Ok(true),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 401 | 403 | 404,
                ..
            }) => Ok(false),
            Err(e) => Err(ImageError::Runtime(format!(
                "failed to query registry for {}: {}",
                image_name, e
            ))),
        }
    }

    async fn pull_image(&self, reference: &ImageRef) -> Result<(), ImageError> {
        let image_name = reference.to_string();

        let opts = CreateImageOptions {
            from_image: Some(image_name.clone()),
            ..Default::default()
        };

        // Pull returns a stream of progress updates - consume it
        let mut stream = self.client.create_image(Some(opts), None, None);
        while let Some(result) = stream.next().await {
            let progress = result.map_err(|e| map_image_pull_error(e, &image_name))?;
            if let Some(status) = progress.status {
                tracing::debug!(image = %image_name, status = %status, "pull progress");
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ContainerOps for BollardRuntime {
    async fn create_container(
        &self,
        config: &RuntimeConfig,
    ) -> Result<ContainerId, ContainerError> {
        let image = config.image().ok_or_else(|| {
            ContainerError::InvalidConfig("no image reference resolved".to_string())
        })?;

        let body = container_create_body(config, image);
        let opts = CreateContainerOptions {
            name: Some(config.container_name().to_string()),
            ..Default::default()
        };

        let response = self
            .client
            .create_container(Some(opts), body)
            .await
            .map_err(map_container_create_error)?;

        for warning in &response.warnings {
            tracing::warn!(container = %config.container_name(), "{}", warning);
        }

        Ok(ContainerId::new(response.id))
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.client
            .start_container(id.as_str(), None::<StartContainerOptions>)
            .await
            .map_err(map_container_start_error)
    }

    async fn run_container_attached(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.start_container(id).await?;
        self.stream_output(id).await?;

        let mut wait = self
            .client
            .wait_container(id.as_str(), None::<WaitContainerOptions>);
        while let Some(result) = wait.next().await {
            let response = result.map_err(map_container_wait_error)?;
            if response.status_code != 0 {
                return Err(ContainerError::Exited(response.status_code));
            }
        }

        Ok(())
    }
}
