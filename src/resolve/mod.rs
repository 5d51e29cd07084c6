// ABOUTME: Descriptor resolution engine: image, ports and networks into a RuntimeConfig.
// ABOUTME: Each resolution builds a fresh, immutable configuration.

mod image;
mod network;
mod ports;

pub use image::{image_candidates, resolve_image};
pub use network::{build_network_attachments, primary_network};
pub use ports::{PortMapping, resolve_port_mapping};

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::descriptor::WorkloadDescriptor;
use crate::host::{HostPorts, PortProbe};
use crate::runtime::ImageOps;
use crate::types::{ImageRef, WorkloadName};

/// Everything handed to the container runtime to create one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeConfig {
    container_name: WorkloadName,
    image: Option<ImageRef>,
    #[serde(flatten)]
    ports: PortMapping,
    volume_binds: Vec<String>,
    command: Vec<String>,
    entrypoint: Vec<String>,
    networks: Option<BTreeMap<String, String>>,
    network_mode: Option<String>,
}

impl RuntimeConfig {
    /// Resolve a descriptor against the runtime and the host.
    ///
    /// Contacts the runtime only for read-only image lookups.
    pub async fn resolve<R, P>(
        descriptor: &WorkloadDescriptor,
        runtime: &R,
        host_ports: &HostPorts<P>,
    ) -> Self
    where
        R: ImageOps + ?Sized,
        P: PortProbe,
    {
        let image = resolve_image(
            runtime,
            &descriptor.predicate,
            &descriptor.priority,
            descriptor.run.use_local_image_only,
        )
        .await;

        Self::from_parts(descriptor, image, host_ports)
    }

    /// Build a configuration with an already chosen image.
    pub fn from_parts<P: PortProbe>(
        descriptor: &WorkloadDescriptor,
        image: Option<ImageRef>,
        host_ports: &HostPorts<P>,
    ) -> Self {
        let run = &descriptor.run;
        Self {
            container_name: descriptor.name.clone(),
            image,
            ports: resolve_port_mapping(&run.published_ports, host_ports),
            volume_binds: run.volumes.clone(),
            command: run.command.clone(),
            entrypoint: run.entrypoint.clone(),
            networks: build_network_attachments(&run.networks),
            network_mode: primary_network(&run.networks),
        }
    }

    pub fn container_name(&self) -> &WorkloadName {
        &self.container_name
    }

    /// `None` when no image candidate was available.
    pub fn image(&self) -> Option<&ImageRef> {
        self.image.as_ref()
    }

    pub fn ports(&self) -> &PortMapping {
        &self.ports
    }

    pub fn exposed_ports(&self) -> &BTreeSet<String> {
        self.ports.exposed_ports()
    }

    pub fn port_bindings(&self) -> &BTreeMap<String, Vec<String>> {
        self.ports.port_bindings()
    }

    pub fn volume_binds(&self) -> &[String] {
        &self.volume_binds
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn entrypoint(&self) -> &[String] {
        &self.entrypoint
    }

    pub fn networks(&self) -> Option<&BTreeMap<String, String>> {
        self.networks.as_ref()
    }

    /// Network the container starts in: the first one listed.
    pub fn network_mode(&self) -> Option<&str> {
        self.network_mode.as_deref()
    }
}
