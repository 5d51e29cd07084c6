// ABOUTME: Workload descriptor types and YAML loading.
// ABOUTME: One document describes one workload: name, image candidates, run requirements.

mod deserialize;

use crate::error::{Error, Result};
use crate::types::WorkloadName;
use deserialize::{deserialize_list, deserialize_workload_name};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One image candidate tier. Empty fields mean "no preference".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResourceDescriptor {
    #[serde(default)]
    pub repository: String,

    #[serde(default)]
    pub tag: String,
}

/// Run requirements, mirroring the options of `docker run`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RunDescriptor {
    /// Skip pulling and use whatever image is present locally.
    #[serde(default, rename = "local_image")]
    pub use_local_image_only: bool,

    #[serde(default)]
    pub detach: bool,

    /// `network:gateway` pairs.
    #[serde(default, rename = "network_list", deserialize_with = "deserialize_list")]
    pub networks: Vec<String>,

    /// `host:container` pairs.
    #[serde(default, rename = "publish_list", deserialize_with = "deserialize_list")]
    pub published_ports: Vec<String>,

    #[serde(default, rename = "volume_list", deserialize_with = "deserialize_list")]
    pub volumes: Vec<String>,

    #[serde(default, rename = "cmd", deserialize_with = "deserialize_list")]
    pub command: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_list")]
    pub entrypoint: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkloadDescriptor {
    #[serde(deserialize_with = "deserialize_workload_name")]
    pub name: WorkloadName,

    /// Free-form document kind; carried but not interpreted.
    #[serde(default)]
    pub kind: Option<String>,

    /// Baseline image candidate.
    #[serde(default)]
    pub predicate: ResourceDescriptor,

    /// Preferred image candidate, tried before the predicate.
    #[serde(default)]
    pub priority: ResourceDescriptor,

    #[serde(default, rename = "requirement")]
    pub run: RunDescriptor,
}

impl WorkloadDescriptor {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str());
        if !matches!(ext, Some("yaml") | Some("yml")) {
            tracing::warn!(path = %path.display(), "descriptor file does not have a .yaml/.yml extension");
        }

        let content = std::fs::read_to_string(path).map_err(|source| Error::DescriptorRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_document_uses_defaults() {
        let descriptor = WorkloadDescriptor::from_yaml("name: web\n").unwrap();
        assert_eq!(descriptor.name.as_str(), "web");
        assert_eq!(descriptor.predicate, ResourceDescriptor::default());
        assert_eq!(descriptor.run, RunDescriptor::default());
    }

    #[test]
    fn null_lists_read_as_empty() {
        let yaml = "name: web\nrequirement:\n  cmd:\n  publish_list:\n";
        let descriptor = WorkloadDescriptor::from_yaml(yaml).unwrap();
        assert!(descriptor.run.command.is_empty());
        assert!(descriptor.run.published_ports.is_empty());
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = WorkloadDescriptor::from_yaml("name: \"\"\n").unwrap_err();
        assert!(err.to_string().contains("cannot be empty"), "{err}");
    }
}
