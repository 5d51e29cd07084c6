// ABOUTME: Application-wide error types for kether.
// ABOUTME: Uses thiserror; each layer's error converts in with `?`.

use std::path::PathBuf;
use thiserror::Error;

use crate::deploy::DeployError;
use crate::runtime::RuntimeError;
use crate::settings::SettingsError;
use crate::state::{StateError, StoreError};
use crate::types::WorkloadNameError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read descriptor {}: {source}", path.display())]
    DescriptorRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid descriptor: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid workload name: {0}")]
    InvalidName(#[from] WorkloadNameError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("state store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Deploy(#[from] DeployError),
}

pub type Result<T> = std::result::Result<T, Error>;
