// ABOUTME: Container runtime collaborator: traits, bollard client and local detection.
// ABOUTME: Docker and Podman are both reached through the Docker-compatible API.

mod bollard;
mod detection;
mod error;
pub mod traits;
mod types;

pub use self::bollard::BollardRuntime;
pub use detection::{DetectionError, detect_local};
pub use error::{ConnectionError, RuntimeError, RuntimeErrorKind};
pub use traits::{ContainerError, ContainerOps, ImageError, ImageOps};
pub use types::{RuntimeInfo, RuntimeOverride, RuntimeType};
