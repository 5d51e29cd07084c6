// ABOUTME: Image operations trait for container runtimes.
// ABOUTME: Check local and registry availability, pull images.

use crate::types::ImageRef;
use async_trait::async_trait;

/// Image operations: availability checks and pulls.
#[async_trait]
pub trait ImageOps: Send + Sync {
    /// Check if an image exists locally.
    async fn image_exists(&self, reference: &ImageRef) -> Result<bool, ImageError>;

    /// Check if the registry can serve an image without pulling it.
    async fn registry_has_image(&self, reference: &ImageRef) -> Result<bool, ImageError>;

    /// Pull an image from its registry.
    async fn pull_image(&self, reference: &ImageRef) -> Result<(), ImageError>;

    /// Whether `reference` can be used for a deployment. With `local_only`
    /// the registry is never consulted. Lookup errors count as unavailable.
    async fn image_available(&self, reference: &ImageRef, local_only: bool) -> bool {
        match self.image_exists(reference).await {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => tracing::debug!(image = %reference, error = %e, "local image lookup failed"),
        }

        if local_only {
            return false;
        }

        match self.registry_has_image(reference).await {
            Ok(found) => found,
            Err(e) => {
                tracing::debug!(image = %reference, error = %e, "registry image lookup failed");
                false
            }
        }
    }
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("pull failed: {0}")]
    PullFailed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
