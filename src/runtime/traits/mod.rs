// ABOUTME: Capability traits for the container runtime collaborator.
// ABOUTME: Defines ImageOps and ContainerOps; the orchestrator depends only on these.

mod container;
mod image;

pub use container::{ContainerError, ContainerOps};
pub use image::{ImageError, ImageOps};
