// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Workload names, image references and phantom-typed container IDs.

mod id;
mod image_ref;
mod workload_name;

pub use id::ContainerId;
pub use image_ref::{ImageRef, ParseImageRefError};
pub use workload_name::{WorkloadName, WorkloadNameError};
