// ABOUTME: Deployment orchestration using the type state pattern.
// ABOUTME: Exports state markers, the Deployment struct and the Orchestrator.

mod deployment;
mod error;
mod orchestrator;
mod state;
mod transitions;

pub use deployment::{Deployment, RunMode};
pub use error::{DeployError, DeployErrorKind};
pub use orchestrator::{DeployOptions, DeployOutcome, Orchestrator};
pub use state::{ContainerCreated, ContainerRunning, ImagePulled, Start};
pub use transitions::TransitionResult;
