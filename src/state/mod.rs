// ABOUTME: Deployment state tracking mirrored to an external key-value store.
// ABOUTME: Exports the Phase enum, the tracker, and the store collaborator.

mod phase;
mod store;
mod tracker;

pub use phase::{ParsePhaseError, Phase};
pub use store::{MemoryStore, RedisStateStore, StateStore, StoreError, state_key};
pub use tracker::{DeploymentState, StateError, fetch_phase};
