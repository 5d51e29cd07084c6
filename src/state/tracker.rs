// ABOUTME: Deployment State Tracker: in-memory phase mirrored to the state store.
// ABOUTME: Rejects illegal transitions and reports when the store copy may be stale.

use serde::Serialize;

use super::phase::{ParsePhaseError, Phase};
use super::store::{StateStore, StoreError, state_key};
use crate::types::WorkloadName;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid phase transition for {name}: {from} -> {to}")]
    InvalidTransition {
        name: WorkloadName,
        from: Phase,
        to: Phase,
    },

    #[error("failed to persist phase {phase} for {name}: {source}")]
    Persist {
        name: WorkloadName,
        phase: Phase,
        #[source]
        source: StoreError,
    },

    #[error("failed to read phase for {name}: {source}")]
    Read {
        name: WorkloadName,
        #[source]
        source: StoreError,
    },

    #[error("stored phase for {name} is unreadable: {source}")]
    Corrupt {
        name: WorkloadName,
        #[source]
        source: ParsePhaseError,
    },
}

/// Phase of one workload's deployment attempt.
///
/// After a failed write the in-memory phase is ahead of the store;
/// [`is_persisted`](Self::is_persisted) is false until a later write or
/// [`resync`](Self::resync) succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentState {
    name: WorkloadName,
    phase: Phase,
    persisted: bool,
}

impl DeploymentState {
    pub fn new(name: WorkloadName) -> Self {
        Self {
            name,
            phase: Phase::Unregistered,
            persisted: false,
        }
    }

    pub fn name(&self) -> &WorkloadName {
        &self.name
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the store is known to hold the current phase.
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn key(&self) -> String {
        state_key(&self.name)
    }

    /// Move to `phase` and write it to the store.
    ///
    /// An illegal transition changes nothing. A failed write leaves the new
    /// phase in memory, marks it unpersisted and returns the error.
    pub async fn set_phase<S: StateStore + ?Sized>(
        &mut self,
        store: &S,
        phase: Phase,
    ) -> Result<(), StateError> {
        if !self.phase.can_transition_to(phase) {
            return Err(StateError::InvalidTransition {
                name: self.name.clone(),
                from: self.phase,
                to: phase,
            });
        }

        self.phase = phase;
        self.persisted = false;
        self.persist(store).await
    }

    /// Rewrite the current phase, e.g. after a failed write.
    pub async fn resync<S: StateStore + ?Sized>(&mut self, store: &S) -> Result<(), StateError> {
        self.persist(store).await
    }

    async fn persist<S: StateStore + ?Sized>(&mut self, store: &S) -> Result<(), StateError> {
        let key = self.key();
        let value = self.phase.as_i8().to_string();

        match store.set(&key, &value).await {
            Ok(()) => {
                self.persisted = true;
                tracing::info!(name = %self.name, phase = %self.phase, key = %key, "deployment state set");
                Ok(())
            }
            Err(source) => {
                tracing::error!(
                    name = %self.name,
                    phase = %self.phase,
                    key = %key,
                    error = %source,
                    "failed to persist deployment state"
                );
                Err(StateError::Persist {
                    name: self.name.clone(),
                    phase: self.phase,
                    source,
                })
            }
        }
    }
}

/// Read the stored phase for a workload, `None` if it was never written.
pub async fn fetch_phase<S: StateStore + ?Sized>(
    store: &S,
    name: &WorkloadName,
) -> Result<Option<Phase>, StateError> {
    let value = store
        .get(&state_key(name))
        .await
        .map_err(|source| StateError::Read {
            name: name.clone(),
            source,
        })?;

    value
        .map(|v| {
            v.parse::<Phase>().map_err(|source| StateError::Corrupt {
                name: name.clone(),
                source,
            })
        })
        .transpose()
}
