// ABOUTME: Lifecycle phase of a deployment attempt.
// ABOUTME: Persisted as a signed integer; failures are the negation of the matching success.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    FailedToDeploy,
    Unregistered,
    Registered,
    Deployed,
}

impl Phase {
    /// Integer form used in the state store.
    pub const fn as_i8(self) -> i8 {
        match self {
            Phase::FailedToDeploy => -2,
            Phase::Unregistered => 0,
            Phase::Registered => 1,
            Phase::Deployed => 2,
        }
    }

    pub const fn from_i8(value: i8) -> Option<Self> {
        match value {
            -2 => Some(Phase::FailedToDeploy),
            0 => Some(Phase::Unregistered),
            1 => Some(Phase::Registered),
            2 => Some(Phase::Deployed),
            _ => None,
        }
    }

    /// No further transition is allowed within the same attempt.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Phase::FailedToDeploy | Phase::Deployed)
    }

    /// Phases only move forward through Unregistered -> Registered ->
    /// Deployed, or drop to FailedToDeploy from a non-terminal phase.
    pub const fn can_transition_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Unregistered, Phase::Registered)
                | (Phase::Registered, Phase::Deployed)
                | (Phase::Unregistered, Phase::FailedToDeploy)
                | (Phase::Registered, Phase::FailedToDeploy)
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::FailedToDeploy => "failed-to-deploy",
            Phase::Unregistered => "unregistered",
            Phase::Registered => "registered",
            Phase::Deployed => "deployed",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unrecognised persisted phase: {0:?}")]
pub struct ParsePhaseError(pub String);

/// Parses the persisted integer form.
impl FromStr for Phase {
    type Err = ParsePhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i8>()
            .ok()
            .and_then(Phase::from_i8)
            .ok_or_else(|| ParsePhaseError(s.to_string()))
    }
}
