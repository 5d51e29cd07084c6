// ABOUTME: Validated workload name, also used as the container name.
// ABOUTME: Follows the character rules the container runtimes accept for names.

use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkloadNameError {
    #[error("workload name cannot be empty")]
    Empty,

    #[error("workload name must start with a letter or digit, found '{0}'")]
    InvalidStart(char),

    #[error("invalid character in workload name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkloadName(String);

impl WorkloadName {
    pub fn new(value: &str) -> Result<Self, WorkloadNameError> {
        let mut chars = value.chars();
        let first = chars.next().ok_or(WorkloadNameError::Empty)?;

        if !first.is_ascii_alphanumeric() {
            return Err(WorkloadNameError::InvalidStart(first));
        }

        for c in chars {
            if !c.is_ascii_alphanumeric() && c != '_' && c != '.' && c != '-' {
                return Err(WorkloadNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkloadName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for WorkloadName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}
