// ABOUTME: Container image reference built from a repository and optional tag.
// ABOUTME: An absent tag leaves the choice to the registry default.

use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseImageRefError {
    #[error("image repository cannot be empty")]
    Empty,

    #[error("invalid character in image reference: {0}")]
    InvalidChar(char),

    #[error("invalid image tag: {0}")]
    InvalidTag(String),
}

/// A concrete image reference such as `nginx` or `ghcr.io/org/app:1.2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    repository: String,
    tag: Option<String>,
}

impl ImageRef {
    /// Compose a reference from a repository and a tag. An empty tag yields
    /// the bare repository.
    pub fn new(repository: &str, tag: &str) -> Result<Self, ParseImageRefError> {
        let repository = repository.trim();
        if repository.is_empty() {
            return Err(ParseImageRefError::Empty);
        }
        check_chars(repository)?;

        let tag = tag.trim();
        let tag = if tag.is_empty() {
            None
        } else {
            if tag.contains(':') || tag.contains('/') || tag.contains('@') {
                return Err(ParseImageRefError::InvalidTag(tag.to_string()));
            }
            check_chars(tag)?;
            Some(tag.to_string())
        };

        Ok(Self {
            repository: repository.to_string(),
            tag,
        })
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }
}

fn check_chars(input: &str) -> Result<(), ParseImageRefError> {
    for c in input.chars() {
        if !c.is_ascii_alphanumeric()
            && c != '/'
            && c != ':'
            && c != '.'
            && c != '-'
            && c != '_'
            && c != '@'
        {
            return Err(ParseImageRefError::InvalidChar(c));
        }
    }
    Ok(())
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repository)?;
        if let Some(ref tag) = self.tag {
            write!(f, ":{}", tag)?;
        }
        Ok(())
    }
}

impl Serialize for ImageRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
