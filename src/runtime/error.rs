// ABOUTME: Runtime error types with SNAFU pattern.
// ABOUTME: Unifies detection and connection errors for programmatic handling.

use snafu::Snafu;

use super::detection::DetectionError;

/// Failure to reach the container runtime API.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ConnectionError(pub String);

/// Unified runtime error for detection and connection failures.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RuntimeError {
    #[snafu(display("runtime detection failed: {source}"))]
    Detection { source: DetectionError },

    #[snafu(display("runtime connection failed: {source}"))]
    Connection { source: ConnectionError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    /// No container runtime found on the system.
    NoRuntimeFound,
    /// A configured socket path does not exist.
    SocketMissing,
    /// Failed to connect to runtime socket.
    ConnectionFailed,
}

impl RuntimeErrorKind {
    /// What the user can do about it.
    pub fn hint(self) -> &'static str {
        match self {
            RuntimeErrorKind::NoRuntimeFound => "start Docker or Podman, or pass --socket",
            RuntimeErrorKind::SocketMissing => "check --socket or KETHER_SOCKET",
            RuntimeErrorKind::ConnectionFailed => {
                "check that the daemon is running and the socket is readable"
            }
        }
    }
}

impl RuntimeError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> RuntimeErrorKind {
        match self {
            RuntimeError::Detection { source } => match source {
                DetectionError::NoRuntimeFound => RuntimeErrorKind::NoRuntimeFound,
                DetectionError::SocketMissing(_) => RuntimeErrorKind::SocketMissing,
            },
            RuntimeError::Connection { .. } => RuntimeErrorKind::ConnectionFailed,
        }
    }
}

impl From<DetectionError> for RuntimeError {
    fn from(source: DetectionError) -> Self {
        RuntimeError::Detection { source }
    }
}

impl From<ConnectionError> for RuntimeError {
    fn from(source: ConnectionError) -> Self {
        RuntimeError::Connection { source }
    }
}
