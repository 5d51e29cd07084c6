// ABOUTME: Process settings: state store URL and container runtime selection.
// ABOUTME: Read from KETHER_* environment variables, then overridden by CLI flags.

use clap::ValueEnum;

use crate::runtime::{RuntimeOverride, RuntimeType};

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

pub const REDIS_URL_VAR: &str = "KETHER_REDIS_URL";
pub const RUNTIME_VAR: &str = "KETHER_RUNTIME";
pub const SOCKET_VAR: &str = "KETHER_SOCKET";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid value for {var}: {value} (expected docker or podman)")]
    InvalidRuntime { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub redis_url: String,
    pub runtime: RuntimeOverride,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            redis_url: DEFAULT_REDIS_URL.to_string(),
            runtime: RuntimeOverride::default(),
        }
    }
}

impl Settings {
    /// Defaults overlaid with any non-empty `KETHER_*` variables.
    pub fn from_env() -> Result<Self, SettingsError> {
        let mut settings = Self::default();

        if let Some(url) = non_empty_var(REDIS_URL_VAR) {
            settings.redis_url = url;
        }

        if let Some(value) = non_empty_var(RUNTIME_VAR) {
            let runtime = RuntimeType::from_str(&value, true).map_err(|_| {
                SettingsError::InvalidRuntime {
                    var: RUNTIME_VAR,
                    value,
                }
            })?;
            settings.runtime.runtime = Some(runtime);
        }

        settings.runtime.socket = non_empty_var(SOCKET_VAR);
        Ok(settings)
    }

    pub fn with_redis_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.redis_url = url;
        }
        self
    }

    pub fn with_runtime(mut self, runtime: Option<RuntimeType>) -> Self {
        if runtime.is_some() {
            self.runtime.runtime = runtime;
        }
        self
    }

    pub fn with_socket(mut self, socket: Option<String>) -> Self {
        if socket.is_some() {
            self.runtime.socket = socket;
        }
        self
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
