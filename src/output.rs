// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use serde::Serialize;
use std::time::Instant;

use crate::resolve::RuntimeConfig;
use crate::state::Phase;
use crate::types::WorkloadName;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => println!("{message}"),
            OutputMode::Json => emit(&JsonEvent {
                event: "success",
                message,
                duration_secs: self.duration(),
            }),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Error: {message}"),
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                    duration_secs: self.duration(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Print the configuration a dry run resolved.
    pub fn dry_run(&self, config: &RuntimeConfig) {
        match self.mode {
            OutputMode::Normal => print!("{}", render_config(config)),
            OutputMode::Quiet => {}
            OutputMode::Json => emit(&DryRunEvent {
                event: "dry_run",
                config,
            }),
        }
    }

    /// Print the stored phase of a workload.
    pub fn status(&self, name: &WorkloadName, phase: Option<Phase>) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => match phase {
                Some(phase) => println!("{name}: {phase}"),
                None => println!("{name}: unknown"),
            },
            OutputMode::Json => emit(&StatusEvent {
                event: "status",
                name,
                phase: phase.map(|p| p.to_string()),
                code: phase.map(Phase::as_i8),
            }),
        }
    }
}

/// Human-readable rendering of a resolved configuration.
pub fn render_config(config: &RuntimeConfig) -> String {
    let mut out = String::new();
    let image = config
        .image()
        .map(ToString::to_string)
        .unwrap_or_else(|| "<none>".to_string());

    out.push_str(&format!("Container: {}\n", config.container_name()));
    out.push_str(&format!("Image: {image}\n"));

    if config.port_bindings().is_empty() {
        out.push_str("Ports: none\n");
    } else {
        out.push_str("Ports:\n");
        for (container_port, hosts) in config.port_bindings() {
            out.push_str(&format!("  {} -> {}\n", hosts.join(", "), container_port));
        }
    }

    push_list(&mut out, "Volumes", config.volume_binds());
    push_list(&mut out, "Command", config.command());
    push_list(&mut out, "Entrypoint", config.entrypoint());

    match config.networks() {
        Some(networks) => {
            out.push_str("Networks:\n");
            for (name, gateway) in networks {
                if gateway.is_empty() {
                    out.push_str(&format!("  {name}\n"));
                } else {
                    out.push_str(&format!("  {name} (gateway {gateway})\n"));
                }
            }
        }
        None => out.push_str("Networks: default\n"),
    }

    out
}

fn push_list(out: &mut String, label: &str, items: &[String]) {
    if items.is_empty() {
        out.push_str(&format!("{label}: none\n"));
    } else {
        out.push_str(&format!("{label}: {}\n", items.join(" ")));
    }
}

fn emit<T: Serialize>(event: &T) {
    if let Ok(json) = serde_json::to_string(event) {
        println!("{json}");
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct DryRunEvent<'a> {
    event: &'a str,
    config: &'a RuntimeConfig,
}

#[derive(Serialize)]
struct StatusEvent<'a> {
    event: &'a str,
    name: &'a WorkloadName,
    phase: Option<String>,
    code: Option<i8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::WorkloadDescriptor;
    use crate::host::{HostPorts, PortProbe};
    use crate::types::ImageRef;

    struct Free;

    impl PortProbe for Free {
        fn can_bind(&self, _port: u16) -> bool {
            true
        }
    }

    #[test]
    fn renders_resolved_values() {
        let descriptor = WorkloadDescriptor::from_yaml(
            "name: web\nrequirement:\n  publish_list: [\"8080:80\"]\n  network_list: [\"backend:10.0.0.1\"]\n  cmd: [nginx, -g]\n",
        )
        .unwrap();
        let image = ImageRef::new("nginx", "1.25").ok();
        let config = RuntimeConfig::from_parts(&descriptor, image, &HostPorts::with_probe(Free));

        let text = render_config(&config);
        assert!(text.contains("Container: web\n"), "{text}");
        assert!(text.contains("Image: nginx:1.25\n"), "{text}");
        assert!(text.contains("  8080 -> 80\n"), "{text}");
        assert!(text.contains("Command: nginx -g\n"), "{text}");
        assert!(text.contains("  backend (gateway 10.0.0.1)\n"), "{text}");
        assert!(text.contains("Volumes: none\n"), "{text}");
    }

    #[test]
    fn renders_missing_image() {
        let descriptor = WorkloadDescriptor::from_yaml("name: web\n").unwrap();
        let config = RuntimeConfig::from_parts(&descriptor, None, &HostPorts::with_probe(Free));

        let text = render_config(&config);
        assert!(text.contains("Image: <none>\n"), "{text}");
        assert!(text.contains("Networks: default\n"), "{text}");
    }
}
