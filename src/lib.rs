// ABOUTME: Library root for kether - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod deploy;
pub mod descriptor;
pub mod error;
pub mod host;
pub mod output;
pub mod resolve;
pub mod runtime;
pub mod settings;
pub mod state;
pub mod types;
