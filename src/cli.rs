// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use kether::runtime::RuntimeType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kether")]
#[command(about = "Resolve a workload descriptor and deploy it on Docker or Podman")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print results as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// State store URL [env: KETHER_REDIS_URL]
    #[arg(long, global = true, value_name = "URL")]
    pub redis_url: Option<String>,

    /// Container runtime, skipping detection [env: KETHER_RUNTIME]
    #[arg(long, global = true, value_enum)]
    pub runtime: Option<RuntimeType>,

    /// Runtime socket path [env: KETHER_SOCKET]
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a descriptor and deploy its container
    Deploy {
        #[command(flatten)]
        descriptor: DescriptorArg,

        /// Resolve and print the configuration without creating anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Check that a descriptor parses
    Validate {
        #[command(flatten)]
        descriptor: DescriptorArg,
    },

    /// Show the stored deployment phase of a workload
    Status {
        /// Workload name
        #[arg(short, long)]
        name: String,
    },
}

#[derive(Args)]
pub struct DescriptorArg {
    /// Descriptor file (YAML)
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub path: PathBuf,
}
