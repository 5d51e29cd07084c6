// ABOUTME: Entry point for the kether CLI application.
// ABOUTME: Parses arguments and dispatches to the command handlers.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use kether::deploy::{DeployOptions, DeployOutcome, Orchestrator};
use kether::descriptor::WorkloadDescriptor;
use kether::error::{Error, Result};
use kether::host::HostPorts;
use kether::output::{Output, OutputMode};
use kether::resolve::image_candidates;
use kether::runtime::{BollardRuntime, RuntimeError, detect_local};
use kether::settings::Settings;
use kether::state::{MemoryStore, RedisStateStore, StateStore, fetch_phase};
use kether::types::WorkloadName;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else if cli.quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    if let Err(e) = run(cli, &mut output).await {
        output.error(&describe(&e));
        std::process::exit(1);
    }
}

fn describe(err: &Error) -> String {
    match err {
        Error::Runtime(e) => format!("{err} ({})", e.kind().hint()),
        _ => err.to_string(),
    }
}

async fn run(cli: Cli, output: &mut Output) -> Result<()> {
    let settings = Settings::from_env()?
        .with_redis_url(cli.redis_url)
        .with_runtime(cli.runtime)
        .with_socket(cli.socket);

    match cli.command {
        Commands::Deploy {
            descriptor,
            dry_run,
        } => {
            let descriptor = WorkloadDescriptor::load(&descriptor.path)?;
            deploy(&descriptor, &settings, DeployOptions { dry_run }, output).await
        }
        Commands::Validate { descriptor } => validate(&descriptor.path, output),
        Commands::Status { name } => {
            let name = WorkloadName::new(&name)?;
            let store = RedisStateStore::connect(&settings.redis_url).await?;
            let phase = fetch_phase(&store, &name).await?;
            output.status(&name, phase);
            Ok(())
        }
    }
}

fn validate(path: &Path, output: &Output) -> Result<()> {
    let descriptor = WorkloadDescriptor::load(path)?;

    let candidates = image_candidates(&descriptor.predicate, &descriptor.priority);
    if candidates.is_empty() {
        output.progress("No image candidates");
    } else {
        output.progress("Image candidates:");
        for candidate in &candidates {
            output.progress(&format!("  {candidate}"));
        }
    }

    output.success(&format!("Descriptor {} is valid", descriptor.name));
    Ok(())
}

async fn deploy(
    descriptor: &WorkloadDescriptor,
    settings: &Settings,
    options: DeployOptions,
    output: &mut Output,
) -> Result<()> {
    output.start_timer();

    let info = detect_local(Some(&settings.runtime)).map_err(RuntimeError::from)?;
    let runtime = BollardRuntime::connect(&info).map_err(RuntimeError::from)?;
    runtime.ping().await.map_err(RuntimeError::from)?;
    output.progress(&format!(
        "Connected to {} at {}",
        runtime.runtime_type(),
        info.socket_path
    ));

    if options.dry_run {
        let store = MemoryStore::new();
        return execute(descriptor, &runtime, &store, options, output).await;
    }

    let store = RedisStateStore::connect(&settings.redis_url).await?;
    execute(descriptor, &runtime, &store, options, output).await
}

async fn execute<St: StateStore>(
    descriptor: &WorkloadDescriptor,
    runtime: &BollardRuntime,
    store: &St,
    options: DeployOptions,
    output: &Output,
) -> Result<()> {
    let orchestrator = Orchestrator::new(runtime, store, options);

    let mut state = orchestrator.register(&descriptor.name).await?;
    output.progress(&format!("Deploying {}", descriptor.name));

    let outcome = orchestrator
        .deploy(descriptor, &HostPorts::system(), &mut state)
        .await?;

    match outcome {
        DeployOutcome::DryRun(config) => {
            output.dry_run(&config);
            output.success(&format!("Dry run for {} complete", descriptor.name));
        }
        DeployOutcome::Deployed { container_id } => {
            output.success(&format!(
                "Deployed {} as container {}",
                descriptor.name, container_id
            ));
        }
    }

    Ok(())
}
