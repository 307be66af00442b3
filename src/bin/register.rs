//! Schema Register CLI
//!
//! Registers the subjects listed in register.toml against a local schema
//! registry and writes registered.csv.
//!
//! Usage:
//!   schema-register --config register.toml --output-dir build/schemas
//!   schema-register list
//!   schema-register init-config register.toml

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use schema_register::{LocalRegistry, RegisterConfig, RegisterTask, RunOutcome};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-register")]
#[command(about = "Register Avro, JSON Schema and Protobuf subjects with a schema registry")]
struct Cli {
    /// Config file (added on top of register.toml in the working directory)
    #[arg(short, long)]
    config: Option<String>,

    /// Path to the local registry (overrides [registry] path)
    #[arg(short, long)]
    registry: Option<PathBuf>,

    /// Directory subject files are relative to (overrides [register] root_dir)
    #[arg(long)]
    root_dir: Option<PathBuf>,

    /// Directory for registered.csv, relative to the root directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Stop at the first subject that fails
    #[arg(long)]
    fail_fast: bool,

    /// Only log failures
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register all configured subjects (default)
    Run,

    /// Print the configured subjects without registering them
    List,

    /// Write a config file with default settings
    InitConfig {
        /// Where to write the config
        #[arg(default_value = "register.toml")]
        path: PathBuf,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Some(Commands::InitConfig { path }) => {
            RegisterConfig::default()
                .save(path)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("✅ Wrote default config to {}", path.display());
            Ok(0)
        }
        Some(Commands::List) => {
            let config = load_config(&cli)?;
            println!("📋 {} subject(s):", config.subjects.len());
            for subject in &config.subjects {
                println!("  {}", subject);
            }
            Ok(0)
        }
        Some(Commands::Run) | None => register(load_config(&cli)?),
    }
}

/// Load config files and environment, then apply command line overrides
fn load_config(cli: &Cli) -> anyhow::Result<RegisterConfig> {
    let mut config =
        RegisterConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(registry) = &cli.registry {
        config.registry.path = registry.clone();
    }
    if let Some(root_dir) = &cli.root_dir {
        config.register.root_dir = root_dir.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        config.register.output_dir = Some(output_dir.clone());
    }
    config.register.fail_fast |= cli.fail_fast;
    config.register.quiet |= cli.quiet;
    Ok(config)
}

fn register(config: RegisterConfig) -> anyhow::Result<i32> {
    let registry_path = config.registry_path().context("resolving registry path")?;
    let root_dir = config.root_dir().context("resolving root directory")?;
    let mut registry = LocalRegistry::open(&registry_path)
        .with_context(|| format!("opening registry at {}", registry_path.display()))?;

    let total = config.subjects.len();
    let outcome = RegisterTask::new(
        &mut registry,
        root_dir,
        config.subjects,
        config.register.output_dir.as_deref(),
    )
    .fail_fast(config.register.fail_fast)
    .quiet(config.register.quiet)
    .run()?;

    let summary = outcome.summary();
    match &outcome {
        RunOutcome::Completed(_) if outcome.is_success() => {
            println!("✅ Registered {} of {} subject(s)", summary.registered.len(), total);
        }
        RunOutcome::Completed(_) => {
            println!(
                "❌ {} of {} subject(s) failed to register",
                outcome.error_count(),
                total
            );
        }
        RunOutcome::Aborted { failure, .. } => {
            println!(
                "❌ Stopped at {} after {} of {} subject(s): {}",
                failure.subject, summary.attempted, total, failure.error
            );
        }
    }

    Ok(outcome.exit_code())
}
