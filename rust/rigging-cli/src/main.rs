//! rigging: bindings for Rust service interfaces
//!
//! Run with: `rigging <command> [--config rigging.yaml] [--output src]`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rigging_cli::{Config, Error, Report, generate, scaffold};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "rigging", version, about = "Bindings for Rust service interfaces")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Service description
    #[arg(long, global = true, default_value = "rigging.yaml")]
    config: PathBuf,

    /// Directory that holds the service module
    #[arg(long, global = true, default_value = "src")]
    output: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the bindings of every unit
    Generate,
    /// Create missing service and unit files; existing files are left alone
    Scaffold,
    /// Scaffold, then generate
    Run,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rigging_codegen=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// `Ok(false)` when a unit or method was skipped.
fn run(cli: &Cli) -> Result<bool, Error> {
    let config = Config::load(&cli.config)?;
    match cli.command {
        Command::Scaffold => {
            scaffold(&config, &cli.output)?;
            Ok(true)
        }
        Command::Generate => Ok(summarize(&generate(&config, &cli.output)?)),
        Command::Run => {
            scaffold(&config, &cli.output)?;
            Ok(summarize(&generate(&config, &cli.output)?))
        }
    }
}

fn summarize(report: &Report) -> bool {
    let failed_units = report.units.iter().filter(|u| u.outcome.is_err()).count();
    let failed_methods: usize = report.units.iter().map(|u| u.method_failures().len()).sum();
    tracing::info!(
        units = report.units.len(),
        failed_units,
        failed_methods,
        written = report.written().count(),
        "generation finished"
    );
    report.is_clean()
}
