mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rust_decimal::Decimal;
use std::process;

use commands::catalog::CatalogArgs;
use commands::presets::PresetArgs;
use commands::simulate::{BatchArgs, SimulateArgs};
use commands::sweep::SweepArgs;
use commands::Engine;

/// Regime forfettario tax simulations
#[derive(Parser)]
#[command(
    name = "forfettario",
    version,
    about = "Regime forfettario tax simulations",
    long_about = "Simulates IRPEF substitute tax and INPS contributions for Italian sole \
                  proprietors under the regime forfettario, with decimal precision. \
                  Supports single simulations, maturity comparisons, batches, named \
                  presets and revenue sweeps."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// ATECO catalog file (JSON or YAML) replacing the built-in table
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// Regime parameters file (JSON or YAML)
    #[arg(long, global = true)]
    parameters: Option<String>,

    /// Coefficient to use for codes missing from the catalog (default: reject)
    #[arg(long, global = true)]
    fallback_coefficient: Option<Decimal>,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one year of taxes
    Simulate(SimulateArgs),
    /// Print a plain-text summary of a simulation
    Summary(SimulateArgs),
    /// Compare new-business and established taxation for the same input
    Compare(SimulateArgs),
    /// Simulate a JSON array of inputs
    Batch(BatchArgs),
    /// List or run the scenario presets
    Presets(PresetArgs),
    /// Sweep annual revenue for one activity code
    Sweep(SweepArgs),
    /// Show the ATECO coefficient table
    Catalog(CatalogArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("{}: {}", "error".red().bold(), e);
    process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Version => {
            println!("forfettario {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        other => other,
    };

    let engine = Engine::load(
        cli.catalog.as_deref(),
        cli.parameters.as_deref(),
        cli.fallback_coefficient,
    )
    .unwrap_or_else(|e| fail(e));

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match command {
        Commands::Simulate(args) => commands::simulate::run_simulate(args, &engine),
        Commands::Summary(args) => match commands::simulate::run_summary(args, &engine) {
            Ok(text) => {
                print!("{}", text);
                process::exit(0);
            }
            Err(e) => fail(e),
        },
        Commands::Compare(args) => commands::simulate::run_compare(args, &engine),
        Commands::Batch(args) => commands::simulate::run_batch(args, &engine),
        Commands::Presets(args) => commands::presets::run_presets(args, &engine),
        Commands::Sweep(args) => commands::sweep::run_sweep(args, &engine),
        Commands::Catalog(args) => commands::catalog::run_catalog(args, &engine),
        Commands::Version => return,
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            fail(e)
        }
    }
}
