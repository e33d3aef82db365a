use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use forfettario_core::sensitivity::{self, RevenueSweepInput};

use super::Engine;
use crate::input;

/// Arguments for a revenue sweep
#[derive(Args)]
pub struct SweepArgs {
    /// ATECO activity code
    #[arg(long)]
    pub ateco: Option<String>,

    /// Years the business has been active
    #[arg(long, default_value = "0")]
    pub years: u32,

    /// Lowest revenue in the sweep
    #[arg(long)]
    pub min: Option<Decimal>,

    /// Highest revenue in the sweep
    #[arg(long)]
    pub max: Option<Decimal>,

    /// Revenue increment between rows
    #[arg(long, default_value = "5000")]
    pub step: Decimal,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_sweep(args: SweepArgs, engine: &Engine) -> Result<Value, Box<dyn std::error::Error>> {
    let sweep_input: RevenueSweepInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        RevenueSweepInput {
            ateco_code: args.ateco.ok_or("--ateco is required (or provide --input)")?,
            years_in_business: args.years,
            revenue_min: args.min.unwrap_or(Decimal::ZERO),
            revenue_max: args
                .max
                .unwrap_or(engine.options.parameters.revenue_ceiling),
            step: args.step,
        }
    };

    let result = sensitivity::revenue_sweep(&sweep_input, &engine.table, &engine.options)?;
    Ok(serde_json::to_value(result)?)
}
