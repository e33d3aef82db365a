use clap::Args;
use serde_json::Value;

use forfettario_core::format::render_summary;
use forfettario_core::input::{FormValue, RawSimulationInput};
use forfettario_core::simulation::{self, SimulationInput};

use super::Engine;
use crate::input;

/// Arguments for a single-year simulation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SimulateArgs {
    /// Annual revenue in euro (e.g. 45000)
    #[arg(long)]
    pub revenue: Option<String>,

    /// ATECO activity code (e.g. 62.02.00)
    #[arg(long)]
    pub ateco: Option<String>,

    /// Years the business has been active
    #[arg(long, default_value = "0")]
    pub years: String,

    /// Deductible expenses (recorded, not applied)
    #[arg(long)]
    pub expenses: Option<String>,

    /// Path to JSON form input (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for a batch of simulations
#[derive(Args)]
pub struct BatchArgs {
    /// Path to a JSON array of form inputs
    #[arg(long)]
    pub input: Option<String>,
}

/// Builds the typed input through the same parser the web form uses, so
/// flag errors name the offending field.
fn build_input(args: SimulateArgs) -> Result<SimulationInput, Box<dyn std::error::Error>> {
    let raw: RawSimulationInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        RawSimulationInput {
            annual_revenue: FormValue::Text(
                args.revenue
                    .ok_or("--revenue is required (or provide --input)")?,
            ),
            ateco_code: args
                .ateco
                .ok_or("--ateco is required (or provide --input)")?,
            years_in_business: FormValue::Text(args.years),
            deductible_expenses: args.expenses.map(FormValue::Text),
        }
    };
    Ok(raw.parse()?)
}

pub fn run_simulate(args: SimulateArgs, engine: &Engine) -> Result<Value, Box<dyn std::error::Error>> {
    let sim_input = build_input(args)?;
    let result = simulation::simulate_with(&sim_input, &engine.table, &engine.options)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_summary(args: SimulateArgs, engine: &Engine) -> Result<String, Box<dyn std::error::Error>> {
    let sim_input = build_input(args)?;
    let output = simulation::simulate_with(&sim_input, &engine.table, &engine.options)?;
    let mut text = render_summary(&output.result);
    for w in &output.warnings {
        text.push_str(&format!("! {}\n", w));
    }
    Ok(text)
}

pub fn run_compare(args: SimulateArgs, engine: &Engine) -> Result<Value, Box<dyn std::error::Error>> {
    let sim_input = build_input(args)?;
    let result = simulation::compare_maturity(&sim_input, &engine.table, &engine.options)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_batch(args: BatchArgs, engine: &Engine) -> Result<Value, Box<dyn std::error::Error>> {
    let raw: Vec<RawSimulationInput> = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> or stdin required for batch".into());
    };

    let inputs = raw
        .iter()
        .map(RawSimulationInput::parse)
        .collect::<Result<Vec<_>, _>>()?;
    let result = simulation::simulate_batch(&inputs, &engine.table, &engine.options)?;
    Ok(serde_json::to_value(result)?)
}
