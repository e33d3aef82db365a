use clap::Args;
use serde_json::Value;

use forfettario_core::presets;

use super::Engine;

/// Arguments for scenario presets
#[derive(Args)]
pub struct PresetArgs {
    /// Preset to simulate (e.g. "Junior Freelancer"); lists presets when omitted
    pub name: Option<String>,

    /// Simulate every preset
    #[arg(long, conflicts_with = "name")]
    pub all: bool,
}

pub fn run_presets(args: PresetArgs, engine: &Engine) -> Result<Value, Box<dyn std::error::Error>> {
    if args.all {
        let result = presets::apply_all(&engine.table, &engine.options)?;
        return Ok(serde_json::to_value(result)?);
    }
    match args.name {
        Some(name) => {
            let result = presets::apply_named(&name, &engine.table, &engine.options)?;
            Ok(serde_json::to_value(result)?)
        }
        None => Ok(serde_json::to_value(presets::all())?),
    }
}
