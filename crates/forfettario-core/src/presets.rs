use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Instant;

use crate::coefficients::CoefficientSource;
use crate::config::SimulationOptions;
use crate::error::ForfettarioError;
use crate::simulation::{compute, SimulationInput, SimulationResult};
use crate::types::*;
use crate::ForfettarioResult;

/// A named example profile used to pre-fill the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPreset {
    pub name: String,
    pub description: String,
    pub annual_revenue: Money,
    pub ateco_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresetRun {
    pub preset: ScenarioPreset,
    pub result: SimulationResult,
}

static PRESETS: OnceLock<Vec<ScenarioPreset>> = OnceLock::new();

fn preset(name: &str, description: &str, annual_revenue: Money, ateco_code: &str) -> ScenarioPreset {
    ScenarioPreset {
        name: name.to_string(),
        description: description.to_string(),
        annual_revenue,
        ateco_code: ateco_code.to_string(),
    }
}

/// The preset list, in display order.
pub fn all() -> &'static [ScenarioPreset] {
    PRESETS.get_or_init(|| {
        vec![
            preset(
                "Junior Freelancer",
                "First-year IT consultant with a handful of clients",
                dec!(25000),
                "62.02.00",
            ),
            preset(
                "Software Developer",
                "Independent developer selling custom software",
                dec!(45000),
                "62.01.00",
            ),
            preset(
                "Graphic Designer",
                "Freelance designer working for agencies",
                dec!(30000),
                "74.10.10",
            ),
            preset(
                "Marketing Consultant",
                "Small advertising practice",
                dec!(60000),
                "73.11.00",
            ),
            preset(
                "Bookkeeper",
                "Accounting services for small businesses",
                dec!(38000),
                "69.20.10",
            ),
            preset(
                "Senior Consultant",
                "Experienced IT consultant billing right at the revenue ceiling",
                dec!(85000),
                "62.02.00",
            ),
        ]
    })
}

/// Case-insensitive lookup by name.
pub fn find(name: &str) -> Option<&'static ScenarioPreset> {
    all().iter().find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

impl ScenarioPreset {
    /// Presets carry no history: they always simulate a brand new business
    /// with no declared expenses.
    pub fn to_input(&self) -> SimulationInput {
        SimulationInput {
            annual_revenue: self.annual_revenue,
            ateco_code: self.ateco_code.clone(),
            years_in_business: 0,
            deductible_expenses: Some(Decimal::ZERO),
        }
    }
}

/// Simulate a single preset.
pub fn apply_preset(
    preset: &ScenarioPreset,
    table: &impl CoefficientSource,
    options: &SimulationOptions,
) -> ForfettarioResult<ComputationOutput<PresetRun>> {
    let start = Instant::now();
    options.validate()?;

    let (result, warnings) = compute(&preset.to_input(), table, options)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Regime forfettario simulation of a named preset (new business, no expenses)",
        &serde_json::json!({
            "preset": preset.name,
            "annual_revenue": preset.annual_revenue.to_string(),
            "ateco_code": preset.ateco_code,
        }),
        warnings,
        elapsed,
        PresetRun {
            preset: preset.clone(),
            result,
        },
    ))
}

/// Look a preset up by name and simulate it.
pub fn apply_named(
    name: &str,
    table: &impl CoefficientSource,
    options: &SimulationOptions,
) -> ForfettarioResult<ComputationOutput<PresetRun>> {
    let preset = find(name).ok_or_else(|| ForfettarioError::InvalidInput {
        field: "preset".to_string(),
        reason: format!("No preset named '{name}'"),
    })?;
    apply_preset(preset, table, options)
}

/// Simulate every preset in order.
pub fn apply_all(
    table: &impl CoefficientSource,
    options: &SimulationOptions,
) -> ForfettarioResult<ComputationOutput<Vec<PresetRun>>> {
    let start = Instant::now();
    options.validate()?;
    let mut warnings: Vec<String> = Vec::new();
    let mut runs = Vec::with_capacity(all().len());

    for p in all() {
        let (result, preset_warnings) = compute(&p.to_input(), table, options)?;
        for w in preset_warnings {
            warnings.push(format!("{}: {}", p.name, w));
        }
        runs.push(PresetRun {
            preset: p.clone(),
            result,
        });
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Regime forfettario simulation of every preset",
        &serde_json::json!({ "num_presets": runs.len() }),
        warnings,
        elapsed,
        runs,
    ))
}
