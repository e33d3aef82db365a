use napi::Result as NapiResult;
use napi_derive::napi;

use forfettario_core::coefficients::CoefficientTable;
use forfettario_core::config::SimulationOptions;
use forfettario_core::input::RawSimulationInput;
use forfettario_core::ForfettarioError;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Engine errors keep their field so the form can highlight the right input.
/// The reason is a JSON object `{field, message}`.
fn engine_error(e: ForfettarioError) -> napi::Error {
    let payload = serde_json::json!({
        "field": e.field(),
        "message": e.to_string(),
    });
    napi::Error::from_reason(payload.to_string())
}

fn parse_options(options_json: Option<String>) -> NapiResult<SimulationOptions> {
    match options_json {
        Some(json) => {
            let options: SimulationOptions = serde_json::from_str(&json).map_err(to_napi_error)?;
            options.validate().map_err(engine_error)?;
            Ok(options)
        }
        None => Ok(SimulationOptions::default()),
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Simulate from the web form payload (`annualRevenue`, `atecoCode`,
/// `yearsInBusiness`, `deductibleExpenses`).
#[napi]
pub fn simulate_taxes(input_json: String, options_json: Option<String>) -> NapiResult<String> {
    let raw: RawSimulationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let input = raw.parse().map_err(engine_error)?;
    let options = parse_options(options_json)?;
    let output = forfettario_core::simulation::simulate_with(&input, CoefficientTable::builtin(), &options)
        .map_err(engine_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compare_maturity(input_json: String, options_json: Option<String>) -> NapiResult<String> {
    let raw: RawSimulationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let input = raw.parse().map_err(engine_error)?;
    let options = parse_options(options_json)?;
    let output =
        forfettario_core::simulation::compare_maturity(&input, CoefficientTable::builtin(), &options)
            .map_err(engine_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Plain-text export of a simulation, run with the same options as
/// `simulate_taxes`.
#[napi]
pub fn simulation_summary(input_json: String, options_json: Option<String>) -> NapiResult<String> {
    let raw: RawSimulationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let input = raw.parse().map_err(engine_error)?;
    let options = parse_options(options_json)?;
    let output = forfettario_core::simulation::simulate_with(&input, CoefficientTable::builtin(), &options)
        .map_err(engine_error)?;
    Ok(forfettario_core::format::render_summary(&output.result))
}

#[napi]
pub fn revenue_sweep(input_json: String, options_json: Option<String>) -> NapiResult<String> {
    let input: forfettario_core::sensitivity::RevenueSweepInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let options = parse_options(options_json)?;
    let output = forfettario_core::sensitivity::revenue_sweep(
        &input,
        CoefficientTable::builtin(),
        &options,
    )
    .map_err(engine_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

#[napi]
pub fn list_ateco_codes() -> NapiResult<String> {
    serde_json::to_string(CoefficientTable::builtin().entries()).map_err(to_napi_error)
}

#[napi]
pub fn list_presets() -> NapiResult<String> {
    serde_json::to_string(forfettario_core::presets::all()).map_err(to_napi_error)
}

#[napi]
pub fn run_preset(name: String, options_json: Option<String>) -> NapiResult<String> {
    let options = parse_options(options_json)?;
    let output = forfettario_core::presets::apply_named(
        &name,
        CoefficientTable::builtin(),
        &options,
    )
    .map_err(engine_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
