pub mod catalog;
pub mod presets;
pub mod simulate;
pub mod sweep;

use forfettario_core::coefficients::CoefficientTable;
use forfettario_core::config::{parse_document, RegimeParameters, SimulationOptions, UnknownCodePolicy};
use rust_decimal::Decimal;

use crate::input;

/// The coefficient table and options every command runs against, built once
/// from the global flags.
pub struct Engine {
    pub table: CoefficientTable,
    pub options: SimulationOptions,
}

impl Engine {
    pub fn load(
        catalog: Option<&str>,
        parameters: Option<&str>,
        fallback_coefficient: Option<Decimal>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let table = match catalog {
            Some(path) => {
                let (text, format) = input::file::read_document(path)?;
                let table = CoefficientTable::parse(&text, format)?;
                tracing::info!(path, entries = table.len(), "loaded ATECO catalog");
                table
            }
            None => CoefficientTable::builtin().clone(),
        };

        let parameters: RegimeParameters = match parameters {
            Some(path) => {
                let (text, format) = input::file::read_document(path)?;
                tracing::info!(path, "loaded regime parameters");
                parse_document(&text, format)?
            }
            None => RegimeParameters::default(),
        };

        let unknown_code_policy = match fallback_coefficient {
            Some(coefficient) => UnknownCodePolicy::Fallback { coefficient },
            None => UnknownCodePolicy::Reject,
        };

        let options = SimulationOptions {
            parameters,
            unknown_code_policy,
        };
        options.validate()?;

        Ok(Engine { table, options })
    }
}
