use clap::Args;
use serde_json::Value;

use forfettario_core::ForfettarioError;

use super::Engine;

/// Arguments for inspecting the coefficient table
#[derive(Args)]
pub struct CatalogArgs {
    /// Look up a single ATECO code instead of listing the table
    #[arg(long)]
    pub code: Option<String>,
}

pub fn run_catalog(args: CatalogArgs, engine: &Engine) -> Result<Value, Box<dyn std::error::Error>> {
    match args.code {
        Some(code) => {
            let entry = engine
                .table
                .get(&code)
                .ok_or(ForfettarioError::UnknownActivityCode { code: code.clone() })?;
            Ok(serde_json::to_value(entry)?)
        }
        None => Ok(serde_json::to_value(engine.table.entries())?),
    }
}
