pub mod coefficients;
pub mod config;
pub mod error;
pub mod format;
pub mod input;
pub mod simulation;
pub mod types;

#[cfg(feature = "presets")]
pub mod presets;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

pub use coefficients::{AtecoEntry, CoefficientSource, CoefficientTable};
pub use config::{RegimeParameters, SimulationOptions, UnknownCodePolicy};
pub use error::ForfettarioError;
pub use simulation::{simulate, simulate_with, SimulationInput, SimulationResult};
pub use types::*;

/// Standard result type for all forfettario operations
pub type ForfettarioResult<T> = Result<T, ForfettarioError>;
