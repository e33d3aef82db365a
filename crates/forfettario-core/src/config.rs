use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ForfettarioError;
use crate::types::*;
use crate::ForfettarioResult;

// ---------------------------------------------------------------------------
// Regime parameters
// ---------------------------------------------------------------------------

/// Statutory constants of the regime forfettario.
///
/// `Default` carries the values in force; a caller may load a different set
/// from a parameters file to explore rule changes, but every simulation path
/// reads rates only through this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeParameters {
    /// Substitute-tax rate during the start-up years
    pub new_business_irpef_rate: Rate,
    /// Substitute-tax rate once the start-up years are over
    pub standard_irpef_rate: Rate,
    /// Years in business strictly below this count as a new business
    pub new_business_years: u32,
    /// INPS rate for the professional sectors (gestione separata)
    pub professional_inps_rate: Rate,
    /// INPS rate for every other sector
    pub standard_inps_rate: Rate,
    /// Two-digit ATECO sector prefixes billed at the professional INPS rate
    pub professional_sectors: Vec<String>,
    /// Ceiling on the annual INPS contribution
    pub inps_cap: Money,
    /// Revenue above which the regime can no longer be accessed
    pub revenue_ceiling: Money,
}

impl Default for RegimeParameters {
    fn default() -> Self {
        RegimeParameters {
            new_business_irpef_rate: dec!(0.05),
            standard_irpef_rate: dec!(0.15),
            new_business_years: 5,
            professional_inps_rate: dec!(0.2535),
            standard_inps_rate: dec!(0.26),
            professional_sectors: vec!["62".to_string(), "74".to_string()],
            inps_cap: dec!(4800),
            revenue_ceiling: dec!(85000),
        }
    }
}

impl RegimeParameters {
    pub fn validate(&self) -> ForfettarioResult<()> {
        let rates = [
            ("new_business_irpef_rate", self.new_business_irpef_rate),
            ("standard_irpef_rate", self.standard_irpef_rate),
            ("professional_inps_rate", self.professional_inps_rate),
            ("standard_inps_rate", self.standard_inps_rate),
        ];
        for (field, rate) in rates {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(ForfettarioError::invalid(
                    field,
                    format!("rate must be between 0 and 1, got {rate}"),
                ));
            }
        }
        if self.inps_cap < Decimal::ZERO {
            return Err(ForfettarioError::invalid(
                "inps_cap",
                "cap must not be negative",
            ));
        }
        if self.revenue_ceiling <= Decimal::ZERO {
            return Err(ForfettarioError::invalid(
                "revenue_ceiling",
                "ceiling must be positive",
            ));
        }
        if self.professional_sectors.iter().any(|s| s.chars().count() != 2) {
            return Err(ForfettarioError::invalid(
                "professional_sectors",
                "sector prefixes must be exactly two characters",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unknown code policy
// ---------------------------------------------------------------------------

/// What the engine does when an ATECO code is missing from the table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum UnknownCodePolicy {
    /// Fail with `UnknownActivityCode`.
    #[default]
    Reject,
    /// Substitute a fixed coefficient and record a warning.
    Fallback { coefficient: Rate },
}

impl UnknownCodePolicy {
    /// The legacy behaviour of the web simulator: default to 0.78.
    pub fn legacy_fallback() -> Self {
        UnknownCodePolicy::Fallback {
            coefficient: dec!(0.78),
        }
    }
}

/// Everything besides the input and the table that shapes a simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    pub parameters: RegimeParameters,
    pub unknown_code_policy: UnknownCodePolicy,
}

impl SimulationOptions {
    pub fn validate(&self) -> ForfettarioResult<()> {
        self.parameters.validate()?;
        if let UnknownCodePolicy::Fallback { coefficient } = self.unknown_code_policy {
            if coefficient <= Decimal::ZERO || coefficient > Decimal::ONE {
                return Err(ForfettarioError::invalid(
                    "fallback_coefficient",
                    format!("coefficient must be in (0, 1], got {coefficient}"),
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Document parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Picks the format from the file extension; anything that is not
    /// `.yaml`/`.yml` is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Json,
        }
    }
}

/// Deserialise a catalog or parameters document already read into memory.
pub fn parse_document<T: DeserializeOwned>(
    contents: &str,
    format: DocumentFormat,
) -> ForfettarioResult<T> {
    let value = match format {
        DocumentFormat::Json => serde_json::from_str(contents)?,
        DocumentFormat::Yaml => serde_yaml::from_str(contents)?,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_parameters_are_statutory() {
        let p = RegimeParameters::default();
        assert_eq!(p.new_business_irpef_rate, dec!(0.05));
        assert_eq!(p.standard_irpef_rate, dec!(0.15));
        assert_eq!(p.new_business_years, 5);
        assert_eq!(p.professional_inps_rate, dec!(0.2535));
        assert_eq!(p.standard_inps_rate, dec!(0.26));
        assert_eq!(p.inps_cap, dec!(4800));
        assert_eq!(p.revenue_ceiling, dec!(85000));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_rate_out_of_range_rejected() {
        let p = RegimeParameters {
            standard_irpef_rate: dec!(1.5),
            ..Default::default()
        };
        match p.validate().unwrap_err() {
            ForfettarioError::InvalidInput { field, .. } => {
                assert_eq!(field, "standard_irpef_rate");
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_sector_prefix_must_be_two_characters() {
        for bad in ["6", "620", ""] {
            let p = RegimeParameters {
                professional_sectors: vec![bad.to_string()],
                ..Default::default()
            };
            let err = p.validate().unwrap_err();
            assert_eq!(err.field(), Some("professional_sectors"), "prefix {bad:?}");
        }
    }

    #[test]
    fn test_fallback_coefficient_validated() {
        let opts = SimulationOptions {
            unknown_code_policy: UnknownCodePolicy::Fallback {
                coefficient: dec!(0),
            },
            ..Default::default()
        };
        assert!(opts.validate().is_err());

        let opts = SimulationOptions {
            unknown_code_policy: UnknownCodePolicy::legacy_fallback(),
            ..Default::default()
        };
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_partial_parameters_document_keeps_defaults() {
        let yaml = "inps_cap: \"5000\"\nrevenue_ceiling: \"100000\"\n";
        let p: RegimeParameters = parse_document(yaml, DocumentFormat::Yaml).unwrap();
        assert_eq!(p.inps_cap, dec!(5000));
        assert_eq!(p.revenue_ceiling, dec!(100000));
        assert_eq!(p.standard_irpef_rate, dec!(0.15));
        assert_eq!(p.professional_sectors, vec!["62", "74"]);
    }

    #[test]
    fn test_policy_document_shape() {
        let json = r#"{"unknown_code_policy": {"policy": "fallback", "coefficient": "0.78"}}"#;
        let opts: SimulationOptions = parse_document(json, DocumentFormat::Json).unwrap();
        assert_eq!(opts.unknown_code_policy, UnknownCodePolicy::legacy_fallback());
        assert_eq!(opts.parameters, RegimeParameters::default());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("catalog.yml")),
            DocumentFormat::Yaml
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("catalog.YAML")),
            DocumentFormat::Yaml
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("catalog.json")),
            DocumentFormat::Json
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("catalog")),
            DocumentFormat::Json
        );
    }
}
