use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ForfettarioError;
use crate::simulation::SimulationInput;
use crate::types::*;
use crate::ForfettarioResult;

/// A numeric form field as the front-end sends it: either a JSON number or
/// the raw text of an input box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Number(serde_json::Number),
    Text(String),
}

impl From<&str> for FormValue {
    fn from(s: &str) -> Self {
        FormValue::Text(s.to_string())
    }
}

impl From<u32> for FormValue {
    fn from(n: u32) -> Self {
        FormValue::Number(n.into())
    }
}

/// Simulation request exactly as submitted by the simulator form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSimulationInput {
    pub annual_revenue: FormValue,
    pub ateco_code: String,
    pub years_in_business: FormValue,
    #[serde(default)]
    pub deductible_expenses: Option<FormValue>,
}

fn parse_decimal(field: &str, value: &FormValue) -> ForfettarioResult<Decimal> {
    let text = match value {
        FormValue::Number(n) => n.to_string(),
        FormValue::Text(s) => s.trim().to_string(),
    };
    if text.is_empty() {
        return Err(ForfettarioError::invalid(field, "A value is required"));
    }
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| ForfettarioError::invalid(field, format!("'{text}' is not a number")))
}

fn parse_years(value: &FormValue) -> ForfettarioResult<u32> {
    const FIELD: &str = "years_in_business";
    let years = parse_decimal(FIELD, value)?;
    if years < Decimal::ZERO {
        return Err(ForfettarioError::invalid(FIELD, "Years in business must not be negative"));
    }
    if !years.fract().is_zero() {
        return Err(ForfettarioError::invalid(FIELD, "Years in business must be a whole number"));
    }
    years
        .to_u32()
        .ok_or_else(|| ForfettarioError::invalid(FIELD, "Years in business is out of range"))
}

impl RawSimulationInput {
    /// Parse the text fields into a typed input. Range checks on revenue and
    /// expenses happen in the engine, so a negative revenue parses here and
    /// is rejected by `simulate`.
    pub fn parse(&self) -> ForfettarioResult<SimulationInput> {
        let annual_revenue: Money = parse_decimal("annual_revenue", &self.annual_revenue)?;
        let years_in_business = parse_years(&self.years_in_business)?;
        let deductible_expenses = match &self.deductible_expenses {
            None => None,
            // An untouched optional box arrives as an empty string
            Some(FormValue::Text(s)) if s.trim().is_empty() => None,
            Some(v) => Some(parse_decimal("deductible_expenses", v)?),
        };

        Ok(SimulationInput {
            annual_revenue,
            ateco_code: self.ateco_code.clone(),
            years_in_business,
            deductible_expenses,
        })
    }
}

impl TryFrom<RawSimulationInput> for SimulationInput {
    type Error = ForfettarioError;

    fn try_from(raw: RawSimulationInput) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_form_json_mixed_types() {
        let json = r#"{
            "annualRevenue": "45000",
            "atecoCode": "62.02.00",
            "yearsInBusiness": 2,
            "deductibleExpenses": 1200.5
        }"#;
        let raw: RawSimulationInput = serde_json::from_str(json).unwrap();
        let parsed = raw.parse().unwrap();
        assert_eq!(
            parsed,
            SimulationInput {
                annual_revenue: dec!(45000),
                ateco_code: "62.02.00".to_string(),
                years_in_business: 2,
                deductible_expenses: Some(dec!(1200.5)),
            }
        );
    }

    #[test]
    fn test_empty_expenses_treated_as_absent() {
        let raw = RawSimulationInput {
            annual_revenue: " 30000.00 ".into(),
            ateco_code: "74.10.10".into(),
            years_in_business: "5".into(),
            deductible_expenses: Some("".into()),
        };
        let parsed = raw.parse().unwrap();
        assert_eq!(parsed.annual_revenue, dec!(30000));
        assert_eq!(parsed.years_in_business, 5);
        assert_eq!(parsed.deductible_expenses, None);
    }

    #[test]
    fn test_years_must_be_whole() {
        let raw = RawSimulationInput {
            annual_revenue: "30000".into(),
            ateco_code: "74.10.10".into(),
            years_in_business: "2.5".into(),
            deductible_expenses: None,
        };
        let err = raw.parse().unwrap_err();
        assert_eq!(err.field(), Some("years_in_business"));
    }

    #[test]
    fn test_years_trailing_zero_scale_accepted() {
        let raw = RawSimulationInput {
            annual_revenue: "30000".into(),
            ateco_code: "74.10.10".into(),
            years_in_business: "3.0".into(),
            deductible_expenses: None,
        };
        assert_eq!(raw.parse().unwrap().years_in_business, 3);
    }

    #[test]
    fn test_negative_years_rejected() {
        let raw = RawSimulationInput {
            annual_revenue: "30000".into(),
            ateco_code: "74.10.10".into(),
            years_in_business: "-1".into(),
            deductible_expenses: None,
        };
        match raw.parse().unwrap_err() {
            ForfettarioError::InvalidInput { field, reason } => {
                assert_eq!(field, "years_in_business");
                assert!(reason.contains("negative"));
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_revenue_rejected() {
        let raw = RawSimulationInput {
            annual_revenue: "tanti".into(),
            ateco_code: "62.02.00".into(),
            years_in_business: 0u32.into(),
            deductible_expenses: None,
        };
        assert_eq!(raw.parse().unwrap_err().field(), Some("annual_revenue"));

        let raw = RawSimulationInput {
            annual_revenue: "".into(),
            ..raw
        };
        assert_eq!(raw.parse().unwrap_err().field(), Some("annual_revenue"));
    }

    #[test]
    fn test_scientific_number() {
        let raw: RawSimulationInput = serde_json::from_str(
            r#"{"annualRevenue": 4.5e4, "atecoCode": "62.02.00", "yearsInBusiness": "0"}"#,
        )
        .unwrap();
        assert_eq!(raw.parse().unwrap().annual_revenue, dec!(45000));
    }
}
