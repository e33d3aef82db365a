use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use crate::config::{parse_document, DocumentFormat};
use crate::error::ForfettarioError;
use crate::types::*;
use crate::ForfettarioResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One row of the ATECO catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtecoEntry {
    /// Activity code in `NN.NN.NN` form, matched exactly
    pub code: String,
    #[serde(default)]
    pub description: String,
    /// Profitability coefficient, a fraction in (0, 1]
    pub coefficient: Rate,
}

/// Anything that can resolve an ATECO code to its profitability coefficient.
///
/// The engine only ever asks this question, so a caller backed by a larger
/// catalog (database, remote service cache) can implement it directly.
pub trait CoefficientSource {
    fn lookup(&self, code: &str) -> Option<Rate>;
}

/// Immutable code -> coefficient table.
#[derive(Debug, Clone, Default)]
pub struct CoefficientTable {
    entries: Vec<AtecoEntry>,
    index: HashMap<String, usize>,
}

// ---------------------------------------------------------------------------
// Built-in catalog
// ---------------------------------------------------------------------------

fn builtin_entries() -> Vec<AtecoEntry> {
    let rows = [
        ("62.01.00", "Produzione di software", dec!(0.67)),
        ("62.02.00", "Consulenza informatica", dec!(0.78)),
        ("73.11.00", "Agenzie di pubblicità", dec!(0.75)),
        ("74.10.10", "Attività di design", dec!(0.78)),
        ("69.20.10", "Consulenza contabile", dec!(0.78)),
        ("82.99.99", "Altri servizi di supporto", dec!(0.86)),
    ];
    rows.into_iter()
        .map(|(code, description, coefficient)| AtecoEntry {
            code: code.to_string(),
            description: description.to_string(),
            coefficient,
        })
        .collect()
}

fn validate_entries(entries: &[AtecoEntry]) -> ForfettarioResult<()> {
    let mut seen = HashSet::new();
    for entry in entries {
        if entry.code.trim().is_empty() {
            return Err(ForfettarioError::CatalogError(
                "Catalog entry with empty code".to_string(),
            ));
        }
        if entry.coefficient <= Decimal::ZERO || entry.coefficient > Decimal::ONE {
            return Err(ForfettarioError::CatalogError(format!(
                "Coefficient for {} must be in (0, 1], got {}",
                entry.code, entry.coefficient
            )));
        }
        if !seen.insert(entry.code.as_str()) {
            return Err(ForfettarioError::CatalogError(format!(
                "Duplicate catalog code {}",
                entry.code
            )));
        }
    }
    Ok(())
}

static BUILTIN: OnceLock<CoefficientTable> = OnceLock::new();

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

impl CoefficientTable {
    /// Build a table from catalog rows, rejecting duplicates and coefficients
    /// outside (0, 1].
    pub fn from_entries(entries: Vec<AtecoEntry>) -> ForfettarioResult<Self> {
        if entries.is_empty() {
            return Err(ForfettarioError::CatalogError(
                "Catalog must contain at least one entry".to_string(),
            ));
        }

        validate_entries(&entries)?;
        Ok(Self::indexed(entries))
    }

    /// The codes offered by the web simulator. Built once per process.
    pub fn builtin() -> &'static CoefficientTable {
        BUILTIN.get_or_init(|| Self::indexed(builtin_entries()))
    }

    /// Parse a catalog document: a list of `{code, description, coefficient}`.
    pub fn parse(contents: &str, format: DocumentFormat) -> ForfettarioResult<Self> {
        let entries: Vec<AtecoEntry> = parse_document(contents, format)?;
        Self::from_entries(entries)
    }

    pub fn get(&self, code: &str) -> Option<&AtecoEntry> {
        self.index.get(code).map(|&i| &self.entries[i])
    }

    /// Rows in catalog order.
    pub fn entries(&self) -> &[AtecoEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn indexed(entries: Vec<AtecoEntry>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.code.clone(), i))
            .collect();
        CoefficientTable { entries, index }
    }
}

impl CoefficientSource for CoefficientTable {
    fn lookup(&self, code: &str) -> Option<Rate> {
        self.get(code).map(|e| e.coefficient)
    }
}

impl CoefficientSource for HashMap<String, Rate> {
    fn lookup(&self, code: &str) -> Option<Rate> {
        self.get(code).copied()
    }
}

impl<T: CoefficientSource + ?Sized> CoefficientSource for &T {
    fn lookup(&self, code: &str) -> Option<Rate> {
        (**self).lookup(code)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(code: &str, coefficient: Rate) -> AtecoEntry {
        AtecoEntry {
            code: code.to_string(),
            description: String::new(),
            coefficient,
        }
    }

    #[test]
    fn test_builtin_lookup() {
        let table = CoefficientTable::builtin();
        assert_eq!(table.len(), 6);
        assert_eq!(table.lookup("62.01.00"), Some(dec!(0.67)));
        assert_eq!(table.lookup("62.02.00"), Some(dec!(0.78)));
        assert_eq!(table.lookup("82.99.99"), Some(dec!(0.86)));
        assert_eq!(table.get("73.11.00").unwrap().description, "Agenzie di pubblicità");
    }

    #[test]
    fn test_lookup_is_exact() {
        let table = CoefficientTable::builtin();
        assert_eq!(table.lookup("99.99.99"), None);
        assert_eq!(table.lookup("62.01"), None);
        assert_eq!(table.lookup(" 62.01.00"), None);
        assert_eq!(table.lookup("620100"), None);
    }

    #[test]
    fn test_builtin_preserves_order() {
        let codes: Vec<&str> = CoefficientTable::builtin()
            .entries()
            .iter()
            .map(|e| e.code.as_str())
            .collect();
        assert_eq!(
            codes,
            vec!["62.01.00", "62.02.00", "73.11.00", "74.10.10", "69.20.10", "82.99.99"]
        );
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let result = CoefficientTable::from_entries(vec![
            entry("10.00.00", dec!(0.40)),
            entry("10.00.00", dec!(0.50)),
        ]);
        assert!(matches!(result, Err(ForfettarioError::CatalogError(_))));
    }

    #[test]
    fn test_coefficient_bounds() {
        assert!(CoefficientTable::from_entries(vec![entry("10.00.00", dec!(0))]).is_err());
        assert!(CoefficientTable::from_entries(vec![entry("10.00.00", dec!(1.01))]).is_err());
        assert!(CoefficientTable::from_entries(vec![entry("10.00.00", dec!(1))]).is_ok());
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(CoefficientTable::from_entries(vec![]).is_err());
    }

    #[test]
    fn test_parse_yaml_catalog() {
        let yaml = r#"
- code: "41.00.00"
  description: Costruzione di edifici
  coefficient: "0.86"
- code: "47.91.10"
  coefficient: "0.40"
"#;
        let table = CoefficientTable::parse(yaml, DocumentFormat::Yaml).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("41.00.00"), Some(dec!(0.86)));
        assert_eq!(table.get("47.91.10").unwrap().description, "");
    }

    #[test]
    fn test_parse_json_catalog() {
        let json = r#"[{"code": "62.01.00", "description": "Software", "coefficient": "0.67"}]"#;
        let table = CoefficientTable::parse(json, DocumentFormat::Json).unwrap();
        assert_eq!(table.lookup("62.01.00"), Some(dec!(0.67)));
    }

    #[test]
    fn test_hashmap_source() {
        let mut map = HashMap::new();
        map.insert("62.02.00".to_string(), dec!(0.78));
        assert_eq!(map.lookup("62.02.00"), Some(dec!(0.78)));
        assert_eq!(map.lookup("62.01.00"), None);
    }
}
