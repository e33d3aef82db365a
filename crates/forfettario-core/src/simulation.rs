use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::coefficients::CoefficientSource;
use crate::config::{RegimeParameters, SimulationOptions, UnknownCodePolicy};
use crate::error::ForfettarioError;
use crate::types::*;
use crate::ForfettarioResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    pub annual_revenue: Money,
    pub ateco_code: String,
    pub years_in_business: u32,
    /// Accepted and echoed back, never subtracted from the taxable base.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deductible_expenses: Option<Money>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessMaturity {
    /// Inside the start-up window, taxed at the discounted rate
    NewBusiness,
    Established,
}

impl BusinessMaturity {
    pub fn classify(years_in_business: u32, params: &RegimeParameters) -> Self {
        if years_in_business < params.new_business_years {
            BusinessMaturity::NewBusiness
        } else {
            BusinessMaturity::Established
        }
    }

    /// The maturity the counterfactual is computed under.
    pub fn other(self) -> Self {
        match self {
            BusinessMaturity::NewBusiness => BusinessMaturity::Established,
            BusinessMaturity::Established => BusinessMaturity::NewBusiness,
        }
    }
}

/// The same taxable income taxed at the other IRPEF rate. INPS is unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterfactualScenario {
    pub maturity: BusinessMaturity,
    pub irpef_rate: Rate,
    pub alternative_irpef: Money,
    pub alternative_total_tax: Money,
    pub alternative_net_income: Money,
    /// `alternative_total_tax - total_tax`
    pub savings_from_current_regime: Money,
    /// Only true when the business actually enjoys the discounted rate, i.e.
    /// the savings figure is a real saving rather than a hypothetical one.
    pub savings_realised: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub annual_revenue: Money,
    pub ateco_code: String,
    pub years_in_business: u32,
    pub deductible_expenses: Money,
    pub profitability_coefficient: Rate,
    /// The code was missing and the fallback coefficient was used
    pub coefficient_defaulted: bool,
    pub taxable_income: Money,
    pub maturity: BusinessMaturity,
    pub is_new_business: bool,
    pub new_business_years_remaining: u32,
    pub irpef_rate: Rate,
    pub irpef: Money,
    pub inps_rate: Rate,
    /// Contribution before the cap is applied
    pub inps_uncapped: Money,
    pub inps_contribution: Money,
    pub inps_capped: bool,
    pub total_tax: Money,
    pub net_income: Money,
    pub effective_tax_rate_percent: Percent,
    pub exceeds_revenue_ceiling: bool,
    pub counterfactual: CounterfactualScenario,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaturityComparison {
    pub new_business: SimulationResult,
    pub established: SimulationResult,
    /// Extra IRPEF once the discounted window closes
    pub irpef_increase: Money,
    pub net_income_reduction: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSimulationOutput {
    pub results: Vec<SimulationResult>,
    pub total_revenue: Money,
    pub total_tax: Money,
    pub total_net_income: Money,
}

// ---------------------------------------------------------------------------
// Rate decision functions
// ---------------------------------------------------------------------------

/// IRPEF substitute-tax rate for a maturity class.
pub fn irpef_rate_for(maturity: BusinessMaturity, params: &RegimeParameters) -> Rate {
    match maturity {
        BusinessMaturity::NewBusiness => params.new_business_irpef_rate,
        BusinessMaturity::Established => params.standard_irpef_rate,
    }
}

/// INPS rate selected by the first two characters of the code.
pub fn inps_rate_for(ateco_code: &str, params: &RegimeParameters) -> Rate {
    let professional = match ateco_code.get(..2) {
        Some(sector) => params.professional_sectors.iter().any(|s| s == sector),
        None => false,
    };
    if professional {
        params.professional_inps_rate
    } else {
        params.standard_inps_rate
    }
}

// ---------------------------------------------------------------------------
// Validation and lookup
// ---------------------------------------------------------------------------

fn validate_input(input: &SimulationInput) -> ForfettarioResult<()> {
    if input.annual_revenue < Decimal::ZERO {
        return Err(ForfettarioError::invalid(
            "annual_revenue",
            "Annual revenue must not be negative",
        ));
    }
    if input.ateco_code.trim().is_empty() {
        return Err(ForfettarioError::invalid(
            "ateco_code",
            "ATECO code is required",
        ));
    }
    if let Some(expenses) = input.deductible_expenses {
        if expenses < Decimal::ZERO {
            return Err(ForfettarioError::invalid(
                "deductible_expenses",
                "Deductible expenses must not be negative",
            ));
        }
    }
    Ok(())
}

/// Returns the coefficient and whether it was defaulted.
fn resolve_coefficient(
    code: &str,
    table: &impl CoefficientSource,
    policy: &UnknownCodePolicy,
    warnings: &mut Vec<String>,
) -> ForfettarioResult<(Rate, bool)> {
    if let Some(coefficient) = table.lookup(code) {
        return Ok((coefficient, false));
    }
    match policy {
        UnknownCodePolicy::Reject => Err(ForfettarioError::UnknownActivityCode {
            code: code.to_string(),
        }),
        UnknownCodePolicy::Fallback { coefficient } => {
            tracing::warn!(code, %coefficient, "ATECO code not in catalog, using fallback coefficient");
            warnings.push(format!(
                "ATECO code {code} is not in the catalog; fallback coefficient {coefficient} applied. \
                 Tax figures may be misstated."
            ));
            Ok((*coefficient, true))
        }
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// The pure computation behind every public entry point. Returns the result
/// and any non-fatal warnings.
pub(crate) fn compute(
    input: &SimulationInput,
    table: &impl CoefficientSource,
    options: &SimulationOptions,
) -> ForfettarioResult<(SimulationResult, Vec<String>)> {
    let params = &options.parameters;
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let (coefficient, coefficient_defaulted) = resolve_coefficient(
        &input.ateco_code,
        table,
        &options.unknown_code_policy,
        &mut warnings,
    )?;

    let revenue = input.annual_revenue;
    let taxable_income = revenue * coefficient;

    // Classified once; both branches below read it.
    let maturity = BusinessMaturity::classify(input.years_in_business, params);
    let is_new_business = maturity == BusinessMaturity::NewBusiness;

    let irpef_rate = irpef_rate_for(maturity, params);
    let irpef = taxable_income * irpef_rate;

    let inps_rate = inps_rate_for(&input.ateco_code, params);
    let inps_uncapped = revenue * inps_rate;
    let inps_capped = inps_uncapped > params.inps_cap;
    let inps_contribution = inps_uncapped.min(params.inps_cap);

    let total_tax = irpef + inps_contribution;
    let net_income = revenue - total_tax;
    let effective_tax_rate_percent = if revenue.is_zero() {
        Decimal::ZERO
    } else {
        total_tax / revenue * dec!(100)
    };

    tracing::debug!(
        code = %input.ateco_code,
        %coefficient,
        ?maturity,
        %irpef_rate,
        %inps_rate,
        %total_tax,
        "simulation computed"
    );

    // Counterfactual: other IRPEF rate, same taxable base, same INPS
    let alternative_maturity = maturity.other();
    let alternative_rate = irpef_rate_for(alternative_maturity, params);
    let alternative_irpef = taxable_income * alternative_rate;
    let alternative_total_tax = alternative_irpef + inps_contribution;
    let counterfactual = CounterfactualScenario {
        maturity: alternative_maturity,
        irpef_rate: alternative_rate,
        alternative_irpef,
        alternative_total_tax,
        alternative_net_income: revenue - alternative_total_tax,
        savings_from_current_regime: alternative_total_tax - total_tax,
        savings_realised: is_new_business,
    };

    let new_business_years_remaining = params
        .new_business_years
        .saturating_sub(input.years_in_business);

    let exceeds_revenue_ceiling = revenue > params.revenue_ceiling;
    if exceeds_revenue_ceiling {
        warnings.push(format!(
            "Annual revenue {} exceeds the regime forfettario ceiling of {}; \
             the flat-rate regime would not be available.",
            revenue, params.revenue_ceiling
        ));
    }

    let deductible_expenses = input.deductible_expenses.unwrap_or(Decimal::ZERO);
    if !deductible_expenses.is_zero() {
        warnings.push(
            "Deductible expenses are not applied: under the regime forfettario the taxable \
             base is derived from revenue and the profitability coefficient only."
                .to_string(),
        );
    }

    if inps_capped {
        warnings.push(format!(
            "INPS contribution capped at {} (uncapped {}).",
            params.inps_cap, inps_uncapped
        ));
    }

    let result = SimulationResult {
        annual_revenue: revenue,
        ateco_code: input.ateco_code.clone(),
        years_in_business: input.years_in_business,
        deductible_expenses,
        profitability_coefficient: coefficient,
        coefficient_defaulted,
        taxable_income,
        maturity,
        is_new_business,
        new_business_years_remaining,
        irpef_rate,
        irpef,
        inps_rate,
        inps_uncapped,
        inps_contribution,
        inps_capped,
        total_tax,
        net_income,
        effective_tax_rate_percent,
        exceeds_revenue_ceiling,
        counterfactual,
    };

    Ok((result, warnings))
}

fn assumptions_for(input: &SimulationInput, options: &SimulationOptions) -> serde_json::Value {
    serde_json::json!({
        "annual_revenue": input.annual_revenue.to_string(),
        "ateco_code": input.ateco_code,
        "years_in_business": input.years_in_business,
        "parameters": options.parameters,
        "unknown_code_policy": options.unknown_code_policy,
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Simulate one year under the regime forfettario with statutory parameters.
///
/// Unknown ATECO codes fail with `UnknownActivityCode`.
pub fn simulate(
    input: &SimulationInput,
    table: &impl CoefficientSource,
) -> ForfettarioResult<ComputationOutput<SimulationResult>> {
    simulate_with(input, table, &SimulationOptions::default())
}

/// Simulate with explicit regime parameters and unknown-code policy.
pub fn simulate_with(
    input: &SimulationInput,
    table: &impl CoefficientSource,
    options: &SimulationOptions,
) -> ForfettarioResult<ComputationOutput<SimulationResult>> {
    let start = Instant::now();
    options.validate()?;

    let (result, warnings) = compute(input, table, options)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Regime forfettario: coefficient-derived taxable income, flat IRPEF by business \
         maturity, sector INPS rate with annual cap",
        &assumptions_for(input, options),
        warnings,
        elapsed,
        result,
    ))
}

/// Run the same input as a new business and as an established one.
pub fn compare_maturity(
    input: &SimulationInput,
    table: &impl CoefficientSource,
    options: &SimulationOptions,
) -> ForfettarioResult<ComputationOutput<MaturityComparison>> {
    let start = Instant::now();
    options.validate()?;
    let mut warnings: Vec<String> = Vec::new();

    let new_input = SimulationInput {
        years_in_business: 0,
        ..input.clone()
    };
    let established_input = SimulationInput {
        years_in_business: options.parameters.new_business_years,
        ..input.clone()
    };

    let (new_business, new_warnings) = compute(&new_input, table, options)?;
    let (established, established_warnings) = compute(&established_input, table, options)?;
    for w in new_warnings.into_iter().chain(established_warnings) {
        if !warnings.contains(&w) {
            warnings.push(w);
        }
    }

    let comparison = MaturityComparison {
        irpef_increase: established.irpef - new_business.irpef,
        net_income_reduction: new_business.net_income - established.net_income,
        new_business,
        established,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Regime forfettario: new-business versus established IRPEF comparison",
        &assumptions_for(input, options),
        warnings,
        elapsed,
        comparison,
    ))
}

/// Simulate several inputs against one table. The first failing input aborts
/// the batch.
pub fn simulate_batch(
    inputs: &[SimulationInput],
    table: &impl CoefficientSource,
    options: &SimulationOptions,
) -> ForfettarioResult<ComputationOutput<BatchSimulationOutput>> {
    let start = Instant::now();
    options.validate()?;
    let mut warnings: Vec<String> = Vec::new();

    if inputs.is_empty() {
        return Err(ForfettarioError::invalid(
            "inputs",
            "Batch must contain at least one input",
        ));
    }

    let mut results = Vec::with_capacity(inputs.len());
    let mut total_revenue = Decimal::ZERO;
    let mut total_tax = Decimal::ZERO;
    let mut total_net_income = Decimal::ZERO;

    for (i, input) in inputs.iter().enumerate() {
        let (result, input_warnings) = compute(input, table, options)?;
        for w in input_warnings {
            warnings.push(format!("Input {}: {}", i + 1, w));
        }
        total_revenue += result.annual_revenue;
        total_tax += result.total_tax;
        total_net_income += result.net_income;
        results.push(result);
    }

    let output = BatchSimulationOutput {
        results,
        total_revenue,
        total_tax,
        total_net_income,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Regime forfettario batch simulation",
        &serde_json::json!({
            "num_inputs": inputs.len(),
            "parameters": options.parameters,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::CoefficientTable;
    use rust_decimal_macros::dec;

    fn input(revenue: Money, code: &str, years: u32) -> SimulationInput {
        SimulationInput {
            annual_revenue: revenue,
            ateco_code: code.to_string(),
            years_in_business: years,
            deductible_expenses: None,
        }
    }

    fn run(i: &SimulationInput) -> SimulationResult {
        simulate(i, CoefficientTable::builtin()).unwrap().result
    }

    #[test]
    fn test_it_consultant_new_business() {
        let r = run(&input(dec!(45000), "62.02.00", 2));

        assert_eq!(r.profitability_coefficient, dec!(0.78));
        assert_eq!(r.taxable_income, dec!(35100));
        assert_eq!(r.irpef_rate, dec!(0.05));
        assert_eq!(r.irpef, dec!(1755));
        assert_eq!(r.inps_rate, dec!(0.2535));
        assert_eq!(r.inps_uncapped, dec!(11407.5));
        assert_eq!(r.inps_contribution, dec!(4800));
        assert!(r.inps_capped);
        assert_eq!(r.total_tax, dec!(6555));
        assert_eq!(r.net_income, dec!(38445));
        assert!(r.is_new_business);
        assert_eq!(r.new_business_years_remaining, 3);
    }

    #[test]
    fn test_it_consultant_established() {
        let r = run(&input(dec!(45000), "62.02.00", 6));

        assert_eq!(r.irpef_rate, dec!(0.15));
        assert_eq!(r.irpef, dec!(5265));
        assert_eq!(r.total_tax, dec!(10065));
        assert_eq!(r.net_income, dec!(34935));
        assert_eq!(r.new_business_years_remaining, 0);

        // Counterfactual at 5% reproduces the new-business IRPEF
        assert_eq!(r.counterfactual.maturity, BusinessMaturity::NewBusiness);
        assert_eq!(r.counterfactual.irpef_rate, dec!(0.05));
        assert_eq!(r.counterfactual.alternative_irpef, dec!(1755));
        assert_eq!(r.counterfactual.alternative_total_tax, dec!(6555));
        assert_eq!(r.counterfactual.savings_from_current_regime, dec!(-3510));
        assert!(!r.counterfactual.savings_realised);
    }

    #[test]
    fn test_software_at_ceiling() {
        let out = simulate(&input(dec!(85000), "62.01.00", 0), CoefficientTable::builtin()).unwrap();
        let r = &out.result;

        assert_eq!(r.profitability_coefficient, dec!(0.67));
        assert_eq!(r.taxable_income, dec!(56950));
        assert_eq!(r.irpef, dec!(2847.5));
        assert_eq!(r.inps_contribution, dec!(4800));
        assert_eq!(r.total_tax, dec!(7647.5));
        // Exactly at the ceiling is still inside the regime
        assert!(!r.exceeds_revenue_ceiling);
        assert!(!out.warnings.iter().any(|w| w.contains("ceiling")));
    }

    #[test]
    fn test_unknown_code_rejected() {
        let result = simulate(&input(dec!(45000), "99.99.99", 2), CoefficientTable::builtin());
        match result.unwrap_err() {
            ForfettarioError::UnknownActivityCode { code } => assert_eq!(code, "99.99.99"),
            other => panic!("Expected UnknownActivityCode, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_code_legacy_fallback() {
        let options = SimulationOptions {
            unknown_code_policy: UnknownCodePolicy::legacy_fallback(),
            ..Default::default()
        };
        let out = simulate_with(
            &input(dec!(45000), "99.99.99", 2),
            CoefficientTable::builtin(),
            &options,
        )
        .unwrap();

        assert!(out.result.coefficient_defaulted);
        assert_eq!(out.result.profitability_coefficient, dec!(0.78));
        assert_eq!(out.result.taxable_income, dec!(35100));
        assert!(out.warnings.iter().any(|w| w.contains("fallback coefficient")));
    }

    #[test]
    fn test_irpef_boundary() {
        assert_eq!(run(&input(dec!(30000), "62.02.00", 4)).irpef_rate, dec!(0.05));
        assert_eq!(run(&input(dec!(30000), "62.02.00", 5)).irpef_rate, dec!(0.15));
    }

    #[test]
    fn test_inps_sector_rule() {
        let params = RegimeParameters::default();
        assert_eq!(inps_rate_for("62.02.00", &params), dec!(0.2535));
        assert_eq!(inps_rate_for("74.10.10", &params), dec!(0.2535));
        assert_eq!(inps_rate_for("41.00.00", &params), dec!(0.26));
        assert_eq!(inps_rate_for("73.11.00", &params), dec!(0.26));
    }

    #[test]
    fn test_inps_below_cap() {
        let r = run(&input(dec!(10000), "73.11.00", 1));
        assert_eq!(r.inps_rate, dec!(0.26));
        assert_eq!(r.inps_contribution, dec!(2600));
        assert!(!r.inps_capped);
    }

    #[test]
    fn test_zero_revenue() {
        let r = run(&input(dec!(0), "62.02.00", 0));
        assert_eq!(r.effective_tax_rate_percent, dec!(0));
        assert_eq!(r.total_tax, dec!(0));
        assert_eq!(r.net_income, dec!(0));
    }

    #[test]
    fn test_effective_rate() {
        // 10000 revenue, 0.75 coefficient: irpef 375, inps 2600, total 2975
        let r = run(&input(dec!(10000), "73.11.00", 0));
        assert_eq!(r.total_tax, dec!(2975));
        assert_eq!(r.effective_tax_rate_percent, dec!(29.75));
    }

    #[test]
    fn test_negative_revenue_rejected() {
        let err = simulate(&input(dec!(-1), "62.02.00", 0), CoefficientTable::builtin())
            .unwrap_err();
        assert_eq!(err.field(), Some("annual_revenue"));
    }

    #[test]
    fn test_empty_code_rejected() {
        let err = simulate(&input(dec!(1000), "  ", 0), CoefficientTable::builtin()).unwrap_err();
        assert_eq!(err.field(), Some("ateco_code"));
        assert!(matches!(err, ForfettarioError::InvalidInput { .. }));
    }

    #[test]
    fn test_negative_expenses_rejected() {
        let mut i = input(dec!(1000), "62.02.00", 0);
        i.deductible_expenses = Some(dec!(-5));
        let err = simulate(&i, CoefficientTable::builtin()).unwrap_err();
        assert_eq!(err.field(), Some("deductible_expenses"));
    }

    #[test]
    fn test_expenses_do_not_change_tax() {
        let base = run(&input(dec!(40000), "62.02.00", 1));
        let mut with_expenses = input(dec!(40000), "62.02.00", 1);
        with_expenses.deductible_expenses = Some(dec!(8000));
        let out = simulate(&with_expenses, CoefficientTable::builtin()).unwrap();

        assert_eq!(out.result.taxable_income, base.taxable_income);
        assert_eq!(out.result.total_tax, base.total_tax);
        assert_eq!(out.result.deductible_expenses, dec!(8000));
        assert!(out.warnings.iter().any(|w| w.contains("not applied")));
    }

    #[test]
    fn test_revenue_ceiling_warning() {
        let out = simulate(&input(dec!(90000), "62.02.00", 0), CoefficientTable::builtin()).unwrap();
        assert!(out.result.exceeds_revenue_ceiling);
        assert!(out.warnings.iter().any(|w| w.contains("ceiling")));
    }

    #[test]
    fn test_custom_parameters() {
        let options = SimulationOptions {
            parameters: RegimeParameters {
                inps_cap: dec!(20000),
                ..Default::default()
            },
            ..Default::default()
        };
        let out = simulate_with(
            &input(dec!(45000), "62.02.00", 2),
            CoefficientTable::builtin(),
            &options,
        )
        .unwrap();
        assert_eq!(out.result.inps_contribution, dec!(11407.5));
        assert!(!out.result.inps_capped);
    }

    #[test]
    fn test_compare_maturity() {
        let out = compare_maturity(
            &input(dec!(45000), "62.02.00", 3),
            CoefficientTable::builtin(),
            &SimulationOptions::default(),
        )
        .unwrap();
        let c = &out.result;
        assert_eq!(c.new_business.irpef, dec!(1755));
        assert_eq!(c.established.irpef, dec!(5265));
        assert_eq!(c.irpef_increase, dec!(3510));
        assert_eq!(c.net_income_reduction, dec!(3510));
    }

    #[test]
    fn test_compare_maturity_merges_warnings_once() {
        let options = SimulationOptions {
            unknown_code_policy: UnknownCodePolicy::legacy_fallback(),
            ..Default::default()
        };
        let out = compare_maturity(
            &input(dec!(90000), "99.99.99", 3),
            CoefficientTable::builtin(),
            &options,
        )
        .unwrap();
        let count = |needle: &str| out.warnings.iter().filter(|w| w.contains(needle)).count();
        assert_eq!(count("fallback coefficient"), 1);
        assert_eq!(count("ceiling"), 1);
        assert!(out.result.established.coefficient_defaulted);
    }

    #[test]
    fn test_inps_sector_is_first_two_characters() {
        let params = RegimeParameters::default();
        assert_eq!(inps_rate_for("62.02.00", &params), dec!(0.2535));
        assert_eq!(inps_rate_for("74.10.10", &params), dec!(0.2535));
        assert_eq!(inps_rate_for("6", &params), dec!(0.26));
        assert_eq!(inps_rate_for("", &params), dec!(0.26));

        // A prefix longer than the sector never matches
        let params = RegimeParameters {
            professional_sectors: vec!["620".to_string()],
            ..Default::default()
        };
        assert_eq!(inps_rate_for("62.02.00", &params), dec!(0.26));
    }

    #[test]
    fn test_one_character_sector_rejected() {
        let options = SimulationOptions {
            parameters: RegimeParameters {
                professional_sectors: vec!["6".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        let err = simulate_with(&input(dec!(45000), "62.02.00", 2), CoefficientTable::builtin(), &options)
            .unwrap_err();
        assert_eq!(err.field(), Some("professional_sectors"));
    }

    #[test]
    fn test_batch_totals() {
        let inputs = vec![
            input(dec!(45000), "62.02.00", 2),
            input(dec!(10000), "73.11.00", 0),
        ];
        let out = simulate_batch(&inputs, CoefficientTable::builtin(), &SimulationOptions::default())
            .unwrap();
        let b = &out.result;
        assert_eq!(b.results.len(), 2);
        assert_eq!(b.total_revenue, dec!(55000));
        assert_eq!(b.total_tax, dec!(9530));
        assert_eq!(b.total_net_income, dec!(45470));
        assert!(out.warnings.iter().any(|w| w.starts_with("Input 1:")));
    }

    #[test]
    fn test_batch_propagates_first_error() {
        let inputs = vec![
            input(dec!(45000), "62.02.00", 2),
            input(dec!(10000), "00.00.00", 0),
        ];
        let result = simulate_batch(&inputs, CoefficientTable::builtin(), &SimulationOptions::default());
        assert!(matches!(
            result,
            Err(ForfettarioError::UnknownActivityCode { .. })
        ));
    }

    #[test]
    fn test_metadata_populated() {
        let out = simulate(&input(dec!(45000), "62.02.00", 2), CoefficientTable::builtin()).unwrap();
        assert!(!out.methodology.is_empty());
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
        assert_eq!(out.assumptions["ateco_code"], "62.02.00");
    }
}
