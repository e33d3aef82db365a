use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::coefficients::CoefficientSource;
use crate::config::SimulationOptions;
use crate::error::ForfettarioError;
use crate::simulation::{compute, BusinessMaturity, SimulationInput};
use crate::types::*;
use crate::ForfettarioResult;

const MAX_SWEEP_POINTS: usize = 10_000;

/// Single-year revenue sweep for one activity code and maturity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueSweepInput {
    pub ateco_code: String,
    pub years_in_business: u32,
    pub revenue_min: Money,
    pub revenue_max: Money,
    pub step: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueSweepRow {
    pub annual_revenue: Money,
    pub taxable_income: Money,
    pub irpef: Money,
    pub inps_contribution: Money,
    pub inps_capped: bool,
    pub total_tax: Money,
    pub net_income: Money,
    pub effective_tax_rate_percent: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueSweepOutput {
    pub ateco_code: String,
    pub maturity: BusinessMaturity,
    pub profitability_coefficient: Rate,
    pub rows: Vec<RevenueSweepRow>,
    /// Lowest swept revenue at which INPS hits the cap
    pub inps_cap_reached_at: Option<Money>,
}

fn step_error(reason: &str) -> ForfettarioError {
    ForfettarioError::invalid("step", reason)
}

/// Revenue points from min to max by step; max is always included.
fn sweep_values(input: &RevenueSweepInput) -> ForfettarioResult<Vec<Money>> {
    if input.step <= Decimal::ZERO {
        return Err(step_error("Step must be positive"));
    }
    if input.revenue_min < Decimal::ZERO {
        return Err(ForfettarioError::invalid(
            "revenue_min",
            "Revenue must not be negative",
        ));
    }
    if input.revenue_min > input.revenue_max {
        return Err(ForfettarioError::invalid(
            "revenue_min",
            "Min must be <= max",
        ));
    }
    let span = input.revenue_max - input.revenue_min;
    let points = span
        .checked_div(input.step)
        .ok_or_else(|| step_error("Sweep range is too large for this step"))?;
    if points > Decimal::from(MAX_SWEEP_POINTS) {
        return Err(step_error(&format!(
            "Sweep would produce more than {MAX_SWEEP_POINTS} points"
        )));
    }
    let n = points
        .floor()
        .to_usize()
        .ok_or_else(|| step_error("Invalid number of sweep points"))?;

    let mut values: Vec<Money> = Vec::with_capacity(n + 2);
    for i in 0..=n {
        let value = input
            .step
            .checked_mul(Decimal::from(i))
            .and_then(|offset| input.revenue_min.checked_add(offset))
            .ok_or_else(|| step_error("Sweep point overflows the decimal range"))?;
        if value > input.revenue_max {
            break;
        }
        // Steps below the precision available at this magnitude round away
        if let Some(&previous) = values.last() {
            if value <= previous {
                return Err(step_error(
                    "Step is too small for the precision available at this revenue",
                ));
            }
        }
        values.push(value);
    }
    if let Some(&last) = values.last() {
        if last < input.revenue_max {
            values.push(input.revenue_max);
        }
    }
    Ok(values)
}

pub fn revenue_sweep(
    input: &RevenueSweepInput,
    table: &impl CoefficientSource,
    options: &SimulationOptions,
) -> ForfettarioResult<ComputationOutput<RevenueSweepOutput>> {
    let start = Instant::now();
    options.validate()?;
    let mut warnings: Vec<String> = Vec::new();

    let values = sweep_values(input)?;
    let mut rows = Vec::with_capacity(values.len());
    let mut coefficient = Decimal::ZERO;
    let mut maturity = BusinessMaturity::classify(input.years_in_business, &options.parameters);
    let mut over_ceiling = false;

    for revenue in values {
        let sim_input = SimulationInput {
            annual_revenue: revenue,
            ateco_code: input.ateco_code.clone(),
            years_in_business: input.years_in_business,
            deductible_expenses: None,
        };
        let (r, point_warnings) = compute(&sim_input, table, options)?;
        coefficient = r.profitability_coefficient;
        maturity = r.maturity;
        over_ceiling |= r.exceeds_revenue_ceiling;
        // The fallback warning repeats for every point; keep it once
        for w in point_warnings {
            if w.contains("fallback coefficient") && !warnings.contains(&w) {
                warnings.push(w);
            }
        }
        rows.push(RevenueSweepRow {
            annual_revenue: r.annual_revenue,
            taxable_income: r.taxable_income,
            irpef: r.irpef,
            inps_contribution: r.inps_contribution,
            inps_capped: r.inps_capped,
            total_tax: r.total_tax,
            net_income: r.net_income,
            effective_tax_rate_percent: r.effective_tax_rate_percent,
        });
    }

    if over_ceiling {
        warnings.push(format!(
            "Part of the sweep exceeds the regime ceiling of {}.",
            options.parameters.revenue_ceiling
        ));
    }

    let inps_cap_reached_at = rows.iter().find(|r| r.inps_capped).map(|r| r.annual_revenue);

    let output = RevenueSweepOutput {
        ateco_code: input.ateco_code.clone(),
        maturity,
        profitability_coefficient: coefficient,
        rows,
        inps_cap_reached_at,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Regime forfettario single-year revenue sweep",
        &serde_json::json!({
            "ateco_code": input.ateco_code,
            "years_in_business": input.years_in_business,
            "revenue_min": input.revenue_min.to_string(),
            "revenue_max": input.revenue_max.to_string(),
            "step": input.step.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
