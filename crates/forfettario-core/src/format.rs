//! Presentation helpers.
//!
//! The engine keeps full precision; these functions apply the Italian
//! convention of rounding half up to the cent only when a figure is shown
//! or exported.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::simulation::{BusinessMaturity, SimulationResult};
use crate::types::*;

/// Round half up (away from zero) to two decimal places.
pub fn round_presentation(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// `€ 38.445,00`, Italian grouping and decimal comma.
pub fn format_eur(value: Money) -> String {
    let mut rounded = round_presentation(value);
    rounded.rescale(2);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("€ {sign}{},{frac_part}", group_thousands(int_part))
}

/// Format a fraction (0.2535) as a percentage (`25,35%`).
pub fn format_rate(rate: Rate) -> String {
    format_percent(rate * dec!(100))
}

/// Format a value already in percent (14.57) as `14,57%`, dropping
/// trailing zeros.
pub fn format_percent(percent: Percent) -> String {
    let text = round_presentation(percent).normalize().to_string();
    format!("{}%", text.replace('.', ","))
}

/// A result with every money figure rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub annual_revenue: Money,
    pub ateco_code: String,
    pub profitability_coefficient: Rate,
    pub taxable_income: Money,
    pub irpef_rate_percent: Percent,
    pub irpef: Money,
    pub inps_rate_percent: Percent,
    pub inps_contribution: Money,
    pub total_tax: Money,
    pub net_income: Money,
    pub effective_tax_rate_percent: Percent,
    pub alternative_irpef: Money,
    pub alternative_total_tax: Money,
    pub alternative_net_income: Money,
    pub savings_from_current_regime: Money,
}

impl From<&SimulationResult> for SimulationSummary {
    fn from(r: &SimulationResult) -> Self {
        let cf = &r.counterfactual;
        SimulationSummary {
            annual_revenue: round_presentation(r.annual_revenue),
            ateco_code: r.ateco_code.clone(),
            profitability_coefficient: r.profitability_coefficient,
            taxable_income: round_presentation(r.taxable_income),
            irpef_rate_percent: round_presentation(r.irpef_rate * dec!(100)),
            irpef: round_presentation(r.irpef),
            inps_rate_percent: round_presentation(r.inps_rate * dec!(100)),
            inps_contribution: round_presentation(r.inps_contribution),
            total_tax: round_presentation(r.total_tax),
            net_income: round_presentation(r.net_income),
            effective_tax_rate_percent: round_presentation(r.effective_tax_rate_percent),
            alternative_irpef: round_presentation(cf.alternative_irpef),
            alternative_total_tax: round_presentation(cf.alternative_total_tax),
            alternative_net_income: round_presentation(cf.alternative_net_income),
            savings_from_current_regime: round_presentation(cf.savings_from_current_regime),
        }
    }
}

fn line(label: &str, value: String) -> String {
    format!("{:<25}{}", label, value)
}

/// Plain-text block for export (clipboard, PDF body, email).
pub fn render_summary(r: &SimulationResult) -> String {
    let cf = &r.counterfactual;
    let mut lines = vec![
        "Simulazione regime forfettario".to_string(),
        line("Codice ATECO:", r.ateco_code.clone()),
        line("Coefficiente:", r.profitability_coefficient.to_string()),
        line("Fatturato annuo:", format_eur(r.annual_revenue)),
        line("Reddito imponibile:", format_eur(r.taxable_income)),
        line(&format!("IRPEF ({}):", format_rate(r.irpef_rate)), format_eur(r.irpef)),
        line(
            &format!("INPS ({}):", format_rate(r.inps_rate)),
            format_eur(r.inps_contribution),
        ),
        line("Totale imposte:", format_eur(r.total_tax)),
        line("Netto finale:", format_eur(r.net_income)),
        line(
            "Pressione fiscale:",
            format_percent(r.effective_tax_rate_percent),
        ),
    ];

    let label = match cf.maturity {
        BusinessMaturity::NewBusiness => "aliquota agevolata",
        BusinessMaturity::Established => "aliquota ordinaria",
    };
    lines.push(format!(
        "Con {} ({}): totale {}, netto {}",
        label,
        format_rate(cf.irpef_rate),
        format_eur(cf.alternative_total_tax),
        format_eur(cf.alternative_net_income)
    ));
    if r.is_new_business {
        lines.push(line(
            "Risparmio neo-attività:",
            format!(
                "{} ({} anni rimanenti)",
                format_eur(cf.savings_from_current_regime),
                r.new_business_years_remaining
            ),
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
