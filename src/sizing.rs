//! Bill-to-system-size calculator.
//!
//! Converts a monthly electricity bill into a recommended rooftop system
//! size, an installed-cost range, expected savings and a payback period.
//! Everything here is pure: no configuration, storage or network access.

use serde::{Deserialize, Serialize};

/// Tariff assumption, currency units per kWh.
pub const COST_PER_UNIT: f64 = 28.0;
pub const DAYS_PER_MONTH: f64 = 30.0;
/// Average daily peak-sun hours.
pub const PEAK_SUN_HOURS: f64 = 4.5;
pub const MIN_SYSTEM_KW: f64 = 1.0;
/// Installed cost per kW, lower bound.
pub const COST_PER_KW_MIN: f64 = 130_000.0;
/// Installed cost per kW, upper bound.
pub const COST_PER_KW_MAX: f64 = 160_000.0;
/// Share of the bill a system is expected to offset.
pub const SAVINGS_RATIO: f64 = 0.9;

/// Calculator input, already coerced from form data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SizingInput {
    pub monthly_bill: f64,
    /// Appliance labels in submission order. Not checked against any catalogue.
    pub appliances: Vec<String>,
}

/// Derived recommendation. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    pub monthly_bill: f64,
    pub appliances: Vec<String>,
    /// Always >= 1.0 and a multiple of 0.5.
    pub recommended_kw: f64,
    pub cost_min: i64,
    pub cost_max: i64,
    pub monthly_savings: i64,
    pub yearly_savings: i64,
    /// Zero when there are no savings to pay the system back.
    pub payback_years: f64,
}

/// Parses a user-supplied bill amount.
///
/// Anything that is not a finite, non-negative number becomes `0.0`.
pub fn parse_monthly_bill(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value,
        _ => 0.0,
    }
}

/// Runs the sizing formula. Never fails.
///
/// Rounding is half-up (`f64::round` rounds half away from zero and the
/// inputs are non-negative), both for the 0.5 kW step and for the one-decimal
/// payback period.
pub fn calculate(input: &SizingInput) -> SizingResult {
    let monthly_bill = if input.monthly_bill.is_finite() && input.monthly_bill > 0.0 {
        input.monthly_bill
    } else {
        0.0
    };

    let monthly_units = monthly_bill / COST_PER_UNIT;
    let daily_units = monthly_units / DAYS_PER_MONTH;
    let required_kw = daily_units / PEAK_SUN_HOURS;

    let recommended_kw = ((required_kw * 2.0).round() / 2.0).max(MIN_SYSTEM_KW);

    let cost_min = (recommended_kw * COST_PER_KW_MIN) as i64;
    let cost_max = (recommended_kw * COST_PER_KW_MAX) as i64;

    let monthly_savings = (monthly_bill * SAVINGS_RATIO) as i64;
    let yearly_savings = monthly_savings.saturating_mul(12);

    let avg_cost = (cost_min as f64 + cost_max as f64) / 2.0;
    let payback_years = if monthly_savings > 0 {
        round_to_tenth(avg_cost / monthly_savings as f64 / 12.0)
    } else {
        0.0
    };

    SizingResult {
        monthly_bill,
        appliances: input.appliances.clone(),
        recommended_kw,
        cost_min,
        cost_max,
        monthly_savings,
        yearly_savings,
        payback_years,
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl SizingResult {
    /// Human-readable summary stored as the message of a report lead.
    ///
    /// Appliances are listed exactly as submitted: same order, duplicates kept.
    pub fn summary(&self) -> String {
        let appliances = if self.appliances.is_empty() {
            "none selected".to_string()
        } else {
            self.appliances.join(", ")
        };

        format!(
            "Monthly bill: {}\n\
             Recommended system: {:.1} kW\n\
             Estimated cost: {} - {}\n\
             Monthly savings: {} (yearly {})\n\
             Payback period: {:.1} years\n\
             Appliances: {}",
            self.monthly_bill,
            self.recommended_kw,
            self.cost_min,
            self.cost_max,
            self.monthly_savings,
            self.yearly_savings,
            self.payback_years,
            appliances
        )
    }
}
