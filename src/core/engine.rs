use super::error::SimulationError;
use super::types::{MonthlyRecord, Scenario, ScenarioResult, ScenarioRun, SimulationInput, SummaryRow};

/// Absolute offset applied to the base annual rate for the pessimistic and
/// optimistic variants: three percentage points, additive, regardless of the
/// base rate's magnitude.
pub const SCENARIO_RATE_OFFSET: f64 = 0.03;

impl Scenario {
    fn rate_offset(self) -> f64 {
        match self {
            Scenario::Pessimistic => -SCENARIO_RATE_OFFSET,
            Scenario::Base => 0.0,
            Scenario::Optimistic => SCENARIO_RATE_OFFSET,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn validate(input: &SimulationInput) -> Result<(), SimulationError> {
    if input.horizon_years < 1 {
        return Err(SimulationError::InvalidHorizon(input.horizon_years));
    }
    if !input.annual_rate.is_finite() || input.annual_rate <= -1.0 {
        return Err(SimulationError::InvalidRate(input.annual_rate));
    }
    if !input.target.is_finite() || input.target <= 0.0 {
        return Err(SimulationError::InvalidTarget(input.target));
    }
    Ok(())
}

/// Projects the accumulated value month by month over the full horizon.
///
/// The annual rate is converted to the equivalent effective monthly rate
/// with `(1 + annual)^(1/12) - 1`, so true annual compounding is preserved
/// for any horizon. Contributions are applied at the end of each month,
/// after growth; a contribution made in month `m` first earns growth in
/// month `m + 1`. Emitted values are rounded to two decimals, while the
/// running recurrence keeps full precision.
pub fn project(input: &SimulationInput) -> Result<Vec<MonthlyRecord>, SimulationError> {
    validate(input)?;

    let monthly_rate = (1.0 + input.annual_rate).powf(1.0 / 12.0) - 1.0;
    let total_months = input.horizon_years * 12;

    let mut records = Vec::with_capacity(total_months as usize);
    let mut value = input.initial_amount;
    for month in 1..=total_months {
        value = value * (1.0 + monthly_rate) + input.monthly_contribution;
        records.push(MonthlyRecord {
            month_index: month,
            year_index: month.div_ceil(12),
            accumulated_value: round2(value),
            target_progress_percent: round2(value / input.target * 100.0),
        });
    }
    Ok(records)
}

/// Runs the three scenario variants and merges them into one dataset.
///
/// Rates are derived additively from the base rate (base - 0.03, base,
/// base + 0.03). Results always come back in the fixed order Pessimistic,
/// Base, Optimistic, with one summary row per scenario taken from its last
/// record. If any variant fails validation the whole run fails; a partial
/// three-way comparison is never surfaced.
pub fn run_scenarios(input: &SimulationInput) -> Result<ScenarioRun, SimulationError> {
    let mut scenarios = Vec::with_capacity(Scenario::ALL.len());
    let mut summary = Vec::with_capacity(Scenario::ALL.len());

    for scenario in Scenario::ALL {
        let scenario_input = SimulationInput {
            annual_rate: input.annual_rate + scenario.rate_offset(),
            ..input.clone()
        };
        let records = project(&scenario_input)?;

        // project never returns an empty sequence: horizon_years >= 1 is
        // enforced before simulation.
        let last = records[records.len() - 1];
        summary.push(SummaryRow {
            scenario,
            final_value: last.accumulated_value,
            final_progress_percent: last.target_progress_percent,
        });
        scenarios.push(ScenarioResult {
            scenario,
            annual_rate: scenario_input.annual_rate,
            records,
        });
    }

    Ok(ScenarioRun { scenarios, summary })
}
