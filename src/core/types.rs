use serde::Serialize;

/// The three rate variants compared side by side. `ALL` fixes the
/// presentation and concatenation order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Scenario {
    Pessimistic,
    Base,
    Optimistic,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Pessimistic, Scenario::Base, Scenario::Optimistic];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Pessimistic => "Pessimistic",
            Scenario::Base => "Base",
            Scenario::Optimistic => "Optimistic",
        }
    }
}

/// Parameters for one projection run. Immutable once built; scenario
/// variants are derived by cloning with a different `annual_rate`.
#[derive(Debug, Clone)]
pub struct SimulationInput {
    pub initial_amount: f64,
    pub monthly_contribution: f64,
    /// Annual growth rate as a fraction (0.10 = 10% per year).
    pub annual_rate: f64,
    pub horizon_years: u32,
    pub target: f64,
}

/// One elapsed month of a projection. Values are rounded to two decimals
/// at emission; downstream consumers never re-round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRecord {
    pub month_index: u32,
    pub year_index: u32,
    pub accumulated_value: f64,
    pub target_progress_percent: f64,
}

/// A monthly record tagged with its owning scenario, as it appears in the
/// combined dataset consumed by the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedRecord {
    pub scenario: Scenario,
    pub month_index: u32,
    pub year_index: u32,
    pub accumulated_value: f64,
    pub target_progress_percent: f64,
}

impl CombinedRecord {
    pub fn tagged(scenario: Scenario, record: MonthlyRecord) -> Self {
        Self {
            scenario,
            month_index: record.month_index,
            year_index: record.year_index,
            accumulated_value: record.accumulated_value,
            target_progress_percent: record.target_progress_percent,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub scenario: Scenario,
    /// The derived rate actually simulated (base plus the scenario offset).
    pub annual_rate: f64,
    pub records: Vec<MonthlyRecord>,
}

/// Derived from the last record of a scenario, never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    pub scenario: Scenario,
    pub final_value: f64,
    pub final_progress_percent: f64,
}

/// Full output of one scenario run, rebuilt from scratch on every call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRun {
    pub scenarios: Vec<ScenarioResult>,
    pub summary: Vec<SummaryRow>,
}

impl ScenarioRun {
    /// Concatenation of all scenarios' records in the fixed order
    /// Pessimistic, Base, Optimistic.
    pub fn combined_records(&self) -> Vec<CombinedRecord> {
        self.scenarios
            .iter()
            .flat_map(|result| {
                result
                    .records
                    .iter()
                    .map(|record| CombinedRecord::tagged(result.scenario, *record))
            })
            .collect()
    }

    /// Final target progress of the Base scenario, feeding the progress bar.
    pub fn base_final_progress_percent(&self) -> f64 {
        self.summary
            .iter()
            .find(|row| row.scenario == Scenario::Base)
            .map(|row| row.final_progress_percent)
            .unwrap_or(0.0)
    }
}
