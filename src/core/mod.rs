mod engine;
mod error;
mod export;
mod types;

pub use engine::{SCENARIO_RATE_OFFSET, project, run_scenarios};
pub use error::SimulationError;
pub use export::{EXPORT_FILE_NAME, EXPORT_MIME_TYPE, SUMMARY_SHEET_NAME, build_workbook};
pub use types::{
    CombinedRecord, MonthlyRecord, Scenario, ScenarioResult, ScenarioRun, SimulationInput,
    SummaryRow,
};
