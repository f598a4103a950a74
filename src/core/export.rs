use rust_xlsxwriter::{Format, Workbook, XlsxError};

use super::types::ScenarioRun;

/// Fixed download name for the exported workbook.
pub const EXPORT_FILE_NAME: &str = "simulacao_financeira_cenarios.xlsx";

/// Standard spreadsheet MIME type.
pub const EXPORT_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const SUMMARY_SHEET_NAME: &str = "Summary";

const RECORD_HEADERS: [&str; 5] = [
    "Mês",
    "Ano",
    "Valor acumulado (R$)",
    "Meta atingida (%)",
    "Cenário",
];

const SUMMARY_HEADERS: [&str; 3] = ["Cenário", "Valor Final (R$)", "Meta Atingida (%)"];

/// Serializes a completed run to workbook bytes: one sheet per scenario in
/// the run's fixed order, plus a summary sheet.
pub fn build_workbook(run: &ScenarioRun) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for result in &run.scenarios {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(result.scenario.name())?;
        for (column, title) in RECORD_HEADERS.iter().enumerate() {
            worksheet.write_with_format(0, column as u16, *title, &header_format)?;
        }
        for (index, record) in result.records.iter().enumerate() {
            let row = index as u32 + 1;
            worksheet.write(row, 0, record.month_index)?;
            worksheet.write(row, 1, record.year_index)?;
            worksheet.write(row, 2, record.accumulated_value)?;
            worksheet.write(row, 3, record.target_progress_percent)?;
            worksheet.write(row, 4, result.scenario.name())?;
        }
    }

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SUMMARY_SHEET_NAME)?;
    for (column, title) in SUMMARY_HEADERS.iter().enumerate() {
        worksheet.write_with_format(0, column as u16, *title, &header_format)?;
    }
    for (index, row) in run.summary.iter().enumerate() {
        let sheet_row = index as u32 + 1;
        worksheet.write(sheet_row, 0, row.scenario.name())?;
        worksheet.write(sheet_row, 1, row.final_value)?;
        worksheet.write(sheet_row, 2, row.final_progress_percent)?;
    }

    workbook.save_to_buffer()
}
