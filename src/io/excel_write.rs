use std::path::Path;

use rust_xlsxwriter::{Table, Workbook, Worksheet};

use crate::error::Result;
use crate::model::{COLUMNS, Score};
use crate::stats::GradeTable;

/// Name of the sheet holding the exported records.
pub const OBSERVATIONS_SHEET: &str = "Observations";

/// Writes the enriched table to an Excel workbook at the given path.
pub fn write_table(path: &Path, table: &GradeTable) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(OBSERVATIONS_SHEET)?;

    for (col_idx, header) in COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, *header)?;
    }

    for (row_idx, record) in table.records().iter().enumerate() {
        let row = (row_idx + 1) as u32;
        let observation = &record.observation;
        worksheet.write_string(row, 0, &observation.name)?;
        worksheet.write_string(row, 1, &observation.period)?;
        worksheet.write_string(row, 2, observation.date.format("%Y-%m-%d").to_string())?;
        worksheet.write_string(row, 3, &observation.code)?;
        worksheet.write_string(row, 4, &observation.test)?;
        write_score(worksheet, row, 5, observation.weight)?;
        worksheet.write_string(row, 6, &observation.skill)?;
        write_score(worksheet, row, 7, observation.result)?;
        write_score(worksheet, row, 8, record.weighted_result)?;
        write_score(worksheet, row, 9, record.normalized_result)?;
    }

    let mut excel_table = Table::new();
    excel_table.set_autofilter(true);
    let col_end = (COLUMNS.len() as u16).saturating_sub(1);
    let row_end = if table.is_empty() {
        1
    } else {
        table.len() as u32
    };
    worksheet.add_table(0, 0, row_end, col_end, &excel_table)?;

    workbook.save(path)?;
    Ok(())
}

fn write_score(worksheet: &mut Worksheet, row: u32, col: u16, score: Score) -> Result<()> {
    if let Some(value) = score.value() {
        worksheet.write_number(row, col, value)?;
    }
    Ok(())
}
