use std::fmt;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::config::Layout;
use crate::error::{BulletinError, Result};
use crate::extract::extract_observations;
use crate::io::workbook::{Workbook, read_workbook};
use crate::io::{excel_write, json};
use crate::stats::{GradeTable, normalize};

/// File formats the enriched table can be exported to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Excel,
    Json,
}

impl ExportFormat {
    /// Derives the format from the extension of `path`.
    pub fn detect(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "xlsx" => Ok(ExportFormat::Excel),
            "json" => Ok(ExportFormat::Json),
            other => Err(BulletinError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Excel => write!(f, "xlsx"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

/// Loads a grade workbook and returns the enriched observation table.
///
/// Any structural problem (missing file, unreadable format, missing sheet,
/// inconsistent layout) aborts the whole load.
#[instrument(level = "info", skip_all, fields(input = %input.display()))]
pub fn load_table(input: &Path, layout: &Layout) -> Result<GradeTable> {
    if !input.exists() {
        return Err(BulletinError::MissingInput(input.to_path_buf()));
    }
    layout.validate()?;

    let mut sheets = Vec::with_capacity(layout.period_sheets.len() + 1);
    sheets.push(layout.names_sheet.as_str());
    sheets.extend(layout.period_sheets.iter().map(String::as_str));

    let workbook = read_workbook(input, &sheets)?;
    debug!(sheet_count = sheets.len(), "workbook read");
    transform(&workbook, layout)
}

/// Runs extraction and normalization over an in-memory workbook.
#[instrument(level = "debug", skip_all)]
pub fn transform(workbook: &Workbook, layout: &Layout) -> Result<GradeTable> {
    let observations = extract_observations(workbook, layout)?;
    let table = normalize(observations, layout.norm_weight);
    info!(record_count = table.len(), "grade table built");
    Ok(table)
}

/// Writes the table to `output` in the requested format.
#[instrument(
    level = "info",
    skip_all,
    fields(output = %output.display(), %format)
)]
pub fn export_table(table: &GradeTable, output: &Path, format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Excel => excel_write::write_table(output, table)?,
        ExportFormat::Json => json::write_table(output, table)?,
    }
    info!(record_count = table.len(), "table exported");
    Ok(())
}
