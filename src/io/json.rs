use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::stats::GradeTable;

/// Serializes the records of the table as a pretty-printed JSON array.
///
/// Undefined scores become `null` and dates use the `YYYY-MM-DD` form.
pub fn to_json_string(table: &GradeTable) -> Result<String> {
    Ok(serde_json::to_string_pretty(table.records())?)
}

/// Writes the records of the table to `path` as JSON.
pub fn write_table(path: &Path, table: &GradeTable) -> Result<()> {
    fs::write(path, to_json_string(table)?)?;
    Ok(())
}
