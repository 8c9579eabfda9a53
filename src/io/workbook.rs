use std::collections::BTreeMap;
use std::path::Path;

use calamine::{DataType, Range, Reader, open_workbook_auto};
use tracing::debug;

use crate::error::{BulletinError, Result};
use crate::model::Score;

static EMPTY: Cell = Cell::Empty;

/// Value of a single spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(value) => value.trim().is_empty(),
            Cell::Number(_) | Cell::Bool(_) => false,
        }
    }

    /// Renders the cell as a label. Integral numbers lose their fraction and
    /// negative zero prints as `0`; other floats use Rust's shortest
    /// round-trip decimal form (`0.0000001`, `2.5`), never an exponent.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(value) if *value == 0.0 => "0".to_string(),
            Cell::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                format!("{value:.0}")
            }
            Cell::Number(value) => value.to_string(),
            Cell::Text(value) => value.trim().to_string(),
            Cell::Bool(value) => value.to_string(),
        }
    }

    /// Interprets the cell as a score.
    ///
    /// Blank cells are undefined, never zero. Text is parsed leniently
    /// (decimal comma accepted); anything else is undefined.
    pub fn as_score(&self) -> Score {
        match self {
            Cell::Empty => Score::UNDEFINED,
            Cell::Number(value) => Score::new(*value),
            Cell::Bool(value) => Score::new(if *value { 1.0 } else { 0.0 }),
            Cell::Text(value) => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Score::UNDEFINED;
                }
                match trimmed.replace(',', ".").parse::<f64>() {
                    Ok(number) => Score::new(number),
                    Err(_) => {
                        debug!(value = trimmed, "non-numeric score treated as undefined");
                        Score::UNDEFINED
                    }
                }
            }
        }
    }
}

impl From<&DataType> for Cell {
    fn from(value: &DataType) -> Self {
        match value {
            DataType::Empty => Cell::Empty,
            DataType::Float(value) => Cell::Number(*value),
            DataType::Int(value) => Cell::Number(*value as f64),
            DataType::String(value) => Cell::Text(value.clone()),
            DataType::Bool(value) => Cell::Bool(*value),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// A dense grid of cells addressed by absolute zero-based coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Number of rows up to the last used one.
    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Returns the cell at `(row, column)`; out-of-range cells are empty.
    pub fn cell(&self, row: u32, column: u32) -> &Cell {
        self.rows
            .get(row as usize)
            .and_then(|cells| cells.get(column as usize))
            .unwrap_or(&EMPTY)
    }

    fn from_range(range: &Range<DataType>) -> Self {
        let Some((row_start, col_start)) = range.start() else {
            return Self::default();
        };

        let mut rows: Vec<Vec<Cell>> = Vec::new();
        for (row, col, value) in range.used_cells() {
            let row = row + row_start as usize;
            let col = col + col_start as usize;
            if rows.len() <= row {
                rows.resize_with(row + 1, Vec::new);
            }
            let cells = &mut rows[row];
            if cells.len() <= col {
                cells.resize(col + 1, Cell::Empty);
            }
            cells[col] = Cell::from(value);
        }

        Self { rows }
    }
}

/// The sheets of a workbook, by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: BTreeMap<String, Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: impl Into<String>, sheet: Sheet) -> Self {
        self.sheets.insert(name.into(), sheet);
        self
    }

    /// Returns the sheet called `name`, failing when it does not exist.
    pub fn sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .get(name)
            .ok_or_else(|| BulletinError::MissingSheet(name.to_string()))
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }
}

/// Reads the named sheets of the spreadsheet at `path`.
///
/// The format (`xls`, `xlsx`, `xlsb`, `ods`) is detected from the file
/// extension. Every requested sheet must exist.
pub fn read_workbook<S: AsRef<str>>(path: &Path, sheet_names: &[S]) -> Result<Workbook> {
    let mut reader = open_workbook_auto(path)?;
    let mut workbook = Workbook::new();

    for name in sheet_names {
        let name = name.as_ref();
        let range = reader
            .worksheet_range(name)
            .ok_or_else(|| BulletinError::MissingSheet(name.to_string()))??;
        debug!(sheet = name, rows = range.height(), "sheet loaded");
        workbook.sheets.insert(name.to_string(), Sheet::from_range(&range));
    }

    Ok(workbook)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_cells_are_empty() {
        let sheet = Sheet::from_rows(vec![vec![Cell::Number(1.0)]]);
        assert_eq!(sheet.cell(0, 0), &Cell::Number(1.0));
        assert_eq!(sheet.cell(0, 5), &Cell::Empty);
        assert_eq!(sheet.cell(9, 0), &Cell::Empty);
    }

    #[test]
    fn blank_text_is_not_zero() {
        assert_eq!(Cell::Text(String::new()).as_score(), Score::UNDEFINED);
        assert_eq!(Cell::Empty.as_score(), Score::UNDEFINED);
        assert_eq!(Cell::Number(0.0).as_score(), Score::new(0.0));
    }

    #[test]
    fn numeric_text_is_parsed() {
        assert_eq!(Cell::Text(" 12,5 ".into()).as_score(), Score::new(12.5));
        assert_eq!(Cell::Text("abs".into()).as_score(), Score::UNDEFINED);
    }

    #[test]
    fn labels_drop_integral_fraction() {
        assert_eq!(Cell::Number(3.0).as_text(), "3");
        assert_eq!(Cell::Number(2.5).as_text(), "2.5");
        assert_eq!(Cell::Number(-0.0).as_text(), "0");
        assert_eq!(Cell::Number(1e-7).as_text(), "0.0000001");
        assert_eq!(Cell::Text(" Dictée ".into()).as_text(), "Dictée");
    }

    #[test]
    fn missing_sheet_is_named() {
        let workbook = Workbook::new().with_sheet("B1", Sheet::default());
        match workbook.sheet("Nom") {
            Err(BulletinError::MissingSheet(name)) => assert_eq!(name, "Nom"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
