//! Positional layout of a grade workbook.
//!
//! The layout declares once where every piece of information lives in the
//! workbook: which sheets exist, where names and test headers start, which
//! labels close a header run, and how the school year is split into periods.
//! Extraction receives a [`Layout`] value and never assumes anything else.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{BulletinError, Result};

/// Zero-based coordinates of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPos {
    pub row: u32,
    pub column: u32,
}

impl CellPos {
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

/// Description of the sheets and offsets of a grade workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layout {
    /// Sheet listing the students.
    pub names_sheet: String,
    /// One sheet per period, in chronological order.
    pub period_sheets: Vec<String>,
    /// Period boundaries: period `i` covers `[bounds[i], bounds[i + 1])`.
    pub period_bounds: Vec<NaiveDate>,
    /// Header labels that end the run of tests.
    pub header_stopwords: Vec<String>,
    /// First student name.
    pub name_origin: CellPos,
    /// First test label of every period sheet.
    pub header_origin: CellPos,
    /// Rows between the header and the maximum scores.
    pub weight_row_offset: u32,
    /// Rows between the header and the skill tags.
    pub skill_row_offset: u32,
    /// Common maximum used to rescale results.
    pub norm_weight: f64,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            names_sheet: "Nom".to_string(),
            period_sheets: ["B1", "B2", "B3", "B4"].map(String::from).to_vec(),
            period_bounds: [(2015, 9), (2015, 11), (2016, 2), (2016, 4), (2016, 6)]
                .into_iter()
                .filter_map(|(year, month)| NaiveDate::from_ymd_opt(year, month, 1))
                .collect(),
            header_stopwords: vec![String::new(), "Total SSFL".to_string()],
            name_origin: CellPos::new(3, 1),
            header_origin: CellPos::new(0, 2),
            weight_row_offset: 1,
            skill_row_offset: 2,
            norm_weight: 20.0,
        }
    }
}

impl Layout {
    /// Reads a layout from a JSON file. Missing keys keep their default.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        let layout: Layout = serde_json::from_str(&source)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Checks that the layout is self-consistent.
    pub fn validate(&self) -> Result<()> {
        if self.period_sheets.is_empty() {
            return Err(config_error("no period sheet configured"));
        }

        let needed = self.period_sheets.len() + 1;
        if self.period_bounds.len() < needed {
            return Err(config_error(format!(
                "{} period(s) need {needed} date boundaries, found {}",
                self.period_sheets.len(),
                self.period_bounds.len()
            )));
        }

        if let Some(pair) = self
            .period_bounds
            .windows(2)
            .find(|pair| pair[0] >= pair[1])
        {
            return Err(config_error(format!(
                "date boundaries must increase strictly ({} is not before {})",
                pair[0], pair[1]
            )));
        }

        if !self.norm_weight.is_finite() || self.norm_weight <= 0.0 {
            return Err(config_error(format!(
                "normalization weight must be positive, got {}",
                self.norm_weight
            )));
        }

        if self.weight_row_offset == 0 || self.skill_row_offset == 0 {
            return Err(config_error("row offsets must point below the header row"));
        }
        if self.weight_row_offset == self.skill_row_offset {
            return Err(config_error("weight and skill rows must differ"));
        }

        Ok(())
    }

    /// Returns the `[start, end)` interval of the period at `index`.
    pub fn period_interval(&self, index: usize) -> Result<(NaiveDate, NaiveDate)> {
        match (self.period_bounds.get(index), self.period_bounds.get(index + 1)) {
            (Some(start), Some(end)) => Ok((*start, *end)),
            _ => Err(config_error(format!(
                "period #{} has no date boundaries",
                index + 1
            ))),
        }
    }

    pub fn is_stopword(&self, label: &str) -> bool {
        self.header_stopwords.iter().any(|stop| stop == label)
    }
}

fn config_error(message: impl Into<String>) -> BulletinError {
    BulletinError::Configuration(message.into())
}
