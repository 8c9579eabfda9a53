use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column names of the enriched table, in export order.
pub const COLUMNS: [&str; 10] = [
    "name",
    "period",
    "date",
    "code",
    "test",
    "weight",
    "skill",
    "result",
    "weighted_result",
    "normalized_result",
];

/// A numeric value that may be undefined.
///
/// Blank cells, unparsable text and degenerate arithmetic all produce an
/// undefined score. Every operator returns undefined as soon as one operand
/// is undefined or the outcome is not a finite number, so a missing cell
/// never turns into a zero further down the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(Option<f64>);

impl Score {
    /// The undefined score.
    pub const UNDEFINED: Score = Score(None);

    /// Wraps a number, mapping non-finite values to undefined.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Score(Some(value))
        } else {
            Score(None)
        }
    }

    /// Returns the inner value when defined.
    pub fn value(self) -> Option<f64> {
        self.0
    }

    pub fn is_defined(self) -> bool {
        self.0.is_some()
    }

    fn combine(self, rhs: Score, op: impl FnOnce(f64, f64) -> f64) -> Score {
        match (self.0, rhs.0) {
            (Some(lhs), Some(rhs)) => Score::new(op(lhs, rhs)),
            _ => Score::UNDEFINED,
        }
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Score::new(value)
    }
}

impl From<Option<f64>> for Score {
    fn from(value: Option<f64>) -> Self {
        value.map(Score::new).unwrap_or_default()
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{value}"),
            None => write!(f, "-"),
        }
    }
}

macro_rules! score_operator {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait for Score {
            type Output = Score;

            fn $method(self, rhs: Score) -> Score {
                self.combine(rhs, |lhs, rhs| lhs $op rhs)
            }
        }

        impl $trait<f64> for Score {
            type Output = Score;

            fn $method(self, rhs: f64) -> Score {
                self.combine(Score::new(rhs), |lhs, rhs| lhs $op rhs)
            }
        }
    };
}

score_operator!(Add, add, +);
score_operator!(Sub, sub, -);
score_operator!(Mul, mul, *);
score_operator!(Div, div, /);

/// One score of one student on one test of one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Student identifier, as written in the names sheet.
    pub name: String,
    /// Period (sheet) the test belongs to.
    pub period: String,
    /// Date assigned to the test inside the period interval.
    pub date: NaiveDate,
    /// Synthetic test identifier: `period/ordinal/skill`.
    pub code: String,
    /// Raw header label of the test.
    pub test: String,
    /// Maximum achievable score.
    pub weight: Score,
    /// Competency tag of the test.
    pub skill: String,
    /// Score obtained by the student.
    pub result: Score,
}

impl Observation {
    /// Builds the synthetic code of the test at `ordinal` (0-based) in
    /// `period`.
    pub fn test_code(period: &str, ordinal: usize, skill: &str) -> String {
        format!("{period}/{:02}/{skill}", ordinal + 1)
    }
}

/// An observation enriched with the fields derived from the whole table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(flatten)]
    pub observation: Observation,
    /// Result rescaled to the common maximum.
    pub weighted_result: Score,
    /// Result relative to the distribution of its date.
    pub normalized_result: Score,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_operands_propagate() {
        let defined = Score::new(4.0);
        assert_eq!(defined / Score::UNDEFINED, Score::UNDEFINED);
        assert_eq!(Score::UNDEFINED * 20.0, Score::UNDEFINED);
        assert_eq!(defined - 1.0, Score::new(3.0));
    }

    #[test]
    fn division_by_zero_is_undefined() {
        assert!(!(Score::new(4.0) / Score::new(0.0)).is_defined());
    }

    #[test]
    fn code_is_zero_padded() {
        assert_eq!(Observation::test_code("B1", 0, "SAV"), "B1/01/SAV");
        assert_eq!(Observation::test_code("B3", 11, ""), "B3/12/");
    }

    #[test]
    fn undefined_serializes_as_null() {
        let json = serde_json::to_value(Score::UNDEFINED).unwrap();
        assert!(json.is_null());
    }
}
