//! Aggregations behind the four presentation views.
//!
//! Nothing here renders anything: each function filters and groups a
//! [`GradeTable`] into the small table a chart would be drawn from.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{BulletinError, Result};
use crate::model::{Record, Score};
use crate::stats::{GradeTable, Summary, describe};

/// Label of the row summing every period in [`skills_distribution`].
pub const TOTAL_PERIOD: &str = "total";

/// Which result a view reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Results rescaled to the normalization weight.
    Weighted,
    /// Results relative to their date distribution.
    Normalized,
}

impl ValueKind {
    /// Axis range conventionally used to plot the values.
    pub fn range(self, norm_weight: f64) -> (f64, f64) {
        match self {
            ValueKind::Weighted => (0.0, norm_weight),
            ValueKind::Normalized => (-2.0, 2.0),
        }
    }

    fn pick(self, record: &Record) -> Score {
        match self {
            ValueKind::Weighted => record.weighted_result,
            ValueKind::Normalized => record.normalized_result,
        }
    }
}

/// Grouping key of the overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Name,
    Code,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillCount {
    pub period: String,
    pub skill: String,
    /// Number of tests measuring the skill.
    pub count: usize,
    /// Sum of the maxima of those tests.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionPoint {
    pub date: NaiveDate,
    /// Code of the first test held on that date.
    pub code: String,
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evolution {
    pub skill: Option<String>,
    pub points: Vec<EvolutionPoint>,
    /// First test date of every period.
    pub period_starts: Vec<(String, NaiveDate)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewGroup {
    pub key: String,
    pub values: Vec<f64>,
    pub summary: Option<Summary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryPoint {
    /// Days since the first test of the table.
    pub day: i64,
    pub date: NaiveDate,
    pub period: String,
    pub code: String,
    pub value: Score,
}

/// Least-squares line `value = slope * day + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentResults {
    pub student: String,
    pub skill: Option<String>,
    pub kind: ValueKind,
    pub points: Vec<TrajectoryPoint>,
    pub regression: Option<Regression>,
}

fn matches_skill(record: &Record, skill: Option<&str>) -> bool {
    skill.is_none_or(|skill| record.observation.skill == skill)
}

/// Number and total weight of tests per period and skill, followed by one
/// [`TOTAL_PERIOD`] row per skill.
pub fn skills_distribution(table: &GradeTable) -> Vec<SkillCount> {
    let mut seen = HashSet::new();
    let mut per_period: BTreeMap<(String, String), (usize, f64)> = BTreeMap::new();
    let mut totals: BTreeMap<String, (usize, f64)> = BTreeMap::new();

    for record in table.records() {
        let observation = &record.observation;
        if !seen.insert(observation.code.as_str()) {
            continue;
        }
        let weight = observation.weight.value().unwrap_or(0.0);

        let entry = per_period
            .entry((observation.period.clone(), observation.skill.clone()))
            .or_default();
        entry.0 += 1;
        entry.1 += weight;

        let total = totals.entry(observation.skill.clone()).or_default();
        total.0 += 1;
        total.1 += weight;
    }

    let rows = per_period
        .into_iter()
        .map(|((period, skill), (count, weight))| SkillCount {
            period,
            skill,
            count,
            weight,
        });
    let total_rows = totals.into_iter().map(|(skill, (count, weight))| SkillCount {
        period: TOTAL_PERIOD.to_string(),
        skill,
        count,
        weight,
    });

    rows.chain(total_rows).collect()
}

/// Distribution of weighted results per date, optionally for one skill.
pub fn results_evolution(table: &GradeTable, skill: Option<&str>) -> Evolution {
    let mut per_date: BTreeMap<NaiveDate, (String, Vec<f64>)> = BTreeMap::new();
    let mut period_starts: Vec<(String, NaiveDate)> = Vec::new();

    for record in table.records().iter().filter(|r| matches_skill(r, skill)) {
        let observation = &record.observation;
        let entry = per_date
            .entry(observation.date)
            .or_insert_with(|| (observation.code.clone(), Vec::new()));
        if let Some(value) = record.weighted_result.value() {
            entry.1.push(value);
        }

        match period_starts
            .iter_mut()
            .find(|(period, _)| *period == observation.period)
        {
            Some((_, start)) => *start = (*start).min(observation.date),
            None => period_starts.push((observation.period.clone(), observation.date)),
        }
    }

    let points = per_date
        .into_iter()
        .filter_map(|(date, (code, values))| {
            describe(&values).map(|summary| EvolutionPoint {
                date,
                code,
                summary,
            })
        })
        .collect();

    Evolution {
        skill: skill.map(str::to_string),
        points,
        period_starts,
    }
}

/// Defined values grouped by student or by test, sorted by key.
pub fn overview(
    table: &GradeTable,
    group_by: GroupBy,
    skill: Option<&str>,
    kind: ValueKind,
) -> Vec<OverviewGroup> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();

    for record in table.records().iter().filter(|r| matches_skill(r, skill)) {
        let key = match group_by {
            GroupBy::Name => record.observation.name.as_str(),
            GroupBy::Code => record.observation.code.as_str(),
        };
        let values = groups.entry(key).or_default();
        if let Some(value) = kind.pick(record).value() {
            values.push(value);
        }
    }

    groups
        .into_iter()
        .map(|(key, values)| OverviewGroup {
            key: key.to_string(),
            summary: describe(&values),
            values,
        })
        .collect()
}

/// Chronological results of one student, with a trend line when at least
/// two defined points exist.
pub fn student_results(
    table: &GradeTable,
    student: &str,
    skill: Option<&str>,
    kind: ValueKind,
) -> Result<StudentResults> {
    let records = table.records();
    if !records.iter().any(|r| r.observation.name == student) {
        return Err(BulletinError::UnknownStudent(student.to_string()));
    }
    let Some(origin) = records.iter().map(|r| r.observation.date).min() else {
        return Err(BulletinError::UnknownStudent(student.to_string()));
    };

    let mut points: Vec<TrajectoryPoint> = records
        .iter()
        .filter(|r| r.observation.name == student && matches_skill(r, skill))
        .map(|record| TrajectoryPoint {
            day: (record.observation.date - origin).num_days(),
            date: record.observation.date,
            period: record.observation.period.clone(),
            code: record.observation.code.clone(),
            value: kind.pick(record),
        })
        .collect();
    points.sort_by_key(|point| point.day);

    let defined: Vec<(f64, f64)> = points
        .iter()
        .filter_map(|point| point.value.value().map(|value| (point.day as f64, value)))
        .collect();

    Ok(StudentResults {
        student: student.to_string(),
        skill: skill.map(str::to_string),
        kind,
        regression: linear_regression(&defined),
        points,
    })
}

/// Ordinary least squares over `(x, y)` pairs. `None` with fewer than two
/// points or when every `x` is equal.
pub fn linear_regression(points: &[(f64, f64)]) -> Option<Regression> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (covariance, variance) = points.iter().fold((0.0, 0.0), |(cov, var), (x, y)| {
        (cov + (x - mean_x) * (y - mean_y), var + (x - mean_x).powi(2))
    });
    if variance == 0.0 {
        return None;
    }

    let slope = covariance / variance;
    Some(Regression {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regression_of_a_line() {
        let line = linear_regression(&[(0.0, 1.0), (1.0, 3.0), (2.0, 5.0)]).unwrap();
        assert!((line.slope - 2.0).abs() < 1e-9);
        assert!((line.intercept - 1.0).abs() < 1e-9);
    }

    #[test]
    fn regression_needs_spread() {
        assert!(linear_regression(&[(1.0, 2.0)]).is_none());
        assert!(linear_regression(&[(1.0, 2.0), (1.0, 4.0)]).is_none());
    }

    #[test]
    fn value_ranges() {
        assert_eq!(ValueKind::Weighted.range(20.0), (0.0, 20.0));
        assert_eq!(ValueKind::Normalized.range(20.0), (-2.0, 2.0));
    }
}
