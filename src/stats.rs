//! Batch statistics over the observation table.
//!
//! Normalization happens in one pass right after extraction: every
//! observation gets its weighted result, then results are grouped by date to
//! build the cross-student distribution each normalized result refers to.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::model::{Observation, Record, Score};

/// Descriptive statistics of a set of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl Summary {
    /// Distance between the first and third quartiles.
    pub fn iqr(&self) -> f64 {
        self.p75 - self.p25
    }
}

/// Summarizes `values`, ignoring non-finite entries. `None` when nothing is
/// left to summarize.
pub fn describe(values: &[f64]) -> Option<Summary> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    Some(Summary {
        count,
        mean: sorted.iter().sum::<f64>() / count as f64,
        min: sorted[0],
        p25: percentile(&sorted, 0.25),
        median: percentile(&sorted, 0.5),
        p75: percentile(&sorted, 0.75),
        max: sorted[count - 1],
    })
}

/// Percentile `q` (in `[0, 1]`) of an ascending slice, interpolating
/// linearly between the two closest ranks.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        len => {
            let rank = q.clamp(0.0, 1.0) * (len - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let fraction = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
        }
    }
}

/// Enriched, read-only observation table.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeTable {
    records: Vec<Record>,
    date_stats: BTreeMap<NaiveDate, Summary>,
    norm_weight: f64,
}

impl GradeTable {
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Distribution of raw results for every date that has at least one
    /// defined result.
    pub fn date_stats(&self) -> &BTreeMap<NaiveDate, Summary> {
        &self.date_stats
    }

    pub fn stats_for(&self, date: NaiveDate) -> Option<&Summary> {
        self.date_stats.get(&date)
    }

    pub fn norm_weight(&self) -> f64 {
        self.norm_weight
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Adds the weighted and normalized results to every observation.
#[instrument(level = "info", skip(observations), fields(observation_count = observations.len()))]
pub fn normalize(observations: Vec<Observation>, norm_weight: f64) -> GradeTable {
    let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for observation in &observations {
        let values = by_date.entry(observation.date).or_default();
        if let Some(result) = observation.result.value() {
            values.push(result);
        }
    }

    let date_stats: BTreeMap<NaiveDate, Summary> = by_date
        .into_iter()
        .filter_map(|(date, values)| match describe(&values) {
            Some(summary) => Some((date, summary)),
            None => {
                debug!(%date, "no result recorded for date");
                None
            }
        })
        .collect();
    info!(date_count = date_stats.len(), "date distributions computed");

    let records = observations
        .into_iter()
        .map(|observation| {
            let weighted_result = observation.result / observation.weight * norm_weight;
            let normalized_result =
                normalized_score(observation.result, date_stats.get(&observation.date));
            Record {
                observation,
                weighted_result,
                normalized_result,
            }
        })
        .collect();

    GradeTable {
        records,
        date_stats,
        norm_weight,
    }
}

/// Position of `result` in its date distribution, in interquartile ranges
/// from the median. A zero range maps every result to 0.
pub fn normalized_score(result: Score, summary: Option<&Summary>) -> Score {
    let Some(summary) = summary else {
        return Score::UNDEFINED;
    };
    if !result.is_defined() {
        return Score::UNDEFINED;
    }

    let range = summary.iqr();
    if range > 0.0 {
        (result - summary.median) / range
    } else {
        Score::new(0.0)
    }
}
