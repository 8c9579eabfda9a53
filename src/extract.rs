use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use tracing::{debug, info, instrument};

use crate::config::Layout;
use crate::error::{BulletinError, Result};
use crate::io::workbook::{Sheet, Workbook};
use crate::model::{Observation, Score};

/// Header run of one period sheet: labels, maxima and skill tags, aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct TestHeader {
    pub label: String,
    pub weight: Score,
    pub skill: String,
}

/// Flattens a workbook into one observation per (student, period, test).
///
/// Observations come out period by period, then in student row order, then
/// in test column order.
#[instrument(level = "info", skip_all, fields(periods = layout.period_sheets.len()))]
pub fn extract_observations(workbook: &Workbook, layout: &Layout) -> Result<Vec<Observation>> {
    layout.validate()?;

    let names_sheet = workbook.sheet(&layout.names_sheet)?;
    let students = read_students(names_sheet, layout)?;
    info!(student_count = students.len(), "students read");

    let mut observations = Vec::new();
    for (period_index, period) in layout.period_sheets.iter().enumerate() {
        let sheet = workbook.sheet(period)?;
        let tests = read_test_headers(sheet, period, layout)?;
        let dates = test_dates(layout.period_interval(period_index)?, tests.len());
        debug!(period = %period, test_count = tests.len(), "period header read");

        for student in &students {
            let row = student.row;
            for (test_index, (test, date)) in tests.iter().zip(&dates).enumerate() {
                let column = layout.header_origin.column + test_index as u32;
                observations.push(Observation {
                    name: student.name.clone(),
                    period: period.clone(),
                    date: *date,
                    code: Observation::test_code(period, test_index, &test.skill),
                    test: test.label.clone(),
                    weight: test.weight,
                    skill: test.skill.clone(),
                    result: sheet.cell(row, column).as_score(),
                });
            }
        }
    }

    info!(observation_count = observations.len(), "observations extracted");
    Ok(observations)
}

/// A student and the row holding their scores in every period sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub row: u32,
    pub name: String,
}

/// Reads student names downward from the name origin, skipping blank cells.
///
/// Each student keeps the row it was read from, so a blank line inside the
/// list does not shift the score rows of the students below it.
pub fn read_students(sheet: &Sheet, layout: &Layout) -> Result<Vec<Student>> {
    let origin = layout.name_origin;
    let mut seen = HashSet::new();
    let mut students = Vec::new();

    for row in origin.row..sheet.height() {
        let cell = sheet.cell(row, origin.column);
        if cell.is_blank() {
            continue;
        }
        let name = cell.as_text();
        if !seen.insert(name.clone()) {
            return Err(BulletinError::DuplicateStudent {
                sheet: layout.names_sheet.clone(),
                name,
            });
        }
        students.push(Student { row, name });
    }

    Ok(students)
}

/// Scans the header row left to right until a blank cell or a stop-word,
/// then reads the weight and skill rows under each label.
///
/// Labels are trimmed before the stop-word check, so a whitespace-only
/// header cell counts as blank and ends the run.
pub fn read_test_headers(sheet: &Sheet, period: &str, layout: &Layout) -> Result<Vec<TestHeader>> {
    let origin = layout.header_origin;
    let weight_row = origin.row + layout.weight_row_offset;
    let skill_row = origin.row + layout.skill_row_offset;

    let mut seen = HashSet::new();
    let mut tests = Vec::new();
    let mut column = origin.column;

    loop {
        let cell = sheet.cell(origin.row, column);
        let label = cell.as_text();
        if cell.is_blank() || layout.is_stopword(&label) {
            break;
        }
        if !seen.insert(label.clone()) {
            return Err(BulletinError::DuplicateTest {
                sheet: period.to_string(),
                test: label,
            });
        }
        tests.push(TestHeader {
            label,
            weight: sheet.cell(weight_row, column).as_score(),
            skill: sheet.cell(skill_row, column).as_text(),
        });
        column += 1;
    }

    if tests.is_empty() {
        return Err(BulletinError::EmptyHeader(period.to_string()));
    }

    Ok(tests)
}

/// Splits `[start, end)` into `count` equal slices of whole days and returns
/// the first day of each slice.
pub fn test_dates((start, end): (NaiveDate, NaiveDate), count: usize) -> Vec<NaiveDate> {
    if count == 0 {
        return Vec::new();
    }
    let span = (end - start).num_days().max(0) as u64;
    let step = span / count as u64;

    (0..count as u64)
        .map(|index| start + Days::new(index * step))
        .collect()
}
