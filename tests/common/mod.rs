#![allow(dead_code)]

use std::path::Path;

use bulletin_tools::Layout;
use bulletin_tools::io::workbook::{Cell, Sheet, Workbook};
use chrono::NaiveDate;
use rust_xlsxwriter::Workbook as XlsxWorkbook;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Default layout restricted to the given periods, one month each from
/// September 2015.
pub fn layout_for(periods: &[&str]) -> Layout {
    let period_bounds = (0..=periods.len() as u32)
        .map(|offset| {
            let month = 9 + offset;
            date(2015 + ((month - 1) / 12) as i32, (month - 1) % 12 + 1, 1)
        })
        .collect();
    Layout {
        period_sheets: periods.iter().map(|p| p.to_string()).collect(),
        period_bounds,
        ..Layout::default()
    }
}

/// One period sheet: tests as (label, max, skill) and one row of scores per
/// student. `None` leaves the cell blank.
pub struct PeriodFixture {
    pub name: &'static str,
    pub tests: Vec<(&'static str, f64, &'static str)>,
    pub scores: Vec<Vec<Option<f64>>>,
}

/// Builds the in-memory workbook following the default positional layout.
pub fn workbook(students: &[&str], periods: &[PeriodFixture]) -> Workbook {
    let mut names = vec![Vec::new(); 3];
    for student in students {
        names.push(vec![Cell::Empty, Cell::Text(student.to_string())]);
    }
    let mut workbook = Workbook::new().with_sheet("Nom", Sheet::from_rows(names));

    for period in periods {
        let blank = || vec![Cell::Empty, Cell::Empty];
        let mut header = blank();
        let mut maxima = blank();
        let mut skills = blank();
        for (label, max, skill) in &period.tests {
            header.push(Cell::Text(label.to_string()));
            maxima.push(Cell::Number(*max));
            skills.push(Cell::Text(skill.to_string()));
        }
        header.push(Cell::Text("Total SSFL".to_string()));

        let mut rows = vec![header, maxima, skills];
        for scores in &period.scores {
            let mut row = blank();
            row.extend(scores.iter().map(|score| match score {
                Some(value) => Cell::Number(*value),
                None => Cell::Text(String::new()),
            }));
            rows.push(row);
        }
        workbook = workbook.with_sheet(period.name, Sheet::from_rows(rows));
    }

    workbook
}

/// Writes the same structure as [`workbook`] to an xlsx file.
pub fn write_xlsx(path: &Path, students: &[&str], periods: &[PeriodFixture]) {
    let mut book = XlsxWorkbook::new();

    let names = book.add_worksheet();
    names.set_name("Nom").expect("sheet named");
    names.write_string(0, 0, "Liste des élèves").expect("title");
    for (index, student) in students.iter().enumerate() {
        names
            .write_string(3 + index as u32, 1, *student)
            .expect("name written");
    }

    for period in periods {
        let sheet = book.add_worksheet();
        sheet.set_name(period.name).expect("sheet named");
        sheet.write_string(0, 0, "Élève").expect("corner");
        for (index, (label, max, skill)) in period.tests.iter().enumerate() {
            let col = 2 + index as u16;
            sheet.write_string(0, col, *label).expect("label");
            sheet.write_number(1, col, *max).expect("max");
            sheet.write_string(2, col, *skill).expect("skill");
        }
        let total_col = 2 + period.tests.len() as u16;
        sheet.write_string(0, total_col, "Total SSFL").expect("total");
        sheet.write_string(0, total_col + 1, "notes").expect("junk");

        for (student_index, scores) in period.scores.iter().enumerate() {
            let row = 3 + student_index as u32;
            for (test_index, score) in scores.iter().enumerate() {
                if let Some(value) = score {
                    sheet
                        .write_number(row, 2 + test_index as u16, *value)
                        .expect("score");
                }
            }
        }
    }

    book.save(path).expect("fixture saved");
}

pub fn two_students_one_period() -> (Vec<&'static str>, Vec<PeriodFixture>) {
    (
        vec!["A", "B"],
        vec![PeriodFixture {
            name: "B1",
            tests: vec![("Dictée", 20.0, "SAV"), ("Calcul", 20.0, "SF")],
            scores: vec![vec![Some(18.0), Some(20.0)], vec![Some(15.0), Some(20.0)]],
        }],
    )
}
