mod common;

use bulletin_tools::BulletinError;
use bulletin_tools::model::Score;
use bulletin_tools::pipeline;
use bulletin_tools::stats::GradeTable;
use bulletin_tools::views::{self, GroupBy, TOTAL_PERIOD, ValueKind};
use common::{PeriodFixture, date, layout_for, workbook};

fn sample_table() -> GradeTable {
    let periods = vec![
        PeriodFixture {
            name: "B1",
            tests: vec![("T1", 10.0, "SAV"), ("T2", 20.0, "SF")],
            scores: vec![vec![Some(5.0), Some(10.0)], vec![Some(10.0), None]],
        },
        PeriodFixture {
            name: "B2",
            tests: vec![("T1", 20.0, "SAV")],
            scores: vec![vec![Some(16.0)], vec![Some(12.0)]],
        },
    ];
    pipeline::transform(&workbook(&["Alice", "Bob"], &periods), &layout_for(&["B1", "B2"]))
        .expect("table built")
}

#[test]
fn skills_distribution_counts_distinct_tests() {
    let rows = views::skills_distribution(&sample_table());

    let find = |period: &str, skill: &str| {
        rows.iter()
            .find(|row| row.period == period && row.skill == skill)
            .unwrap_or_else(|| panic!("row {period}/{skill}"))
    };

    assert_eq!(find("B1", "SAV").count, 1);
    assert_eq!(find("B1", "SF").weight, 20.0);
    let total = find(TOTAL_PERIOD, "SAV");
    assert_eq!(total.count, 2);
    assert_eq!(total.weight, 30.0);
    assert_eq!(rows.len(), 3 + 2);
}

#[test]
fn evolution_follows_dates() {
    let evolution = views::results_evolution(&sample_table(), None);

    assert_eq!(evolution.points.len(), 3);
    assert_eq!(evolution.points[0].code, "B1/01/SAV");
    // 5/10 and 10/10 rescaled to 20.
    assert_eq!(evolution.points[0].summary.median, 15.0);
    assert_eq!(evolution.points[1].summary.count, 1);
    assert_eq!(
        evolution.period_starts,
        vec![
            ("B1".to_string(), date(2015, 9, 1)),
            ("B2".to_string(), date(2015, 10, 1))
        ]
    );

    let filtered = views::results_evolution(&sample_table(), Some("SF"));
    assert_eq!(filtered.points.len(), 1);
    assert_eq!(filtered.period_starts.len(), 1);
}

#[test]
fn overview_groups_by_student_or_test() {
    let table = sample_table();

    let by_name = views::overview(&table, GroupBy::Name, None, ValueKind::Weighted);
    assert_eq!(
        by_name.iter().map(|g| g.key.as_str()).collect::<Vec<_>>(),
        vec!["Alice", "Bob"]
    );
    assert_eq!(by_name[1].values.len(), 2);

    let by_code = views::overview(&table, GroupBy::Code, Some("SF"), ValueKind::Normalized);
    assert_eq!(by_code.len(), 1);
    assert_eq!(by_code[0].key, "B1/02/SF");
    // Only Alice took the test, so the distribution is degenerate.
    assert_eq!(by_code[0].values, vec![0.0]);
}

#[test]
fn student_trajectory_with_trend() {
    let results = views::student_results(&sample_table(), "Alice", None, ValueKind::Weighted)
        .expect("student found");

    let days: Vec<i64> = results.points.iter().map(|p| p.day).collect();
    assert_eq!(days, vec![0, 15, 30]);
    assert_eq!(results.points[2].value, Score::new(16.0));

    let regression = results.regression.expect("regression");
    assert!(regression.slope > 0.0);
}

#[test]
fn student_with_single_point_has_no_trend() {
    let results = views::student_results(&sample_table(), "Bob", Some("SF"), ValueKind::Weighted)
        .expect("student found");
    assert_eq!(results.points.len(), 1);
    assert_eq!(results.points[0].value, Score::UNDEFINED);
    assert!(results.regression.is_none());
}

#[test]
fn unknown_student_is_an_error() {
    assert!(matches!(
        views::student_results(&sample_table(), "Zoé", None, ValueKind::Normalized),
        Err(BulletinError::UnknownStudent(name)) if name == "Zoé"
    ));
}
