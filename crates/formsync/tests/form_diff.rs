//! End-to-end tests for comparing form versions

use formsync::prelude::*;
use formsync::{align, CellRef, MatchKind, SheetStatus};
use pretty_assertions::assert_eq;

fn sheet(name: &str, rows: &[&[&str]]) -> Worksheet {
    let mut ws = Worksheet::new(name);
    for row in rows {
        ws.push_row(row.iter().copied());
    }
    ws
}

/// A form with a survey and a choices sheet
fn household(extra_question: bool, yes_label: &str) -> Workbook {
    let mut survey: Vec<&[&str]> = vec![
        &["type", "name", "label::English"],
        &["begin group", "hh", "Household"],
        &["integer", "members", "How many members?"],
        &["select_one yn", "water", "Piped water?"],
        &["end group", "", ""],
    ];
    if extra_question {
        survey.insert(3, &["select_one yn", "power", "Electricity?"]);
    }
    let yes = ["yn", "1", yes_label];
    let choices: Vec<&[&str]> = vec![
        &["list_name", "name", "label::English"],
        &yes,
        &["yn", "0", "No"],
    ];
    Workbook::from_worksheets(vec![sheet("survey", &survey), sheet("choices", &choices)]).unwrap()
}

/// Test that an inserted question is the only change reported
#[test]
fn test_inserted_question() {
    let old = household(false, "Yes");
    let new = household(true, "Yes");

    let report = old.diff_against(&new, DiffMode::FormAware).unwrap();

    let survey = report.sheet("survey").unwrap();
    assert_eq!(survey.status, SheetStatus::Matched);
    assert_eq!(survey.rows.len(), 1);
    assert_eq!(survey.rows[0].row, 3);
    assert_eq!(survey.rows[0].markers, vec![ChangeCategory::OnlyInNewFile]);
    assert!(report.sheet("choices").unwrap().is_empty());
    assert_eq!(report.count(ChangeCategory::RowReordered), 0);
}

/// Test that choice edits are matched through list_name + name
#[test]
fn test_choice_label_edit() {
    let old = household(false, "Yes");
    let new = household(false, "Yes, always");

    let report = old.diff_against(&new, DiffMode::FormAware).unwrap();
    let map = report.to_category_map();

    assert_eq!(map.get(CellRef::new(1, 1, 2)), Some(ChangeCategory::CellDiffers));
    assert_eq!(report.summary().len(), 1);

    let alignment = align(
        old.worksheet_by_name("choices").unwrap(),
        new.worksheet_by_name("choices").unwrap(),
    )
    .unwrap();
    assert_eq!(alignment.rows.kind(1), Some(MatchKind::Key));
}

/// Test palette lookup over a report's categories
#[test]
fn test_palette_covers_report() {
    let old = household(false, "Yes");
    let new = household(true, "Yes, always");
    let palette = HighlightPalette::default();

    let map = old
        .diff_against(&new, DiffMode::FormAware)
        .unwrap()
        .to_category_map();

    for (_, category) in map.cells() {
        assert!(palette.color(category).is_some());
    }
    for (_, markers) in map.rows() {
        assert!(palette.row_color(markers).is_some());
    }
}

/// Test the spreadsheet error scan through the extension trait
#[test]
fn test_excel_errors() {
    let mut wb = household(false, "Yes");
    wb.worksheet_mut(0)
        .unwrap()
        .set_value_at(2, 2, CellValue::Error(formsync::CellError::Ref));

    let errors = wb.excel_errors();
    assert_eq!(errors["survey"]["#REF!"], vec!["C3"]);
    assert_eq!(wb.form_language().as_deref(), Some("English"));
}
