//! XLSForm conventions
//!
//! An XLSForm keeps its questions in a `survey` sheet, answer lists in
//! `choices`, and form-wide settings as a header/value row pair in
//! `settings`.

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellValue};
use crate::workbook::Workbook;

/// Name of the questions worksheet
pub const SURVEY_SHEET: &str = "survey";
/// Name of the answer-list worksheet
pub const CHOICES_SHEET: &str = "choices";
/// Name of the settings worksheet
pub const SETTINGS_SHEET: &str = "settings";

/// Spreadsheet errors found in a workbook: sheet → error text → A1 addresses
pub type ExcelErrorReport = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Settings of a form as `header → value`
///
/// Reads the first two rows of the `settings` sheet; pairs with a blank
/// header or value are skipped. A missing sheet yields no settings.
pub fn settings(workbook: &Workbook) -> BTreeMap<String, String> {
    let Some(sheet) = workbook.worksheet_by_name(SETTINGS_SHEET) else {
        return BTreeMap::new();
    };

    (0..sheet.column_count())
        .filter_map(|col| {
            let key = sheet.text_at(0, col).trim().to_string();
            let value = sheet.text_at(1, col).trim().to_string();
            (!key.is_empty() && !value.is_empty()).then_some((key, value))
        })
        .collect()
}

/// Languages used by the `survey` sheet headers, sorted
pub fn survey_languages(workbook: &Workbook) -> Vec<String> {
    workbook
        .worksheet_by_name(SURVEY_SHEET)
        .map(|sheet| sheet.languages())
        .unwrap_or_default()
}

/// Default language of a form
///
/// The `default_language` setting wins; otherwise the first survey language
/// in sorted order. `None` means the form only uses bare (language-less)
/// columns.
pub fn form_language(workbook: &Workbook) -> Option<String> {
    settings(workbook)
        .remove("default_language")
        .or_else(|| survey_languages(workbook).into_iter().next())
}

/// Locate every spreadsheet error value in a workbook
///
/// Sheets without errors are left out of the report.
pub fn excel_errors(workbook: &Workbook) -> ExcelErrorReport {
    let mut report = ExcelErrorReport::new();
    for sheet in workbook.worksheets() {
        let mut found: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (address, value) in sheet.cells() {
            if let CellValue::Error(err) = value {
                found
                    .entry(err.as_str().to_string())
                    .or_default()
                    .push(CellAddress::to_a1_string(&address));
            }
        }
        if !found.is_empty() {
            report.insert(sheet.name().to_string(), found);
        }
    }
    report
}
