//! Diff Report Builder
//!
//! Compares two versions of a workbook sheet by sheet and reports, for every
//! row of the new version that needs attention, its row markers and the
//! cells that changed.

use std::collections::BTreeMap;
use std::fmt;

use log::{debug, warn};

use formsync_core::{CategoryMap, CellRef, ChangeCategory, Error, Result, Workbook, Worksheet};

use crate::align::align_with_options;
use crate::classify::classify_edit;
use crate::options::AlignOptions;

/// How rows and columns are paired before comparing cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DiffMode {
    /// Row i against row i, column j against column j
    Simple,
    /// Columns by header, rows by content then key
    #[default]
    FormAware,
}

/// A changed cell of the new file
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellDiff {
    /// Column in the new file
    pub column: usize,
    /// Header text of that column
    pub header: String,
    pub category: ChangeCategory,
    pub old: String,
    pub new: String,
}

/// A row of the new file with something to report
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowDiff {
    /// Row in the new file
    pub row: usize,
    /// Matching row in the old file
    pub old_row: Option<usize>,
    /// Row-level categories
    pub markers: Vec<ChangeCategory>,
    pub cells: Vec<CellDiff>,
}

impl RowDiff {
    fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.cells.is_empty()
    }
}

/// Whether a sheet of the new file has a counterpart in the old one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SheetStatus {
    Matched,
    OnlyInNew,
}

/// Differences found in one worksheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetDiff {
    pub name: String,
    /// Index of the sheet in the new workbook
    pub index: usize,
    pub status: SheetStatus,
    /// Rows needing attention, in new-file order
    pub rows: Vec<RowDiff>,
    /// Old rows with no counterpart in the new file
    pub deleted_rows: Vec<usize>,
    /// Old rows left out as surplus duplicates
    pub excluded_rows: Vec<usize>,
    /// Recovered problems met while aligning
    pub degradations: Vec<Error>,
}

impl SheetDiff {
    fn new(name: &str, index: usize, status: SheetStatus) -> Self {
        Self {
            name: name.to_string(),
            index,
            status,
            rows: Vec::new(),
            deleted_rows: Vec::new(),
            excluded_rows: Vec::new(),
            degradations: Vec::new(),
        }
    }

    /// Old rows that are gone from the new file, deleted or excluded
    pub fn removed_rows(&self) -> Vec<usize> {
        let mut removed: Vec<usize> = self
            .deleted_rows
            .iter()
            .chain(&self.excluded_rows)
            .copied()
            .collect();
        removed.sort_unstable();
        removed
    }

    /// Whether nothing changed in this sheet
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.deleted_rows.is_empty() && self.excluded_rows.is_empty()
    }
}

/// Result of comparing two workbooks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffReport {
    pub mode: DiffMode,
    /// One entry per sheet of the new workbook
    pub sheets: Vec<SheetDiff>,
    /// Sheets of the old workbook missing from the new one
    pub sheets_only_in_old: Vec<String>,
}

impl DiffReport {
    /// Whether the two workbooks compare equal
    pub fn is_empty(&self) -> bool {
        self.sheets_only_in_old.is_empty() && self.sheets.iter().all(SheetDiff::is_empty)
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetDiff> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Number of cells and row markers with `category`
    pub fn count(&self, category: ChangeCategory) -> usize {
        self.sheets
            .iter()
            .flat_map(|s| &s.rows)
            .map(|r| {
                r.markers.iter().filter(|m| **m == category).count()
                    + r.cells.iter().filter(|c| c.category == category).count()
            })
            .sum()
    }

    /// Count per category, for categories that occur
    pub fn summary(&self) -> BTreeMap<ChangeCategory, usize> {
        let mut summary = BTreeMap::new();
        for row in self.sheets.iter().flat_map(|s| &s.rows) {
            let categories = row.markers.iter().copied().chain(row.cells.iter().map(|c| c.category));
            for category in categories {
                *summary.entry(category).or_insert(0) += 1;
            }
        }
        summary
    }

    /// Categories keyed by cell of the new workbook, for a sink
    pub fn to_category_map(&self) -> CategoryMap {
        let mut map = CategoryMap::new();
        for sheet in &self.sheets {
            for row in &sheet.rows {
                for marker in &row.markers {
                    map.mark_row(sheet.index, row.row, *marker);
                }
                for cell in &row.cells {
                    map.insert(CellRef::new(sheet.index, row.row, cell.column), cell.category);
                }
            }
        }
        map
    }
}

impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for sheet in &self.sheets {
            if sheet.is_empty() {
                continue;
            }
            writeln!(f, "[{}]", sheet.name)?;
            for row in &sheet.rows {
                for marker in &row.markers {
                    writeln!(f, "  row {}: {}", row.row + 1, marker)?;
                }
                for cell in &row.cells {
                    writeln!(
                        f,
                        "  {}{}: {} ({:?} -> {:?})",
                        formsync_core::CellAddress::column_to_letters(cell.column),
                        row.row + 1,
                        cell.category,
                        cell.old,
                        cell.new
                    )?;
                }
            }
            for row in sheet.removed_rows() {
                writeln!(f, "  old row {}: removed", row + 1)?;
            }
        }
        for name in &self.sheets_only_in_old {
            writeln!(f, "[{}] only in old file", name)?;
        }
        Ok(())
    }
}

/// Compare two workbooks with default alignment options
pub fn diff(a: &Workbook, b: &Workbook, mode: DiffMode) -> Result<DiffReport> {
    diff_with_options(a, b, mode, &AlignOptions::default())
}

/// Compare two workbooks
///
/// Sheets are paired by name. Sheets only in `b` report every non-blank row
/// as `only-in-new-file`; sheets only in `a` are listed by name.
pub fn diff_with_options(
    a: &Workbook,
    b: &Workbook,
    mode: DiffMode,
    options: &AlignOptions,
) -> Result<DiffReport> {
    if a.is_empty() {
        return Err(Error::EmptyInput("old workbook has no worksheets".into()));
    }
    if b.is_empty() {
        return Err(Error::EmptyInput("new workbook has no worksheets".into()));
    }

    let mut sheets = Vec::with_capacity(b.sheet_count());
    for (index, sheet_b) in b.worksheets().enumerate() {
        let diff = match a.worksheet_by_name(sheet_b.name()) {
            Some(sheet_a) => match mode {
                DiffMode::Simple => diff_simple(sheet_a, sheet_b, index),
                DiffMode::FormAware => diff_form(sheet_a, sheet_b, index, options)?,
            },
            None => diff_new_sheet(sheet_b, index),
        };
        sheets.push(diff);
    }

    let sheets_only_in_old: Vec<String> = a
        .sheet_names()
        .into_iter()
        .filter(|name| b.worksheet_by_name(name).is_none())
        .map(str::to_string)
        .collect();
    if !sheets_only_in_old.is_empty() {
        warn!("Worksheets missing from new file: {}", sheets_only_in_old.join(", "));
    }

    let report = DiffReport {
        mode,
        sheets,
        sheets_only_in_old,
    };
    debug!("Diff summary: {:?}", report.summary());
    Ok(report)
}

fn diff_new_sheet(sheet: &Worksheet, index: usize) -> SheetDiff {
    let mut diff = SheetDiff::new(sheet.name(), index, SheetStatus::OnlyInNew);
    diff.rows = sheet
        .rows()
        .enumerate()
        .filter(|(_, row)| !row.is_blank())
        .map(|(row, _)| RowDiff {
            row,
            old_row: None,
            markers: vec![ChangeCategory::OnlyInNewFile],
            cells: Vec::new(),
        })
        .collect();
    diff
}

fn cell_diff(a: &Worksheet, b: &Worksheet, rows: (usize, usize), cols: (usize, usize)) -> Option<CellDiff> {
    let old = a.text_at(rows.0, cols.0);
    let new = b.text_at(rows.1, cols.1);
    let category = classify_edit(&old, &new);
    (category != ChangeCategory::Unchanged).then(|| CellDiff {
        column: cols.1,
        header: b.header(cols.1),
        category,
        old,
        new,
    })
}

fn diff_simple(a: &Worksheet, b: &Worksheet, index: usize) -> SheetDiff {
    let mut diff = SheetDiff::new(b.name(), index, SheetStatus::Matched);
    let width = a.column_count().max(b.column_count());

    for row in 0..b.row_count() {
        let cells = (0..width)
            .filter_map(|col| cell_diff(a, b, (row, row), (col, col)))
            .collect();
        let row_diff = RowDiff {
            row,
            old_row: (row < a.row_count()).then_some(row),
            markers: Vec::new(),
            cells,
        };
        if !row_diff.is_empty() {
            diff.rows.push(row_diff);
        }
    }
    diff.deleted_rows = (b.row_count()..a.row_count())
        .filter(|&row| a.row(row).is_some_and(|r| !r.is_blank()))
        .collect();
    diff
}

fn diff_form(a: &Worksheet, b: &Worksheet, index: usize, options: &AlignOptions) -> Result<SheetDiff> {
    let mut diff = SheetDiff::new(b.name(), index, SheetStatus::Matched);
    if a.is_empty() && b.is_empty() {
        return Ok(diff);
    }

    let alignment = align_with_options(a, b, options)?;
    let columns = &alignment.columns;
    let rows = &alignment.rows;

    for row in 0..b.row_count() {
        let blank = b.row(row).map_or(true, |r| r.is_blank());
        let mut row_diff = RowDiff {
            row,
            old_row: rows.a_for_b(row),
            markers: Vec::new(),
            cells: Vec::new(),
        };

        if rows.is_only_in_b(row) && !blank {
            row_diff.markers.push(ChangeCategory::OnlyInNewFile);
        }
        if rows.is_duplicate_in_b(row) {
            row_diff.markers.push(ChangeCategory::DuplicateExcluded);
        }
        if rows.is_reordered(row) {
            row_diff.markers.push(ChangeCategory::RowReordered);
        }

        if let Some(old_row) = row_diff.old_row {
            for col in 0..columns.width_b() {
                match columns.a_for_b(col) {
                    Some(old_col) => {
                        row_diff.cells.extend(cell_diff(a, b, (old_row, row), (old_col, col)));
                    }
                    None => {
                        let new = b.text_at(row, col);
                        if !new.trim().is_empty() {
                            row_diff.cells.push(CellDiff {
                                column: col,
                                header: b.header(col),
                                category: ChangeCategory::OnlyInNewFile,
                                old: String::new(),
                                new,
                            });
                        }
                    }
                }
            }
        }

        if !row_diff.is_empty() {
            diff.rows.push(row_diff);
        }
    }

    diff.deleted_rows = rows
        .deleted()
        .iter()
        .copied()
        .filter(|&row| a.row(row).is_some_and(|r| !r.is_blank()))
        .collect();
    diff.excluded_rows = rows.duplicates_in_a().to_vec();
    diff.degradations = alignment.degradations;
    Ok(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn book(sheets: &[(&str, &[&[&str]])]) -> Workbook {
        let mut wb = Workbook::new();
        for (name, rows) in sheets {
            let mut ws = Worksheet::new(*name);
            for row in rows.iter() {
                ws.push_row(row.iter().copied());
            }
            wb.add_worksheet(ws).unwrap();
        }
        wb
    }

    const HEADER: &[&str] = &["type", "name", "label"];

    #[test]
    fn test_identical_workbooks() {
        let a = book(&[("survey", &[HEADER, &["text", "q1", "Name?"]])]);
        let report = diff(&a, &a.clone(), DiffMode::FormAware).unwrap();
        assert!(report.is_empty());
        assert!(report.summary().is_empty());
    }

    #[test]
    fn test_reorder_without_cell_changes() {
        let a = book(&[(
            "survey",
            &[HEADER, &["text", "r1", "One"], &["text", "r2", "Two"], &["text", "r3", "Three"]],
        )]);
        let b = book(&[(
            "survey",
            &[HEADER, &["text", "r3", "Three"], &["text", "r1", "One"], &["text", "r2", "Two"]],
        )]);

        let report = diff(&a, &b, DiffMode::FormAware).unwrap();
        assert_eq!(report.count(ChangeCategory::RowReordered), 3);
        assert_eq!(report.count(ChangeCategory::CellDiffers), 0);
    }

    #[test]
    fn test_duplicate_row_is_excluded() {
        let a = book(&[("survey", &[HEADER, &["note", "x", "X"], &["note", "x", "X"]])]);
        let b = book(&[("survey", &[HEADER, &["note", "x", "X"]])]);

        let report = diff(&a, &b, DiffMode::FormAware).unwrap();
        let sheet = report.sheet("survey").unwrap();
        assert!(sheet.rows.is_empty());
        assert_eq!(sheet.excluded_rows, vec![2]);
        assert_eq!(sheet.removed_rows(), vec![2]);
    }

    #[test]
    fn test_surplus_new_row_is_marked_duplicate() {
        let a = book(&[("survey", &[HEADER, &["note", "x", "X"]])]);
        let b = book(&[("survey", &[HEADER, &["note", "x", "X"], &["note", "x", "X"]])]);

        let report = diff(&a, &b, DiffMode::FormAware).unwrap();
        let sheet = report.sheet("survey").unwrap();
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].row, 2);
        assert_eq!(sheet.rows[0].old_row, None);
        assert_eq!(sheet.rows[0].markers, vec![ChangeCategory::DuplicateExcluded]);
        assert!(sheet.rows[0].cells.is_empty());
        assert!(sheet.excluded_rows.is_empty());
        assert_eq!(report.count(ChangeCategory::DuplicateExcluded), 1);
        assert_eq!(report.count(ChangeCategory::OnlyInNewFile), 0);
    }

    #[test]
    fn test_form_aware_cells() {
        let a = book(&[(
            "survey",
            &[HEADER, &["text", "q1", "Name?"], &["integer", "q2", "Age?"]],
        )]);
        let b = book(&[(
            "survey",
            &[
                &["type", "name", "label", "hint"],
                &["text", "q1", "Full name?", "As on ID"],
                &["date", "q3", "Birthday?", ""],
            ],
        )]);

        let report = diff(&a, &b, DiffMode::FormAware).unwrap();
        let sheet = report.sheet("survey").unwrap();
        assert_eq!(sheet.deleted_rows, vec![2]);

        let header = &sheet.rows[0];
        assert_eq!(header.row, 0);
        assert_eq!(header.cells[0].category, ChangeCategory::OnlyInNewFile);
        assert_eq!(header.cells[0].new, "hint");

        let q1 = &sheet.rows[1];
        assert_eq!(q1.old_row, Some(1));
        assert_eq!(
            q1.cells,
            vec![
                CellDiff {
                    column: 2,
                    header: "label".into(),
                    category: ChangeCategory::CellDiffers,
                    old: "Name?".into(),
                    new: "Full name?".into(),
                },
                CellDiff {
                    column: 3,
                    header: "hint".into(),
                    category: ChangeCategory::OnlyInNewFile,
                    old: String::new(),
                    new: "As on ID".into(),
                },
            ]
        );

        let q3 = &sheet.rows[2];
        assert_eq!(q3.markers, vec![ChangeCategory::OnlyInNewFile]);
        assert!(q3.cells.is_empty());
    }

    #[test]
    fn test_simple_mode_is_positional() {
        let a = book(&[("survey", &[HEADER, &["text", "q1", "One"], &["text", "q2", "Two"]])]);
        let b = book(&[("survey", &[HEADER, &["text", "q2", "Two"]])]);

        let report = diff(&a, &b, DiffMode::Simple).unwrap();
        let sheet = report.sheet("survey").unwrap();
        assert_eq!(report.count(ChangeCategory::CellDiffers), 2);
        assert_eq!(sheet.deleted_rows, vec![2]);
        assert_eq!(report.count(ChangeCategory::RowReordered), 0);
    }

    #[test]
    fn test_sheets_paired_by_name() {
        let a = book(&[("survey", &[HEADER]), ("settings", &[&["form_id"], &["x"]])]);
        let b = book(&[("survey", &[HEADER]), ("choices", &[&["list_name", "name"], &[""], &["yn", "1"]])]);

        let report = diff(&a, &b, DiffMode::FormAware).unwrap();
        assert_eq!(report.sheets_only_in_old, vec!["settings".to_string()]);

        let choices = report.sheet("choices").unwrap();
        assert_eq!(choices.status, SheetStatus::OnlyInNew);
        assert_eq!(choices.rows.iter().map(|r| r.row).collect::<Vec<_>>(), vec![0, 2]);
        assert!(!report.is_empty());
    }

    #[test]
    fn test_category_map() {
        let a = book(&[("survey", &[HEADER, &["text", "q1", "Name?"]])]);
        let b = book(&[("survey", &[HEADER, &["text", "q1", "Full name?"], &["text", "q2", "Age?"]])]);

        let map = diff(&a, &b, DiffMode::FormAware).unwrap().to_category_map();
        assert_eq!(map.get(CellRef::new(0, 1, 2)), Some(ChangeCategory::CellDiffers));
        assert_eq!(map.row_markers(0, 2), &[ChangeCategory::OnlyInNewFile]);
    }

    #[test]
    fn test_empty_workbook_is_rejected() {
        let a = book(&[("survey", &[HEADER])]);
        assert!(matches!(
            diff(&a, &Workbook::new(), DiffMode::Simple),
            Err(Error::EmptyInput(_))
        ));
    }

    #[test]
    fn test_display_lists_changes() {
        let a = book(&[("survey", &[HEADER, &["text", "q1", "Name?"]])]);
        let b = book(&[("survey", &[HEADER, &["text", "q1", "Full name?"]])]);

        let text = diff(&a, &b, DiffMode::FormAware).unwrap().to_string();
        assert!(text.contains("[survey]"));
        assert!(text.contains("C2: cell-differs"));
    }
}
