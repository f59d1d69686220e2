//! # formsync-diff
//!
//! Structured comparison of two worksheets whose rows may have been inserted,
//! deleted, reordered or duplicated.
//!
//! - [`classify`] - Cell Classifier: one [`ChangeCategory`] per cell
//! - [`align`] - Row/Column Matcher: columns by header, rows by content then key
//! - [`diff`] - Diff Report Builder: per-row, per-cell annotations
//!
//! ## Example
//!
//! ```rust
//! use formsync_core::{ChangeCategory, Workbook, Worksheet};
//! use formsync_diff::{diff, DiffMode};
//!
//! let mut old = Worksheet::new("survey");
//! old.push_row(vec!["type", "name", "label"]);
//! old.push_row(vec!["text", "q1", "Name?"]);
//! old.push_row(vec!["integer", "q2", "Age?"]);
//!
//! let mut new = Worksheet::new("survey");
//! new.push_row(vec!["type", "name", "label"]);
//! new.push_row(vec!["integer", "q2", "Age?"]);
//! new.push_row(vec!["text", "q1", "Full name?"]);
//!
//! let a = Workbook::from_worksheets(vec![old]).unwrap();
//! let b = Workbook::from_worksheets(vec![new]).unwrap();
//! let report = diff(&a, &b, DiffMode::FormAware).unwrap();
//!
//! assert_eq!(report.count(ChangeCategory::CellDiffers), 1);
//! assert_eq!(report.count(ChangeCategory::RowReordered), 2);
//! ```

pub mod align;
pub mod classify;
pub mod options;
pub mod report;

pub use align::{align, align_with_options, Alignment, ColumnAlignment, MatchKind, RowAlignment, RowStrategy};
pub use classify::{classify, classify_edit, Lookup};
pub use options::AlignOptions;
pub use report::{diff, diff_with_options, CellDiff, DiffMode, DiffReport, RowDiff, SheetDiff, SheetStatus};

pub use formsync_core::ChangeCategory;
