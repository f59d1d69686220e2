//! # formsync-core
//!
//! Core data structures for the formsync survey-form diff/merge engine.
//!
//! This crate provides the fundamental types used throughout formsync:
//! - [`CellValue`] - Represents cell values (text, numbers, booleans, errors)
//! - [`CellAddress`] - Cell addressing for diagnostics
//! - [`Workbook`], [`Worksheet`], [`Row`] - The tabular document model
//! - [`ColumnHeader`] - `field::language` header parsing for XLSForm columns
//! - [`ChangeCategory`] and [`CategoryMap`] - Per-cell change classification
//! - [`WorkbookSource`] and [`WorkbookSink`] - Seams to the file I/O layer
//!
//! ## Example
//!
//! ```rust
//! use formsync_core::{Workbook, Worksheet};
//!
//! let mut survey = Worksheet::new("survey");
//! survey.push_row(vec!["type", "name", "label::English", "label::French"]);
//! survey.push_row(vec!["note", "hello", "Hello!", ""]);
//!
//! let mut workbook = Workbook::new();
//! workbook.add_worksheet(survey).unwrap();
//!
//! let sheet = workbook.worksheet_by_name("survey").unwrap();
//! assert_eq!(sheet.column_index("label::French"), Some(3));
//! assert!(sheet.value_at(1, 3).is_blank());
//! ```

pub mod category;
pub mod cell;
pub mod error;
pub mod header;
pub mod io;
pub mod row;
pub mod workbook;
pub mod worksheet;
pub mod xlsform;

// Re-exports for convenience
pub use category::{CategoryMap, CellRef, ChangeCategory};
pub use cell::{CellAddress, CellError, CellValue};
pub use error::{Error, Result};
pub use header::{ColumnHeader, FieldGroup};
pub use io::{WorkbookSink, WorkbookSource};
pub use row::Row;
pub use workbook::Workbook;
pub use worksheet::Worksheet;
pub use xlsform::{excel_errors, form_language, settings, survey_languages, ExcelErrorReport};

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
