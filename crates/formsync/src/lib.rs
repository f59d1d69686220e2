//! # formsync
//!
//! Diff, merge and translation borrowing for ODK/XLSForm survey workbooks.
//!
//! formsync compares two versions of a form, reporting changes per row and
//! cell even when rows were inserted, deleted, reordered or duplicated, and
//! moves translations from existing forms into new ones.
//!
//! ## Features
//!
//! - Row/column alignment by content, then by identifying column
//! - Per-cell change categories, with a configurable highlight palette
//! - Translation dictionaries with provenance, "correct" sources and diverse
//!   translation detection
//! - Copy-on-write merging of translations into target forms
//! - Borrowing runs over any [`WorkbookSource`] / [`WorkbookSink`]
//!
//! ## Example
//!
//! ```rust
//! use formsync::prelude::*;
//!
//! let mut old = Worksheet::new("survey");
//! old.push_row(vec!["type", "name", "label::English", "label::French"]);
//! old.push_row(vec!["note", "hi", "Hello!", "Bonjour!"]);
//! let old = Workbook::from_worksheets(vec![old]).unwrap();
//!
//! let mut new = Worksheet::new("survey");
//! new.push_row(vec!["type", "name", "label::English", "label::French"]);
//! new.push_row(vec!["note", "hi", "Hello!", ""]);
//! let new = Workbook::from_worksheets(vec![new]).unwrap();
//!
//! // What changed?
//! let report = old.diff_against(&new, DiffMode::FormAware).unwrap();
//! assert_eq!(report.count(ChangeCategory::CellDiffers), 1);
//!
//! // Borrow the old translations
//! let dictionary = old.translation_dictionary("old.xlsx", &DictionaryOptions::default()).unwrap();
//! let outcome = new.merge_translations(&dictionary, &MergeOptions::default()).unwrap();
//! assert_eq!(outcome.workbook, old);
//! ```

pub mod borrow;
pub mod highlight;
pub mod prelude;

pub use borrow::{borrow_path, BorrowOptions, BorrowOutput, BorrowRun, BorrowSummary};
pub use highlight::{Color, HighlightPalette};

// Re-export core types
pub use formsync_core::{
    excel_errors, form_language, settings, survey_languages, CategoryMap, CellAddress, CellError, CellRef,
    CellValue, ChangeCategory, ColumnHeader, Error, ExcelErrorReport, FieldGroup, Result, Row, Workbook,
    WorkbookSink, WorkbookSource, Worksheet, MAX_SHEET_NAME_LEN,
};

// Re-export diff types
pub use formsync_diff::{
    align, align_with_options, classify, classify_edit, diff, diff_with_options, AlignOptions, Alignment, CellDiff,
    ColumnAlignment, DiffMode, DiffReport, Lookup, MatchKind, RowAlignment, RowDiff, RowStrategy, SheetDiff,
    SheetStatus,
};

// Re-export translation types
pub use formsync_translate::{
    build, merge, merge_with_options, Candidate, DictionaryBuilder, DictionaryOptions, MergeOptions, MergeOutcome,
    Origin, Resolution, ResolutionKind, TranslationDictionary, TranslationEntry, TranslationSource,
};

/// Extension trait for Workbook to add form-level operations
pub trait WorkbookFormExt {
    /// Compare this (old) workbook against a newer version
    fn diff_against(&self, newer: &Workbook, mode: DiffMode) -> Result<DiffReport>;

    /// Build a dictionary from this workbook alone
    fn translation_dictionary(&self, tag: &str, options: &DictionaryOptions) -> Result<TranslationDictionary>;

    /// Merge dictionary translations into a copy of this workbook
    fn merge_translations(&self, dictionary: &TranslationDictionary, options: &MergeOptions) -> Result<MergeOutcome>;

    /// Locate spreadsheet error values
    fn excel_errors(&self) -> ExcelErrorReport;

    /// Default language of the form
    fn form_language(&self) -> Option<String>;
}

impl WorkbookFormExt for Workbook {
    fn diff_against(&self, newer: &Workbook, mode: DiffMode) -> Result<DiffReport> {
        diff(self, newer, mode)
    }

    fn translation_dictionary(&self, tag: &str, options: &DictionaryOptions) -> Result<TranslationDictionary> {
        build(&[TranslationSource::new(self, tag)], options)
    }

    fn merge_translations(&self, dictionary: &TranslationDictionary, options: &MergeOptions) -> Result<MergeOutcome> {
        merge_with_options(self, dictionary, options)
    }

    fn excel_errors(&self) -> ExcelErrorReport {
        excel_errors(self)
    }

    fn form_language(&self) -> Option<String> {
        form_language(self)
    }
}
