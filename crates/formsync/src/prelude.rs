//! Prelude module - common imports for formsync users
//!
//! ```rust
//! use formsync::prelude::*;
//! ```

pub use crate::{
    // Orchestration
    BorrowOptions,
    BorrowRun,
    CategoryMap,
    // Cell types
    CellValue,
    ChangeCategory,
    Color,
    DictionaryOptions,
    // Diff types
    DiffMode,
    DiffReport,
    // Error types
    Error,
    HighlightPalette,
    // Translation types
    MergeOptions,
    MergeOutcome,
    Result,
    TranslationDictionary,
    TranslationSource,
    // Main types
    Workbook,
    // Extension traits
    WorkbookFormExt,
    // I/O seams
    WorkbookSink,
    WorkbookSource,
    Worksheet,
};
