//! Seams to the spreadsheet file layer
//!
//! Reading and writing xlsx files is not part of this workspace. Callers plug
//! a reader and a renderer in through these traits.

use std::path::Path;

use crate::category::CategoryMap;
use crate::error::Result;
use crate::workbook::Workbook;

/// Supplies workbook models from files
///
/// Implementations must preserve row and column order and keep the
/// difference between an empty string and an absent cell where the file
/// format has one.
pub trait WorkbookSource {
    /// Load the workbook stored at `path`
    fn load(&self, path: &Path) -> Result<Workbook>;
}

/// Renders workbooks (with highlights) to files
pub trait WorkbookSink {
    /// Write `workbook` to `path`, highlighting cells and rows per `categories`
    fn write(&mut self, path: &Path, workbook: &Workbook, categories: &CategoryMap) -> Result<()>;
}

impl<S: WorkbookSource + ?Sized> WorkbookSource for &S {
    fn load(&self, path: &Path) -> Result<Workbook> {
        (**self).load(path)
    }
}

impl<S: WorkbookSink + ?Sized> WorkbookSink for &mut S {
    fn write(&mut self, path: &Path, workbook: &Workbook, categories: &CategoryMap) -> Result<()> {
        (**self).write(path, workbook, categories)
    }
}
