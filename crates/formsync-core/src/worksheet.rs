//! Worksheet type

use crate::cell::{CellAddress, CellValue};
use crate::error::{Error, Result};
use crate::header::{ColumnHeader, FieldGroup};
use crate::row::Row;

static EMPTY: CellValue = CellValue::Empty;

/// A worksheet (single sheet in a workbook)
///
/// Row 0 is the header row; every other row is a data row whose cells are
/// associated with a column through the header text in the same position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Rows, header first
    rows: Vec<Row>,
}

impl Worksheet {
    /// Create a new empty worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Create a worksheet from rows (header first)
    pub fn from_rows<S: Into<String>>(name: S, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    // === Row Access ===

    /// Append a row built from anything convertible into cell values
    pub fn push_row<I, V>(&mut self, cells: I) -> usize
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.rows.push(cells.into_iter().collect());
        self.rows.len() - 1
    }

    /// Get a row by index
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Iterate over all rows, header included
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Iterate over `(row index, row)` for every row after the header
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &Row)> {
        self.rows.iter().enumerate().skip(1)
    }

    /// Number of rows, header included
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (width of the widest row)
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Row::len).max().unwrap_or(0)
    }

    /// Check if the sheet has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    // === Header Access ===

    /// Get the header row, if any
    pub fn header_row(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Get the header row, failing when the sheet has no usable header
    pub fn require_header(&self) -> Result<&Row> {
        match self.rows.first() {
            None => Err(Error::malformed(&self.name, "no header row")),
            Some(row) if row.is_blank() => Err(Error::malformed(&self.name, "header row is blank")),
            Some(row) => Ok(row),
        }
    }

    /// Trimmed header text of a column (empty if there is none)
    pub fn header(&self, col: usize) -> String {
        self.header_row()
            .map(|row| row.cell(col).display_text().trim().to_string())
            .unwrap_or_default()
    }

    /// All header texts, one per column
    pub fn headers(&self) -> Vec<String> {
        (0..self.column_count()).map(|col| self.header(col)).collect()
    }

    /// Index of the first column whose header equals `header`
    pub fn column_index(&self, header: &str) -> Option<usize> {
        let header = header.trim();
        if header.is_empty() {
            return None;
        }
        (0..self.column_count()).find(|&col| self.header(col) == header)
    }

    /// Parsed headers of every column
    pub fn column_headers(&self) -> Vec<ColumnHeader> {
        self.headers()
            .iter()
            .map(|text| ColumnHeader::parse(text))
            .collect()
    }

    /// Languages appearing in `field::language` headers, sorted and deduplicated
    pub fn languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self
            .column_headers()
            .into_iter()
            .filter_map(|header| header.language)
            .collect();
        languages.sort();
        languages.dedup();
        languages
    }

    /// Translatable column groups of this sheet
    pub fn field_groups(&self) -> Vec<FieldGroup> {
        FieldGroup::collect(&self.column_headers())
    }

    // === Cell Access ===

    /// Get a cell value by indices (empty past the grid)
    pub fn value_at(&self, row: usize, col: usize) -> &CellValue {
        self.rows.get(row).map(|r| r.cell(col)).unwrap_or(&EMPTY)
    }

    /// Display text of a cell
    pub fn text_at(&self, row: usize, col: usize) -> String {
        self.value_at(row, col).display_text()
    }

    /// Set a cell value by indices, growing the grid as needed
    pub fn set_value_at<V: Into<CellValue>>(&mut self, row: usize, col: usize, value: V) {
        if row >= self.rows.len() {
            self.rows.resize_with(row + 1, Row::new);
        }
        self.rows[row].set_cell(col, value.into());
    }

    /// Iterate over every non-empty cell with its address
    pub fn cells(&self) -> impl Iterator<Item = (CellAddress, &CellValue)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.cells()
                .enumerate()
                .filter(|(_, value)| !value.is_empty())
                .map(move |(c, value)| (CellAddress::new(r, c), value))
        })
    }

    // === Column Operations ===

    /// Append a column with the given header, returning its index
    ///
    /// If a column with the same header already exists its index is returned
    /// and nothing is added.
    pub fn add_column(&mut self, header: &str) -> usize {
        if let Some(col) = self.column_index(header) {
            return col;
        }
        let col = self.column_count();
        self.set_value_at(0, col, header);
        col
    }
}
