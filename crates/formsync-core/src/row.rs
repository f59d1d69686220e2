//! Row type

use crate::cell::CellValue;

static EMPTY: CellValue = CellValue::Empty;

/// An ordered sequence of cells
///
/// Rows may be ragged: any column past the end of the row reads as
/// [`CellValue::Empty`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Row {
    cells: Vec<CellValue>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a row from cell values
    pub fn from_cells(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// Get a cell by column index
    pub fn cell(&self, col: usize) -> &CellValue {
        self.cells.get(col).unwrap_or(&EMPTY)
    }

    /// Set a cell value, growing the row with empty cells as needed
    pub fn set_cell(&mut self, col: usize, value: CellValue) {
        if col >= self.cells.len() {
            self.cells.resize(col + 1, CellValue::Empty);
        }
        self.cells[col] = value;
    }

    /// Iterate over the stored cells
    pub fn cells(&self) -> impl Iterator<Item = &CellValue> {
        self.cells.iter()
    }

    /// Number of stored cells (including trailing blanks)
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if row stores no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Check if every cell in the row is blank
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_blank)
    }
}

impl<V: Into<CellValue>> FromIterator<V> for Row {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ragged_access() {
        let row: Row = vec!["a", "b"].into_iter().collect();
        assert_eq!(row.cell(1), &CellValue::text("b"));
        assert_eq!(row.cell(7), &CellValue::Empty);
    }

    #[test]
    fn test_set_cell_grows() {
        let mut row = Row::new();
        row.set_cell(3, CellValue::text("x"));
        assert_eq!(row.len(), 4);
        assert!(row.cell(0).is_empty());
        assert!(!row.is_blank());
    }
}
