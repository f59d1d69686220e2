//! Change categories
//!
//! Every cell (and some rows) considered by a diff or merge run receives a
//! [`ChangeCategory`]. Categories are computed fresh for each run and handed
//! to a renderer through a [`CategoryMap`]; how a category looks (its
//! highlight color) is the renderer's business.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Classification of a cell or row change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ChangeCategory {
    /// Nothing to report
    Unchanged,
    /// Dictionary value equals the existing translation
    TranslationSame,
    /// Existing translation replaced by the dictionary value
    TranslationChanged,
    /// Blank cell filled from the dictionary
    TranslationFilled,
    /// No dictionary entry; the cell already had text
    NoDictionaryEntryHasPreexisting,
    /// No dictionary entry; the cell is blank
    NoDictionaryEntryNoPreexisting,
    /// Key has several translations and was left alone
    DiverseUntouched,
    /// Surplus occurrence of a duplicated row
    DuplicateExcluded,
    /// Row or column exists only in the new file
    OnlyInNewFile,
    /// Cell text differs between versions
    CellDiffers,
    /// Row moved relative to the other matched rows
    RowReordered,
}

impl ChangeCategory {
    /// Every category, in declaration order
    pub const ALL: [ChangeCategory; 11] = [
        ChangeCategory::Unchanged,
        ChangeCategory::TranslationSame,
        ChangeCategory::TranslationChanged,
        ChangeCategory::TranslationFilled,
        ChangeCategory::NoDictionaryEntryHasPreexisting,
        ChangeCategory::NoDictionaryEntryNoPreexisting,
        ChangeCategory::DiverseUntouched,
        ChangeCategory::DuplicateExcluded,
        ChangeCategory::OnlyInNewFile,
        ChangeCategory::CellDiffers,
        ChangeCategory::RowReordered,
    ];

    /// Kebab-case name of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeCategory::Unchanged => "unchanged",
            ChangeCategory::TranslationSame => "translation-same",
            ChangeCategory::TranslationChanged => "translation-changed",
            ChangeCategory::TranslationFilled => "translation-filled",
            ChangeCategory::NoDictionaryEntryHasPreexisting => "no-dictionary-entry-has-preexisting",
            ChangeCategory::NoDictionaryEntryNoPreexisting => "no-dictionary-entry-no-preexisting",
            ChangeCategory::DiverseUntouched => "diverse-untouched",
            ChangeCategory::DuplicateExcluded => "duplicate-excluded",
            ChangeCategory::OnlyInNewFile => "only-in-new-file",
            ChangeCategory::CellDiffers => "cell-differs",
            ChangeCategory::RowReordered => "row-reordered",
        }
    }

    /// Whether the merge engine writes the resolved value for this category
    pub fn implies_write(&self) -> bool {
        matches!(
            self,
            ChangeCategory::TranslationChanged | ChangeCategory::TranslationFilled
        )
    }
}

impl fmt::Display for ChangeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChangeCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::other(format!("unknown change category: {}", s)))
    }
}

/// Location of a cell: worksheet index, row index, column index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRef {
    pub sheet: usize,
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(sheet: usize, row: usize, col: usize) -> Self {
        Self { sheet, row, col }
    }
}

/// Per-cell and per-row categories produced by one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryMap {
    cells: BTreeMap<CellRef, ChangeCategory>,
    rows: BTreeMap<(usize, usize), Vec<ChangeCategory>>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the category of a cell, replacing any earlier one
    pub fn insert(&mut self, cell: CellRef, category: ChangeCategory) {
        self.cells.insert(cell, category);
    }

    /// Record a row-level marker (markers accumulate, without repeats)
    pub fn mark_row(&mut self, sheet: usize, row: usize, category: ChangeCategory) {
        let markers = self.rows.entry((sheet, row)).or_default();
        if !markers.contains(&category) {
            markers.push(category);
        }
    }

    /// Category of a cell
    pub fn get(&self, cell: CellRef) -> Option<ChangeCategory> {
        self.cells.get(&cell).copied()
    }

    /// Row-level markers of a row
    pub fn row_markers(&self, sheet: usize, row: usize) -> &[ChangeCategory] {
        self.rows
            .get(&(sheet, row))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Iterate over cell categories in sheet/row/column order
    pub fn cells(&self) -> impl Iterator<Item = (CellRef, ChangeCategory)> + '_ {
        self.cells.iter().map(|(k, v)| (*k, *v))
    }

    /// Iterate over row markers in sheet/row order
    pub fn rows(&self) -> impl Iterator<Item = ((usize, usize), &[ChangeCategory])> {
        self.rows.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    /// Number of cells (plus marked rows) carrying a category
    pub fn count(&self, category: ChangeCategory) -> usize {
        let cells = self.cells.values().filter(|c| **c == category).count();
        let rows = self
            .rows
            .values()
            .filter(|markers| markers.contains(&category))
            .count();
        cells + rows
    }

    /// Counts for every category that occurs at least once
    pub fn counts(&self) -> BTreeMap<ChangeCategory, usize> {
        let mut counts = BTreeMap::new();
        for category in self.cells.values() {
            *counts.entry(*category).or_insert(0) += 1;
        }
        for category in self.rows.values().flatten() {
            *counts.entry(*category).or_insert(0) += 1;
        }
        counts
    }

    /// Number of categorized cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if nothing was categorized
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.rows.is_empty()
    }

    /// Absorb another map, its entries taking precedence
    pub fn extend(&mut self, other: CategoryMap) {
        self.cells.extend(other.cells);
        for ((sheet, row), markers) in other.rows {
            for marker in markers {
                self.mark_row(sheet, row, marker);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for category in ChangeCategory::ALL {
            assert_eq!(category.as_str().parse::<ChangeCategory>().unwrap(), category);
        }
        assert!("purple".parse::<ChangeCategory>().is_err());
    }

    #[test]
    fn test_implies_write() {
        assert!(ChangeCategory::TranslationFilled.implies_write());
        assert!(ChangeCategory::TranslationChanged.implies_write());
        assert!(!ChangeCategory::TranslationSame.implies_write());
        assert!(!ChangeCategory::DiverseUntouched.implies_write());
    }

    #[test]
    fn test_category_map_counts() {
        let mut map = CategoryMap::new();
        map.insert(CellRef::new(0, 1, 2), ChangeCategory::TranslationFilled);
        map.insert(CellRef::new(0, 2, 2), ChangeCategory::TranslationFilled);
        map.insert(CellRef::new(0, 2, 2), ChangeCategory::TranslationSame);
        map.mark_row(0, 3, ChangeCategory::RowReordered);
        map.mark_row(0, 3, ChangeCategory::RowReordered);

        assert_eq!(map.len(), 2);
        assert_eq!(map.count(ChangeCategory::TranslationFilled), 1);
        assert_eq!(map.count(ChangeCategory::RowReordered), 1);
        assert_eq!(map.row_markers(0, 3), &[ChangeCategory::RowReordered]);
        assert_eq!(map.row_markers(0, 4), &[] as &[ChangeCategory]);
        assert_eq!(map.counts().len(), 3);
    }
}
