//! Cell Classifier
//!
//! Pure functions deciding the [`ChangeCategory`] of a single cell from its
//! existing text and the value a dictionary (or a newer file version)
//! proposes for it.

use formsync_core::ChangeCategory;

/// What the dictionary offers for a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup<'a> {
    /// Resolved value
    pub value: &'a str,
    /// Whether the value comes from a file marked correct
    ///
    /// Provenance only: it never changes the category.
    pub correct: bool,
}

impl<'a> Lookup<'a> {
    pub fn new(value: &'a str, correct: bool) -> Self {
        Self { value, correct }
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Classify a cell against a dictionary lookup
///
/// `lookup` is `None` when the dictionary has no entry for the cell's key.
/// A lookup resolving to blank text counts as no entry, so a translation is
/// never blanked out.
pub fn classify(old_value: &str, lookup: Option<Lookup<'_>>) -> ChangeCategory {
    let resolved = lookup.map(|l| l.value).filter(|v| !is_blank(v));

    match resolved {
        None if is_blank(old_value) => {
            if lookup.is_some() {
                ChangeCategory::Unchanged
            } else {
                ChangeCategory::NoDictionaryEntryNoPreexisting
            }
        }
        None => ChangeCategory::NoDictionaryEntryHasPreexisting,
        Some(value) if value == old_value => ChangeCategory::TranslationSame,
        Some(_) if is_blank(old_value) => ChangeCategory::TranslationFilled,
        Some(_) => ChangeCategory::TranslationChanged,
    }
}

/// Classify a cell edit between two versions of a file
///
/// Built on [`classify`] with the new text as the proposed value: no change
/// is `unchanged`, anything else is `cell-differs`.
pub fn classify_edit(old_value: &str, new_value: &str) -> ChangeCategory {
    if is_blank(old_value) && is_blank(new_value) {
        return ChangeCategory::Unchanged;
    }
    match classify(old_value, Some(Lookup::new(new_value, false))) {
        ChangeCategory::Unchanged | ChangeCategory::TranslationSame => ChangeCategory::Unchanged,
        _ => ChangeCategory::CellDiffers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(value: &str) -> Option<Lookup<'_>> {
        Some(Lookup::new(value, false))
    }

    #[test]
    fn test_no_entry() {
        assert_eq!(
            classify("Bonjour", None),
            ChangeCategory::NoDictionaryEntryHasPreexisting
        );
        assert_eq!(classify("", None), ChangeCategory::NoDictionaryEntryNoPreexisting);
    }

    #[test]
    fn test_with_entry() {
        assert_eq!(classify("Bonjour", entry("Bonjour")), ChangeCategory::TranslationSame);
        assert_eq!(classify("", entry("Bonjour")), ChangeCategory::TranslationFilled);
        assert_eq!(classify("Salut", entry("Bonjour")), ChangeCategory::TranslationChanged);
    }

    #[test]
    fn test_blank_entry_never_erases() {
        assert_eq!(classify("", entry("")), ChangeCategory::Unchanged);
        assert_eq!(
            classify("Salut", entry("  ")),
            ChangeCategory::NoDictionaryEntryHasPreexisting
        );
    }

    #[test]
    fn test_correctness_does_not_change_category() {
        for old in ["", "Salut", "Bonjour"] {
            assert_eq!(
                classify(old, Some(Lookup::new("Bonjour", true))),
                classify(old, Some(Lookup::new("Bonjour", false)))
            );
        }
    }

    #[test]
    fn test_classify_edit() {
        assert_eq!(classify_edit("", ""), ChangeCategory::Unchanged);
        assert_eq!(classify_edit("a", "a"), ChangeCategory::Unchanged);
        assert_eq!(classify_edit("a", "b"), ChangeCategory::CellDiffers);
        assert_eq!(classify_edit("", "b"), ChangeCategory::CellDiffers);
        assert_eq!(classify_edit("a", ""), ChangeCategory::CellDiffers);
    }
}
