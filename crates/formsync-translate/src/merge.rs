//! Merge Engine
//!
//! Fills and updates the translation columns of a target workbook from a
//! [`TranslationDictionary`]. The target is never modified; the merged copy
//! comes back in a [`MergeOutcome`] together with the category of every
//! translatable cell.

use std::collections::BTreeSet;

use log::{debug, warn};

use formsync_core::{
    form_language, CategoryMap, CellRef, ChangeCategory, ColumnHeader, Error, Result, Workbook, Worksheet,
};
use formsync_diff::{classify, Lookup};

use crate::dictionary::{source_column, TranslationDictionary};
use crate::normalize::{clean_string, split_numbered_text};

/// Options for merging translations
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MergeOptions {
    /// Leave cells alone when their key has several translations
    pub skip_diverse: bool,
    /// Copy the source text into blank cells without a translation
    pub carry: bool,
    /// Languages never written
    pub ignore_languages: BTreeSet<String>,
    /// Languages to add a column for in every translatable group
    pub add_languages: Vec<String>,
    /// Source language; `None` uses the target's form language
    pub source_language: Option<String>,
    /// Look keys up without their question number (default: true)
    pub strip_numbering: bool,
}

impl MergeOptions {
    pub fn skip_diverse(skip_diverse: bool) -> Self {
        Self {
            skip_diverse,
            ..Self::default()
        }
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            skip_diverse: false,
            carry: false,
            ignore_languages: BTreeSet::new(),
            add_languages: Vec::new(),
            source_language: None,
            strip_numbering: true,
        }
    }
}

/// Result of a merge
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// The merged copy of the target
    pub workbook: Workbook,
    /// Category of every translatable cell that is not `unchanged`
    pub categories: CategoryMap,
    /// Worksheets skipped for lack of a header
    pub warnings: Vec<Error>,
}

impl MergeOutcome {
    /// Number of cells with `category`
    pub fn count(&self, category: ChangeCategory) -> usize {
        self.categories.count(category)
    }

    /// Number of cells written
    pub fn written(&self) -> usize {
        self.categories
            .cells()
            .filter(|(_, category)| category.implies_write())
            .count()
    }
}

/// Merge with default options, optionally leaving diverse keys alone
pub fn merge(target: &Workbook, dictionary: &TranslationDictionary, skip_diverse: bool) -> Result<MergeOutcome> {
    merge_with_options(target, dictionary, &MergeOptions::skip_diverse(skip_diverse))
}

/// Merge translations into a copy of `target`
pub fn merge_with_options(
    target: &Workbook,
    dictionary: &TranslationDictionary,
    options: &MergeOptions,
) -> Result<MergeOutcome> {
    if target.is_empty() {
        return Err(Error::EmptyInput("merge target has no worksheets".into()));
    }

    let source_language = options.source_language.clone().or_else(|| form_language(target));
    let mut workbook = target.clone();
    let mut categories = CategoryMap::new();
    let mut warnings = Vec::new();

    for (index, sheet) in workbook.worksheets_mut().enumerate() {
        if sheet.is_empty() {
            continue;
        }
        if let Err(err) = sheet.require_header() {
            warn!("Skipping worksheet: {}", err);
            warnings.push(err);
            continue;
        }
        if !options.add_languages.is_empty() {
            add_language_columns(sheet, &options.add_languages);
        }
        merge_sheet(sheet, index, dictionary, source_language.as_deref(), options, &mut categories);
    }

    debug!("Merge summary: {:?}", categories.counts());
    Ok(MergeOutcome {
        workbook,
        categories,
        warnings,
    })
}

/// Append `field::language` columns missing from translatable groups
fn add_language_columns(sheet: &mut Worksheet, languages: &[String]) {
    for group in sheet.field_groups() {
        for language in languages {
            if group.column(Some(language)).is_none() {
                let col = sheet.add_column(&ColumnHeader::compose(&group.field, language));
                debug!("Worksheet '{}': added column {} for {}", sheet.name(), col, language);
            }
        }
    }
}

fn merge_sheet(
    sheet: &mut Worksheet,
    index: usize,
    dictionary: &TranslationDictionary,
    source_language: Option<&str>,
    options: &MergeOptions,
    categories: &mut CategoryMap,
) {
    for group in sheet.field_groups() {
        let Some(source_col) = source_column(&group, source_language) else {
            continue;
        };
        let targets: Vec<(String, usize)> = group
            .languages
            .into_iter()
            .filter(|(lang, col)| {
                *col != source_col && Some(lang.as_str()) != source_language && !options.ignore_languages.contains(lang)
            })
            .collect();

        for row in 1..sheet.row_count() {
            let source_text = clean_string(&sheet.text_at(row, source_col));
            if source_text.is_empty() {
                continue;
            }
            let (prefix, key) = if options.strip_numbering {
                split_numbered_text(&source_text)
            } else {
                ("", source_text.as_str())
            };

            for (language, col) in &targets {
                let cell = CellRef::new(index, row, *col);
                let old = clean_string(&sheet.text_at(row, *col));
                let resolution = dictionary.resolve(key, language);

                if options.skip_diverse && resolution.is_some_and(|r| r.is_diverse()) {
                    categories.insert(cell, ChangeCategory::DiverseUntouched);
                    continue;
                }

                let proposed = resolution.map(|r| (format!("{}{}", prefix, r.text), r.is_correct()));
                let lookup = proposed.as_ref().map(|(text, correct)| Lookup::new(text, *correct));
                let mut category = classify(&old, lookup);
                let mut write = proposed.map(|(text, _)| text);

                if options.carry && category == ChangeCategory::NoDictionaryEntryNoPreexisting {
                    category = ChangeCategory::TranslationFilled;
                    write = Some(source_text.clone());
                }

                if category.implies_write() {
                    if let Some(text) = write {
                        sheet.set_value_at(row, *col, text);
                    }
                }
                if category != ChangeCategory::Unchanged {
                    categories.insert(cell, category);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::{build, DictionaryOptions, TranslationSource};
    use pretty_assertions::assert_eq;

    const HEADER: &[&str] = &["type", "name", "label::English", "label::French"];

    fn form(rows: &[&[&str]]) -> Workbook {
        let mut survey = Worksheet::new("survey");
        for row in rows {
            survey.push_row(row.iter().copied());
        }
        Workbook::from_worksheets(vec![survey]).unwrap()
    }

    fn dictionary(sources: &[&Workbook]) -> TranslationDictionary {
        let tags: Vec<String> = (0..sources.len()).map(|i| format!("source{}", i)).collect();
        let sources: Vec<TranslationSource<'_>> = sources
            .iter()
            .zip(&tags)
            .map(|(wb, tag)| TranslationSource::new(wb, tag))
            .collect();
        build(&sources, &DictionaryOptions::default()).unwrap()
    }

    #[test]
    fn test_fills_blank_translation() {
        let source = form(&[HEADER, &["note", "hi", "Hello!", "Bonjour!"]]);
        let target = form(&[HEADER, &["note", "hi", "Hello!", ""]]);

        let outcome = merge(&target, &dictionary(&[&source]), false).unwrap();
        let survey = outcome.workbook.worksheet_by_name("survey").unwrap();
        assert_eq!(survey.text_at(1, 3), "Bonjour!");
        assert_eq!(
            outcome.categories.get(CellRef::new(0, 1, 3)),
            Some(ChangeCategory::TranslationFilled)
        );
        assert_eq!(target.worksheet(0).unwrap().text_at(1, 3), "");
    }

    #[test]
    fn test_diverse_skipped() {
        let a = form(&[HEADER, &["note", "n", "Yes", "Oui"]]);
        let b = form(&[HEADER, &["note", "n", "Yes", "Ouais"]]);
        let target = form(&[HEADER, &["note", "n", "Yes", ""]]);
        let dict = dictionary(&[&a, &b]);

        let outcome = merge(&target, &dict, true).unwrap();
        assert_eq!(outcome.workbook, target);
        assert_eq!(
            outcome.categories.get(CellRef::new(0, 1, 3)),
            Some(ChangeCategory::DiverseUntouched)
        );

        let outcome = merge(&target, &dict, false).unwrap();
        assert_eq!(outcome.workbook.worksheet(0).unwrap().text_at(1, 3), "Oui");
    }

    #[test]
    fn test_changed_same_and_missing() {
        let source = form(&[
            HEADER,
            &["note", "a", "Hello!", "Bonjour!"],
            &["note", "b", "Bye", "Au revoir"],
        ]);
        let target = form(&[
            HEADER,
            &["note", "a", "Hello!", "Salut!"],
            &["note", "b", "Bye", "Au revoir"],
            &["note", "c", "Thanks", "Merci"],
            &["note", "d", "Please", ""],
        ]);

        let outcome = merge(&target, &dictionary(&[&source]), false).unwrap();
        let get = |row| outcome.categories.get(CellRef::new(0, row, 3));
        assert_eq!(get(1), Some(ChangeCategory::TranslationChanged));
        assert_eq!(get(2), Some(ChangeCategory::TranslationSame));
        assert_eq!(get(3), Some(ChangeCategory::NoDictionaryEntryHasPreexisting));
        assert_eq!(get(4), Some(ChangeCategory::NoDictionaryEntryNoPreexisting));
        assert_eq!(outcome.written(), 1);
        assert_eq!(outcome.workbook.worksheet(0).unwrap().text_at(3, 3), "Merci");
    }

    #[test]
    fn test_number_prefix_reattached() {
        let source = form(&[HEADER, &["text", "q", "3. Your age?", "3. Votre âge ?"]]);
        let target = form(&[HEADER, &["text", "q", "12. Your age?", ""]]);

        let outcome = merge(&target, &dictionary(&[&source]), false).unwrap();
        assert_eq!(outcome.workbook.worksheet(0).unwrap().text_at(1, 3), "12. Votre âge ?");
    }

    #[test]
    fn test_carry_and_add_languages() {
        let source = form(&[HEADER, &["note", "hi", "Hello!", "Bonjour!"]]);
        let target = form(&[
            &["type", "name", "label::English", "label::French"],
            &["note", "hi", "Hello!", ""],
            &["note", "bye", "Bye", ""],
        ]);
        let options = MergeOptions {
            carry: true,
            add_languages: vec!["Swahili".to_string()],
            ..MergeOptions::default()
        };

        let outcome = merge_with_options(&target, &dictionary(&[&source]), &options).unwrap();
        let survey = outcome.workbook.worksheet(0).unwrap();
        assert_eq!(survey.header(4), "label::Swahili");
        assert_eq!(survey.text_at(2, 3), "Bye");
        assert_eq!(survey.text_at(1, 4), "Hello!");
        assert_eq!(outcome.count(ChangeCategory::TranslationFilled), 4);
    }

    #[test]
    fn test_ignored_language_untouched() {
        let source = form(&[HEADER, &["note", "hi", "Hello!", "Bonjour!"]]);
        let target = form(&[HEADER, &["note", "hi", "Hello!", ""]]);
        let options = MergeOptions {
            ignore_languages: ["French".to_string()].into_iter().collect(),
            ..MergeOptions::default()
        };

        let outcome = merge_with_options(&target, &dictionary(&[&source]), &options).unwrap();
        assert_eq!(outcome.workbook, target);
        assert!(outcome.categories.is_empty());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let source = form(&[
            HEADER,
            &["note", "hi", "Hello!", "Bonjour!"],
            &["text", "q", "1. Name?", "1. Nom ?"],
        ]);
        let target = form(&[
            HEADER,
            &["note", "hi", "Hello!", ""],
            &["text", "q", "2. Name?", "Nom"],
        ]);

        let merged = merge(&target, &dictionary(&[&source]), false).unwrap().workbook;
        let again = merge(&merged, &dictionary(&[&merged]), false).unwrap();
        assert_eq!(again.count(ChangeCategory::TranslationChanged), 0);
        assert_eq!(again.count(ChangeCategory::TranslationFilled), 0);
        assert_eq!(again.workbook, merged);
    }

    #[test]
    fn test_empty_target() {
        let dict = TranslationDictionary::default();
        assert!(matches!(merge(&Workbook::new(), &dict, false), Err(Error::EmptyInput(_))));
    }

    #[test]
    fn test_headerless_sheet_skipped_with_warning() {
        let mut target = form(&[HEADER, &["note", "hi", "Hello!", ""]]);
        let mut blank = Worksheet::new("notes");
        blank.push_row(vec![""]);
        blank.push_row(vec!["stray"]);
        target.add_worksheet(blank).unwrap();

        let outcome = merge(&target, &TranslationDictionary::default(), false).unwrap();
        assert_eq!(outcome.warnings.len(), 1);
    }
}
