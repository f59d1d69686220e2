//! Translation borrowing runs
//!
//! A run loads a set of source forms, builds one translation dictionary from
//! them, then either writes the dictionary out as a table or merges it into
//! each target form. Loading and writing go through a [`WorkbookSource`] and
//! a [`WorkbookSink`].
//!
//! # Example
//!
//! ```rust,ignore
//! use formsync::borrow::{BorrowOptions, BorrowRun};
//!
//! let options = BorrowOptions {
//!     merge: vec!["new/household.xlsx".into()],
//!     skip_diverse: true,
//!     ..BorrowOptions::default()
//! };
//! let summary = BorrowRun::new(vec!["old/household.xlsx".into()], options)
//!     .run(&reader, &mut writer)?;
//! // writes new/household-borrow.xlsx
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use log::{info, warn};

use formsync_core::{CategoryMap, ChangeCategory, Error, Result, Workbook, WorkbookSink, WorkbookSource};
use formsync_translate::{
    DictionaryBuilder, DictionaryOptions, MergeOptions, TranslationDictionary, TranslationSource,
};

/// Output path of a translation table when none is given
pub const DEFAULT_TRANSLATIONS_PATH: &str = "translations.xlsx";

/// Suffix added to the file stem of merged forms
pub const BORROW_SUFFIX: &str = "-borrow";

/// Options for a borrowing run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BorrowOptions {
    /// Forms whose translations take precedence; loaded before the sources
    pub correct: Vec<PathBuf>,
    /// Forms receiving translations; empty writes a translation table instead
    pub merge: Vec<PathBuf>,
    /// Leave cells with diverse translations alone
    pub skip_diverse: bool,
    /// Write only the diverse translations of this language (table mode)
    pub diverse: Option<String>,
    /// Languages to add a column for
    pub add_languages: Vec<String>,
    /// Languages neither collected nor written
    pub ignore_languages: BTreeSet<String>,
    /// Copy source text into untranslated cells
    pub carry: bool,
    /// Output file, or output directory when merging several forms
    pub outpath: Option<PathBuf>,
    /// Source language; `None` uses each form's own
    pub source_language: Option<String>,
}

impl BorrowOptions {
    fn dictionary_options(&self) -> DictionaryOptions {
        DictionaryOptions {
            source_language: self.source_language.clone(),
            ignore_languages: self.ignore_languages.clone(),
            ..DictionaryOptions::default()
        }
    }

    fn merge_options(&self) -> MergeOptions {
        let mut add_languages = self.add_languages.clone();
        add_languages.sort();
        add_languages.dedup();
        MergeOptions {
            skip_diverse: self.skip_diverse,
            carry: self.carry,
            ignore_languages: self.ignore_languages.clone(),
            add_languages,
            source_language: self.source_language.clone(),
            ..MergeOptions::default()
        }
    }
}

/// A file written by a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BorrowOutput {
    /// The full translation table
    Translations { path: PathBuf },
    /// The diverse translations of one language
    Diverse { path: PathBuf, language: String },
    /// A merged copy of a target form
    Merged {
        target: PathBuf,
        path: PathBuf,
        counts: BTreeMap<ChangeCategory, usize>,
    },
}

impl BorrowOutput {
    pub fn path(&self) -> &Path {
        match self {
            BorrowOutput::Translations { path }
            | BorrowOutput::Diverse { path, .. }
            | BorrowOutput::Merged { path, .. } => path,
        }
    }
}

/// What a run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowSummary {
    /// Loaded sources in dictionary order
    pub sources: Vec<PathBuf>,
    /// Number of dictionary keys
    pub keys: usize,
    pub outputs: Vec<BorrowOutput>,
    /// Conflicts and skipped worksheets
    pub warnings: Vec<Error>,
}

/// `<stem>-borrow.<ext>` next to `target`
pub fn borrow_path(target: &Path) -> PathBuf {
    target.with_file_name(borrow_file_name(target))
}

fn borrow_file_name(target: &Path) -> String {
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match target.extension() {
        Some(ext) => format!("{}{}.{}", stem, BORROW_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, BORROW_SUFFIX),
    }
}

/// A configured borrowing run
#[derive(Debug, Clone)]
pub struct BorrowRun {
    sources: Vec<PathBuf>,
    options: BorrowOptions,
}

impl BorrowRun {
    pub fn new(sources: Vec<PathBuf>, options: BorrowOptions) -> Self {
        Self { sources, options }
    }

    /// Correct files first, then the other sources, each path once
    pub fn load_order(&self) -> Vec<(PathBuf, bool)> {
        let mut seen: BTreeSet<&PathBuf> = BTreeSet::new();
        let correct = self.options.correct.iter().map(|p| (p, true));
        let sources = self.sources.iter().map(|p| (p, false));
        correct
            .chain(sources)
            .filter(|(path, _)| seen.insert(*path))
            .map(|(path, correct)| (path.clone(), correct))
            .collect()
    }

    /// Output path for a merged target
    pub fn output_path(&self, target: &Path) -> PathBuf {
        match &self.options.outpath {
            None => borrow_path(target),
            Some(dir) if self.options.merge.len() > 1 => dir.join(borrow_file_name(target)),
            Some(path) => path.clone(),
        }
    }

    /// Load every source and build the dictionary
    pub fn dictionary<S: WorkbookSource>(&self, source: &S) -> Result<(TranslationDictionary, Vec<PathBuf>)> {
        let order = self.load_order();
        if order.is_empty() {
            return Err(Error::EmptyInput("no source forms given".into()));
        }

        let mut loaded = Vec::with_capacity(order.len());
        for (path, correct) in &order {
            loaded.push((source.load(path)?, path.display().to_string(), *correct));
        }

        let sources = loaded.iter().map(|(workbook, tag, correct)| TranslationSource {
            workbook,
            tag: tag.as_str(),
            correct: *correct,
        });
        let dictionary = DictionaryBuilder::new(self.options.dictionary_options())
            .add_sources(sources)
            .build()?;
        info!("Built translation dictionary with {} keys", dictionary.len());

        Ok((dictionary, order.into_iter().map(|(path, _)| path).collect()))
    }

    /// Run: build the dictionary, then write a table or merge every target
    pub fn run<S: WorkbookSource, K: WorkbookSink>(&self, source: &S, sink: &mut K) -> Result<BorrowSummary> {
        let (dictionary, sources) = self.dictionary(source)?;
        let mut summary = BorrowSummary {
            sources,
            keys: dictionary.len(),
            outputs: Vec::new(),
            warnings: dictionary.warnings().to_vec(),
        };

        if self.options.merge.is_empty() {
            summary.outputs.push(self.write_table(&dictionary, sink)?);
            return Ok(summary);
        }

        let merge_options = self.options.merge_options();
        for target in &self.options.merge {
            let workbook = source.load(target)?;
            let outcome = formsync_translate::merge_with_options(&workbook, &dictionary, &merge_options)?;
            let path = self.output_path(target);
            sink.write(&path, &outcome.workbook, &outcome.categories)?;
            info!("Merged translations into '{}'", path.display());

            summary.warnings.extend(outcome.warnings);
            summary.outputs.push(BorrowOutput::Merged {
                target: target.clone(),
                path,
                counts: outcome.categories.counts(),
            });
        }
        Ok(summary)
    }

    fn write_table<K: WorkbookSink>(&self, dictionary: &TranslationDictionary, sink: &mut K) -> Result<BorrowOutput> {
        let path = self
            .options
            .outpath
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TRANSLATIONS_PATH));

        let (sheet, output) = match &self.options.diverse {
            Some(language) => {
                let sheet = dictionary.diverse_worksheet(language);
                if sheet.row_count() <= 1 {
                    warn!("No diverse translations for {}", language);
                }
                let output = BorrowOutput::Diverse {
                    path: path.clone(),
                    language: language.clone(),
                };
                (sheet, output)
            }
            None => {
                let sheet = dictionary.to_worksheet(&self.options.add_languages);
                (sheet, BorrowOutput::Translations { path: path.clone() })
            }
        };

        let workbook = Workbook::from_worksheets(vec![sheet])?;
        sink.write(&path, &workbook, &CategoryMap::new())?;
        info!("Created translation file '{}'", path.display());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_borrow_path() {
        assert_eq!(borrow_path(Path::new("forms/hh.xlsx")), PathBuf::from("forms/hh-borrow.xlsx"));
        assert_eq!(borrow_path(Path::new("hh")), PathBuf::from("hh-borrow"));
    }

    #[test]
    fn test_load_order() {
        let options = BorrowOptions {
            correct: vec!["b.xlsx".into(), "b.xlsx".into()],
            ..BorrowOptions::default()
        };
        let run = BorrowRun::new(vec!["a.xlsx".into(), "b.xlsx".into(), "c.xlsx".into()], options);
        assert_eq!(
            run.load_order(),
            vec![
                (PathBuf::from("b.xlsx"), true),
                (PathBuf::from("a.xlsx"), false),
                (PathBuf::from("c.xlsx"), false),
            ]
        );
    }

    #[test]
    fn test_output_paths() {
        let single = BorrowRun::new(
            vec![],
            BorrowOptions {
                merge: vec!["t.xlsx".into()],
                outpath: Some("out.xlsx".into()),
                ..BorrowOptions::default()
            },
        );
        assert_eq!(single.output_path(Path::new("t.xlsx")), PathBuf::from("out.xlsx"));

        let many = BorrowRun::new(
            vec![],
            BorrowOptions {
                merge: vec!["x/t.xlsx".into(), "u.xlsx".into()],
                outpath: Some("out".into()),
                ..BorrowOptions::default()
            },
        );
        assert_eq!(many.output_path(Path::new("x/t.xlsx")), PathBuf::from("out/t-borrow.xlsx"));
    }
}
