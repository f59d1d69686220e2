//! Translation Dictionary Builder
//!
//! Collects, from an ordered list of source workbooks, every translation of
//! every source-language string. Candidates are never dropped: resolution
//! happens on lookup.
//!
//! Resolution for a key and language:
//! - A candidate supplied by a file marked correct wins: the one from the
//!   earliest correct source, whatever file first introduced the text.
//!   Further correct files disagreeing with it are recorded as
//!   [`Error::ConflictingCorrectSource`] warnings.
//! - Otherwise a single distinct candidate resolves directly.
//! - Otherwise the key is *diverse* for the language; the first-encountered
//!   candidate is the default.

use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;
use log::{debug, warn};

use formsync_core::{form_language, CellValue, Error, FieldGroup, Result, Row, Workbook, Worksheet};

use crate::normalize::translation_key;

/// Name of the worksheet produced by [`TranslationDictionary::to_worksheet`]
pub const TRANSLATIONS_SHEET: &str = "translations";
/// Name of the worksheet produced by [`TranslationDictionary::diverse_worksheet`]
pub const DIVERSE_SHEET: &str = "diverse";
/// Header of the key column in dictionary tables
pub const SOURCE_HEADER: &str = "source";

/// A workbook contributing translations
#[derive(Debug, Clone, Copy)]
pub struct TranslationSource<'a> {
    pub workbook: &'a Workbook,
    /// Label identifying the workbook in provenance and warnings
    pub tag: &'a str,
    /// Translations from this workbook take precedence
    pub correct: bool,
}

impl<'a> TranslationSource<'a> {
    pub fn new(workbook: &'a Workbook, tag: &'a str) -> Self {
        Self {
            workbook,
            tag,
            correct: false,
        }
    }

    pub fn correct(workbook: &'a Workbook, tag: &'a str) -> Self {
        Self {
            workbook,
            tag,
            correct: true,
        }
    }
}

/// Options for building a dictionary
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DictionaryOptions {
    /// Source language; `None` uses each workbook's form language
    pub source_language: Option<String>,
    /// Languages never collected
    pub ignore_languages: BTreeSet<String>,
    /// Strip leading question numbers from keys and candidates (default: true)
    pub strip_numbering: bool,
}

impl Default for DictionaryOptions {
    fn default() -> Self {
        Self {
            source_language: None,
            ignore_languages: BTreeSet::new(),
            strip_numbering: true,
        }
    }
}

/// A file that supplied a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Origin {
    pub tag: String,
    pub correct: bool,
    /// Position of the file among the dictionary's sources
    pub source: usize,
}

/// One distinct translation of a key
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    pub text: String,
    /// Files supplying this text, in encounter order, without repeats
    pub origins: Vec<Origin>,
}

impl Candidate {
    /// Whether any supplying file is marked correct
    pub fn is_correct(&self) -> bool {
        self.origins.iter().any(|o| o.correct)
    }

    /// Earliest correct file supplying this text
    fn first_correct(&self) -> Option<&Origin> {
        self.origins.iter().filter(|o| o.correct).min_by_key(|o| o.source)
    }

    fn add_origin(&mut self, origin: Origin) {
        if !self.origins.iter().any(|o| o.tag == origin.tag) {
            self.origins.push(origin);
        }
    }
}

/// All candidates of one key, per language
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TranslationEntry {
    pub key: String,
    /// Language → distinct candidates in encounter order
    pub candidates: BTreeMap<String, Vec<Candidate>>,
}

impl TranslationEntry {
    fn new(key: String) -> Self {
        Self {
            key,
            candidates: BTreeMap::new(),
        }
    }

    /// Candidates for a language
    pub fn candidates(&self, language: &str) -> &[Candidate] {
        self.candidates.get(language).map_or(&[], Vec::as_slice)
    }

    fn add(&mut self, language: &str, text: String, origin: Origin) {
        let candidates = self.candidates.entry(language.to_string()).or_default();
        match candidates.iter_mut().find(|c| c.text == text) {
            Some(candidate) => candidate.add_origin(origin),
            None => candidates.push(Candidate {
                text,
                origins: vec![origin],
            }),
        }
    }
}

/// How a lookup was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolutionKind {
    /// From a file marked correct
    Correct,
    /// The only candidate
    Single,
    /// First of several candidates
    Diverse,
}

/// Result of a dictionary lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub text: &'a str,
    pub kind: ResolutionKind,
}

impl Resolution<'_> {
    pub fn is_correct(&self) -> bool {
        self.kind == ResolutionKind::Correct
    }

    pub fn is_diverse(&self) -> bool {
        self.kind == ResolutionKind::Diverse
    }
}

/// The candidate backed by the earliest correct file, with that file
fn correct_winner(candidates: &[Candidate]) -> Option<(&Candidate, &Origin)> {
    candidates
        .iter()
        .filter_map(|c| c.first_correct().map(|o| (c, o)))
        .min_by_key(|(_, o)| o.source)
}

/// Pick the effective candidate of a list
fn resolve_candidates(candidates: &[Candidate]) -> Option<Resolution<'_>> {
    if let Some((winner, _)) = correct_winner(candidates) {
        return Some(Resolution {
            text: &winner.text,
            kind: ResolutionKind::Correct,
        });
    }
    let first = candidates.first()?;
    let kind = if candidates.len() == 1 {
        ResolutionKind::Single
    } else {
        ResolutionKind::Diverse
    };
    Some(Resolution {
        text: &first.text,
        kind,
    })
}

/// Correct files disagreeing with the winning candidate
fn conflicts(entry: &TranslationEntry, language: &str) -> Vec<Error> {
    let candidates = entry.candidates(language);
    let Some((winner, kept)) = correct_winner(candidates) else {
        return Vec::new();
    };

    candidates
        .iter()
        .filter(|c| c.text != winner.text)
        .filter_map(|c| {
            let rejected = c.first_correct()?;
            Some(Error::ConflictingCorrectSource {
                key: entry.key.clone(),
                language: language.to_string(),
                kept: winner.text.clone(),
                kept_source: kept.tag.clone(),
                rejected: c.text.clone(),
                rejected_source: rejected.tag.clone(),
            })
        })
        .collect()
}

/// Source → translations dictionary
///
/// Entries keep first-seen order. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct TranslationDictionary {
    entries: Vec<TranslationEntry>,
    index: AHashMap<String, usize>,
    warnings: Vec<Error>,
}

impl TranslationDictionary {
    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order
    pub fn entries(&self) -> &[TranslationEntry] {
        &self.entries
    }

    pub fn entry(&self, key: &str) -> Option<&TranslationEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    /// Every language with at least one candidate, sorted
    pub fn languages(&self) -> Vec<String> {
        let languages: BTreeSet<&String> = self
            .entries
            .iter()
            .flat_map(|e| e.candidates.keys())
            .collect();
        languages.into_iter().cloned().collect()
    }

    /// Effective translation of `key` into `language`
    pub fn resolve(&self, key: &str, language: &str) -> Option<Resolution<'_>> {
        resolve_candidates(self.entry(key)?.candidates(language))
    }

    /// Whether `key` has several translations into `language` and none is
    /// from a correct file
    pub fn is_diverse(&self, key: &str, language: &str) -> bool {
        self.resolve(key, language).is_some_and(|r| r.is_diverse())
    }

    /// Keys that are diverse for `language`, in first-seen order
    pub fn get_diverse_keys(&self, language: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| resolve_candidates(e.candidates(language)).is_some_and(|r| r.is_diverse()))
            .map(|e| e.key.as_str())
            .collect()
    }

    /// Conflicts between correct files found while building
    pub fn warnings(&self) -> &[Error] {
        &self.warnings
    }

    /// The dictionary as a table: a key column, then one column per language
    ///
    /// `extra_languages` adds (empty) columns for languages not present.
    /// Diverse cells list every candidate, one per line.
    pub fn to_worksheet(&self, extra_languages: &[String]) -> Worksheet {
        let mut languages = self.languages();
        for language in extra_languages {
            if !languages.contains(language) {
                languages.push(language.clone());
            }
        }

        let mut rows: Vec<Row> = vec![std::iter::once(SOURCE_HEADER.to_string())
            .chain(languages.iter().cloned())
            .collect()];
        for entry in &self.entries {
            let mut row = vec![CellValue::text(entry.key.as_str())];
            for language in &languages {
                let candidates = entry.candidates(language);
                let text = match resolve_candidates(candidates) {
                    Some(r) if r.is_diverse() => candidates
                        .iter()
                        .map(|c| c.text.as_str())
                        .collect::<Vec<_>>()
                        .join("\n"),
                    Some(r) => r.text.to_string(),
                    None => String::new(),
                };
                row.push(CellValue::from(text));
            }
            rows.push(Row::from_cells(row));
        }
        Worksheet::from_rows(TRANSLATIONS_SHEET, rows)
    }

    /// Diverse keys of `language`: the key, then one column per candidate
    pub fn diverse_worksheet(&self, language: &str) -> Worksheet {
        let diverse: Vec<&TranslationEntry> = self
            .get_diverse_keys(language)
            .into_iter()
            .filter_map(|key| self.entry(key))
            .collect();
        let width = diverse
            .iter()
            .map(|e| e.candidates(language).len())
            .max()
            .unwrap_or(0);

        let mut sheet = Worksheet::new(DIVERSE_SHEET);
        let header = std::iter::once(SOURCE_HEADER.to_string())
            .chain((1..=width).map(|i| format!("{}::{}", language, i)));
        sheet.push_row(header);
        for entry in diverse {
            let row = std::iter::once(entry.key.clone())
                .chain(entry.candidates(language).iter().map(|c| c.text.clone()));
            sheet.push_row(row);
        }
        sheet
    }
}

/// Builder collecting sources in order
#[derive(Debug, Clone, Default)]
pub struct DictionaryBuilder<'a> {
    options: DictionaryOptions,
    sources: Vec<TranslationSource<'a>>,
}

impl<'a> DictionaryBuilder<'a> {
    pub fn new(options: DictionaryOptions) -> Self {
        Self {
            options,
            sources: Vec::new(),
        }
    }

    /// Append a source; earlier sources come first in candidate order
    pub fn add_source(mut self, source: TranslationSource<'a>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn add_sources<I: IntoIterator<Item = TranslationSource<'a>>>(mut self, sources: I) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Scan every source and build the dictionary
    ///
    /// A lone source with no translations is [`Error::EmptyInput`]; among
    /// several, empty sources are skipped with a warning.
    pub fn build(self) -> Result<TranslationDictionary> {
        if self.sources.is_empty() {
            return Err(Error::EmptyInput("no translation sources".into()));
        }

        let mut dictionary = TranslationDictionary::default();
        let lone = self.sources.len() == 1;
        for (position, source) in self.sources.iter().enumerate() {
            let added = scan_source(&mut dictionary, source, position, &self.options);
            if added == 0 {
                if lone {
                    return Err(Error::EmptyInput(format!("'{}' has no translations", source.tag)));
                }
                warn!("Skipping '{}': no translations found", source.tag);
            } else {
                debug!("Collected {} translations from '{}'", added, source.tag);
            }
        }

        let mut warnings = Vec::new();
        for entry in &dictionary.entries {
            for language in entry.candidates.keys() {
                warnings.extend(conflicts(entry, language));
            }
        }
        for warning in &warnings {
            warn!("{}", warning);
        }
        dictionary.warnings = warnings;

        Ok(dictionary)
    }
}

/// Build a dictionary from sources in order
pub fn build(sources: &[TranslationSource<'_>], options: &DictionaryOptions) -> Result<TranslationDictionary> {
    DictionaryBuilder::new(options.clone())
        .add_sources(sources.iter().copied())
        .build()
}

/// Source column of a group, falling back to the bare field column
pub(crate) fn source_column(group: &FieldGroup, source_language: Option<&str>) -> Option<usize> {
    group.column(source_language).or(group.bare)
}

/// Add every translation in `source` to the dictionary, returning how many
/// (key, language, text) triples were seen
fn scan_source(
    dictionary: &mut TranslationDictionary,
    source: &TranslationSource<'_>,
    position: usize,
    options: &DictionaryOptions,
) -> usize {
    let source_language = options
        .source_language
        .clone()
        .or_else(|| form_language(source.workbook));
    let mut added = 0;

    for sheet in source.workbook.worksheets() {
        if sheet.require_header().is_err() {
            continue;
        }
        for group in sheet.field_groups() {
            let Some(source_col) = source_column(&group, source_language.as_deref()) else {
                continue;
            };
            let targets: Vec<&(String, usize)> = group
                .languages
                .iter()
                .filter(|(lang, col)| {
                    *col != source_col
                        && Some(lang.as_str()) != source_language.as_deref()
                        && !options.ignore_languages.contains(lang)
                })
                .collect();
            if targets.is_empty() {
                continue;
            }

            for (row, _) in sheet.data_rows() {
                let key = translation_key(&sheet.text_at(row, source_col), options.strip_numbering);
                if key.is_empty() {
                    continue;
                }
                for (language, col) in &targets {
                    let text = translation_key(&sheet.text_at(row, *col), options.strip_numbering);
                    if text.is_empty() {
                        continue;
                    }
                    let index = match dictionary.index.get(&key) {
                        Some(&index) => index,
                        None => {
                            dictionary.entries.push(TranslationEntry::new(key.clone()));
                            dictionary.index.insert(key.clone(), dictionary.entries.len() - 1);
                            dictionary.entries.len() - 1
                        }
                    };
                    let origin = Origin {
                        tag: source.tag.to_string(),
                        correct: source.correct,
                        source: position,
                    };
                    dictionary.entries[index].add(language, text, origin);
                    added += 1;
                }
            }
        }
    }
    added
}
