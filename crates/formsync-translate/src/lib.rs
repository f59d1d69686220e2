//! # formsync-translate
//!
//! Translation borrowing between XLSForms.
//!
//! - [`dictionary`] - collects every translation of every source string from
//!   an ordered list of workbooks, with provenance
//! - [`merge`] - writes dictionary translations into a copy of a target form
//!
//! ## Example
//!
//! ```rust
//! use formsync_core::{ChangeCategory, Workbook, Worksheet};
//! use formsync_translate::{build, merge, DictionaryOptions, TranslationSource};
//!
//! let form = |french: &str| {
//!     let mut survey = Worksheet::new("survey");
//!     survey.push_row(vec!["type", "name", "label::English", "label::French"]);
//!     survey.push_row(vec!["note", "hi", "Hello!", french]);
//!     Workbook::from_worksheets(vec![survey]).unwrap()
//! };
//! let source = form("Bonjour!");
//! let target = form("");
//!
//! let dictionary = build(&[TranslationSource::new(&source, "old.xlsx")], &DictionaryOptions::default()).unwrap();
//! let outcome = merge(&target, &dictionary, false).unwrap();
//!
//! assert_eq!(outcome.count(ChangeCategory::TranslationFilled), 1);
//! assert_eq!(outcome.workbook.worksheet(0).unwrap().text_at(1, 3), "Bonjour!");
//! ```

pub mod dictionary;
pub mod merge;
pub mod normalize;

pub use dictionary::{
    build, Candidate, DictionaryBuilder, DictionaryOptions, Origin, Resolution, ResolutionKind, TranslationDictionary,
    TranslationEntry, TranslationSource, DIVERSE_SHEET, SOURCE_HEADER, TRANSLATIONS_SHEET,
};
pub use merge::{merge, merge_with_options, MergeOptions, MergeOutcome};
pub use normalize::{clean_string, split_numbered_text, translation_key};
