//! Error types for formsync-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while diffing or merging workbooks
///
/// Two variants are recovered locally and only surface as warnings:
/// [`Error::AmbiguousKey`] (the matcher falls back to positional alignment)
/// and [`Error::ConflictingCorrectSource`] (the first correct file wins).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Worksheet is missing expected structure (e.g. no header row)
    #[error("Malformed worksheet '{sheet}': {reason}")]
    MalformedWorkbook { sheet: String, reason: String },

    /// Identifying column value is blank or repeated within a worksheet
    #[error("Ambiguous key {key:?} in column '{column}' of worksheet '{sheet}' at row {row}")]
    AmbiguousKey {
        sheet: String,
        column: String,
        row: usize,
        key: String,
    },

    /// More than one "correct" file supplies a value for the same key/language
    #[error(
        "Conflicting correct translations for {key:?} ({language}): kept {kept:?} from '{kept_source}', ignored {rejected:?} from '{rejected_source}'"
    )]
    ConflictingCorrectSource {
        key: String,
        language: String,
        kept: String,
        kept_source: String,
        rejected: String,
        rejected_source: String,
    },

    /// Zero usable rows/columns in an input
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Invalid sheet name
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Duplicate sheet name
    #[error("Sheet name already exists: {0}")]
    DuplicateSheetName(String),

    /// Failure reported by a workbook source or sink
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Create a malformed-worksheet error
    pub fn malformed<S: Into<String>, R: Into<String>>(sheet: S, reason: R) -> Self {
        Error::MalformedWorkbook {
            sheet: sheet.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error is a recovered degradation rather than a failure
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::AmbiguousKey { .. } | Error::ConflictingCorrectSource { .. }
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message() {
        let err = Error::malformed("survey", "no header row");
        assert_eq!(err.to_string(), "Malformed worksheet 'survey': no header row");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_recoverable_variants() {
        let err = Error::AmbiguousKey {
            sheet: "survey".into(),
            column: "name".into(),
            row: 4,
            key: String::new(),
        };
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("row 4"));
    }
}
