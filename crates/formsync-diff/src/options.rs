//! Matcher options

/// Options for row/column alignment
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AlignOptions {
    /// Candidate identifying column sets, tried in order
    ///
    /// The first set whose headers all exist in both worksheets is used for
    /// the key-column pass. Default: `list_name + name`, then `name`, `id`,
    /// `key` (XLSForm choice lists repeat names across lists).
    pub key_columns: Vec<Vec<String>>,
    /// Run the exact-content pass before the key-column pass (default: true)
    pub match_content: bool,
}

impl AlignOptions {
    /// Use a single identifying column
    pub fn with_key_column<S: Into<String>>(column: S) -> Self {
        Self {
            key_columns: vec![vec![column.into()]],
            ..Self::default()
        }
    }

    /// Disable the key-column pass (positional fallback only)
    pub fn without_key_columns() -> Self {
        Self {
            key_columns: Vec::new(),
            ..Self::default()
        }
    }
}

impl Default for AlignOptions {
    fn default() -> Self {
        let set = |cols: &[&str]| cols.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        Self {
            key_columns: vec![
                set(&["list_name", "name"]),
                set(&["name"]),
                set(&["id"]),
                set(&["key"]),
            ],
            match_content: true,
        }
    }
}
