//! XLSForm column headers
//!
//! Translatable columns carry the language after a `::` separator, e.g.
//! `label::English` or `hint::French (fr)`. Columns sharing the same field
//! form a [`FieldGroup`]: one prompt rendered in several languages.

/// Fields that hold media file names rather than text
const MEDIA_FIELDS: &[&str] = &["image", "audio", "video", "big-image"];

/// Separator between field and language
pub const LANGUAGE_SEPARATOR: &str = "::";

/// A parsed column header
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnHeader {
    /// Full header text, trimmed
    pub text: String,
    /// Field part (`label` in `label::English`)
    pub field: String,
    /// Language part, if the header names one
    pub language: Option<String>,
}

impl ColumnHeader {
    /// Parse a header, splitting on the last `::`
    ///
    /// `media::image` style headers name a media field and carry no language;
    /// `media::image::English` is field `media::image` in English.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let split = text
            .rsplit_once(LANGUAGE_SEPARATOR)
            .map(|(field, language)| (field.trim(), language.trim()))
            .filter(|(field, language)| {
                !field.is_empty() && !language.is_empty() && *field != "media"
            });

        match split {
            Some((field, language)) => Self {
                text: text.to_string(),
                field: field.to_string(),
                language: Some(language.to_string()),
            },
            None => Self {
                text: text.to_string(),
                field: text.to_string(),
                language: None,
            },
        }
    }

    /// Build the header text for a field in a language
    pub fn compose(field: &str, language: &str) -> String {
        format!("{}{}{}", field, LANGUAGE_SEPARATOR, language)
    }

    /// Check if the header is blank
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }

    /// Check if the field holds media file names
    pub fn is_media(&self) -> bool {
        is_media_field(&self.field)
    }
}

/// Check whether a field names media rather than text
pub fn is_media_field(field: &str) -> bool {
    MEDIA_FIELDS.contains(&field) || field.starts_with("media::")
}

/// One translatable prompt: a field and its per-language columns
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldGroup {
    /// Field name shared by the columns
    pub field: String,
    /// Column of the bare field (e.g. `label` without a language)
    pub bare: Option<usize>,
    /// `(language, column)` pairs in column order
    pub languages: Vec<(String, usize)>,
}

impl FieldGroup {
    /// Group parsed headers by field
    ///
    /// Only text fields with at least one language column form a group.
    /// Groups are ordered by the first column of each field; a language
    /// appearing twice for the same field keeps its first column.
    pub fn collect(headers: &[ColumnHeader]) -> Vec<FieldGroup> {
        let mut groups: Vec<FieldGroup> = Vec::new();

        for (col, header) in headers.iter().enumerate() {
            if header.is_blank() || header.is_media() {
                continue;
            }
            let index = match groups.iter().position(|g| g.field == header.field) {
                Some(index) => index,
                None => {
                    groups.push(FieldGroup {
                        field: header.field.clone(),
                        bare: None,
                        languages: Vec::new(),
                    });
                    groups.len() - 1
                }
            };
            let group = &mut groups[index];
            match &header.language {
                Some(language) => {
                    if group.column(Some(language)).is_none() {
                        group.languages.push((language.clone(), col));
                    }
                }
                None => {
                    if group.bare.is_none() {
                        group.bare = Some(col);
                    }
                }
            }
        }

        groups.retain(|g| !g.languages.is_empty());
        groups
    }

    /// Column for a language (`None` selects the bare field column)
    pub fn column(&self, language: Option<&str>) -> Option<usize> {
        match language {
            None => self.bare,
            Some(language) => self
                .languages
                .iter()
                .find(|(lang, _)| lang == language)
                .map(|(_, col)| *col),
        }
    }
}
