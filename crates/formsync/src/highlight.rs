//! Highlight colors for change categories
//!
//! The engine only decides categories; how a sink paints them is configured
//! here. [`HighlightPalette::default`] gives every category except
//! `unchanged` a fill color and can be overridden per category.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use formsync_core::{ChangeCategory, Error};

/// Fill color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    /// RGB color (no alpha)
    Rgb { r: u8, g: u8, b: u8 },
    /// ARGB color with alpha channel
    Argb { a: u8, r: u8, g: u8, b: u8 },
}

impl Color {
    /// Create an RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Create an ARGB color
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color::Argb { a, r, g, b }
    }

    /// Create from a hex string (e.g., "#FF0000" or "80FF0000")
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let byte = |i: usize| hex.get(i..i + 2).and_then(|s| u8::from_str_radix(s, 16).ok());

        match hex.len() {
            6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Color::argb(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Hex string without `#` prefix
    pub fn to_hex(&self) -> String {
        match self {
            Color::Rgb { r, g, b } => format!("{:02X}{:02X}{:02X}", r, g, b),
            Color::Argb { a, r, g, b } => format!("{:02X}{:02X}{:02X}{:02X}", a, r, g, b),
        }
    }

    /// 8-character ARGB hex string, opaque for RGB colors
    pub fn to_argb_hex(&self) -> String {
        match self {
            Color::Rgb { r, g, b } => format!("FF{:02X}{:02X}{:02X}", r, g, b),
            Color::Argb { .. } => self.to_hex(),
        }
    }

    /// Convert to RGB tuple
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        match self {
            Color::Rgb { r, g, b } | Color::Argb { r, g, b, .. } => (*r, *g, *b),
        }
    }

    // Common colors
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const ORANGE: Color = Color::rgb(255, 192, 0);
    pub const GREEN: Color = Color::rgb(146, 208, 80);
    pub const BLUE: Color = Color::rgb(155, 194, 230);
    pub const PURPLE: Color = Color::rgb(204, 153, 255);
    pub const GRAY: Color = Color::rgb(191, 191, 191);
    pub const RED: Color = Color::rgb(255, 124, 128);
    pub const PINK: Color = Color::rgb(255, 204, 255);
    pub const TEAL: Color = Color::rgb(153, 230, 230);
    pub const BROWN: Color = Color::rgb(214, 180, 140);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s.trim()).ok_or_else(|| Error::other(format!("Invalid color: {}", s)))
    }
}

/// Category → fill color table
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HighlightPalette {
    colors: BTreeMap<ChangeCategory, Color>,
}

impl HighlightPalette {
    /// A palette with no colors
    pub fn empty() -> Self {
        Self {
            colors: BTreeMap::new(),
        }
    }

    /// Color of a category, `None` for no highlight
    pub fn color(&self, category: ChangeCategory) -> Option<Color> {
        self.colors.get(&category).copied()
    }

    /// Color for a row given its markers: the first marker with a color
    pub fn row_color(&self, markers: &[ChangeCategory]) -> Option<Color> {
        markers.iter().find_map(|m| self.color(*m))
    }

    pub fn set(&mut self, category: ChangeCategory, color: Color) -> &mut Self {
        self.colors.insert(category, color);
        self
    }

    /// Stop highlighting a category
    pub fn clear(&mut self, category: ChangeCategory) -> &mut Self {
        self.colors.remove(&category);
        self
    }

    /// Override this palette with `category=color` pairs
    ///
    /// ```rust
    /// use formsync::{ChangeCategory, Color, HighlightPalette};
    ///
    /// let mut palette = HighlightPalette::default();
    /// palette.apply_overrides(&["translation-filled=#00FF00"]).unwrap();
    /// assert_eq!(palette.color(ChangeCategory::TranslationFilled), Some(Color::rgb(0, 255, 0)));
    /// ```
    pub fn apply_overrides<S: AsRef<str>>(&mut self, overrides: &[S]) -> Result<&mut Self, Error> {
        for item in overrides {
            let item = item.as_ref();
            let (category, color) = item
                .split_once('=')
                .ok_or_else(|| Error::other(format!("Expected category=color, got '{}'", item)))?;
            self.set(category.trim().parse()?, color.parse()?);
        }
        Ok(self)
    }

    /// Categories with a color, in category order
    pub fn iter(&self) -> impl Iterator<Item = (ChangeCategory, Color)> + '_ {
        self.colors.iter().map(|(k, v)| (*k, *v))
    }
}

impl Default for HighlightPalette {
    fn default() -> Self {
        let mut palette = Self::empty();
        palette
            .set(ChangeCategory::TranslationSame, Color::GREEN)
            .set(ChangeCategory::TranslationChanged, Color::YELLOW)
            .set(ChangeCategory::TranslationFilled, Color::BLUE)
            .set(ChangeCategory::NoDictionaryEntryHasPreexisting, Color::GRAY)
            .set(ChangeCategory::NoDictionaryEntryNoPreexisting, Color::RED)
            .set(ChangeCategory::DiverseUntouched, Color::ORANGE)
            .set(ChangeCategory::DuplicateExcluded, Color::BROWN)
            .set(ChangeCategory::OnlyInNewFile, Color::TEAL)
            .set(ChangeCategory::CellDiffers, Color::YELLOW)
            .set(ChangeCategory::RowReordered, Color::PURPLE);
        palette
    }
}
