//! Text style configuration for display elements.
//!
//! A [`TextStyle`] travels with each element's layout configuration and
//! drives both measurement (font family, weight, line height) and the
//! auto-fit behavior (size bounds, per-line fitting, line compression).

use serde::{Deserialize, Serialize};

/// Horizontal text alignment within an element's resolved bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical text alignment within an element's resolved bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Separator glyph inserted between two merged lines during compression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSeparator {
    /// Two spaces: `"A  B"`.
    #[default]
    Space,
    /// An em dash with surrounding spaces: `"A — B"`.
    Dash,
    /// A vertical bar with surrounding spaces: `"A | B"`.
    Pipe,
}

impl LineSeparator {
    /// The literal glyph sequence inserted between merged lines.
    #[inline]
    pub fn glyph(&self) -> &'static str {
        match self {
            LineSeparator::Space => "  ",
            LineSeparator::Dash => " \u{2014} ",
            LineSeparator::Pipe => " | ",
        }
    }
}

/// Visual and fitting configuration for one text element.
///
/// All fields have sensible defaults so partial configurations
/// deserialize cleanly; a missing style never causes an error.
///
/// # Example
///
/// ```
/// use versecast_core_display::TextStyle;
///
/// let style = TextStyle::default();
/// assert_eq!(style.max_font_size, 80.0);
/// assert!(style.auto_scale);
/// assert!(!style.compress_lines);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    /// CSS font family used for measurement and painting.
    pub font_family: String,
    /// CSS color string for the glyphs themselves.
    pub color: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub align: HAlign,
    pub vertical_align: VAlign,
    /// Upper bound for auto-fit, and the fixed size when auto-fit is off.
    pub max_font_size: f64,
    /// Hard floor below which text is never shrunk, even if it overflows.
    pub min_font_size: f64,
    /// Line height as a multiple of the font size.
    pub line_height: f64,
    /// When false, text renders at `max_font_size` with no measurement.
    pub auto_scale: bool,
    /// Merge short adjacent lines to use wide boxes better.
    pub compress_lines: bool,
    /// Glyph placed between merged lines when compression applies.
    pub line_separator: LineSeparator,
    /// Fit each line independently (bisection) instead of scaling the
    /// whole block by a single ratio.
    pub fit_line_to_width: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        TextStyle {
            font_family: "sans-serif".to_string(),
            color: "#ffffff".to_string(),
            bold: false,
            italic: false,
            underline: false,
            align: HAlign::Center,
            vertical_align: VAlign::Center,
            max_font_size: 80.0,
            min_font_size: 12.0,
            line_height: 1.1,
            auto_scale: true,
            compress_lines: false,
            line_separator: LineSeparator::Space,
            fit_line_to_width: false,
        }
    }
}
