//! Text measurement capability.
//!
//! The fitting engine never shapes text itself; it asks a
//! [`TextMeasurer`] for pixel metrics. Hosts plug in a real measurer
//! (DOM canvas on the web target) while tests and headless callers use
//! the deterministic [`RatioMeasurer`].

use crate::style::TextStyle;

/// Measured pixel extents of a block of text.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

/// Measures text at a given style and font size.
///
/// Returning `None` means the measurement surface is not ready (for
/// example, an element not yet attached to a document). Callers must
/// treat that as "try again next frame", never as an error.
pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle, font_size: f64) -> Option<TextMetrics>;
}

/// Deterministic measurer approximating glyph width as a fixed ratio
/// of the font size.
///
/// Width is `longest line chars x font_size x char_width_ratio`
/// (widened slightly for bold), height is
/// `line count x font_size x style.line_height`. Exact enough for
/// layout previews and required for tests, where DOM measurement is
/// unavailable.
///
/// # Example
///
/// ```
/// use versecast_core_display::{RatioMeasurer, TextMeasurer, TextStyle};
///
/// let measurer = RatioMeasurer::default();
/// let metrics = measurer.measure("hello", &TextStyle::default(), 10.0).unwrap();
/// assert_eq!(metrics.width, 30.0); // 5 chars x 10px x 0.6
/// ```
#[derive(Clone, Copy, Debug)]
pub struct RatioMeasurer {
    /// Average glyph width as a fraction of the font size.
    pub char_width_ratio: f64,
    /// Width multiplier applied when the style is bold.
    pub bold_factor: f64,
}

impl Default for RatioMeasurer {
    fn default() -> Self {
        RatioMeasurer { char_width_ratio: 0.6, bold_factor: 1.05 }
    }
}

impl TextMeasurer for RatioMeasurer {
    fn measure(&self, text: &str, style: &TextStyle, font_size: f64) -> Option<TextMetrics> {
        let longest = text.lines().map(|line| line.chars().count()).max().unwrap_or(0);
        let line_count = text.lines().count();
        let mut width = longest as f64 * font_size * self.char_width_ratio;
        if style.bold {
            width *= self.bold_factor;
        }
        Some(TextMetrics {
            width,
            height: line_count as f64 * font_size * style.line_height,
        })
    }
}

/// Build the CSS font shorthand for a style at a font size, the exact
/// string assigned to a canvas context before measuring or painting.
///
/// Families containing whitespace are quoted.
pub fn css_font(style: &TextStyle, font_size: f64) -> String {
    let mut font = String::new();
    if style.italic {
        font.push_str("italic ");
    }
    if style.bold {
        font.push_str("bold ");
    }
    font.push_str(&format!("{:.2}px ", font_size));
    let family = style.font_family.trim();
    let quoted = family.starts_with('"') || family.starts_with('\'');
    if family.chars().any(char::is_whitespace) && !quoted {
        font.push('"');
        font.push_str(family);
        font.push('"');
    } else {
        font.push_str(family);
    }
    font
}

/// Web-specific measurement backed by a hidden canvas context.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use wasm_bindgen::JsCast;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

    /// Measures text through `CanvasRenderingContext2d::measure_text`.
    ///
    /// One instance owns one detached canvas context and can be shared
    /// across every element on a display.
    ///
    /// ## Example
    ///
    /// ```rust,ignore
    /// use versecast_core_display::measure::web::DomTextMeasurer;
    ///
    /// let measurer = DomTextMeasurer::new()?;
    /// let metrics = measurer.measure("Amazing grace", &style, 48.0);
    /// ```
    #[derive(Clone, Debug)]
    pub struct DomTextMeasurer {
        ctx: CanvasRenderingContext2d,
    }

    impl DomTextMeasurer {
        /// Create a measurer backed by a fresh detached canvas.
        pub fn new() -> Result<Self, String> {
            let window = web_sys::window().ok_or("No window available")?;
            let document = window.document().ok_or("No document available")?;
            let canvas = document
                .create_element("canvas")
                .map_err(|_| "Failed to create canvas element")?
                .dyn_into::<HtmlCanvasElement>()
                .map_err(|_| "Failed to cast element to HtmlCanvasElement")?;
            let ctx = canvas
                .get_context("2d")
                .map_err(|_| "Failed to get 2d context")?
                .ok_or("No 2d context available")?
                .dyn_into::<CanvasRenderingContext2d>()
                .map_err(|_| "Failed to cast to CanvasRenderingContext2d")?;
            Ok(DomTextMeasurer { ctx })
        }
    }

    impl TextMeasurer for DomTextMeasurer {
        fn measure(&self, text: &str, style: &TextStyle, font_size: f64) -> Option<TextMetrics> {
            self.ctx.set_font(&css_font(style, font_size));
            let mut width: f64 = 0.0;
            let mut line_count = 0usize;
            for line in text.lines() {
                line_count += 1;
                let metrics = self.ctx.measure_text(line).ok()?;
                width = width.max(metrics.width());
            }
            Some(TextMetrics {
                width,
                height: line_count as f64 * font_size * style.line_height,
            })
        }
    }
}
