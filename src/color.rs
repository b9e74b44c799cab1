//! CSS-style color parsing for highlight and style values.
//!
//! Highlight colors arrive as untrusted strings from markup attributes
//! and operator configuration. Parsing them up front lets the renderer
//! reject garbage early and derive contrast decisions (light text on a
//! dark highlight, dark text on a light one).

/// An opaque sRGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    #[inline]
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Returns a CSS `rgb(r,g,b)` string.
    pub fn css(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    /// Relative luminance in `0.0..=1.0` (ITU-R BT.709 weights).
    pub fn luminance(&self) -> f64 {
        (0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64) / 255.0
    }

    /// True when text drawn over this color should be light.
    #[inline]
    pub fn is_dark(&self) -> bool {
        self.luminance() < 0.5
    }

    /// A readable foreground for text drawn over this color.
    #[inline]
    pub fn contrast_text(&self) -> Rgb {
        if self.is_dark() {
            Rgb::WHITE
        } else {
            Rgb::BLACK
        }
    }
}

/// Parse a CSS color string.
///
/// Supports:
/// - Named colors: black, white, red, green, blue, yellow, cyan, magenta,
///   gray/grey, orange, purple, pink, brown
/// - Hex: `#RGB` (expanded to `#RRGGBB`), `#RRGGBB`
/// - Functional: `rgb(r, g, b)` and `rgba(r, g, b, a)` (alpha ignored)
/// - Case-insensitive, trims whitespace
///
/// Returns `None` for anything else; callers treat that as "no highlight"
/// rather than an error.
pub fn parse_color(s: &str) -> Option<Rgb> {
    let s = s.trim();
    let prefix = |n: usize, p: &str| s.get(..n).is_some_and(|head| head.eq_ignore_ascii_case(p));
    if s.starts_with('#') {
        parse_hex(s)
    } else if prefix(4, "rgb(") || prefix(5, "rgba(") {
        parse_functional(s)
    } else {
        parse_named(s)
    }
}

fn parse_hex(s: &str) -> Option<Rgb> {
    let hex = s.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
            Some(Rgb::new(r * 17, g * 17, b * 17))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgb::new(r, g, b))
        }
        _ => None,
    }
}

fn parse_functional(s: &str) -> Option<Rgb> {
    let open = s.find('(')?;
    let close = s.rfind(')')?;
    if close <= open {
        return None;
    }
    let mut parts = s[open + 1..close].split(',');
    let r = parts.next()?.trim().parse::<u8>().ok()?;
    let g = parts.next()?.trim().parse::<u8>().ok()?;
    let b = parts.next()?.trim().parse::<u8>().ok()?;
    // rgba() carries one trailing component; anything further is malformed
    match (parts.next(), parts.next()) {
        (_, Some(_)) => None,
        (Some(alpha), None) => {
            alpha.trim().parse::<f64>().ok()?;
            Some(Rgb::new(r, g, b))
        }
        (None, None) => Some(Rgb::new(r, g, b)),
    }
}

fn parse_named(s: &str) -> Option<Rgb> {
    let (r, g, b) = match s.to_lowercase().as_str() {
        "black"         => (0, 0, 0),
        "white"         => (255, 255, 255),
        "red"           => (255, 0, 0),
        "green"         => (0, 128, 0),
        "blue"          => (0, 0, 255),
        "yellow"        => (255, 255, 0),
        "cyan"          => (0, 255, 255),
        "magenta"       => (255, 0, 255),
        "gray" | "grey" => (128, 128, 128),
        "orange"        => (255, 165, 0),
        "purple"        => (128, 0, 128),
        "pink"          => (255, 192, 203),
        "brown"         => (139, 69, 19),
        _               => return None,
    };
    Some(Rgb::new(r, g, b))
}
