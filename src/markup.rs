//! Limited rich-text markup parsing.
//!
//! Content authored in a rich editor arrives with a small HTML-ish
//! vocabulary: paragraph and line-break tags for structure, highlight
//! spans (`<mark>`, or `<span>` with a background-color style) for
//! emphasis, and standard entities. Everything else is presentation
//! noise and gets stripped. The parser never fails: broken markup
//! degrades to plain text instead of erroring mid-show.

use crate::color::parse_color;
use crate::segment::TextSegment;

/// Parse markup into ordered text segments.
///
/// Block tags (`<p>`, `<div>`, `<br>`) normalize to newlines, highlight
/// spans carry their color through, entities are decoded and all other
/// tags are stripped. Unterminated tags are kept as literal text.
///
/// # Example
///
/// ```
/// use versecast_core_display::{parse_markup, TextSegment};
///
/// let segments = parse_markup("Hello <mark data-color=\"#ff0\">world</mark>!");
/// assert_eq!(segments, vec![
///     TextSegment::plain("Hello "),
///     TextSegment::highlighted("world", "#ff0"),
///     TextSegment::plain("!"),
/// ]);
/// ```
pub fn parse_markup(input: &str) -> Vec<TextSegment> {
    let mut scanner = Scanner::new();
    let mut rest = input;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('<') {
            match after.find('>') {
                Some(end) => {
                    scanner.tag(&after[..end]);
                    rest = &after[end + 1..];
                }
                None => {
                    // unterminated tag: literal text
                    scanner.buf.push('<');
                    rest = after;
                }
            }
        } else if rest.starts_with('&') {
            match decode_entity(rest) {
                Some((ch, len)) => {
                    scanner.buf.push(ch);
                    rest = &rest[len..];
                }
                None => {
                    scanner.buf.push('&');
                    rest = &rest[1..];
                }
            }
        } else {
            let end = rest.find(['<', '&']).unwrap_or(rest.len());
            scanner.buf.push_str(&rest[..end]);
            rest = &rest[end..];
        }
    }

    scanner.finish()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SpanTag {
    Mark,
    Span,
}

struct OpenHighlight {
    color: Option<String>,
    tag: SpanTag,
}

struct Scanner {
    segments: Vec<TextSegment>,
    buf: String,
    highlight: Option<OpenHighlight>,
}

impl Scanner {
    fn new() -> Self {
        Scanner { segments: Vec::new(), buf: String::new(), highlight: None }
    }

    fn tag(&mut self, raw: &str) {
        let inner = raw.trim();
        let closing = inner.starts_with('/');
        let name: String = inner
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();

        match (name.as_str(), closing) {
            ("br", false) => self.buf.push('\n'),
            ("p" | "div", true) => self.buf.push('\n'),
            ("mark", false) => self.open_highlight(highlight_color_of(inner), SpanTag::Mark),
            ("mark", true) => self.close_highlight(SpanTag::Mark),
            ("span", false) => {
                // plain spans are styling noise; only a background color
                // makes one a highlight
                if let Some(color) = style_attr_color(inner) {
                    self.open_highlight(Some(color), SpanTag::Span);
                }
            }
            ("span", true) => self.close_highlight(SpanTag::Span),
            _ => {}
        }
    }

    fn open_highlight(&mut self, color: Option<String>, tag: SpanTag) {
        if self.highlight.is_some() {
            log::debug!("highlight span opened inside another; starting a new run");
        }
        self.flush();
        self.highlight = Some(OpenHighlight { color, tag });
    }

    fn close_highlight(&mut self, tag: SpanTag) {
        match &self.highlight {
            Some(open) if open.tag == tag => {
                self.flush();
                self.highlight = None;
            }
            // plain spans never opened a highlight, so their closes are noise
            _ if tag == SpanTag::Span => {}
            _ => log::warn!("ignoring unmatched </mark>"),
        }
    }

    fn flush(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.buf);
        let segment = match &self.highlight {
            Some(OpenHighlight { color: Some(color), .. }) => {
                TextSegment::highlighted(text, color.clone())
            }
            Some(OpenHighlight { color: None, .. }) => TextSegment::highlighted_default(text),
            None => TextSegment::plain(text),
        };
        self.segments.push(segment);
    }

    fn finish(mut self) -> Vec<TextSegment> {
        self.flush();
        // structural closers leave trailing newlines; drop them
        while let Some(last) = self.segments.last_mut() {
            while last.text.ends_with('\n') {
                last.text.pop();
            }
            if last.text.is_empty() {
                self.segments.pop();
            } else {
                break;
            }
        }
        self.segments
    }
}

/// Highlight color of a `<mark>` tag: explicit `data-color` attribute
/// first, then an inline `background-color` declaration. Unparseable
/// values count as absent.
fn highlight_color_of(tag: &str) -> Option<String> {
    if let Some(value) = attr_value(tag, "data-color") {
        let value = value.trim().to_string();
        if parse_color(&value).is_some() {
            return Some(value);
        }
        log::debug!("ignoring unparseable highlight color {value:?}");
    }
    style_attr_color(tag)
}

fn style_attr_color(tag: &str) -> Option<String> {
    attr_value(tag, "style").and_then(|style| background_color_of(&style))
}

fn background_color_of(style: &str) -> Option<String> {
    for declaration in style.split(';') {
        if let Some((property, value)) = declaration.split_once(':') {
            if property.trim().eq_ignore_ascii_case("background-color") {
                let value = value.trim();
                if parse_color(value).is_some() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Extract a (possibly quoted) attribute value from inside a tag.
/// Attribute names are matched case-insensitively.
fn attr_value(tag: &str, name: &str) -> Option<String> {
    // ASCII lowercasing preserves byte offsets, so indices found in
    // `lower` slice `tag` safely
    let lower = tag.to_ascii_lowercase();
    let bytes = tag.as_bytes();
    let mut search = 0;

    while let Some(found) = lower[search..].find(name) {
        let start = search + found;
        search = start + name.len();
        if start > 0 && !bytes[start - 1].is_ascii_whitespace() {
            continue;
        }

        let mut i = start + name.len();
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'=' {
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }

        let quote = bytes[i];
        return if quote == b'"' || quote == b'\'' {
            let value = &tag[i + 1..];
            value.find(quote as char).map(|end| value[..end].to_string())
        } else {
            let value = &tag[i..];
            let end = value.find(|c: char| c.is_whitespace()).unwrap_or(value.len());
            Some(value[..end].to_string())
        };
    }
    None
}

/// Decode one entity at the start of `s` (which begins with `&`).
/// Returns the character and the byte length consumed.
fn decode_entity(s: &str) -> Option<(char, usize)> {
    let semi = s.find(';')?;
    if semi > 12 {
        return None;
    }
    let name = &s[1..semi];
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let code = if let Some(hex) =
                name.strip_prefix("#x").or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)?
        }
    };
    Some((ch, semi + 1))
}
