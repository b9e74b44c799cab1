//! Styled text segments.
//!
//! All display text flows through the renderer as a flat list of
//! [`TextSegment`]s: runs of characters that share one highlight state.
//! Newlines live inside segment text. Concatenating the `text` of every
//! segment always reproduces the plain text exactly; no transformation
//! in this crate is allowed to break that.

use crate::content::LiveHighlight;
use serde::{Deserialize, Serialize};

/// A run of text with at most one highlight state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSegment {
    pub text: String,
    /// CSS background color for the highlight, when one was given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_color: Option<String>,
    /// True for runs inside a highlight span. May be set with no color,
    /// e.g. a markup span without a parseable color attribute; the
    /// renderer then falls back to its default highlight color.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub highlighted: bool,
}

impl TextSegment {
    /// An unhighlighted run.
    pub fn plain(text: impl Into<String>) -> Self {
        TextSegment { text: text.into(), highlight_color: None, highlighted: false }
    }

    /// A highlighted run with an explicit color.
    pub fn highlighted(text: impl Into<String>, color: impl Into<String>) -> Self {
        TextSegment {
            text: text.into(),
            highlight_color: Some(color.into()),
            highlighted: true,
        }
    }

    /// A highlighted run with no color of its own.
    pub fn highlighted_default(text: impl Into<String>) -> Self {
        TextSegment { text: text.into(), highlight_color: None, highlighted: true }
    }

    #[inline]
    pub fn is_highlighted(&self) -> bool {
        self.highlighted || self.highlight_color.is_some()
    }
}

/// Concatenate segment text back into plain text.
pub fn to_plain_text(segments: &[TextSegment]) -> String {
    let mut out = String::with_capacity(segments.iter().map(|s| s.text.len()).sum());
    for segment in segments {
        out.push_str(&segment.text);
    }
    out
}

/// Overlay operator-driven highlight ranges on top of existing segments.
///
/// Ranges address character offsets into the plain text. The result is a
/// fresh segmentation: highlighted runs where ranges cover, plain runs in
/// the gaps. Invalid ranges (inverted, out of bounds, or overlapping an
/// earlier range) are skipped with a log message rather than failing the
/// render. If nothing applies, the input segmentation is returned
/// untouched so markup-driven highlights survive.
pub fn apply_live_highlights(
    segments: &[TextSegment],
    highlights: &[LiveHighlight],
) -> Vec<TextSegment> {
    if highlights.is_empty() {
        return segments.to_vec();
    }

    let plain = to_plain_text(segments);
    let chars: Vec<char> = plain.chars().collect();
    if chars.is_empty() {
        return segments.to_vec();
    }

    let mut ordered: Vec<&LiveHighlight> = highlights.iter().collect();
    ordered.sort_by_key(|h| (h.start_offset, h.end_offset));

    let mut out: Vec<TextSegment> = Vec::new();
    let mut cursor = 0usize;
    let mut applied = false;

    for highlight in ordered {
        let start = highlight.start_offset.max(cursor);
        let end = highlight.end_offset.min(chars.len());
        if highlight.start_offset >= chars.len() || end <= start {
            log::warn!(
                "skipping live highlight {}..{} over {} chars",
                highlight.start_offset,
                highlight.end_offset,
                chars.len()
            );
            continue;
        }
        if start > cursor {
            out.push(TextSegment::plain(collect_range(&chars, cursor, start)));
        }
        out.push(TextSegment::highlighted(
            collect_range(&chars, start, end),
            highlight.color.clone(),
        ));
        cursor = end;
        applied = true;
    }

    if !applied {
        return segments.to_vec();
    }
    if cursor < chars.len() {
        out.push(TextSegment::plain(collect_range(&chars, cursor, chars.len())));
    }
    if out.is_empty() {
        return segments.to_vec();
    }
    out
}

fn collect_range(chars: &[char], start: usize, end: usize) -> String {
    chars[start..end].iter().collect()
}
