//! Line compression for vertically tight layouts.
//!
//! Stanzas often arrive as many short lines. When a layout box is wide
//! but shallow, merging adjacent lines pairwise buys font size without
//! reflowing the text. Compression operates on segment lists so markup
//! highlights survive; the plain-string entry points delegate to the
//! segment path and flatten the result.

use crate::segment::{to_plain_text, TextSegment};
use crate::style::LineSeparator;

/// Default fraction of the box width a merged pair may occupy.
pub const FIT_THRESHOLD: f64 = 0.7;

/// Merge adjacent lines pairwise, unconditionally.
///
/// Lines are trimmed and blank lines dropped first. Two or fewer
/// remaining lines are returned as-is (trim-only); three or more are
/// paired `(0,1) (2,3) ...` with an unpaired tail kept alone.
///
/// # Example
///
/// ```
/// use versecast_core_display::{compress, LineSeparator};
///
/// let merged = compress("A\nB\nC\nD", LineSeparator::Dash);
/// assert_eq!(merged, "A \u{2014} B\nC \u{2014} D");
/// ```
pub fn compress(text: &str, separator: LineSeparator) -> String {
    to_plain_text(&compress_segments(&[TextSegment::plain(text)], separator))
}

/// Merge adjacent lines pairwise only where the merged line fits.
///
/// A pair merges when `measure(merged)` reports a width at most
/// `max_width * threshold`; a pair that does not fit stays as two
/// separate lines. A measurement failure (`None`) counts as not
/// fitting, so unmeasurable text is never over-merged.
pub fn compress_with_fit<F>(
    text: &str,
    separator: LineSeparator,
    max_width: f64,
    threshold: f64,
    measure: F,
) -> String
where
    F: FnMut(&str) -> Option<f64>,
{
    to_plain_text(&compress_segments_with_fit(
        &[TextSegment::plain(text)],
        separator,
        max_width,
        threshold,
        measure,
    ))
}

/// Segment-preserving unconditional compression.
pub fn compress_segments(segments: &[TextSegment], separator: LineSeparator) -> Vec<TextSegment> {
    let lines = clean_segment_lines(segments);
    let plan = plan_for(&lines, |_, _| true);
    build(lines, &plan, separator.glyph())
}

/// Segment-preserving fit-checked compression.
///
/// The fit check runs against the plain text of each candidate merge;
/// highlight boundaries are carried through untouched. Invariant: the
/// concatenated segment text equals the compressed plain text exactly.
pub fn compress_segments_with_fit<F>(
    segments: &[TextSegment],
    separator: LineSeparator,
    max_width: f64,
    threshold: f64,
    mut measure: F,
) -> Vec<TextSegment>
where
    F: FnMut(&str) -> Option<f64>,
{
    let lines = clean_segment_lines(segments);
    let plain: Vec<String> = lines.iter().map(|line| to_plain_text(line)).collect();
    let glyph = separator.glyph();
    let limit = max_width * threshold;
    let plan = plan_for(&lines, |a, b| {
        let merged = format!("{}{}{}", plain[a], glyph, plain[b]);
        measure(&merged).is_some_and(|width| width <= limit)
    });
    build(lines, &plan, glyph)
}

/// Pairing plan: `(line, Some(partner))` for a merge, `(line, None)`
/// for a line kept alone. Inputs of two or fewer lines are left alone
/// entirely.
fn plan_for(
    lines: &[Vec<TextSegment>],
    mut fits: impl FnMut(usize, usize) -> bool,
) -> Vec<(usize, Option<usize>)> {
    let count = lines.len();
    if count <= 2 {
        return (0..count).map(|i| (i, None)).collect();
    }
    let mut plan = Vec::with_capacity(count);
    let mut i = 0;
    while i < count {
        if i + 1 < count {
            if fits(i, i + 1) {
                plan.push((i, Some(i + 1)));
            } else {
                plan.push((i, None));
                plan.push((i + 1, None));
            }
            i += 2;
        } else {
            plan.push((i, None));
            i += 1;
        }
    }
    plan
}

/// Split segments into lines, trim each line at the segment level and
/// drop lines left blank.
fn clean_segment_lines(segments: &[TextSegment]) -> Vec<Vec<TextSegment>> {
    let mut lines: Vec<Vec<TextSegment>> = vec![Vec::new()];
    for segment in segments {
        for (i, piece) in segment.text.split('\n').enumerate() {
            if i > 0 {
                lines.push(Vec::new());
            }
            if !piece.is_empty() {
                if let Some(line) = lines.last_mut() {
                    line.push(TextSegment {
                        text: piece.to_string(),
                        highlight_color: segment.highlight_color.clone(),
                        highlighted: segment.highlighted,
                    });
                }
            }
        }
    }
    lines
        .into_iter()
        .map(trim_line)
        .filter(|line| !line.is_empty())
        .collect()
}

fn trim_line(mut line: Vec<TextSegment>) -> Vec<TextSegment> {
    while line.first().is_some_and(|s| s.text.trim_start().is_empty()) {
        line.remove(0);
    }
    if let Some(first) = line.first_mut() {
        if first.text.starts_with(char::is_whitespace) {
            let trimmed: String = first.text.trim_start().to_string();
            first.text = trimmed;
        }
    }
    while line.last().is_some_and(|s| s.text.trim_end().is_empty()) {
        line.pop();
    }
    if let Some(last) = line.last_mut() {
        if last.text.ends_with(char::is_whitespace) {
            let trimmed: String = last.text.trim_end().to_string();
            last.text = trimmed;
        }
    }
    line
}

fn build(
    mut lines: Vec<Vec<TextSegment>>,
    plan: &[(usize, Option<usize>)],
    glyph: &str,
) -> Vec<TextSegment> {
    let mut out: Vec<TextSegment> = Vec::new();
    for (row, (a, b)) in plan.iter().enumerate() {
        if row > 0 {
            if let Some(last) = out.last_mut() {
                last.text.push('\n');
            }
        }
        for segment in std::mem::take(&mut lines[*a]) {
            push_coalescing(&mut out, segment);
        }
        if let Some(b) = b {
            if let Some(last) = out.last_mut() {
                // separator glyphs attach to the preceding segment
                last.text.push_str(glyph);
            }
            for segment in std::mem::take(&mut lines[*b]) {
                push_coalescing(&mut out, segment);
            }
        }
    }
    out
}

fn push_coalescing(out: &mut Vec<TextSegment>, segment: TextSegment) {
    if let Some(last) = out.last_mut() {
        if last.highlight_color == segment.highlight_color
            && last.highlighted == segment.highlighted
        {
            last.text.push_str(&segment.text);
            return;
        }
    }
    out.push(segment);
}
