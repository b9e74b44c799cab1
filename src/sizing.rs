//! Auto-fit font sizing for display elements.
//!
//! Given a resolved pixel box, a style and the text to show, pick the
//! largest font size that fits. Two strategies exist: a single-pass
//! whole-block ratio fit, and a per-line bisection used when every line
//! must independently fit the box width without wrapping. Results are
//! cached per element so repeated paints (and the one-per-second clock
//! tick) cost zero measurer calls.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::measure::TextMeasurer;
use crate::style::TextStyle;

/// Outcome of a fit pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitResult {
    /// Chosen font size in pixels.
    pub font_size: f64,
    /// False when no measurement could be taken. The renderer keeps the
    /// element hidden (no flash of wrongly sized text) and retries on
    /// the next frame.
    pub measured: bool,
}

impl FitResult {
    #[inline]
    fn sized(font_size: f64) -> Self {
        FitResult { font_size, measured: true }
    }

    #[inline]
    fn unmeasured(font_size: f64) -> Self {
        FitResult { font_size, measured: false }
    }
}

/// Pick the largest font size at which `text` fits the given box.
///
/// With `auto_scale` off the style's `max_font_size` is returned with
/// no measurement at all. Degenerate boxes and measurement failures
/// yield an unmeasured result at `max_font_size`; the caller hides the
/// element and retries next frame rather than showing unverified text.
///
/// ## Arguments
///
/// * `text` - The (already compressed) text to fit
/// * `style` - Style carrying size bounds, line height and fit mode
/// * `bounds_width` / `bounds_height` - Resolved box in pixels
/// * `measurer` - Text measurement capability
///
/// ## Example
///
/// ```rust
/// use versecast_core_display::{fit_text, RatioMeasurer, TextStyle};
///
/// let style = TextStyle::default(); // max 80, min 12
/// let fit = fit_text("hello", &style, 120.0, 500.0, &RatioMeasurer::default());
/// assert!(fit.measured);
/// assert_eq!(fit.font_size, 40.0);
/// ```
pub fn fit_text<M>(
    text: &str,
    style: &TextStyle,
    bounds_width: f64,
    bounds_height: f64,
    measurer: &M,
) -> FitResult
where
    M: TextMeasurer + ?Sized,
{
    if !style.auto_scale {
        return FitResult::sized(style.max_font_size);
    }
    if bounds_width <= 0.0 || bounds_height <= 0.0 {
        return FitResult::unmeasured(style.max_font_size);
    }
    if style.fit_line_to_width {
        fit_per_line(text, style, bounds_width, bounds_height, measurer)
            .unwrap_or_else(|| FitResult::unmeasured(style.max_font_size))
    } else {
        fit_block_ratio(text, style, bounds_width, bounds_height, measurer)
    }
}

/// Whole-block ratio fit: measure once at `max_font_size`, scale down
/// by the tighter of the width and height ratios, never up.
fn fit_block_ratio<M>(
    text: &str,
    style: &TextStyle,
    bounds_width: f64,
    bounds_height: f64,
    measurer: &M,
) -> FitResult
where
    M: TextMeasurer + ?Sized,
{
    let Some(metrics) = measurer.measure(text, style, style.max_font_size) else {
        return FitResult::unmeasured(style.max_font_size);
    };
    if metrics.width <= 0.0 || metrics.height <= 0.0 {
        // nothing to show; any size fits
        return FitResult::sized(style.max_font_size);
    }
    let width_ratio = bounds_width / metrics.width;
    let height_ratio = bounds_height / metrics.height;
    let ratio = width_ratio.min(height_ratio).min(1.0);
    let font_size = (style.max_font_size * ratio).floor().max(style.min_font_size);
    FitResult::sized(font_size)
}

/// Per-line fit: bisect integer font sizes in `[min, max]` such that
/// every line fits the width and the stacked lines fit the height.
///
/// Monotonicity (anything fitting at size `s` fits at any smaller
/// size) holds because wrapping is disabled, so the search converges
/// in `ceil(log2(max - min))` probes.
fn fit_per_line<M>(
    text: &str,
    style: &TextStyle,
    bounds_width: f64,
    bounds_height: f64,
    measurer: &M,
) -> Option<FitResult>
where
    M: TextMeasurer + ?Sized,
{
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return Some(FitResult::sized(style.max_font_size));
    }

    let min = style.min_font_size.floor().max(1.0) as u32;
    let max = style.max_font_size.floor().max(min as f64) as u32;

    let fits = |size: u32| -> Option<bool> {
        let size_px = size as f64;
        for line in &lines {
            let metrics = measurer.measure(line, style, size_px)?;
            if metrics.width > bounds_width {
                return Some(false);
            }
        }
        let stacked = lines.len() as f64 * size_px * style.line_height;
        Some(stacked <= bounds_height)
    };

    if !fits(min)? {
        // even the floor overflows; the floor still wins
        return Some(FitResult::sized(min as f64));
    }
    if fits(max)? {
        return Some(FitResult::sized(max as f64));
    }

    let mut lo = min; // known to fit
    let mut hi = max; // known not to fit
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if fits(mid)? {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some(FitResult::sized(lo as f64))
}

/// Hash of the style fields that influence measurement.
///
/// Color, alignment and underline change pixels but never metrics, so
/// they are deliberately excluded; editing them must not flush fit
/// caches mid-show.
pub fn style_signature(style: &TextStyle) -> u64 {
    let mut hasher = DefaultHasher::new();
    style.font_family.hash(&mut hasher);
    style.bold.hash(&mut hasher);
    style.italic.hash(&mut hasher);
    style.max_font_size.to_bits().hash(&mut hasher);
    style.min_font_size.to_bits().hash(&mut hasher);
    style.line_height.to_bits().hash(&mut hasher);
    style.auto_scale.hash(&mut hasher);
    style.fit_line_to_width.hash(&mut hasher);
    hasher.finish()
}

#[derive(Clone, Debug, PartialEq)]
struct FitKey {
    text: String,
    width_bits: u64,
    height_bits: u64,
    style_sig: u64,
}

/// Single-entry fit cache, owned by one rendered element.
///
/// Keyed on content, bounds and the measurement-relevant style
/// signature. Anything else changing (phase, highlight overlays, the
/// clock's displayed digits) reuses the cached size verbatim.
#[derive(Clone, Debug, Default)]
pub struct FitCache {
    entry: Option<(FitKey, FitResult)>,
}

impl FitCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result on a key match, otherwise fit afresh.
    ///
    /// Only measured results are stored: an element that could not be
    /// measured this frame must retry, not commit to a guess.
    pub fn get_or_fit<M>(
        &mut self,
        text: &str,
        style: &TextStyle,
        bounds_width: f64,
        bounds_height: f64,
        measurer: &M,
    ) -> FitResult
    where
        M: TextMeasurer + ?Sized,
    {
        let style_sig = style_signature(style);
        if let Some((key, result)) = &self.entry {
            if key.style_sig == style_sig
                && key.width_bits == bounds_width.to_bits()
                && key.height_bits == bounds_height.to_bits()
                && key.text == text
            {
                return *result;
            }
        }

        let result = fit_text(text, style, bounds_width, bounds_height, measurer);
        if result.measured {
            if self.entry.is_some() {
                log::debug!("fit cache miss; refit to {}px", result.font_size);
            }
            self.entry = Some((
                FitKey {
                    text: text.to_string(),
                    width_bits: bounds_width.to_bits(),
                    height_bits: bounds_height.to_bits(),
                    style_sig,
                },
                result,
            ));
        }
        result
    }

    /// Drop the cached result, forcing the next call to refit.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{RatioMeasurer, TextMetrics};
    use proptest::prelude::*;
    use std::cell::Cell;

    /// Counts calls before delegating to a `RatioMeasurer`.
    struct CountingMeasurer {
        inner: RatioMeasurer,
        calls: Cell<usize>,
    }

    impl CountingMeasurer {
        fn new() -> Self {
            CountingMeasurer { inner: RatioMeasurer::default(), calls: Cell::new(0) }
        }
    }

    impl TextMeasurer for CountingMeasurer {
        fn measure(&self, text: &str, style: &TextStyle, font_size: f64) -> Option<TextMetrics> {
            self.calls.set(self.calls.get() + 1);
            self.inner.measure(text, style, font_size)
        }
    }

    /// A surface that is never ready.
    struct NotReady {
        calls: Cell<usize>,
    }

    impl TextMeasurer for NotReady {
        fn measure(&self, _: &str, _: &TextStyle, _: f64) -> Option<TextMetrics> {
            self.calls.set(self.calls.get() + 1);
            None
        }
    }

    /// Panics when consulted; for paths that must not measure.
    struct MustNotMeasure;

    impl TextMeasurer for MustNotMeasure {
        fn measure(&self, _: &str, _: &TextStyle, _: f64) -> Option<TextMetrics> {
            panic!("measurement must not happen on this path");
        }
    }

    fn style() -> TextStyle {
        TextStyle { line_height: 1.0, ..TextStyle::default() }
    }

    #[test]
    fn ratio_fit_scales_down_to_width() {
        // "hello" at max 80: width 5*80*0.6 = 240, so a 120px box halves it
        let fit = fit_text("hello", &style(), 120.0, 500.0, &RatioMeasurer::default());
        assert!(fit.measured);
        assert_eq!(fit.font_size, 40.0);
    }

    #[test]
    fn ratio_fit_never_upscales() {
        let fit = fit_text("hello", &style(), 100_000.0, 100_000.0, &RatioMeasurer::default());
        assert_eq!(fit.font_size, 80.0);
    }

    #[test]
    fn ratio_fit_respects_height() {
        // 2 lines at max 80 with line_height 1.0: height 160
        let fit = fit_text("ab\ncd", &style(), 10_000.0, 40.0, &RatioMeasurer::default());
        // height ratio 40/160 = 0.25 -> 80*0.25 = 20
        assert_eq!(fit.font_size, 20.0);
    }

    #[test]
    fn ratio_fit_floors_at_min_font_size() {
        let fit = fit_text("hello", &style(), 6.0, 500.0, &RatioMeasurer::default());
        assert!(fit.measured);
        assert_eq!(fit.font_size, 12.0);
    }

    #[test]
    fn auto_scale_off_skips_measurement() {
        let mut s = style();
        s.auto_scale = false;
        let fit = fit_text("anything", &s, 100.0, 100.0, &MustNotMeasure);
        assert!(fit.measured);
        assert_eq!(fit.font_size, s.max_font_size);
    }

    #[test]
    fn degenerate_bounds_defer_without_measuring() {
        let fit = fit_text("text", &style(), 0.0, 100.0, &MustNotMeasure);
        assert!(!fit.measured);
        assert_eq!(fit.font_size, 80.0);

        let fit = fit_text("text", &style(), 100.0, -5.0, &MustNotMeasure);
        assert!(!fit.measured);
    }

    #[test]
    fn unready_surface_defers() {
        let not_ready = NotReady { calls: Cell::new(0) };
        let fit = fit_text("text", &style(), 100.0, 100.0, &not_ready);
        assert!(!fit.measured);
        assert_eq!(fit.font_size, 80.0);
        assert_eq!(not_ready.calls.get(), 1);
    }

    #[test]
    fn empty_text_fits_at_max() {
        let fit = fit_text("", &style(), 100.0, 100.0, &RatioMeasurer::default());
        assert!(fit.measured);
        assert_eq!(fit.font_size, 80.0);
    }

    #[test]
    fn per_line_bisection_finds_largest_fitting_size() {
        let mut s = style();
        s.fit_line_to_width = true;
        // widest line 10 chars: width 6*size <= 300 means size <= 50
        let fit = fit_text(
            "aaaaaaaaaa\nbbbb",
            &s,
            300.0,
            200.0,
            &RatioMeasurer::default(),
        );
        assert!(fit.measured);
        assert_eq!(fit.font_size, 50.0);
    }

    #[test]
    fn per_line_respects_stacked_height() {
        let mut s = style();
        s.fit_line_to_width = true;
        // width is no constraint; 3 lines * size <= 90 means size <= 30
        let fit = fit_text("a\nb\nc", &s, 10_000.0, 90.0, &RatioMeasurer::default());
        assert_eq!(fit.font_size, 30.0);
    }

    #[test]
    fn per_line_floors_at_min_when_nothing_fits() {
        let mut s = style();
        s.fit_line_to_width = true;
        let fit = fit_text("wwwwwwwwwwwwwwwwwwww", &s, 5.0, 5.0, &RatioMeasurer::default());
        assert!(fit.measured);
        assert_eq!(fit.font_size, s.min_font_size);
    }

    #[test]
    fn per_line_unready_surface_defers() {
        let mut s = style();
        s.fit_line_to_width = true;
        let not_ready = NotReady { calls: Cell::new(0) };
        let fit = fit_text("a\nb", &s, 100.0, 100.0, &not_ready);
        assert!(!fit.measured);
        assert_eq!(fit.font_size, s.max_font_size);
    }

    #[test]
    fn cache_hit_costs_zero_measurer_calls() {
        let measurer = CountingMeasurer::new();
        let mut cache = FitCache::new();
        let s = style();

        let first = cache.get_or_fit("hello", &s, 120.0, 500.0, &measurer);
        assert_eq!(first.font_size, 40.0);
        let after_first = measurer.calls.get();
        assert!(after_first > 0);

        let second = cache.get_or_fit("hello", &s, 120.0, 500.0, &measurer);
        assert_eq!(second, first);
        assert_eq!(measurer.calls.get(), after_first);
    }

    #[test]
    fn cache_refits_on_content_or_bounds_change() {
        let measurer = CountingMeasurer::new();
        let mut cache = FitCache::new();
        let s = style();

        cache.get_or_fit("hello", &s, 120.0, 500.0, &measurer);
        let baseline = measurer.calls.get();

        cache.get_or_fit("goodbye", &s, 120.0, 500.0, &measurer);
        assert!(measurer.calls.get() > baseline);

        let after_text = measurer.calls.get();
        cache.get_or_fit("goodbye", &s, 240.0, 500.0, &measurer);
        assert!(measurer.calls.get() > after_text);
    }

    #[test]
    fn metric_neutral_style_edits_keep_the_cache() {
        let measurer = CountingMeasurer::new();
        let mut cache = FitCache::new();
        let mut s = style();

        cache.get_or_fit("hello", &s, 120.0, 500.0, &measurer);
        let baseline = measurer.calls.get();

        s.color = "#ff00aa".to_string();
        s.underline = true;
        let fit = cache.get_or_fit("hello", &s, 120.0, 500.0, &measurer);
        assert_eq!(measurer.calls.get(), baseline);
        assert_eq!(fit.font_size, 40.0);
    }

    #[test]
    fn metric_relevant_style_edits_refit() {
        let measurer = CountingMeasurer::new();
        let mut cache = FitCache::new();
        let mut s = style();

        cache.get_or_fit("hello", &s, 120.0, 500.0, &measurer);
        let baseline = measurer.calls.get();

        s.max_font_size = 60.0;
        cache.get_or_fit("hello", &s, 120.0, 500.0, &measurer);
        assert!(measurer.calls.get() > baseline);
    }

    #[test]
    fn unmeasured_results_are_not_cached() {
        let not_ready = NotReady { calls: Cell::new(0) };
        let mut cache = FitCache::new();
        let s = style();

        let first = cache.get_or_fit("hello", &s, 120.0, 500.0, &not_ready);
        assert!(!first.measured);
        assert_eq!(not_ready.calls.get(), 1);

        // still not ready: must try again, not serve the failure
        cache.get_or_fit("hello", &s, 120.0, 500.0, &not_ready);
        assert_eq!(not_ready.calls.get(), 2);
    }

    #[test]
    fn invalidate_forces_refit() {
        let measurer = CountingMeasurer::new();
        let mut cache = FitCache::new();
        let s = style();

        cache.get_or_fit("hello", &s, 120.0, 500.0, &measurer);
        let baseline = measurer.calls.get();

        cache.invalidate();
        cache.get_or_fit("hello", &s, 120.0, 500.0, &measurer);
        assert!(measurer.calls.get() > baseline);
    }

    proptest! {
        #[test]
        fn per_line_fit_is_monotonic_and_maximal(
            max_size in 20u32..120,
            line_lengths in proptest::collection::vec(1usize..20, 1..5),
            bw in 10.0f64..2000.0,
            bh in 10.0f64..2000.0,
        ) {
            let mut s = style();
            s.fit_line_to_width = true;
            s.max_font_size = max_size as f64;
            let text: Vec<String> =
                line_lengths.iter().map(|n| "x".repeat(*n)).collect();
            let text = text.join("\n");
            let line_count = line_lengths.len();
            let longest = line_lengths.iter().copied().max().unwrap_or(0);

            // mirror the measurer's arithmetic exactly
            let fits = |size: f64| -> bool {
                let width = longest as f64 * size * 0.6;
                let stacked = line_count as f64 * size * s.line_height;
                width <= bw && stacked <= bh
            };

            let fit = fit_text(&text, &s, bw, bh, &RatioMeasurer::default());
            prop_assert!(fit.measured);
            let chosen = fit.font_size as u32;

            // monotonic below the chosen size, unless nothing fits at all
            if fits(chosen as f64) {
                for size in (s.min_font_size as u32)..=chosen {
                    prop_assert!(fits(size as f64));
                }
            } else {
                prop_assert_eq!(chosen, s.min_font_size as u32);
            }
            // maximal: the next integer size up must not fit
            if chosen < max_size {
                prop_assert!(!fits(chosen as f64 + 1.0));
            }
        }
    }
}
