//! Frame assembly for display screens.
//!
//! Turns configuration, content and canvas dimensions into a
//! platform-agnostic [`StageFrame`]: positioned, sized, styled text
//! elements plus the transition phase the renderer applies its
//! treatments from. Each consumer interprets the frame for its own
//! backend; this module never touches a rendering surface itself.

use serde::Serialize;

use crate::animation::{PendingWake, TransitionController, TransitionPhase};
use crate::compress::{compress_segments_with_fit, FIT_THRESHOLD};
use crate::content::{LiveHighlight, SlideContent};
use crate::layout::{clamp_to_screen, resolve_bounds, PixelBounds};
use crate::markup::parse_markup;
use crate::measure::TextMeasurer;
use crate::screen::{ClockConfig, ElementConfig, ElementRole, ScreenConfig, TransitionConfig};
use crate::segment::{apply_live_highlights, to_plain_text, TextSegment};
use crate::sizing::FitCache;
use crate::style::TextStyle;

/// One positioned, sized, styled element ready to draw.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementFrame {
    /// Which slot this element fills
    pub role: ElementRole,
    /// Resolved pixel rectangle
    pub bounds: PixelBounds,
    /// Fitted font size in pixels
    pub font_size: f64,
    /// False until a real measurement backs the font size; the
    /// renderer suppresses output instead of flashing wrong-sized text
    pub visible: bool,
    /// Ordered renderable text runs
    pub segments: Vec<TextSegment>,
    /// Style the renderer paints with
    pub style: TextStyle,
}

/// Renders one element role, owning its fit cache.
#[derive(Clone, Debug, Default)]
pub struct ElementRenderer {
    cache: FitCache,
}

impl ElementRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the frame for one element.
    ///
    /// Markup is parsed into segments, lines are compressed when the
    /// style asks for it, the result is fitted into the resolved
    /// bounds, and live highlights are overlaid last so they track
    /// exactly what is on screen.
    pub fn render<M>(
        &mut self,
        role: ElementRole,
        config: &ElementConfig,
        text: &str,
        live_highlights: &[LiveHighlight],
        canvas_width: f64,
        canvas_height: f64,
        measurer: &M,
    ) -> ElementFrame
    where
        M: TextMeasurer + ?Sized,
    {
        let style = &config.style;
        let bounds = resolve_bounds(&config.constraints, &config.size, canvas_width, canvas_height);

        let mut segments = parse_markup(text);
        if style.compress_lines {
            segments = compress_segments_with_fit(
                &segments,
                style.line_separator,
                bounds.width,
                FIT_THRESHOLD,
                |line| measurer.measure(line, style, style.max_font_size).map(|m| m.width),
            );
        }

        let plain = to_plain_text(&segments);
        let fit = self.cache.get_or_fit(&plain, style, bounds.width, bounds.height, measurer);

        if !live_highlights.is_empty() {
            segments = apply_live_highlights(&segments, live_highlights);
        }

        ElementFrame {
            role,
            bounds,
            font_size: fit.font_size,
            visible: fit.measured,
            segments,
            style: style.clone(),
        }
    }

    /// Drop the cached fit, forcing the next render to re-measure.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }
}

/// Renders the wall clock.
///
/// The fit cache is keyed on a digit-masked copy of the time text, so
/// the per-second tick reuses the cached size and costs zero measurer
/// calls until the digit count itself changes.
#[derive(Clone, Debug, Default)]
pub struct ClockRenderer {
    cache: FitCache,
}

impl ClockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the clock's frame for the given wall time.
    ///
    /// The clock's configured box may be stale relative to a resized
    /// canvas, so it is clamped fully onto the screen before fitting.
    pub fn render<M>(
        &mut self,
        config: &ClockConfig,
        hours: u32,
        minutes: u32,
        seconds: u32,
        canvas_width: f64,
        canvas_height: f64,
        measurer: &M,
    ) -> ElementFrame
    where
        M: TextMeasurer + ?Sized,
    {
        let element = &config.element;
        let style = &element.style;
        let resolved = resolve_bounds(&element.constraints, &element.size, canvas_width, canvas_height);
        let bounds = clamp_to_screen(&resolved, canvas_width, canvas_height);

        let text = format_clock_time(
            hours,
            minutes,
            seconds,
            config.twenty_four_hour,
            config.show_seconds,
        );
        let mask = digit_template(&text);
        let fit = self.cache.get_or_fit(&mask, style, bounds.width, bounds.height, measurer);

        ElementFrame {
            role: ElementRole::Clock,
            bounds,
            font_size: fit.font_size,
            visible: fit.measured,
            segments: vec![TextSegment::plain(text)],
            style: style.clone(),
        }
    }

    /// Drop the cached fit, forcing the next render to re-measure.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }
}

/// Format a wall time for display.
///
/// Twelve-hour mode drops the leading zero and maps hour zero to 12.
pub fn format_clock_time(
    hours: u32,
    minutes: u32,
    seconds: u32,
    twenty_four_hour: bool,
    show_seconds: bool,
) -> String {
    let mut out = if twenty_four_hour {
        format!("{:02}:{:02}", hours % 24, minutes)
    } else {
        let hour = match hours % 12 {
            0 => 12,
            h => h,
        };
        format!("{}:{:02}", hour, minutes)
    };
    if show_seconds {
        out.push_str(&format!(":{:02}", seconds));
    }
    out
}

/// Replace every digit with `'0'` so all times with the same shape
/// share one fit cache key.
fn digit_template(text: &str) -> String {
    text.chars().map(|c| if c.is_ascii_digit() { '0' } else { c }).collect()
}

/// Platform-agnostic output of one render pass.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageFrame {
    /// Elements in render order
    pub elements: Vec<ElementFrame>,
    /// Transition phase the renderer applies treatments from
    pub phase: TransitionPhase,
    /// Increments on every enter sequence
    pub enter_frame_id: u64,
    /// Increments on every exit sequence
    pub exit_frame_id: u64,
}

/// Owns the element renderers and transition state for one display
/// surface.
///
/// Feed presentation state changes through [`Stage::update`], then call
/// [`Stage::render`] per frame. During a slide transition the stage
/// keeps rendering the outgoing content until its exit has fully
/// settled, so old and new text never overlap on screen.
///
/// ## Example
///
/// ```rust
/// use versecast_core_display::{
///     RatioMeasurer, ScreenConfig, SlideContent, Stage, TransitionPhase,
/// };
///
/// let config = ScreenConfig::default();
/// let mut stage = Stage::new();
///
/// stage.update(&SlideContent::song("Amazing grace"), true);
/// let frame = stage.render(&config, &[], None, 1920.0, 1080.0, &RatioMeasurer::default());
///
/// assert_eq!(frame.phase, TransitionPhase::EnterStart);
/// assert_eq!(frame.elements.len(), 1);
/// assert!(frame.elements[0].visible);
/// ```
#[derive(Clone, Debug)]
pub struct Stage {
    controller: TransitionController,
    main: ElementRenderer,
    content: ElementRenderer,
    reference: ElementRenderer,
    person: ElementRenderer,
    next_preview: ElementRenderer,
    clock: ClockRenderer,
    /// Content currently on screen, tracked so the outgoing slide keeps
    /// rendering through its exit
    shown: Option<SlideContent>,
    /// Content queued behind a running slide exit
    queued: Option<SlideContent>,
}

impl Stage {
    pub fn new() -> Self {
        Self {
            controller: TransitionController::new(TransitionConfig::default().exit_ms),
            main: ElementRenderer::new(),
            content: ElementRenderer::new(),
            reference: ElementRenderer::new(),
            person: ElementRenderer::new(),
            next_preview: ElementRenderer::new(),
            clock: ClockRenderer::new(),
            shown: None,
            queued: None,
        }
    }

    /// Feed the current content and visibility.
    ///
    /// Call whenever the presentation state may have changed; redundant
    /// calls are no-ops.
    pub fn update(&mut self, content: &SlideContent, visible: bool) {
        let key = content.content_key();
        self.controller.update(&key, visible);
        if self.controller.content_key() == Some(key.as_str()) {
            self.shown = Some(content.clone());
        } else if self.controller.next_key() == Some(key.as_str()) {
            self.queued = Some(content.clone());
        }
        self.sync_content();
    }

    /// Assemble the frame for the current state.
    ///
    /// `live_highlights` apply to the main element only. `next_item`
    /// feeds the next-item preview when it is enabled; the preview is
    /// independent of the transition phase.
    pub fn render<M>(
        &mut self,
        config: &ScreenConfig,
        live_highlights: &[LiveHighlight],
        next_item: Option<&SlideContent>,
        canvas_width: f64,
        canvas_height: f64,
        measurer: &M,
    ) -> StageFrame
    where
        M: TextMeasurer + ?Sized,
    {
        self.controller.set_exit_ms(config.transition.exit_ms);

        let phase = self.controller.phase();
        let mut elements = Vec::new();

        if phase.shows_content() {
            if let Some(content) = &self.shown {
                let layout = config.layout_for(content.kind);
                elements.push(self.main.render(
                    ElementRole::Main,
                    &layout.main,
                    &content.main,
                    live_highlights,
                    canvas_width,
                    canvas_height,
                    measurer,
                ));
                if let (Some(element), Some(text)) = (&layout.content, &content.content) {
                    elements.push(self.content.render(
                        ElementRole::Content,
                        element,
                        text,
                        &[],
                        canvas_width,
                        canvas_height,
                        measurer,
                    ));
                }
                if let (Some(element), Some(text)) = (&layout.reference, &content.reference) {
                    elements.push(self.reference.render(
                        ElementRole::Reference,
                        element,
                        text,
                        &[],
                        canvas_width,
                        canvas_height,
                        measurer,
                    ));
                }
                if let (Some(element), Some(text)) = (&layout.person, &content.person) {
                    elements.push(self.person.render(
                        ElementRole::Person,
                        element,
                        text,
                        &[],
                        canvas_width,
                        canvas_height,
                        measurer,
                    ));
                }
            }
        }

        if config.next_preview.enabled {
            if let Some(next) = next_item {
                elements.push(self.next_preview.render(
                    ElementRole::NextPreview,
                    &config.next_preview.element,
                    &next.main,
                    &[],
                    canvas_width,
                    canvas_height,
                    measurer,
                ));
            }
        }

        StageFrame {
            elements,
            phase,
            enter_frame_id: self.controller.enter_frame_id(),
            exit_frame_id: self.controller.exit_frame_id(),
        }
    }

    /// Produce the clock's frame, or `None` while the clock is
    /// disabled.
    ///
    /// Independent of content and phase; call it from the embedder's
    /// per-second tick.
    pub fn render_clock<M>(
        &mut self,
        config: &ScreenConfig,
        hours: u32,
        minutes: u32,
        seconds: u32,
        canvas_width: f64,
        canvas_height: f64,
        measurer: &M,
    ) -> Option<ElementFrame>
    where
        M: TextMeasurer + ?Sized,
    {
        if !config.clock.enabled {
            return None;
        }
        Some(self.clock.render(
            &config.clock,
            hours,
            minutes,
            seconds,
            canvas_width,
            canvas_height,
            measurer,
        ))
    }

    /// The continuation the transition machine is waiting on, if any.
    #[inline]
    pub fn pending(&self) -> Option<PendingWake> {
        self.controller.pending()
    }

    /// Get the current transition phase.
    #[inline]
    pub fn phase(&self) -> TransitionPhase {
        self.controller.phase()
    }

    /// Report one committed paint frame for the given token.
    pub fn frame_committed(&mut self, token: u64) {
        self.controller.frame_committed(token);
        self.sync_content();
    }

    /// Report an elapsed delay for the given token.
    pub fn delay_elapsed(&mut self, token: u64) {
        self.controller.delay_elapsed(token);
        self.sync_content();
    }

    /// Report that the enter treatment's duration has elapsed.
    pub fn enter_finished(&mut self) {
        self.controller.enter_finished();
    }

    /// Clear content and transition state, as when the surface
    /// unmounts or changes identity.
    pub fn reset(&mut self) {
        self.controller.reset();
        self.shown = None;
        self.queued = None;
    }

    /// Drop every cached fit, as when a web font finishes loading and
    /// metrics change under the cache.
    pub fn invalidate_fits(&mut self) {
        self.main.invalidate();
        self.content.invalidate();
        self.reference.invalidate();
        self.person.invalidate();
        self.next_preview.invalidate();
        self.clock.invalidate();
    }

    /// Promote queued content once the machine owns its key, and drop
    /// it when the machine no longer targets it.
    fn sync_content(&mut self) {
        if let Some(queued) = &self.queued {
            let queued_key = queued.content_key();
            if self.controller.content_key() == Some(queued_key.as_str()) {
                self.shown = self.queued.take();
            } else if self.controller.next_key() != Some(queued_key.as_str()) {
                self.queued = None;
            }
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}
