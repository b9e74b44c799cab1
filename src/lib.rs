//! # versecast-core-display
//!
//! Core layout and rendering logic for live presentation screens.
//!
//! This crate provides platform-agnostic data structures and logic for:
//! - Resolving per-edge constraints and size requests into pixel bounds
//! - Auto-fitting text into its box (whole-block ratio or per-line bisection)
//! - Compressing short adjacent lines, with optional width-fit checking
//! - Parsing lightly marked-up text into highlightable segments
//! - Sequencing enter/exit/slide transitions across sibling elements
//!
//! ## Features
//!
//! - `web` - Browser text measurement and frame/timer waits via WASM
//! - `toml` - Screen configuration from TOML documents
//!
//! ## Example
//!
//! ```rust
//! use versecast_core_display::{RatioMeasurer, ScreenConfig, SlideContent, Stage};
//!
//! let config = ScreenConfig::default();
//! let mut stage = Stage::new();
//!
//! // The operator sends a slide to the screen.
//! stage.update(&SlideContent::song("Amazing grace\nhow sweet the sound"), true);
//!
//! // Each frame: resolve, fit and hand the result to the renderer.
//! let frame = stage.render(&config, &[], None, 1920.0, 1080.0, &RatioMeasurer::default());
//! assert!(frame.elements[0].visible);
//!
//! // Drive the transition from the host's paint callbacks.
//! let pending = stage.pending().unwrap();
//! stage.frame_committed(pending.token);
//! stage.frame_committed(pending.token);
//! stage.enter_finished();
//! ```

pub mod animation;
mod color;
mod compress;
mod content;
mod layout;
mod markup;
pub mod measure;
mod render;
mod screen;
mod segment;
mod sizing;
mod style;

pub use animation::{PendingWake, TransitionController, TransitionPhase, Wake, SLIDE_SETTLE_MS};
pub use color::{parse_color, Rgb};
pub use compress::{
    compress, compress_segments, compress_segments_with_fit, compress_with_fit, FIT_THRESHOLD,
};
pub use content::{ContentKind, LiveHighlight, SlideContent};
pub use layout::{
    clamp_to_screen, resolve_bounds, Constraints, EdgeConstraint, PixelBounds, SizeSpec, Unit,
};
pub use markup::parse_markup;
pub use measure::{css_font, RatioMeasurer, TextMeasurer, TextMetrics};
pub use render::{
    format_clock_time, ClockRenderer, ElementFrame, ElementRenderer, Stage, StageFrame,
};
pub use screen::{
    ClockConfig, ElementConfig, ElementRole, NextPreviewConfig, RoleLayout, ScreenConfig,
    TransitionConfig,
};
pub use segment::{apply_live_highlights, to_plain_text, TextSegment};
pub use sizing::{fit_text, style_signature, FitCache, FitResult};
pub use style::{HAlign, LineSeparator, TextStyle, VAlign};

#[cfg(feature = "web")]
pub use animation::web::after_paint_commit;
#[cfg(feature = "web")]
pub use measure::web::DomTextMeasurer;
