//! Edge-constraint layout resolution.
//!
//! Operators position display elements by anchoring edges to the canvas
//! (percent or pixel offsets) rather than by absolute rectangles, so the
//! same configuration scales across projector resolutions. This module
//! turns those declarative constraints into concrete pixel boxes.

use serde::{Deserialize, Serialize};

/// Measurement unit for a constraint or size value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// Percentage of the relevant canvas dimension.
    #[default]
    #[serde(rename = "%")]
    Percent,
    /// Absolute device pixels.
    #[serde(rename = "px")]
    Px,
}

/// One edge anchor. Disabled edges do not participate in resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConstraint {
    pub enabled: bool,
    pub value: f64,
    pub unit: Unit,
}

impl EdgeConstraint {
    /// An enabled percent anchor.
    #[inline]
    pub fn percent(value: f64) -> Self {
        EdgeConstraint { enabled: true, value, unit: Unit::Percent }
    }

    /// An enabled pixel anchor.
    #[inline]
    pub fn px(value: f64) -> Self {
        EdgeConstraint { enabled: true, value, unit: Unit::Px }
    }

    fn to_px(&self, canvas_dim: f64) -> f64 {
        match self.unit {
            Unit::Percent => self.value / 100.0 * canvas_dim,
            Unit::Px => self.value,
        }
    }
}

/// Edge anchors for all four sides of an element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    pub left: EdgeConstraint,
    pub right: EdgeConstraint,
    pub top: EdgeConstraint,
    pub bottom: EdgeConstraint,
}

/// Requested element size, used on an axis only when that axis is not
/// stretched by two opposing anchors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SizeSpec {
    pub width: f64,
    pub width_unit: Unit,
    pub height: f64,
    pub height_unit: Unit,
}

impl Default for SizeSpec {
    fn default() -> Self {
        SizeSpec {
            width: 100.0,
            width_unit: Unit::Percent,
            height: 100.0,
            height_unit: Unit::Percent,
        }
    }
}

/// A resolved pixel rectangle on the canvas.
///
/// Resolution never fails; impossible configurations produce degenerate
/// (zero-area) boxes that downstream fitting treats as "nothing to show".
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelBounds {
    /// True when the box has no drawable area.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

fn size_to_px(value: f64, unit: Unit, canvas_dim: f64) -> f64 {
    let px = match unit {
        Unit::Percent => value / 100.0 * canvas_dim,
        Unit::Px => value,
    };
    px.max(0.0)
}

/// Resolve edge constraints and a size request into a pixel rectangle.
///
/// Per axis:
/// - both opposing edges enabled: the element stretches between them and
///   the size request for that axis is ignored
/// - one edge enabled: the element anchors to it at the requested size
/// - neither enabled: origin 0 at the requested size
///
/// # Example
///
/// ```
/// use versecast_core_display::{resolve_bounds, Constraints, EdgeConstraint, SizeSpec, Unit};
///
/// let constraints = Constraints {
///     left: EdgeConstraint::percent(10.0),
///     top: EdgeConstraint::px(0.0),
///     ..Constraints::default()
/// };
/// let size = SizeSpec {
///     width: 50.0,
///     width_unit: Unit::Percent,
///     height: 20.0,
///     height_unit: Unit::Percent,
/// };
/// let bounds = resolve_bounds(&constraints, &size, 1000.0, 500.0);
/// assert_eq!((bounds.x, bounds.y), (100.0, 0.0));
/// assert_eq!((bounds.width, bounds.height), (500.0, 100.0));
/// ```
pub fn resolve_bounds(
    constraints: &Constraints,
    size: &SizeSpec,
    canvas_width: f64,
    canvas_height: f64,
) -> PixelBounds {
    let spec_w = size_to_px(size.width, size.width_unit, canvas_width);
    let spec_h = size_to_px(size.height, size.height_unit, canvas_height);

    let (x, width) = match (constraints.left.enabled, constraints.right.enabled) {
        (true, true) => {
            let left = constraints.left.to_px(canvas_width);
            let right = constraints.right.to_px(canvas_width);
            (left, (canvas_width - left - right).max(0.0))
        }
        (true, false) => (constraints.left.to_px(canvas_width), spec_w),
        (false, true) => {
            let right = constraints.right.to_px(canvas_width);
            (canvas_width - right - spec_w, spec_w)
        }
        (false, false) => (0.0, spec_w),
    };

    let (y, height) = match (constraints.top.enabled, constraints.bottom.enabled) {
        (true, true) => {
            let top = constraints.top.to_px(canvas_height);
            let bottom = constraints.bottom.to_px(canvas_height);
            (top, (canvas_height - top - bottom).max(0.0))
        }
        (true, false) => (constraints.top.to_px(canvas_height), spec_h),
        (false, true) => {
            let bottom = constraints.bottom.to_px(canvas_height);
            (canvas_height - bottom - spec_h, spec_h)
        }
        (false, false) => (0.0, spec_h),
    };

    PixelBounds { x, y, width, height }
}

/// Force a rectangle fully onto the canvas.
///
/// Size is clamped to at least 1x1 and at most the canvas; the origin is
/// then moved so the box stays inside. Used for elements whose stored
/// configuration may be stale relative to a resized canvas, such as the
/// clock.
pub fn clamp_to_screen(bounds: &PixelBounds, canvas_width: f64, canvas_height: f64) -> PixelBounds {
    let width = bounds.width.min(canvas_width).max(1.0);
    let height = bounds.height.min(canvas_height).max(1.0);
    let x = bounds.x.min(canvas_width - width).max(0.0);
    let y = bounds.y.min(canvas_height - height).max(0.0);
    PixelBounds { x, y, width, height }
}
