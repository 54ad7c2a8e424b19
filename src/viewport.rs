//! Coordinate mapping between source-image pixels and screen pixels.
//!
//! Overlay geometry is always stored in source-image space. Every time the
//! rendered image changes size or position, a fresh [`ViewportState`] is
//! computed and every overlay is re-derived from its source rectangle with
//! [`to_screen`]. Nothing here rounds; pixel snapping is the renderer's job.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A point in either source or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle. `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build a rectangle from two opposite corners in any order.
    #[must_use]
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x: x1.min(x2),
            y: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether `pt` lies inside the rectangle (edges inclusive).
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x && pt.x <= self.right() && pt.y >= self.y && pt.y <= self.bottom()
    }
}

/// How the page image is sized inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Image height follows the container height.
    #[default]
    Contain,
    /// Image width follows the container width.
    Width,
    /// Natural pixel size.
    Original,
}

impl FitMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contain => "contain",
            Self::Width => "width",
            Self::Original => "original",
        }
    }
}

impl fmt::Display for FitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fit mode '{0}' (expected 'contain', 'width' or 'original')")]
pub struct ParseFitModeError(pub String);

impl FromStr for FitMode {
    type Err = ParseFitModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "contain" => Ok(Self::Contain),
            "width" => Ok(Self::Width),
            "original" => Ok(Self::Original),
            other => Err(ParseFitModeError(other.to_owned())),
        }
    }
}

/// Current on-screen geometry of the displayed page image.
///
/// Derived from measurements on every layout change; never carried across
/// pages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub natural_width: u32,
    pub natural_height: u32,
    pub rendered_width: f64,
    pub rendered_height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    /// `rendered_width / natural_width`, or `1.0` while pending.
    pub scale_x: f64,
    /// `rendered_height / natural_height`, or `1.0` while pending.
    pub scale_y: f64,
    pub fit_mode: FitMode,
}

impl ViewportState {
    /// True while the natural image size is unknown. Scales are meaningless
    /// until this turns false.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.natural_width == 0 || self.natural_height == 0
    }

    /// Tag the viewport with the fit mode that produced it.
    #[must_use]
    pub fn with_fit_mode(mut self, fit_mode: FitMode) -> Self {
        self.fit_mode = fit_mode;
        self
    }

    /// Snapshot for callers converting screen points back to source space.
    /// Scales are never 0 or non-finite; an unlaid-out page reports 1.
    #[must_use]
    pub fn bounds(&self) -> OverlayBounds {
        OverlayBounds {
            rendered_width: self.rendered_width,
            rendered_height: self.rendered_height,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
            natural_width: self.natural_width,
            natural_height: self.natural_height,
            scale_x: usable_scale(self.scale_x),
            scale_y: usable_scale(self.scale_y),
        }
    }
}

fn usable_scale(scale: f64) -> f64 {
    if scale.is_normal() { scale } else { 1.0 }
}

impl Default for ViewportState {
    fn default() -> Self {
        compute_viewport(0, 0, 0.0, 0.0, 0.0, 0.0)
    }
}

/// Geometry snapshot exposed to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayBounds {
    pub rendered_width: f64,
    pub rendered_height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub natural_width: u32,
    pub natural_height: u32,
    pub scale_x: f64,
    pub scale_y: f64,
}

/// Build a viewport from the natural image size and the *measured* rendered
/// box. Negative or non-finite measurements are treated as zero.
#[must_use]
pub fn compute_viewport(
    natural_w: u32,
    natural_h: u32,
    rendered_w: f64,
    rendered_h: f64,
    offset_x: f64,
    offset_y: f64,
) -> ViewportState {
    let rendered_width = sanitize_extent(rendered_w);
    let rendered_height = sanitize_extent(rendered_h);
    let pending = natural_w == 0 || natural_h == 0;
    let (scale_x, scale_y) = if pending {
        (1.0, 1.0)
    } else {
        (rendered_width / f64::from(natural_w), rendered_height / f64::from(natural_h))
    };

    ViewportState {
        natural_width: natural_w,
        natural_height: natural_h,
        rendered_width,
        rendered_height,
        offset_x: sanitize_offset(offset_x),
        offset_y: sanitize_offset(offset_y),
        scale_x,
        scale_y,
        fit_mode: FitMode::default(),
    }
}

/// Map a source-space rectangle to screen space. Linear and exact.
#[must_use]
pub fn to_screen(rect: Rect, viewport: &ViewportState) -> Rect {
    Rect {
        x: rect.x * viewport.scale_x + viewport.offset_x,
        y: rect.y * viewport.scale_y + viewport.offset_y,
        width: rect.width * viewport.scale_x,
        height: rect.height * viewport.scale_y,
    }
}

/// Map a screen-space point back to source space.
///
/// Returns `None` while the viewport is pending or the image has no rendered
/// extent.
#[must_use]
pub fn to_source(screen: Point, viewport: &ViewportState) -> Option<Point> {
    if viewport.is_pending() || viewport.scale_x <= 0.0 || viewport.scale_y <= 0.0 {
        return None;
    }
    Some(Point {
        x: (screen.x - viewport.offset_x) / viewport.scale_x,
        y: (screen.y - viewport.offset_y) / viewport.scale_y,
    })
}

/// Derive the rendered box and offset of the image inside a container of the
/// given size, for hosts without a layout engine of their own.
///
/// The image is centred on each axis where it is smaller than the container
/// and pinned to 0 where it overflows.
#[must_use]
pub fn layout_image(fit_mode: FitMode, natural_w: u32, natural_h: u32, container: Size) -> (Size, Point) {
    if natural_w == 0 || natural_h == 0 {
        return (Size::default(), Point::default());
    }
    let nw = f64::from(natural_w);
    let nh = f64::from(natural_h);
    let cw = sanitize_extent(container.width);
    let ch = sanitize_extent(container.height);

    let rendered = match fit_mode {
        FitMode::Contain => Size::new(nw * ch / nh, ch),
        FitMode::Width => Size::new(cw, nh * cw / nw),
        FitMode::Original => Size::new(nw, nh),
    };
    let offset = Point {
        x: ((cw - rendered.width) / 2.0).max(0.0),
        y: ((ch - rendered.height) / 2.0).max(0.0),
    };
    (rendered, offset)
}

fn sanitize_extent(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

fn sanitize_offset(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}
