//! Adaptive font sizing for overlay text.
//!
//! [`TextFitter::fit`] picks a font size so that the text rendered inside an
//! overlay box fits the box along its dominant axis without overflowing the
//! other one. The search is two-phase but never both in one call: an
//! overflowing box only shrinks, a fitting box only grows (or holds). Each
//! call performs at most `max_px - min_px` measurements after the first.
//!
//! Measurement is delegated to the host through [`TextMetricsProvider`] (one
//! text, varying font size) or [`TextSurface`] (any text in any box).

#[cfg(test)]
#[path = "text_fit_test.rs"]
mod text_fit_test;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::FitConfig;
use crate::consts::{DEFAULT_FONT_PX, DEFAULT_MAX_FONT_PX, DEFAULT_MIN_FONT_PX};
use crate::viewport::Size;

/// Requested writing direction of an overlay's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    /// Decide from the box shape: wider than tall is horizontal.
    #[default]
    Auto,
    #[serde(alias = "horizontal-tb")]
    Horizontal,
    #[serde(alias = "vertical-rl", alias = "tb-rl")]
    Vertical,
}

impl TextDirection {
    /// Resolve to a concrete writing class for a box of the given size.
    #[must_use]
    pub fn resolve(self, frame: Size) -> WritingClass {
        match self {
            Self::Horizontal => WritingClass::Horizontal,
            Self::Vertical => WritingClass::Vertical,
            Self::Auto if frame.width > frame.height => WritingClass::Horizontal,
            Self::Auto => WritingClass::Vertical,
        }
    }
}

/// Concrete writing mode used for layout and fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritingClass {
    /// Left-to-right rows, top to bottom.
    Horizontal,
    /// Top-to-bottom columns, right to left.
    Vertical,
}

impl WritingClass {
    #[must_use]
    pub fn dominant_axis(self) -> Axis {
        match self {
            Self::Horizontal => Axis::Width,
            Self::Vertical => Axis::Height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

impl Axis {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Width => Self::Height,
            Self::Height => Self::Width,
        }
    }

    #[must_use]
    pub fn of(self, size: Size) -> f64 {
        match self {
            Self::Width => size.width,
            Self::Height => size.height,
        }
    }
}

/// Text measurement could not be performed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetricsError {
    #[error("no rendering surface attached")]
    Detached,
    #[error("text measurement failed: {0}")]
    Measure(String),
}

/// Reports the rendered content box of one piece of text at a font size.
pub trait TextMetricsProvider {
    /// # Errors
    ///
    /// Returns [`MetricsError`] when the host surface cannot measure.
    fn measure(&self, font_px: u32) -> Result<Size, MetricsError>;
}

impl<F> TextMetricsProvider for F
where
    F: Fn(u32) -> Result<Size, MetricsError>,
{
    fn measure(&self, font_px: u32) -> Result<Size, MetricsError> {
        self(font_px)
    }
}

/// Host rendering surface able to measure any text laid out in a box.
pub trait TextSurface {
    /// Content bounding box of `text` laid out in a box of size `frame` with
    /// the given writing class and font size.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] when the surface cannot measure.
    fn measure(&self, text: &str, writing: WritingClass, frame: Size, font_px: u32) -> Result<Size, MetricsError>;
}

/// What the last fit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitStatus {
    Shrunk,
    Grown,
    Held,
    /// Nothing to measure; size left unchanged.
    Empty,
    /// Zero-area box; minimum size returned.
    Degenerate,
    /// Measurement failed; last known size kept.
    MetricsUnavailable,
}

/// Output of one fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitResult {
    pub font_px: u32,
    pub writing: WritingClass,
    pub status: FitStatus,
    /// Measurements taken after the initial one.
    pub steps: u32,
}

/// Bounded font-size search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextFitter {
    min_px: u32,
    max_px: u32,
    default_px: u32,
}

impl Default for TextFitter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_FONT_PX, DEFAULT_MAX_FONT_PX, DEFAULT_FONT_PX)
    }
}

impl TextFitter {
    /// Build a fitter. `min_px` is raised to 1, `max_px` to `min_px`, and
    /// `default_px` is clamped into range.
    #[must_use]
    pub fn new(min_px: u32, max_px: u32, default_px: u32) -> Self {
        let min_px = min_px.max(1);
        let max_px = max_px.max(min_px);
        Self { min_px, max_px, default_px: default_px.clamp(min_px, max_px) }
    }

    #[must_use]
    pub fn from_config(config: &FitConfig) -> Self {
        Self::new(config.min_px, config.max_px, config.default_px)
    }

    #[must_use]
    pub fn min_px(&self) -> u32 {
        self.min_px
    }

    #[must_use]
    pub fn max_px(&self) -> u32 {
        self.max_px
    }

    #[must_use]
    pub fn default_px(&self) -> u32 {
        self.default_px
    }

    /// Choose a font size for text in a `box_w` x `box_h` box.
    ///
    /// `current` is the size the text is displayed at now (the default size
    /// when `None`). Never fails: degenerate boxes yield the minimum size,
    /// empty text and measurement failures yield the current size.
    #[must_use]
    pub fn fit(
        &self,
        box_w: f64,
        box_h: f64,
        current: Option<u32>,
        metrics: &dyn TextMetricsProvider,
        direction: TextDirection,
    ) -> FitResult {
        let frame = Size::new(box_w, box_h);
        let writing = direction.resolve(frame);
        let start = current.unwrap_or(self.default_px).clamp(self.min_px, self.max_px);

        if is_degenerate(box_w) || is_degenerate(box_h) {
            return FitResult { font_px: self.min_px, writing, status: FitStatus::Degenerate, steps: 0 };
        }

        let content = match metrics.measure(start) {
            Ok(content) => content,
            Err(e) => return unavailable(start, writing, frame, &e, 0),
        };
        if is_degenerate(writing.dominant_axis().of(content)) {
            return FitResult { font_px: start, writing, status: FitStatus::Empty, steps: 0 };
        }

        if overflows(content, frame) {
            self.shrink(start, content, frame, writing, metrics)
        } else {
            self.grow(start, frame, writing, metrics)
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn shrink(
        &self,
        start: u32,
        mut content: Size,
        frame: Size,
        writing: WritingClass,
        metrics: &dyn TextMetricsProvider,
    ) -> FitResult {
        let mut size = start;
        let mut steps = 0;
        while overflows(content, frame) && size > self.min_px {
            let ratio = shrink_ratio(content, frame, writing.dominant_axis());
            let proportional = (f64::from(size) * ratio).ceil().max(0.0) as u32;
            // One extra pixel of headroom, and always at least one pixel of progress.
            size = proportional.saturating_sub(1).clamp(self.min_px, size - 1);
            steps += 1;
            content = match metrics.measure(size) {
                Ok(content) => content,
                Err(e) => return unavailable(start, writing, frame, &e, steps),
            };
        }
        FitResult { font_px: size, writing, status: FitStatus::Shrunk, steps }
    }

    fn grow(&self, start: u32, frame: Size, writing: WritingClass, metrics: &dyn TextMetricsProvider) -> FitResult {
        let mut size = start;
        let mut steps = 0;
        while size < self.max_px {
            let candidate = size + 1;
            steps += 1;
            let content = match metrics.measure(candidate) {
                Ok(content) => content,
                Err(e) => return unavailable(start, writing, frame, &e, steps),
            };
            if overflows(content, frame) {
                break;
            }
            size = candidate;
        }
        let status = if size > start { FitStatus::Grown } else { FitStatus::Held };
        FitResult { font_px: size, writing, status, steps }
    }
}

/// Whether `content` spills out of `frame` on either axis.
#[must_use]
pub fn overflows(content: Size, frame: Size) -> bool {
    content.width > frame.width || content.height > frame.height
}

/// Box-to-content ratio on the dominant axis if it overflows, else on the
/// secondary axis.
fn shrink_ratio(content: Size, frame: Size, dominant: Axis) -> f64 {
    let axis = if dominant.of(content) > dominant.of(frame) { dominant } else { dominant.other() };
    let content_extent = axis.of(content);
    if content_extent > 0.0 { axis.of(frame) / content_extent } else { 1.0 }
}

/// Zero, negative, or NaN extents.
fn is_degenerate(extent: f64) -> bool {
    extent.is_nan() || extent <= 0.0
}

fn unavailable(font_px: u32, writing: WritingClass, frame: Size, error: &MetricsError, steps: u32) -> FitResult {
    warn!(
        box_w = frame.width,
        box_h = frame.height,
        font_px,
        error = %error,
        "text metrics unavailable; keeping last font size"
    );
    FitResult { font_px, writing, status: FitStatus::MetricsUnavailable, steps }
}
