//! Browser canvas glyph measurement.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It backs [`crate::text_layout::WrappedLayout`] when the engine runs as
//! WebAssembly in the reader window.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use std::cell::Cell;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::consts::DEFAULT_FONT_FAMILY;
use crate::text_fit::MetricsError;
use crate::text_layout::GlyphMeasure;

/// Glyph advances measured with a 2D canvas context.
///
/// A surface without a context reports [`MetricsError::Detached`] for every
/// measurement, which the fitter treats as a soft failure.
pub struct CanvasGlyphs {
    ctx: Option<CanvasRenderingContext2d>,
    family: String,
    font_px: Cell<f64>,
}

impl CanvasGlyphs {
    #[must_use]
    pub fn new(ctx: CanvasRenderingContext2d, family: impl Into<String>) -> Self {
        Self { ctx: Some(ctx), family: family.into(), font_px: Cell::new(f64::NAN) }
    }

    /// A surface with no canvas behind it.
    #[must_use]
    pub fn detached(family: impl Into<String>) -> Self {
        Self { ctx: None, family: family.into(), font_px: Cell::new(f64::NAN) }
    }

    /// Acquire the 2D context of `canvas`.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] if the canvas has no 2D context.
    pub fn from_canvas(canvas: &HtmlCanvasElement, family: impl Into<String>) -> Result<Self, MetricsError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| MetricsError::Measure(js_message(&e)))?
            .ok_or(MetricsError::Detached)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| MetricsError::Measure("canvas context is not 2d".to_owned()))?;
        Ok(Self::new(ctx, family))
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.ctx.is_some()
    }

    /// Drop the canvas context, e.g. when the viewer leaves the document.
    pub fn detach(&mut self) {
        self.ctx = None;
        self.font_px.set(f64::NAN);
    }

    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }
}

impl GlyphMeasure for CanvasGlyphs {
    #[allow(clippy::float_cmp)]
    fn advance(&self, run: &str, font_px: f64) -> Result<f64, MetricsError> {
        let Some(ctx) = &self.ctx else {
            return Err(MetricsError::Detached);
        };
        if self.font_px.get() != font_px {
            ctx.set_font(&font_spec(font_px, &self.family));
            self.font_px.set(font_px);
        }
        ctx.measure_text(run)
            .map(|metrics| metrics.width())
            .map_err(|e| MetricsError::Measure(js_message(&e)))
    }
}

const GENERIC_FAMILIES: &[&str] = &[
    "serif",
    "sans-serif",
    "monospace",
    "cursive",
    "fantasy",
    "system-ui",
    "ui-serif",
    "ui-sans-serif",
    "ui-monospace",
    "ui-rounded",
    "math",
    "emoji",
    "fangsong",
];

/// CSS font shorthand for a size and family list. Named families are quoted
/// so names with digits or spaces stay valid; generic keywords and names
/// that are already quoted pass through.
#[must_use]
pub fn font_spec(font_px: f64, family: &str) -> String {
    let families: Vec<String> = family
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(quote_family)
        .collect();
    if families.is_empty() {
        return format!("{font_px}px {DEFAULT_FONT_FAMILY}");
    }
    format!("{font_px}px {}", families.join(", "))
}

fn quote_family(name: &str) -> String {
    let generic = GENERIC_FAMILIES.iter().any(|g| g.eq_ignore_ascii_case(name));
    let quoted = name.len() >= 2 && ['"', '\''].iter().any(|&q| name.starts_with(q) && name.ends_with(q));
    if generic || quoted { name.to_owned() } else { format!("\"{}\"", name.replace('"', "\\\"")) }
}

fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
