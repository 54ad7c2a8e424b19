//! Host-independent text measurement.
//!
//! [`WrappedLayout`] lays a string out the way the reader's OCR text boxes
//! are styled: pre-wrapped, breakable between any two glyphs, 1.2em line
//! pitch, 0.2em/0.4em padding, in rows (horizontal) or right-to-left columns
//! (vertical). Only glyph advances come from the host, through
//! [`GlyphMeasure`].

#[cfg(test)]
#[path = "text_layout_test.rs"]
mod text_layout_test;

use crate::consts::{LINE_HEIGHT_EM, NARROW_ADVANCE_EM, PADDING_BLOCK_EM, PADDING_INLINE_EM, WIDE_ADVANCE_EM};
use crate::text_fit::{MetricsError, TextSurface, WritingClass};
use crate::viewport::Size;

/// Measures the inline advance of a run of text.
pub trait GlyphMeasure {
    /// Advance of `run` at `font_px`, in pixels.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] when the host cannot measure.
    fn advance(&self, run: &str, font_px: f64) -> Result<f64, MetricsError>;
}

/// Fixed per-glyph advances: wide glyphs take a full em, others half.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedAdvance;

impl GlyphMeasure for FixedAdvance {
    fn advance(&self, run: &str, font_px: f64) -> Result<f64, MetricsError> {
        let ems: f64 = run
            .chars()
            .map(|ch| if is_wide(ch) { WIDE_ADVANCE_EM } else { NARROW_ADVANCE_EM })
            .sum();
        Ok(ems * font_px)
    }
}

/// East Asian wide and full-width code points.
#[must_use]
pub fn is_wide(ch: char) -> bool {
    matches!(
        u32::from(ch),
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA000..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x20000..=0x3FFFD
    )
}

/// Wrapping text layout over a glyph measurer.
#[derive(Debug, Clone, Default)]
pub struct WrappedLayout<M> {
    glyphs: M,
}

impl<M: GlyphMeasure> WrappedLayout<M> {
    #[must_use]
    pub fn new(glyphs: M) -> Self {
        Self { glyphs }
    }

    #[must_use]
    pub fn glyphs(&self) -> &M {
        &self.glyphs
    }

    pub fn glyphs_mut(&mut self) -> &mut M {
        &mut self.glyphs
    }

    /// Content box of `text` laid out inside `frame` at `font_px`.
    ///
    /// Whitespace-only text has an empty content box. The inline extent only
    /// exceeds the frame when a single glyph is wider than the available line.
    ///
    /// # Errors
    ///
    /// Propagates the first glyph measurement failure.
    pub fn layout(&self, text: &str, writing: WritingClass, frame: Size, font_px: u32) -> Result<Size, MetricsError> {
        if text.trim().is_empty() {
            return Ok(Size::default());
        }

        let px = f64::from(font_px);
        let pad_block = PADDING_BLOCK_EM * px;
        let pad_inline = PADDING_INLINE_EM * px;
        let pitch = LINE_HEIGHT_EM * px;
        let available = match writing {
            WritingClass::Horizontal => frame.width - 2.0 * pad_inline,
            WritingClass::Vertical => frame.height - 2.0 * pad_block,
        };

        let mut buf = [0u8; 4];
        let mut lines = 0u32;
        let mut longest = 0.0_f64;
        for hard_line in text.trim_end_matches(['\n', '\r']).split('\n') {
            lines += 1;
            let mut current = 0.0_f64;
            let mut started = false;
            for ch in hard_line.chars().filter(|&c| c != '\r') {
                let advance = self.glyphs.advance(ch.encode_utf8(&mut buf), px)?;
                if started && current + advance > available {
                    longest = longest.max(current);
                    lines += 1;
                    current = advance;
                } else {
                    current += advance;
                }
                started = true;
            }
            longest = longest.max(current);
        }

        let stacked = f64::from(lines) * pitch;
        Ok(match writing {
            WritingClass::Horizontal => Size::new(longest + 2.0 * pad_inline, stacked + 2.0 * pad_block),
            WritingClass::Vertical => Size::new(stacked + 2.0 * pad_inline, longest + 2.0 * pad_block),
        })
    }
}

impl<M: GlyphMeasure> TextSurface for WrappedLayout<M> {
    fn measure(&self, text: &str, writing: WritingClass, frame: Size, font_px: u32) -> Result<Size, MetricsError> {
        self.layout(text, writing, frame, font_px)
    }
}
