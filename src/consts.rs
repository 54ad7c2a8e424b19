//! Shared numeric constants for the overlay engine.

// ── Text fitting ────────────────────────────────────────────────

/// Smallest font size the fitter will ever return, in CSS pixels.
pub const DEFAULT_MIN_FONT_PX: u32 = 1;

/// Largest font size the fitter will ever return, in CSS pixels.
pub const DEFAULT_MAX_FONT_PX: u32 = 50;

/// Starting font size for an overlay that has never been fitted.
pub const DEFAULT_FONT_PX: u32 = 16;

/// Font family used when measuring through a canvas surface.
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

// ── Text layout ─────────────────────────────────────────────────

/// Line (or column) pitch as a multiple of the font size.
pub const LINE_HEIGHT_EM: f64 = 1.2;

/// Padding above and below the text block, in em.
pub const PADDING_BLOCK_EM: f64 = 0.2;

/// Padding left and right of the text block, in em.
pub const PADDING_INLINE_EM: f64 = 0.4;

/// Advance of a wide (CJK, kana, full-width) glyph, in em.
pub const WIDE_ADVANCE_EM: f64 = 1.0;

/// Advance of any other glyph, in em.
pub const NARROW_ADVANCE_EM: f64 = 0.5;
