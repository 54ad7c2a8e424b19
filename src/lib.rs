//! Overlay coordinate and adaptive text-fit engine for the page reader.
//!
//! The reader shows one raster page at a time at whatever scale the window
//! and fit mode dictate, and draws annotations (OCR text boxes, highlights,
//! badges, tooltips) on top of it. This crate keeps those annotations
//! pixel-aligned with the image across zoom, fit-mode and resize changes, and
//! sizes overlay text so it fills its box without overflowing. It compiles
//! natively and to WebAssembly; the host owns the DOM and only forwards
//! layout events and paints the resulting placements.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::ViewerCore`]: layout events in, placements out |
//! | [`overlay`] | Overlay types and the per-page [`overlay::OverlayStore`] |
//! | [`viewport`] | Source-to-screen coordinate mapping and fit-mode layout |
//! | [`text_fit`] | Bounded shrink-or-grow font size search |
//! | [`text_layout`] | Wrapped horizontal/vertical text measurement |
//! | [`surface`] | Canvas-backed glyph measurement for the browser |
//! | [`ocr`] | Page metadata and OCR record contracts |
//! | [`config`] | Fit configuration from the environment |
//! | [`consts`] | Shared numeric constants (font limits, padding, line pitch) |

pub mod config;
pub mod consts;
pub mod engine;
pub mod ocr;
pub mod overlay;
pub mod surface;
pub mod text_fit;
pub mod text_layout;
pub mod viewport;
