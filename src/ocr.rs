//! Page metadata and OCR record contracts, and overlay population from them.
//!
//! These mirror what the archive/OCR service returns for a page: natural
//! image size plus an ordered list of detected text regions in source pixels.

#[cfg(test)]
#[path = "ocr_test.rs"]
mod ocr_test;

use serde::{Deserialize, Serialize};

use crate::overlay::{OverlayHandle, OverlayKind, OverlayStore};
use crate::text_fit::TextDirection;
use crate::viewport::Rect;

/// Natural size of a page image, plus the OCR regions detected on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub name: String,
    #[serde(alias = "width", alias = "naturalWidth")]
    pub natural_width: i64,
    #[serde(alias = "height", alias = "naturalHeight")]
    pub natural_height: i64,
    #[serde(default, alias = "ocr_results")]
    pub records: Vec<OcrRecord>,
}

/// One detected text region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrRecord {
    /// `[x1, y1, x2, y2]` in source pixels.
    pub bbox: [f64; 4],
    #[serde(default)]
    pub text: String,
    #[serde(default, alias = "writingDirection", skip_serializing_if = "Option::is_none")]
    pub writing_direction: Option<TextDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl OcrRecord {
    /// Source rectangle of the region; corners may come in either order.
    #[must_use]
    pub fn rect(&self) -> Rect {
        let [x1, y1, x2, y2] = self.bbox;
        Rect::from_corners(x1, y1, x2, y2)
    }

    /// Regions with recognised text render it; empty ones are highlighted.
    #[must_use]
    pub fn kind(&self) -> OverlayKind {
        if self.text.trim().is_empty() { OverlayKind::Highlight } else { OverlayKind::OcrText }
    }
}

/// Add one overlay per record, in order, returning their handles.
pub fn populate(store: &mut OverlayStore, records: &[OcrRecord]) -> Vec<OverlayHandle> {
    records
        .iter()
        .map(|r| store.add_overlay(r.rect(), r.text.clone(), r.kind(), r.writing_direction))
        .collect()
}
