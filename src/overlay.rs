//! Overlay model and the per-page store that owns it.
//!
//! Overlays are anchored in source-image pixel space and never move there.
//! [`OverlayStore::reposition`] derives each overlay's screen rectangle from
//! its source rectangle and the current [`ViewportState`], then refits the
//! font of any overlay that carries text. Replacing the page with
//! [`OverlayStore::set_page`] destroys every overlay of the previous page.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::text_fit::{FitResult, FitStatus, TextDirection, TextFitter, TextSurface};
use crate::viewport::{OverlayBounds, Point, Rect, ViewportState, compute_viewport, to_screen};

/// Stable identifier returned by [`OverlayStore::add_overlay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayHandle(Uuid);

impl OverlayHandle {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for OverlayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Visual role of an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlayKind {
    /// Translucent box marking a region.
    #[default]
    Highlight,
    /// Recognised text drawn over the region it came from.
    #[serde(alias = "ocr")]
    OcrText,
    /// Small label pinned to a region.
    Badge,
    /// Informational popup anchored to a region.
    Tooltip,
}

/// The page currently on display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub name: String,
    /// Source pixel width; 0 until the image decodes.
    pub natural_width: u32,
    /// Source pixel height; 0 until the image decodes.
    pub natural_height: u32,
}

impl Page {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.natural_width == 0 || self.natural_height == 0
    }
}

/// Where an overlay sits on screen right now.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub screen: Rect,
    /// Font chosen for the overlay's text; `None` for overlays without text.
    pub font: Option<FitResult>,
}

/// One annotation on the current page.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub handle: OverlayHandle,
    /// Rectangle in source-image pixels.
    pub source: Rect,
    pub kind: OverlayKind,
    pub content: String,
    pub direction: TextDirection,
    /// `None` until the first reposition against a non-pending viewport.
    pub placement: Option<Placement>,
}

impl Overlay {
    #[must_use]
    pub fn has_text(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// Owns the overlays of the current page.
pub struct OverlayStore {
    page: Page,
    overlays: Vec<Overlay>,
    viewport: Option<ViewportState>,
    fitter: TextFitter,
}

impl OverlayStore {
    /// Create an empty store with no page.
    #[must_use]
    pub fn new(fitter: TextFitter) -> Self {
        Self { page: Page::default(), overlays: Vec::new(), viewport: None, fitter }
    }

    // --- Page lifecycle ---

    /// Replace the current page. Clears every overlay and the cached
    /// viewport. Negative dimensions are logged and treated as 0 (pending).
    pub fn set_page(&mut self, name: impl Into<String>, natural_w: i64, natural_h: i64) {
        let name = name.into();
        let natural_width = normalize_dimension(&name, "width", natural_w);
        let natural_height = normalize_dimension(&name, "height", natural_h);
        self.page = Page { name, natural_width, natural_height };
        self.overlays.clear();
        self.viewport = None;
    }

    /// Fill in the natural size of a page that was presented before its image
    /// decoded. Overlays are kept. Returns `false` when the page already had a
    /// size or the new size is still unknown.
    pub fn adopt_natural_size(&mut self, natural_w: u32, natural_h: u32) -> bool {
        if !self.page.is_pending() || natural_w == 0 || natural_h == 0 {
            return false;
        }
        self.page.natural_width = natural_w;
        self.page.natural_height = natural_h;
        self.viewport = None;
        true
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    // --- Overlay mutations ---

    /// Append an overlay anchored at `rect` (source pixels). Out-of-frame
    /// rectangles are accepted. The overlay stays unplaced until the next
    /// [`reposition`](Self::reposition).
    pub fn add_overlay(
        &mut self,
        rect: Rect,
        content: impl Into<String>,
        kind: OverlayKind,
        direction: Option<TextDirection>,
    ) -> OverlayHandle {
        let handle = OverlayHandle::new();
        self.overlays.push(Overlay {
            handle,
            source: rect,
            kind,
            content: content.into(),
            direction: direction.unwrap_or_default(),
            placement: None,
        });
        handle
    }

    /// Remove an overlay. Unknown or already-removed handles are ignored.
    pub fn remove_overlay(&mut self, handle: OverlayHandle) -> bool {
        let Some(index) = self.overlays.iter().position(|o| o.handle == handle) else {
            return false;
        };
        self.overlays.remove(index);
        true
    }

    /// Remove every overlay of the current page.
    pub fn clear_overlays(&mut self) {
        self.overlays.clear();
    }

    // --- Layout ---

    /// Recompute every overlay's screen rectangle from `viewport` and refit
    /// text whose screen box changed since its last fit. Returns the number of
    /// overlays placed.
    ///
    /// A pending viewport unplaces everything. A viewport computed for a
    /// different natural size than the current page is stale and ignored.
    pub fn reposition(&mut self, viewport: &ViewportState, surface: &dyn TextSurface) -> usize {
        if viewport.natural_width != self.page.natural_width || viewport.natural_height != self.page.natural_height {
            debug!(
                page = %self.page.name,
                viewport_w = viewport.natural_width,
                viewport_h = viewport.natural_height,
                "ignoring viewport for a different page size"
            );
            return 0;
        }
        self.viewport = Some(*viewport);

        if viewport.is_pending() {
            for overlay in &mut self.overlays {
                overlay.placement = None;
            }
            return 0;
        }

        let fitter = self.fitter;
        for overlay in &mut self.overlays {
            place(overlay, viewport, &fitter, surface);
        }
        debug!(
            page = %self.page.name,
            overlays = self.overlays.len(),
            scale_x = viewport.scale_x,
            scale_y = viewport.scale_y,
            "repositioned overlays"
        );
        self.overlays.len()
    }

    // --- Queries ---

    #[must_use]
    pub fn overlays(&self) -> &[Overlay] {
        &self.overlays
    }

    #[must_use]
    pub fn get(&self, handle: OverlayHandle) -> Option<&Overlay> {
        self.overlays.iter().find(|o| o.handle == handle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// The viewport of the last accepted reposition, if any since the page
    /// was set.
    #[must_use]
    pub fn viewport(&self) -> Option<&ViewportState> {
        self.viewport.as_ref()
    }

    #[must_use]
    pub fn fitter(&self) -> &TextFitter {
        &self.fitter
    }

    /// Geometry snapshot for converting screen points back to source space.
    #[must_use]
    pub fn bounds(&self) -> OverlayBounds {
        match self.viewport {
            Some(vp) => vp.bounds(),
            None => compute_viewport(self.page.natural_width, self.page.natural_height, 0.0, 0.0, 0.0, 0.0).bounds(),
        }
    }

    /// Topmost placed overlay whose screen rectangle contains `pt`. Later
    /// overlays are drawn above earlier ones.
    #[must_use]
    pub fn overlay_at(&self, pt: Point) -> Option<OverlayHandle> {
        self.overlays
            .iter()
            .rev()
            .find(|o| o.placement.is_some_and(|p| p.screen.contains(pt)))
            .map(|o| o.handle)
    }
}

impl Default for OverlayStore {
    fn default() -> Self {
        Self::new(TextFitter::default())
    }
}

fn place(overlay: &mut Overlay, viewport: &ViewportState, fitter: &TextFitter, surface: &dyn TextSurface) {
    let screen = to_screen(overlay.source, viewport);
    let previous = overlay.placement;

    let font = if overlay.has_text() {
        let settled = previous.and_then(|p| p.font).filter(|f| f.status != FitStatus::MetricsUnavailable);
        match (previous, settled) {
            (Some(p), Some(font)) if p.screen == screen => Some(font),
            _ => {
                let current = previous.and_then(|p| p.font).map(|f| f.font_px);
                let frame = screen.size();
                let writing = overlay.direction.resolve(frame);
                let content = overlay.content.as_str();
                let metrics = |font_px: u32| surface.measure(content, writing, frame, font_px);
                Some(fitter.fit(screen.width, screen.height, current, &metrics, overlay.direction))
            }
        }
    } else {
        None
    };

    overlay.placement = Some(Placement { screen, font });
}

fn normalize_dimension(page: &str, axis: &'static str, value: i64) -> u32 {
    if value < 0 {
        warn!(%page, axis, value, "negative page dimension; treating as pending");
        return 0;
    }
    u32::try_from(value).unwrap_or(u32::MAX)
}
