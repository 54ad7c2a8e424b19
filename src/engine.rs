use tracing::debug;

use crate::ocr::{self, PageMeta};
use crate::overlay::{OverlayHandle, OverlayKind, OverlayStore};
use crate::text_fit::{TextDirection, TextFitter, TextSurface};
use crate::viewport::{FitMode, OverlayBounds, Point, Rect, Size, ViewportState, compute_viewport, layout_image};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// What the host should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    RenderNeeded,
}

/// Rendered box as measured by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Measured {
    rendered: Size,
    offset: Point,
}

/// Page viewer state: one page, its overlays, and the layout inputs that
/// position them.
///
/// Every layout event (image decoded, container resize, fit-mode change,
/// host measurement) rebuilds the viewport from scratch and repositions the
/// store. Rendered geometry comes from the host's own measurement when it
/// has reported one for the current layout, otherwise it is derived from the
/// container size and fit mode.
pub struct ViewerCore<S> {
    pub store: OverlayStore,
    surface: S,
    fit_mode: FitMode,
    container: Option<Size>,
    measured: Option<Measured>,
}

impl<S: TextSurface> ViewerCore<S> {
    #[must_use]
    pub fn new(fitter: TextFitter, surface: S) -> Self {
        Self { store: OverlayStore::new(fitter), surface, fit_mode: FitMode::default(), container: None, measured: None }
    }

    // --- Page ---

    /// Present a new page and its OCR regions. Everything from the previous
    /// page is dropped.
    pub fn present_page(&mut self, meta: &PageMeta) -> Vec<OverlayHandle> {
        self.store.set_page(meta.name.clone(), meta.natural_width, meta.natural_height);
        self.measured = None;
        let handles = ocr::populate(&mut self.store, &meta.records);
        self.relayout();
        handles
    }

    /// The image finished decoding with the given natural size.
    pub fn on_image_decoded(&mut self, natural_w: u32, natural_h: u32) -> Action {
        if self.store.adopt_natural_size(natural_w, natural_h) {
            debug!(page = %self.store.page().name, natural_w, natural_h, "adopted decoded image size");
        }
        self.relayout()
    }

    // --- Layout events ---

    /// The container changed size. Repeated notifications with the same size
    /// are ignored.
    pub fn on_container_resize(&mut self, width: f64, height: f64) -> Action {
        let size = Size::new(width, height);
        if self.container == Some(size) {
            return Action::None;
        }
        self.container = Some(size);
        self.measured = None;
        self.relayout()
    }

    /// Switch fit mode. Any earlier host measurement is stale afterwards.
    pub fn set_fit_mode(&mut self, fit_mode: FitMode) -> Action {
        if self.fit_mode == fit_mode {
            return Action::None;
        }
        self.fit_mode = fit_mode;
        self.measured = None;
        self.relayout()
    }

    /// The host measured where the image actually rendered. Takes precedence
    /// over the derived layout until the next resize, fit-mode change or page.
    pub fn on_layout_measured(&mut self, rendered_w: f64, rendered_h: f64, offset_x: f64, offset_y: f64) -> Action {
        let measured = Measured { rendered: Size::new(rendered_w, rendered_h), offset: Point::new(offset_x, offset_y) };
        if self.measured == Some(measured) {
            return Action::None;
        }
        self.measured = Some(measured);
        self.relayout()
    }

    // --- Overlays ---

    pub fn add_overlay(
        &mut self,
        rect: Rect,
        content: impl Into<String>,
        kind: OverlayKind,
        direction: Option<TextDirection>,
    ) -> OverlayHandle {
        let handle = self.store.add_overlay(rect, content, kind, direction);
        self.relayout();
        handle
    }

    pub fn remove_overlay(&mut self, handle: OverlayHandle) -> Action {
        if self.store.remove_overlay(handle) { Action::RenderNeeded } else { Action::None }
    }

    pub fn clear_overlays(&mut self) -> Action {
        if self.store.is_empty() {
            return Action::None;
        }
        self.store.clear_overlays();
        Action::RenderNeeded
    }

    // --- Queries ---

    #[must_use]
    pub fn fit_mode(&self) -> FitMode {
        self.fit_mode
    }

    #[must_use]
    pub fn overlay_bounds(&self) -> OverlayBounds {
        self.store.bounds()
    }

    /// Topmost overlay under a screen point.
    #[must_use]
    pub fn overlay_at(&self, screen: Point) -> Option<OverlayHandle> {
        self.store.overlay_at(screen)
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Viewport for the current inputs, or `None` before any layout input.
    #[must_use]
    pub fn current_viewport(&self) -> Option<ViewportState> {
        let page = self.store.page();
        let (rendered, offset) = match (self.measured, self.container) {
            (Some(m), _) => (m.rendered, m.offset),
            (None, Some(container)) => layout_image(self.fit_mode, page.natural_width, page.natural_height, container),
            (None, None) => return None,
        };
        Some(
            compute_viewport(
                page.natural_width,
                page.natural_height,
                rendered.width,
                rendered.height,
                offset.x,
                offset.y,
            )
            .with_fit_mode(self.fit_mode),
        )
    }

    fn relayout(&mut self) -> Action {
        let Some(viewport) = self.current_viewport() else {
            return Action::None;
        };
        self.store.reposition(&viewport, &self.surface);
        Action::RenderNeeded
    }
}
