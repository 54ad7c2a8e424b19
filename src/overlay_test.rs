#![allow(clippy::float_cmp)]

use std::cell::Cell;

use super::*;
use crate::text_fit::{MetricsError, WritingClass};
use crate::text_layout::{FixedAdvance, WrappedLayout};
use crate::viewport::Size;

// =============================================================
// Helpers
// =============================================================

/// Content box is `per_px` square pixels per font pixel; counts measurements.
struct CountingSurface {
    per_px: f64,
    calls: Cell<u32>,
}

impl CountingSurface {
    fn new(per_px: f64) -> Self {
        Self { per_px, calls: Cell::new(0) }
    }
}

impl TextSurface for CountingSurface {
    fn measure(&self, _text: &str, _writing: WritingClass, _frame: Size, font_px: u32) -> Result<Size, MetricsError> {
        self.calls.set(self.calls.get() + 1);
        let side = self.per_px * f64::from(font_px);
        Ok(Size::new(side, side))
    }
}

struct DetachedSurface;

impl TextSurface for DetachedSurface {
    fn measure(&self, _: &str, _: WritingClass, _: Size, _: u32) -> Result<Size, MetricsError> {
        Err(MetricsError::Detached)
    }
}

fn store_with_page(w: i64, h: i64) -> OverlayStore {
    let mut store = OverlayStore::default();
    store.set_page("p001.jpg", w, h);
    store
}

fn screen_of(store: &OverlayStore, handle: OverlayHandle) -> Option<Rect> {
    store.get(handle).and_then(|o| o.placement).map(|p| p.screen)
}

// =============================================================
// Page lifecycle
// =============================================================

#[test]
fn set_page_records_dimensions() {
    let store = store_with_page(800, 1200);
    assert_eq!(store.page().name, "p001.jpg");
    assert_eq!(store.page().natural_width, 800);
    assert_eq!(store.page().natural_height, 1200);
    assert!(!store.page().is_pending());
}

#[test]
fn set_page_negative_dimensions_become_pending() {
    let store = store_with_page(-10, 1200);
    assert_eq!(store.page().natural_width, 0);
    assert_eq!(store.page().natural_height, 1200);
    assert!(store.page().is_pending());
}

#[test]
fn set_page_clears_overlays_and_viewport() {
    let mut store = store_with_page(800, 1200);
    store.add_overlay(Rect::new(0.0, 0.0, 10.0, 10.0), "", OverlayKind::Highlight, None);
    store.reposition(&compute_viewport(800, 1200, 400.0, 600.0, 0.0, 0.0), &CountingSurface::new(1.0));
    assert!(store.viewport().is_some());

    store.set_page("p002.jpg", 640, 960);
    assert!(store.is_empty());
    assert!(store.viewport().is_none());
}

#[test]
fn adopt_natural_size_only_fills_pending_page() {
    let mut store = store_with_page(0, 0);
    let h = store.add_overlay(Rect::new(1.0, 1.0, 1.0, 1.0), "", OverlayKind::Highlight, None);
    assert!(store.adopt_natural_size(100, 200));
    assert_eq!(store.page().natural_width, 100);
    assert!(store.get(h).is_some());
    assert!(!store.adopt_natural_size(300, 300));
    assert_eq!(store.page().natural_width, 100);
}

#[test]
fn adopt_natural_size_ignores_unknown_size() {
    let mut store = store_with_page(0, 0);
    assert!(!store.adopt_natural_size(0, 50));
    assert!(store.page().is_pending());
}

// =============================================================
// Mutations
// =============================================================

#[test]
fn add_overlay_keeps_order_and_defaults() {
    let mut store = store_with_page(100, 100);
    let a = store.add_overlay(Rect::new(0.0, 0.0, 1.0, 1.0), "a", OverlayKind::OcrText, None);
    let b = store.add_overlay(Rect::new(0.0, 0.0, 1.0, 1.0), "b", OverlayKind::Badge, Some(TextDirection::Vertical));
    assert_ne!(a, b);
    let handles: Vec<_> = store.overlays().iter().map(|o| o.handle).collect();
    assert_eq!(handles, vec![a, b]);
    assert_eq!(store.get(a).unwrap().direction, TextDirection::Auto);
    assert_eq!(store.get(b).unwrap().direction, TextDirection::Vertical);
    assert!(store.get(a).unwrap().placement.is_none());
}

#[test]
fn add_overlay_accepts_out_of_frame_rect() {
    let mut store = store_with_page(100, 100);
    let h = store.add_overlay(Rect::new(500.0, 500.0, 20.0, 20.0), "", OverlayKind::Highlight, None);
    store.reposition(&compute_viewport(100, 100, 50.0, 50.0, 0.0, 0.0), &CountingSurface::new(1.0));
    assert_eq!(screen_of(&store, h), Some(Rect::new(250.0, 250.0, 10.0, 10.0)));
}

#[test]
fn remove_overlay_is_idempotent() {
    let mut store = store_with_page(100, 100);
    let h = store.add_overlay(Rect::default(), "", OverlayKind::Highlight, None);
    assert!(store.remove_overlay(h));
    assert!(!store.remove_overlay(h));
    assert!(store.is_empty());
}

#[test]
fn remove_overlay_from_replaced_page_is_noop() {
    let mut store = store_with_page(100, 100);
    let old = store.add_overlay(Rect::default(), "", OverlayKind::Highlight, None);
    store.set_page("next", 100, 100);
    store.add_overlay(Rect::default(), "", OverlayKind::Highlight, None);
    assert!(!store.remove_overlay(old));
    assert_eq!(store.len(), 1);
}

#[test]
fn clear_overlays_twice_leaves_valid_empty_store() {
    let mut store = store_with_page(100, 100);
    store.add_overlay(Rect::default(), "x", OverlayKind::OcrText, None);
    store.clear_overlays();
    store.clear_overlays();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    let h = store.add_overlay(Rect::default(), "", OverlayKind::Highlight, None);
    assert!(store.get(h).is_some());
}

// =============================================================
// Reposition
// =============================================================

#[test]
fn reposition_maps_scenario_rect() {
    let mut store = store_with_page(800, 1200);
    let h = store.add_overlay(Rect::new(100.0, 100.0, 50.0, 50.0), "", OverlayKind::Highlight, None);
    let placed = store.reposition(&compute_viewport(800, 1200, 400.0, 600.0, 0.0, 0.0), &CountingSurface::new(1.0));
    assert_eq!(placed, 1);
    assert_eq!(screen_of(&store, h), Some(Rect::new(50.0, 50.0, 25.0, 25.0)));
    assert!(store.get(h).unwrap().placement.unwrap().font.is_none());
}

#[test]
fn reposition_does_not_touch_source_geometry() {
    let mut store = store_with_page(800, 1200);
    let src = Rect::new(10.0, 20.0, 30.0, 40.0);
    let h = store.add_overlay(src, "", OverlayKind::Highlight, None);
    store.reposition(&compute_viewport(800, 1200, 123.0, 456.0, 7.0, 8.0), &CountingSurface::new(1.0));
    assert_eq!(store.get(h).unwrap().source, src);
}

#[test]
fn reposition_rederives_from_source_each_time() {
    let mut store = store_with_page(800, 1200);
    let h = store.add_overlay(Rect::new(100.0, 100.0, 50.0, 50.0), "", OverlayKind::Highlight, None);
    let surface = CountingSurface::new(1.0);
    for w in [400.0, 1600.0, 333.0, 800.0] {
        store.reposition(&compute_viewport(800, 1200, w, w * 1.5, 0.0, 0.0), &surface);
    }
    assert_eq!(screen_of(&store, h), Some(Rect::new(100.0, 100.0, 50.0, 50.0)));
}

#[test]
fn reposition_twice_is_idempotent() {
    let mut store = store_with_page(800, 1200);
    store.add_overlay(Rect::new(100.0, 100.0, 200.0, 80.0), "テスト", OverlayKind::OcrText, None);
    store.add_overlay(Rect::new(300.0, 500.0, 60.0, 300.0), "縦書きのテキスト", OverlayKind::OcrText, None);
    store.add_overlay(Rect::new(0.0, 0.0, 5.0, 5.0), "", OverlayKind::Highlight, None);
    let vp = compute_viewport(800, 1200, 400.0, 600.0, 12.0, 0.0);
    let surface = WrappedLayout::new(FixedAdvance);

    store.reposition(&vp, &surface);
    let first: Vec<_> = store.overlays().iter().map(|o| o.placement).collect();
    store.reposition(&vp, &surface);
    let second: Vec<_> = store.overlays().iter().map(|o| o.placement).collect();
    assert_eq!(first, second);
}

#[test]
fn reposition_skips_refit_when_screen_box_unchanged() {
    let mut store = store_with_page(100, 100);
    store.add_overlay(Rect::new(0.0, 0.0, 50.0, 50.0), "text", OverlayKind::OcrText, None);
    let vp = compute_viewport(100, 100, 100.0, 100.0, 0.0, 0.0);
    let surface = CountingSurface::new(1.0);

    store.reposition(&vp, &surface);
    let after_first = surface.calls.get();
    assert!(after_first > 0);
    store.reposition(&vp, &surface);
    assert_eq!(surface.calls.get(), after_first);
}

#[test]
fn reposition_refits_when_box_changes() {
    let mut store = store_with_page(100, 100);
    let h = store.add_overlay(Rect::new(0.0, 0.0, 50.0, 50.0), "text", OverlayKind::OcrText, None);
    let surface = CountingSurface::new(2.0);

    store.reposition(&compute_viewport(100, 100, 100.0, 100.0, 0.0, 0.0), &surface);
    let big = store.get(h).unwrap().placement.unwrap().font.unwrap().font_px;
    store.reposition(&compute_viewport(100, 100, 40.0, 40.0, 0.0, 0.0), &surface);
    let small = store.get(h).unwrap().placement.unwrap().font.unwrap().font_px;

    assert_eq!(big, 25);
    assert!(small < big);
    assert!(2.0 * f64::from(small) <= 20.0);
}

#[test]
fn reposition_with_pending_viewport_unplaces_overlays() {
    let mut store = store_with_page(0, 0);
    let h = store.add_overlay(Rect::new(1.0, 1.0, 1.0, 1.0), "", OverlayKind::Highlight, None);
    let placed = store.reposition(&compute_viewport(0, 0, 400.0, 600.0, 0.0, 0.0), &CountingSurface::new(1.0));
    assert_eq!(placed, 0);
    assert!(screen_of(&store, h).is_none());
}

#[test]
fn reposition_ignores_viewport_for_other_page_size() {
    let mut store = store_with_page(800, 1200);
    let h = store.add_overlay(Rect::new(1.0, 1.0, 1.0, 1.0), "", OverlayKind::Highlight, None);
    let placed = store.reposition(&compute_viewport(640, 960, 400.0, 600.0, 0.0, 0.0), &CountingSurface::new(1.0));
    assert_eq!(placed, 0);
    assert!(screen_of(&store, h).is_none());
    assert!(store.viewport().is_none());
}

#[test]
fn reposition_survives_detached_surface() {
    let mut store = store_with_page(100, 100);
    let h = store.add_overlay(Rect::new(0.0, 0.0, 50.0, 50.0), "text", OverlayKind::OcrText, None);
    store.reposition(&compute_viewport(100, 100, 100.0, 100.0, 0.0, 0.0), &DetachedSurface);
    let font = store.get(h).unwrap().placement.unwrap().font.unwrap();
    assert_eq!(font.status, FitStatus::MetricsUnavailable);
    assert_eq!(font.font_px, store.fitter().default_px());
}

#[test]
fn reposition_retries_fit_after_metrics_failure() {
    let mut store = store_with_page(100, 100);
    let h = store.add_overlay(Rect::new(0.0, 0.0, 50.0, 50.0), "text", OverlayKind::OcrText, None);
    let vp = compute_viewport(100, 100, 100.0, 100.0, 0.0, 0.0);
    store.reposition(&vp, &DetachedSurface);
    store.reposition(&vp, &CountingSurface::new(2.0));
    let font = store.get(h).unwrap().placement.unwrap().font.unwrap();
    assert_ne!(font.status, FitStatus::MetricsUnavailable);
    assert_eq!(font.font_px, 25);
}

#[test]
fn whitespace_content_is_not_fitted() {
    let mut store = store_with_page(100, 100);
    let h = store.add_overlay(Rect::new(0.0, 0.0, 50.0, 50.0), "  \n", OverlayKind::OcrText, None);
    let surface = CountingSurface::new(1.0);
    store.reposition(&compute_viewport(100, 100, 100.0, 100.0, 0.0, 0.0), &surface);
    assert_eq!(surface.calls.get(), 0);
    assert!(store.get(h).unwrap().placement.unwrap().font.is_none());
}

// =============================================================
// Queries
// =============================================================

#[test]
fn bounds_before_layout_report_page_size() {
    let store = store_with_page(800, 1200);
    let b = store.bounds();
    assert_eq!(b.natural_width, 800);
    assert_eq!(b.rendered_width, 0.0);
    assert_eq!(b.scale_x, 1.0);
    assert_eq!(b.scale_y, 1.0);
}

#[test]
fn bounds_follow_last_viewport() {
    let mut store = store_with_page(800, 1200);
    store.reposition(&compute_viewport(800, 1200, 400.0, 600.0, 3.0, 4.0), &CountingSurface::new(1.0));
    let b = store.bounds();
    assert_eq!(b.scale_x, 0.5);
    assert_eq!(b.offset_x, 3.0);
}

#[test]
fn overlay_at_prefers_topmost() {
    let mut store = store_with_page(100, 100);
    let below = store.add_overlay(Rect::new(0.0, 0.0, 50.0, 50.0), "", OverlayKind::Highlight, None);
    let above = store.add_overlay(Rect::new(25.0, 25.0, 50.0, 50.0), "", OverlayKind::Highlight, None);
    store.reposition(&compute_viewport(100, 100, 200.0, 200.0, 0.0, 0.0), &CountingSurface::new(1.0));

    assert_eq!(store.overlay_at(Point::new(60.0, 60.0)), Some(above));
    assert_eq!(store.overlay_at(Point::new(10.0, 10.0)), Some(below));
    assert_eq!(store.overlay_at(Point::new(190.0, 10.0)), None);
}

#[test]
fn overlay_at_ignores_unplaced_overlays() {
    let mut store = store_with_page(100, 100);
    store.add_overlay(Rect::new(0.0, 0.0, 50.0, 50.0), "", OverlayKind::Highlight, None);
    assert_eq!(store.overlay_at(Point::new(10.0, 10.0)), None);
}

// =============================================================
// Serde
// =============================================================

#[test]
fn kind_serde_uses_kebab_case() {
    assert_eq!(serde_json::to_string(&OverlayKind::OcrText).unwrap(), "\"ocr-text\"");
    let legacy: OverlayKind = serde_json::from_str("\"ocr\"").unwrap();
    assert_eq!(legacy, OverlayKind::OcrText);
    let tooltip: OverlayKind = serde_json::from_str("\"tooltip\"").unwrap();
    assert_eq!(tooltip, OverlayKind::Tooltip);
}

#[test]
fn handle_serializes_as_uuid_string() {
    let mut store = store_with_page(1, 1);
    let h = store.add_overlay(Rect::default(), "", OverlayKind::Highlight, None);
    let json = serde_json::to_string(&h).unwrap();
    assert_eq!(json, format!("\"{h}\""));
}
