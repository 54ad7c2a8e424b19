use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use page_overlay::config::{ConfigError, FitConfig};
use page_overlay::engine::ViewerCore;
use page_overlay::ocr::PageMeta;
use page_overlay::overlay::{OverlayHandle, OverlayKind, Placement};
use page_overlay::text_fit::TextFitter;
use page_overlay::text_layout::{FixedAdvance, WrappedLayout};
use page_overlay::viewport::{FitMode, Point, Size};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Parser, Debug)]
#[command(name = "page-overlay", about = "Lay out page overlays for a given viewport")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the screen placement and font size of every overlay.
    Layout(ViewArgs),
    /// Print the overlay under a screen point, if any.
    Hit(HitArgs),
    /// Print the viewport geometry used to map overlays.
    Bounds(ViewArgs),
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// Page JSON: `{ name?, width, height, ocr_results: [{ bbox, text, ... }] }`.
    #[arg(long)]
    page: PathBuf,

    /// Container size as WIDTHxHEIGHT in CSS pixels.
    #[arg(long, default_value = "800x1200", value_parser = parse_size)]
    container: Size,

    /// contain | width | original
    #[arg(long, default_value = "contain")]
    fit: FitMode,
}

#[derive(Args, Debug)]
struct HitArgs {
    #[command(flatten)]
    view: ViewArgs,

    #[arg(long, allow_negative_numbers = true)]
    x: f64,

    #[arg(long, allow_negative_numbers = true)]
    y: f64,
}

#[derive(Serialize)]
struct PlacementOut<'a> {
    handle: OverlayHandle,
    kind: OverlayKind,
    content: &'a str,
    placement: Option<Placement>,
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();
    let config = FitConfig::from_env()?;

    match cli.command {
        Command::Layout(view) => run_layout(&config, &view),
        Command::Hit(hit) => run_hit(&config, &hit),
        Command::Bounds(view) => run_bounds(&config, &view),
    }
}

fn run_layout(config: &FitConfig, view: &ViewArgs) -> Result<(), CliError> {
    let viewer = build_viewer(config, view)?;
    let out: Vec<PlacementOut<'_>> = viewer
        .store
        .overlays()
        .iter()
        .map(|o| PlacementOut { handle: o.handle, kind: o.kind, content: &o.content, placement: o.placement })
        .collect();
    print_json(&out)
}

fn run_hit(config: &FitConfig, hit: &HitArgs) -> Result<(), CliError> {
    let viewer = build_viewer(config, &hit.view)?;
    let found = viewer.overlay_at(Point::new(hit.x, hit.y)).and_then(|h| viewer.store.get(h)).map(|o| PlacementOut {
        handle: o.handle,
        kind: o.kind,
        content: &o.content,
        placement: o.placement,
    });
    print_json(&found)
}

fn run_bounds(config: &FitConfig, view: &ViewArgs) -> Result<(), CliError> {
    let viewer = build_viewer(config, view)?;
    print_json(&viewer.overlay_bounds())
}

fn build_viewer(config: &FitConfig, view: &ViewArgs) -> Result<ViewerCore<WrappedLayout<FixedAdvance>>, CliError> {
    let raw = fs::read_to_string(&view.page).map_err(|source| CliError::Read { path: view.page.clone(), source })?;
    let meta: PageMeta = serde_json::from_str(&raw)?;

    let mut viewer = ViewerCore::new(TextFitter::from_config(config), WrappedLayout::new(FixedAdvance));
    viewer.set_fit_mode(view.fit);
    viewer.on_container_resize(view.container.width, view.container.height);
    let handles = viewer.present_page(&meta);
    info!(
        page = %meta.name,
        overlays = handles.len(),
        fit = %view.fit,
        container_w = view.container.width,
        container_h = view.container.height,
        "page laid out"
    );
    Ok(viewer)
}

fn parse_size(raw: &str) -> Result<Size, String> {
    let (w, h) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("invalid size '{raw}' (expected WIDTHxHEIGHT)"))?;
    let width = w.trim().parse::<f64>().map_err(|e| format!("invalid width '{w}': {e}"))?;
    let height = h.trim().parse::<f64>().map_err(|e| format!("invalid height '{h}': {e}"))?;
    if width < 0.0 || height < 0.0 {
        return Err(format!("size must not be negative: '{raw}'"));
    }
    Ok(Size::new(width, height))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
