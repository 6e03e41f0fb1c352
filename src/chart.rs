//! Histogram plot rendering.
//!
//! Plots are composed as SVG strings and rasterized to 8-bit RGB so callers
//! receive display rasters rather than vector text. The three plots of a
//! pairwise comparison (original, edited, difference) share one global
//! Y-axis maximum; without that shared scale the visual comparison would be
//! misleading.

use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use imgref::ImgVec;
use resvg::usvg;
use rgb::RGB8;
use tiny_skia::Pixmap;

use crate::error::{Error, Result};
use crate::raster::RgbImage;

/// Canvas width of a single plot, in pixels.
pub const PLOT_WIDTH: u32 = 340;
/// Canvas height of a single plot, in pixels.
pub const PLOT_HEIGHT: u32 = 100;

const MARGIN_LEFT: f64 = 40.0;
const MARGIN_RIGHT: f64 = 10.0;
const MARGIN_TOP: f64 = 25.0;
const MARGIN_BOTTOM: f64 = 25.0;

const BG_COLOR: &str = "#2a2a2a";
const BG_RGB: RGB8 = RGB8 { r: 42, g: 42, b: 42 };
const TEXT_COLOR: &str = "#e6e6e6";
const AXIS_COLOR: &str = "#404040";
const GRID_COLOR: &str = "#202020";

const CHANNEL_COLORS: [&str; 3] = ["rgb(255,80,80)", "rgb(80,255,80)", "rgb(80,80,255)"];
const CHANNEL_LABELS: [&str; 3] = ["R", "G", "B"];

/// Smooth one histogram channel with a centered moving average (window 3).
///
/// The window is truncated at the ends, so the first and last bins average
/// over two samples instead of three.
#[must_use]
pub fn smooth_histogram(bins: &[u32; 256]) -> [f64; 256] {
    let mut out = [0.0f64; 256];
    for i in 0..256usize {
        let start = i.saturating_sub(1);
        let end = (i + 2).min(256);
        let sum: u64 = bins[start..end].iter().map(|&v| u64::from(v)).sum();
        out[i] = sum as f64 / (end - start) as f64;
    }
    out
}

/// Global Y-axis maximum shared by all three plots: the largest smoothed
/// peak or absolute difference, scaled by 10% padding.
#[must_use]
pub fn shared_y_max(
    original: &[[f64; 256]; 3],
    edited: &[[f64; 256]; 3],
    difference: &[[f64; 256]; 3],
) -> f64 {
    let peak = |channels: &[[f64; 256]; 3]| -> f64 {
        channels
            .iter()
            .flat_map(|ch| ch.iter())
            .fold(0.0f64, |acc, &v| acc.max(v.abs()))
    };
    let y_max = peak(original).max(peak(edited)).max(peak(difference)) * 1.1;
    if y_max > 0.0 { y_max } else { 1.0 }
}

/// Compose a single histogram plot as an SVG document.
///
/// Normal plots anchor the X axis at the bottom; a difference plot centers
/// it vertically so positive and negative deltas diverge up and down.
#[must_use]
pub fn plot_svg(channels: &[[f64; 256]; 3], title: &str, y_max: f64, centered: bool) -> String {
    let width = f64::from(PLOT_WIDTH);
    let height = f64::from(PLOT_HEIGHT);
    let plot_width = width - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = height - MARGIN_TOP - MARGIN_BOTTOM;

    let mut svg = String::with_capacity(16 * 1024);
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{PLOT_WIDTH}" height="{PLOT_HEIGHT}" viewBox="0 0 {PLOT_WIDTH} {PLOT_HEIGHT}">"#
    );

    // Background
    let _ = writeln!(
        svg,
        r#"<rect width="{PLOT_WIDTH}" height="{PLOT_HEIGHT}" fill="{BG_COLOR}"/>"#
    );

    // Title
    let _ = writeln!(
        svg,
        r#"<text x="{:.0}" y="14" text-anchor="middle" font-family="sans-serif" font-size="10" fill="{TEXT_COLOR}">{title}</text>"#,
        width / 2.0
    );

    // Vertical gridlines with X-axis labels at the canonical intensities.
    for x_val in [0u32, 64, 128, 192, 255] {
        let x_px = MARGIN_LEFT + f64::from(x_val) / 255.0 * plot_width;
        let _ = writeln!(
            svg,
            r#"<line x1="{x_px:.2}" y1="{MARGIN_TOP}" x2="{x_px:.2}" y2="{:.0}" stroke="{GRID_COLOR}" stroke-width="1"/>"#,
            height - MARGIN_BOTTOM
        );
        let _ = writeln!(
            svg,
            r#"<text x="{x_px:.2}" y="{:.0}" text-anchor="middle" font-family="sans-serif" font-size="8" fill="{TEXT_COLOR}">{x_val}</text>"#,
            height - MARGIN_BOTTOM + 13.0
        );
    }

    // Y axis
    let _ = writeln!(
        svg,
        r#"<line x1="{MARGIN_LEFT}" y1="{MARGIN_TOP}" x2="{MARGIN_LEFT}" y2="{:.0}" stroke="{AXIS_COLOR}" stroke-width="1"/>"#,
        height - MARGIN_BOTTOM
    );

    // X axis: bottom-anchored, or vertically centered for difference plots.
    let x_axis_y = if centered {
        MARGIN_TOP + plot_height / 2.0
    } else {
        height - MARGIN_BOTTOM
    };
    let _ = writeln!(
        svg,
        r#"<line x1="{MARGIN_LEFT}" y1="{x_axis_y:.2}" x2="{:.0}" y2="{x_axis_y:.2}" stroke="{AXIS_COLOR}" stroke-width="1"/>"#,
        width - MARGIN_RIGHT
    );

    // Y axis label
    let _ = writeln!(
        svg,
        r#"<text x="5" y="{:.0}" font-family="sans-serif" font-size="8" fill="{TEXT_COLOR}">Freq</text>"#,
        MARGIN_TOP + 6.0
    );

    // One translucent polyline per channel.
    for (ch, color) in channels.iter().zip(CHANNEL_COLORS.iter()) {
        let mut points = String::with_capacity(256 * 16);
        for (x, &val) in ch.iter().enumerate() {
            let x_px = MARGIN_LEFT + x as f64 / 255.0 * plot_width;
            let y_px = if centered {
                x_axis_y - val / y_max * (plot_height / 2.0)
            } else {
                (height - MARGIN_BOTTOM) - val / y_max * plot_height
            };
            let _ = write!(points, "{x_px:.2},{y_px:.2} ");
        }
        let _ = writeln!(
            svg,
            r#"<polyline points="{}" fill="none" stroke="{color}" stroke-width="2" stroke-opacity="0.7"/>"#,
            points.trim_end()
        );
    }

    // Channel legend
    let legend_x = width - MARGIN_RIGHT - 60.0;
    let legend_y = MARGIN_TOP + 5.0;
    for (i, (color, label)) in CHANNEL_COLORS.iter().zip(CHANNEL_LABELS.iter()).enumerate() {
        let y = legend_y + i as f64 * 12.0;
        let _ = writeln!(
            svg,
            r#"<rect x="{legend_x:.0}" y="{y:.0}" width="10" height="8" fill="{color}"/>"#
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.0}" y="{:.0}" font-family="sans-serif" font-size="8" fill="{TEXT_COLOR}">{label}</text>"#,
            legend_x + 15.0,
            y + 7.0
        );
    }

    svg.push_str("</svg>\n");
    svg
}

/// Shared font database; loading system fonts is expensive, so it happens
/// once per process.
fn font_database() -> Arc<fontdb::Database> {
    static DB: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    DB.get_or_init(|| {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        Arc::new(db)
    })
    .clone()
}

/// Rasterize an SVG plot to an 8-bit RGB image.
///
/// # Errors
///
/// Returns [`Error::ChartRender`] if the SVG fails to parse or the pixmap
/// cannot be allocated.
pub fn render_plot(svg: &str) -> Result<RgbImage> {
    let options = usvg::Options {
        fontdb: font_database(),
        ..Default::default()
    };
    let tree =
        usvg::Tree::from_str(svg, &options).map_err(|e| Error::ChartRender(e.to_string()))?;

    let mut pixmap = Pixmap::new(PLOT_WIDTH, PLOT_HEIGHT)
        .ok_or_else(|| Error::ChartRender("pixmap allocation failed".to_string()))?;
    pixmap.fill(tiny_skia::Color::from_rgba8(BG_RGB.r, BG_RGB.g, BG_RGB.b, 255));
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    // The canvas is fully opaque, so premultiplied RGBA equals straight RGB.
    let pixels: Vec<RGB8> = pixmap
        .data()
        .chunks_exact(4)
        .map(|c| RGB8::new(c[0], c[1], c[2]))
        .collect();
    Ok(ImgVec::new(
        pixels,
        PLOT_WIDTH as usize,
        PLOT_HEIGHT as usize,
    ))
}

/// Concatenate equally wide plots vertically into one export image.
#[must_use]
pub fn stack_vertical(plots: &[&RgbImage]) -> RgbImage {
    let width = plots.first().map_or(0, |p| p.width());
    let height: usize = plots.iter().map(|p| p.height()).sum();
    let mut buf = vec![BG_RGB; width * height];
    let mut offset = 0usize;
    for plot in plots {
        debug_assert_eq!(plot.width(), width);
        buf[offset..offset + plot.buf().len()].copy_from_slice(plot.buf());
        offset += plot.buf().len();
    }
    ImgVec::new(buf, width, height)
}
