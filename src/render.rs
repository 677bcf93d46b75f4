//! Static rendering of a painted field to an RGBA image.
//!
//! [`render_image`] draws the inclusive bounding box of the painted cells,
//! one pixel per cell, plus dotted coordinate axes and markers for the
//! origin and the turtle's final position. [`PngExporter`] is the observer
//! that renders and saves automatically when a script ends.

use std::path::PathBuf;

use glam::IVec2;
use image::{ImageResult, Rgba, RgbaImage};
use tracing::{info, warn};

use crate::observer::Observer;
use crate::turtle::{BoundingBox, Turtle};

/// Colors and marker sizes for [`render_image`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderStyle {
    /// Fill for cells the turtle never painted.
    pub background: Rgba<u8>,
    /// Painted cells.
    pub stroke: Rgba<u8>,
    /// Dots along the horizontal axis (turtle y = 0).
    pub x_axis: Rgba<u8>,
    /// Dots along the vertical axis (turtle x = 0).
    pub y_axis: Rgba<u8>,
    /// Filled marker over the origin.
    pub origin: Rgba<u8>,
    /// Radius of the origin marker, in pixels.
    pub origin_radius: u32,
    /// Filled marker over the turtle's final position.
    pub turtle: Rgba<u8>,
    /// Radius of the turtle marker, in pixels.
    pub turtle_radius: u32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: Rgba([0, 0, 0, 255]),
            stroke: Rgba([255, 255, 255, 255]),
            x_axis: Rgba([255, 0, 0, 255]),
            y_axis: Rgba([0, 255, 0, 255]),
            origin: Rgba([0, 0, 255, 255]),
            origin_radius: 10,
            turtle: Rgba([255, 255, 0, 255]),
            turtle_radius: 10,
        }
    }
}

/// Draws the turtle's painted field into an RGBA image.
///
/// The canvas covers the inclusive bounding box of the painted cells, one
/// pixel per cell; screen x runs opposite turtle x, so the cell at `x_max`
/// lands in the left column. Strokes go down first, then the axis dots,
/// then the origin and turtle markers on top. Anything mapping outside
/// the canvas is clipped. Returns `None` when nothing has been painted.
pub fn render_image(turtle: &Turtle, style: &RenderStyle) -> Option<RgbaImage> {
    let bounds = turtle.bounds()?;
    let mut img = RgbaImage::from_pixel(bounds.width(), bounds.height(), style.background);

    for &cell in turtle.painted_cells() {
        let (x, y) = to_screen(&bounds, cell);
        put_pixel_clipped(&mut img, x, y, style.stroke);
    }

    draw_axes(&mut img, &bounds, style);
    fill_circle(
        &mut img,
        to_screen(&bounds, IVec2::ZERO),
        style.origin_radius,
        style.origin,
    );
    fill_circle(
        &mut img,
        to_screen(&bounds, turtle.position()),
        style.turtle_radius,
        style.turtle,
    );

    Some(img)
}

/// Observer that renders the final field to a PNG when the script ends.
///
/// Keeps the save result so callers can tell success from failure after
/// the run. A field with nothing painted is skipped with a warning and
/// leaves no file behind.
#[derive(Debug)]
pub struct PngExporter {
    path: PathBuf,
    style: RenderStyle,
    saved: Option<ImageResult<()>>,
}

impl PngExporter {
    /// Exporter writing to `path` with the default palette.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            style: RenderStyle::default(),
            saved: None,
        }
    }

    /// Replaces the palette (builder pattern).
    pub fn with_style(mut self, style: RenderStyle) -> Self {
        self.style = style;
        self
    }

    /// The save result: `None` until a script has ended, and when there
    /// was nothing to render.
    pub fn save_result(&self) -> Option<&ImageResult<()>> {
        self.saved.as_ref()
    }
}

impl Observer for PngExporter {
    fn after_script(&mut self, turtle: &Turtle) {
        let Some(img) = render_image(turtle, &self.style) else {
            warn!("no cells painted, nothing to render");
            return;
        };
        let result = img.save(&self.path);
        match &result {
            Ok(()) => info!(path = %self.path.display(), "painted field rendered"),
            Err(err) => warn!(%err, "saving render failed"),
        }
        self.saved = Some(result);
    }
}

/// Turtle cell to pixel coordinates: `(x_max - x, y - y_min)`.
fn to_screen(bounds: &BoundingBox, cell: IVec2) -> (i64, i64) {
    (
        bounds.x_max as i64 - cell.x as i64,
        cell.y as i64 - bounds.y_min as i64,
    )
}

/// Dots both axes through the origin, one dot per two cells. Dots land on
/// even turtle coordinates; whatever falls outside the canvas clips away.
fn draw_axes(img: &mut RgbaImage, bounds: &BoundingBox, style: &RenderStyle) {
    let reach_y = bounds.height() as i32 * 2;
    for y in (-reach_y..reach_y).step_by(2) {
        let (px, py) = to_screen(bounds, IVec2::new(0, y));
        put_pixel_clipped(img, px, py, style.y_axis);
    }
    let reach_x = bounds.width() as i32 * 2;
    for x in (-reach_x..reach_x).step_by(2) {
        let (px, py) = to_screen(bounds, IVec2::new(x, 0));
        put_pixel_clipped(img, px, py, style.x_axis);
    }
}

fn fill_circle(img: &mut RgbaImage, center: (i64, i64), radius: u32, color: Rgba<u8>) {
    let (cx, cy) = center;
    let r = radius as i64;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                put_pixel_clipped(img, cx + dx, cy + dy, color);
            }
        }
    }
}

fn put_pixel_clipped(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if (0..img.width() as i64).contains(&x) && (0..img.height() as i64).contains(&y) {
        img.put_pixel(x as u32, y as u32, color);
    }
}
