//! Script generation: turns the lit pixels of a raster image into a
//! movement script that repaints them.
//!
//! [`generate`] extracts lit pixels, orders them along an approximately
//! greedy Manhattan route from the origin, and emits one visit per pixel:
//! the x leg, the y leg, then `paint`. Legs longer than one cell compress
//! into `N times` blocks. The emitted header records the smallest budgets
//! that run the script to completion.

use std::fmt::Write as _;

use glam::IVec2;
use image::{Pixel, RgbaImage};
use tracing::info;

use crate::turtle::Command;

/// The smallest budgets that run a generated script to completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptBudget {
    /// Total operations: `fuel + paint`.
    pub battery: u64,
    /// Total Manhattan distance walked.
    pub fuel: u64,
    /// One unit per visited cell.
    pub paint: u64,
}

/// Generates a movement script that repaints the lit pixels of `img`.
///
/// A pixel is lit when its alpha is above zero and its luma strictly above
/// `threshold`; zero keeps everything that is not pure black. Returns the
/// script text and its minimum budgets.
pub fn generate(img: &RgbaImage, threshold: u8) -> (String, ScriptBudget) {
    let pixels = lit_pixels(img, threshold);
    let ordered = route(pixels, IVec2::ZERO);
    let (script, budget) = emit_script(&ordered);
    info!(
        cells = ordered.len(),
        battery = budget.battery,
        fuel = budget.fuel,
        paint = budget.paint,
        "script generated"
    );
    (script, budget)
}

/// Emits the script that walks `targets` in order from the origin,
/// painting each, together with its minimum budgets.
///
/// Per target the x displacement goes first, then the y displacement,
/// then `paint`. The budget header rides along as `#` comment lines, so
/// the interpreter skips it.
pub fn emit_script(targets: &[IVec2]) -> (String, ScriptBudget) {
    let mut body = String::new();
    let mut fuel = 0u64;
    let mut cursor = IVec2::ZERO;

    for &target in targets {
        emit_leg(&mut body, target.x - cursor.x, Command::Right, Command::Left);
        emit_leg(&mut body, target.y - cursor.y, Command::Up, Command::Down);
        let _ = writeln!(body, "{}", Command::Paint);
        fuel += manhattan(cursor, target);
        cursor = target;
    }

    let budget = ScriptBudget {
        battery: fuel + targets.len() as u64,
        fuel,
        paint: targets.len() as u64,
    };

    let mut script = String::new();
    let _ = writeln!(script, "# minimum budgets for a complete run:");
    let _ = writeln!(script, "# battery = {}", budget.battery);
    let _ = writeln!(script, "# fuel = {}", budget.fuel);
    let _ = writeln!(script, "# paint = {}", budget.paint);
    script.push_str(&body);
    (script, budget)
}

/// One movement leg: `positive` steps for a positive displacement,
/// `negative` for the other way, compressed into a block past one cell.
fn emit_leg(out: &mut String, disp: i32, positive: Command, negative: Command) {
    if disp == 0 {
        return;
    }
    let cmd = if disp > 0 { positive } else { negative };
    let count = disp.unsigned_abs();
    if count > 1 {
        let _ = writeln!(out, "{count} times");
        let _ = writeln!(out, "{cmd}");
        let _ = writeln!(out, "end");
    } else {
        let _ = writeln!(out, "{cmd}");
    }
}

/// Collects the turtle-space coordinates of every lit pixel, scanning
/// rows top to bottom.
///
/// Pixel `(ix, iy)` of a `w x h` image maps to the turtle cell
/// `(w/2 - ix, iy - h/2)`, the exact inverse of the screen mapping in
/// [`crate::render`]: a generated script, once run and rendered,
/// reproduces the source image.
fn lit_pixels(img: &RgbaImage, threshold: u8) -> Vec<IVec2> {
    let half_w = (img.width() / 2) as i32;
    let half_h = (img.height() / 2) as i32;
    let mut cells = Vec::new();
    for iy in 0..img.height() {
        for ix in 0..img.width() {
            let pixel = img.get_pixel(ix, iy);
            if pixel[3] == 0 || pixel.to_luma()[0] <= threshold {
                continue;
            }
            cells.push(IVec2::new(half_w - ix as i32, iy as i32 - half_h));
        }
    }
    cells
}

/// Orders pixels by repeatedly taking the nearest remaining one.
///
/// The remainder is re-sorted by Manhattan distance from the cursor every
/// 100 visits; between re-sorts the head of the list is taken as-is.
fn route(mut targets: Vec<IVec2>, start: IVec2) -> Vec<IVec2> {
    let mut ordered = Vec::with_capacity(targets.len());
    let mut cursor = start;
    let mut visits = 0usize;
    while !targets.is_empty() {
        if visits % 100 == 0 {
            let from = cursor;
            targets.sort_by_key(|target| manhattan(*target, from));
        }
        let next = targets.remove(0);
        ordered.push(next);
        cursor = next;
        visits += 1;
    }
    ordered
}

fn manhattan(a: IVec2, b: IVec2) -> u64 {
    let d = (a - b).abs();
    d.x as u64 + d.y as u64
}
