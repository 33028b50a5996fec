//! SVG path builders for QR modules and finder patterns.
//!
//! All coordinates are in symbol pixels. Paths are appended to a shared `String` so a whole
//! region (all data dots, all finder rings, ...) becomes a single `<path>`.

use std::fmt::Write as _;

use crate::canvas::model::{CornerDotShape, CornerSquareShape, DotShape};

/// Which orthogonal neighbours of a dark module are also dark data modules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Neighbours {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Neighbours {
    fn count(self) -> usize {
        [self.left, self.right, self.top, self.bottom]
            .into_iter()
            .filter(|n| *n)
            .count()
    }
}

/// Per-corner radii, clockwise from top-left.
type Radii = [f64; 4];

/// Corner radii of one data module for the given dot shape.
pub fn dot_radii(shape: DotShape, n: Neighbours, s: f64) -> Radii {
    let half = s / 2.0;
    // A corner is free when neither side meeting at it touches a neighbour.
    let free = [
        !n.left && !n.top,
        !n.top && !n.right,
        !n.right && !n.bottom,
        !n.bottom && !n.left,
    ];
    let pick = |r: f64, mask: [bool; 4]| -> Radii {
        [0, 1, 2, 3].map(|i| if mask[i] { r } else { 0.0 })
    };

    match shape {
        DotShape::Square => [0.0; 4],
        DotShape::Dots => [half; 4],
        DotShape::Rounded => pick(half, free),
        DotShape::ExtraRounded => {
            // A lone corner turn gets a full quarter circle.
            let r = if n.count() == 2 && free.iter().filter(|f| **f).count() == 1 {
                s
            } else {
                half
            };
            pick(r, free)
        }
        DotShape::Classy | DotShape::ClassyRounded => {
            if n.count() == 0 {
                return [half, 0.0, half, 0.0];
            }
            let r = if shape == DotShape::ClassyRounded { s } else { half };
            pick(r, [free[0], false, free[2], false])
        }
    }
}

/// Append a rectangle with per-corner radii.
pub fn push_rounded_rect(out: &mut String, x: f64, y: f64, w: f64, h: f64, r: Radii) {
    let [tl, tr, br, bl] = r;
    let _ = write!(out, "M{} {}", fmt(x + tl), fmt(y));
    let _ = write!(out, "H{}", fmt(x + w - tr));
    push_arc(out, tr, x + w, y + tr);
    let _ = write!(out, "V{}", fmt(y + h - br));
    push_arc(out, br, x + w - br, y + h);
    let _ = write!(out, "H{}", fmt(x + bl));
    push_arc(out, bl, x, y + h - bl);
    let _ = write!(out, "V{}", fmt(y + tl));
    push_arc(out, tl, x + tl, y);
    out.push('Z');
}

fn push_arc(out: &mut String, r: f64, x: f64, y: f64) {
    if r > 0.0 {
        let _ = write!(out, "A{} {} 0 0 1 {} {}", fmt(r), fmt(r), fmt(x), fmt(y));
    }
}

/// Append a full circle as two arcs.
pub fn push_circle(out: &mut String, cx: f64, cy: f64, r: f64) {
    let _ = write!(
        out,
        "M{} {}A{r} {r} 0 1 1 {} {}A{r} {r} 0 1 1 {} {}Z",
        fmt(cx - r),
        fmt(cy),
        fmt(cx + r),
        fmt(cy),
        fmt(cx - r),
        fmt(cy),
        r = fmt(r),
    );
}

/// Append a 7x7 finder ring at `(x, y)` with module size `s`. Fill with `evenodd`.
pub fn push_corner_square(out: &mut String, shape: CornerSquareShape, x: f64, y: f64, s: f64) {
    let outer = 7.0 * s;
    let inner = 5.0 * s;
    match shape {
        CornerSquareShape::Square => {
            push_rounded_rect(out, x, y, outer, outer, [0.0; 4]);
            push_rounded_rect(out, x + s, y + s, inner, inner, [0.0; 4]);
        }
        CornerSquareShape::Dot => {
            push_circle(out, x + outer / 2.0, y + outer / 2.0, outer / 2.0);
            push_circle(out, x + outer / 2.0, y + outer / 2.0, inner / 2.0);
        }
        CornerSquareShape::ExtraRounded => {
            push_rounded_rect(out, x, y, outer, outer, [2.5 * s; 4]);
            push_rounded_rect(out, x + s, y + s, inner, inner, [1.5 * s; 4]);
        }
    }
}

/// Append the 3x3 finder centre whose top-left module is at `(x, y)`.
pub fn push_corner_dot(out: &mut String, shape: CornerDotShape, x: f64, y: f64, s: f64) {
    let side = 3.0 * s;
    match shape {
        CornerDotShape::Square => push_rounded_rect(out, x, y, side, side, [0.0; 4]),
        CornerDotShape::Dot => push_circle(out, x + side / 2.0, y + side / 2.0, side / 2.0),
    }
}

/// Compact decimal formatting for path data.
fn fmt(v: f64) -> String {
    let r = (v * 1000.0).round() / 1000.0;
    if r == r.trunc() {
        format!("{}", r as i64)
    } else {
        format!("{r}")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/symbol/shapes.rs"]
mod tests;
