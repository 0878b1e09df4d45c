//! Band polygon assembly: offset a centerline by its local half-width.
//!
//! Estimates a tangent at every centerline sample with a
//! central-difference gradient, rotates it 90° for the left normal,
//! and offsets the centerline by half the local width to both sides.
//! The closed polygon walks the left boundary forward and the right
//! boundary backward.
//!
//! This is step 5 of the pipeline, the final geometry stage.

use crate::types::{Point, Polyline};

/// Tangent norms below this are treated as zero (duplicate samples).
const TANGENT_EPSILON: f64 = 1e-30;

/// Build the closed band polygon for a centerline and width profile.
///
/// The polygon has exactly `2 * n` vertices for `n` centerline
/// samples: left-offset points in order, then right-offset points in
/// reverse. When `centerline` and `widths` disagree in length the
/// extra tail of the longer one is ignored.
///
/// Zero-length tangents (coincident neighboring samples) reuse the
/// nearest preceding valid tangent, or the nearest following one at
/// the start of the path. A fully degenerate centerline (all samples
/// coincident) gets a zero offset: the polygon collapses onto the
/// point, which is the defined result for zero-length paths.
#[must_use]
pub fn build(centerline: &Polyline, widths: &[f64]) -> Polyline {
    let points = centerline.points();
    let n = points.len().min(widths.len());
    if n == 0 {
        return Polyline::new(Vec::new());
    }
    if n == 1 {
        return Polyline::new(vec![points[0], points[0]]);
    }

    let normals = unit_normals(&points[..n]);

    let mut polygon = Vec::with_capacity(2 * n);
    for i in 0..n {
        let (nx, ny) = normals[i];
        let half = widths[i] / 2.0;
        polygon.push(Point::new(
            nx.mul_add(half, points[i].x),
            ny.mul_add(half, points[i].y),
        ));
    }
    for i in (0..n).rev() {
        let (nx, ny) = normals[i];
        let half = widths[i] / 2.0;
        polygon.push(Point::new(
            nx.mul_add(-half, points[i].x),
            ny.mul_add(-half, points[i].y),
        ));
    }

    Polyline::new(polygon)
}

/// Unit left normals from central-difference tangents.
///
/// Interior samples use `(p[i+1] - p[i-1]) / 2`, the ends use one-sided
/// differences. Returns `(0, 0)` normals only when no sample pair in
/// the whole centerline is distinct.
fn unit_normals(points: &[Point]) -> Vec<(f64, f64)> {
    let n = points.len();
    let mut tangents = Vec::with_capacity(n);
    let mut valid = Vec::with_capacity(n);

    for i in 0..n {
        let (dx, dy) = if i == 0 {
            (points[1].x - points[0].x, points[1].y - points[0].y)
        } else if i == n - 1 {
            (
                points[n - 1].x - points[n - 2].x,
                points[n - 1].y - points[n - 2].y,
            )
        } else {
            (
                (points[i + 1].x - points[i - 1].x) / 2.0,
                (points[i + 1].y - points[i - 1].y) / 2.0,
            )
        };
        let norm = dx.hypot(dy);
        if norm > TANGENT_EPSILON {
            tangents.push((dx / norm, dy / norm));
            valid.push(true);
        } else {
            tangents.push((0.0, 0.0));
            valid.push(false);
        }
    }

    // Backfill degenerate tangents from the nearest valid neighbor:
    // a forward pass carries the preceding valid tangent, a backward
    // pass covers an invalid run at the start.
    let mut carry: Option<(f64, f64)> = None;
    for i in 0..n {
        if valid[i] {
            carry = Some(tangents[i]);
        } else if let Some(t) = carry {
            tangents[i] = t;
            valid[i] = true;
        }
    }
    let mut carry: Option<(f64, f64)> = None;
    for i in (0..n).rev() {
        if valid[i] {
            carry = Some(tangents[i]);
        } else if let Some(t) = carry {
            tangents[i] = t;
        }
    }

    tangents.into_iter().map(|(tx, ty)| (-ty, tx)).collect()
}
