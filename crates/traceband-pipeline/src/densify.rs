//! Path densification: expand arc markers into a dense polyline.
//!
//! Scans an arc-annotated path in order. Ordinary points pass through;
//! every arc marker is resolved against its nearest ordinary neighbors
//! and expanded via [`arc::expand`](crate::arc::expand). Consecutive
//! duplicates (within [`DEDUP_EPSILON`]) are dropped so downstream
//! arc-length computation never sees a zero-length segment.
//!
//! This is step 2 of the pipeline, between wire decoding and
//! arc-length resampling.

use crate::arc;
use crate::types::{PathVertex, Point, Polyline};

/// Two consecutive points closer than this are considered duplicates.
pub const DEDUP_EPSILON: f64 = 1e-15;

/// Upper bound on points emitted per expanded arc.
const MAX_ARC_POINTS: usize = 2000;

/// Densify an arc-annotated path into a plain polyline.
///
/// A marker with no ordinary point before it or after it (skipping
/// over adjacent markers) cannot be resolved and is dropped. That is
/// expected for real path data, not an error; a path consisting only
/// of markers densifies to an empty polyline.
#[must_use]
pub fn densify(path: &[PathVertex], arc_segment_length: f64) -> Polyline {
    let mut out: Vec<Point> = Vec::new();

    for (index, vertex) in path.iter().enumerate() {
        match *vertex {
            PathVertex::Point(p) => push_deduplicated(&mut out, p),
            PathVertex::ArcMarker { sagitta } => {
                let Some(start) = preceding_point(path, index) else {
                    continue;
                };
                let Some(end) = following_point(path, index) else {
                    continue;
                };
                for p in arc::expand(start, end, sagitta, arc_segment_length, MAX_ARC_POINTS) {
                    push_deduplicated(&mut out, p);
                }
            }
        }
    }

    Polyline::new(out)
}

/// Append `p` unless it duplicates the last appended point.
fn push_deduplicated(out: &mut Vec<Point>, p: Point) {
    match out.last() {
        Some(last) if last.distance(p) <= DEDUP_EPSILON => {}
        _ => out.push(p),
    }
}

/// Nearest ordinary point before `index`, skipping arc markers.
fn preceding_point(path: &[PathVertex], index: usize) -> Option<Point> {
    path[..index].iter().rev().find_map(|vertex| match *vertex {
        PathVertex::Point(p) => Some(p),
        PathVertex::ArcMarker { .. } => None,
    })
}

/// Nearest ordinary point after `index`, skipping arc markers.
fn following_point(path: &[PathVertex], index: usize) -> Option<Point> {
    path[index + 1..].iter().find_map(|vertex| match *vertex {
        PathVertex::Point(p) => Some(p),
        PathVertex::ArcMarker { .. } => None,
    })
}
