//! Arc-length resampling: reindex a polyline onto a uniform grid.
//!
//! Computes cumulative traveled distance along the dense centerline
//! and linearly interpolates both coordinate axes onto a uniform
//! arc-length grid. Uniform spacing is what lets the width field be
//! synthesized on a regular grid downstream.
//!
//! This is step 3 of the pipeline, between densification and width
//! synthesis.

use crate::types::{Point, Polyline, TraceError};

/// Cumulative Euclidean arc length along a polyline, starting at 0.
#[must_use]
pub fn cumulative_arc_length(points: &[Point]) -> Vec<f64> {
    let mut lengths = Vec::with_capacity(points.len());
    let mut total = 0.0;
    for (index, p) in points.iter().enumerate() {
        if index > 0 {
            total += points[index - 1].distance(*p);
        }
        lengths.push(total);
    }
    lengths
}

/// Resample a polyline onto `count` uniform arc-length samples.
///
/// Returns the resampled polyline together with the arc-length grid
/// `s` (monotonically non-decreasing, `s[0] = 0`, last value the total
/// path length).
///
/// A zero-length input (a single point, or coincident points) yields
/// `count` copies of the first point over an all-zero grid: degenerate
/// geometry is expected in real path data and gets a defined trivial
/// result.
///
/// # Errors
///
/// Returns [`TraceError::EmptyPath`] for an empty polyline and
/// [`TraceError::InvalidConfig`] for `count < 2`.
pub fn resample(dense: &Polyline, count: usize) -> Result<(Polyline, Vec<f64>), TraceError> {
    let points = dense.points();
    let Some(&first) = points.first() else {
        return Err(TraceError::EmptyPath);
    };
    if count < 2 {
        return Err(TraceError::InvalidConfig(format!(
            "resample count must be at least 2, got {count}",
        )));
    }

    let lengths = cumulative_arc_length(points);
    let total = lengths.last().copied().unwrap_or(0.0);
    if total <= 0.0 {
        return Ok((Polyline::new(vec![first; count]), vec![0.0; count]));
    }

    let mut grid = Vec::with_capacity(count);
    let mut resampled = Vec::with_capacity(count);
    let mut segment = 0;
    for i in 0..count {
        #[allow(clippy::cast_precision_loss)]
        let target = total * i as f64 / (count - 1) as f64;

        // Both the grid and the cumulative lengths are sorted, so a
        // single forward-moving cursor finds every bracketing segment.
        while segment + 2 < lengths.len() && lengths[segment + 1] < target {
            segment += 1;
        }
        let span = lengths[segment + 1] - lengths[segment];
        let t = if span > 0.0 {
            ((target - lengths[segment]) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let a = points[segment];
        let b = points[segment + 1];
        grid.push(target);
        resampled.push(Point::new(
            (b.x - a.x).mul_add(t, a.x),
            (b.y - a.y).mul_add(t, a.y),
        ));
    }

    Ok((Polyline::new(resampled), grid))
}
