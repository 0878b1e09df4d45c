//! Arc expansion: reconstruct a circular arc from endpoints and a sagitta.
//!
//! A sagitta (arc height) is the signed perpendicular distance from
//! the chord midpoint to the arc; positive values bulge to the left of
//! the chord direction. Given the two endpoints and the sagitta, the
//! circle is fully determined, and the arc is emitted as a polyline of
//! angularly uniform samples.
//!
//! This is step 1 of the pipeline, invoked by
//! [`densify`](crate::densify::densify) for every arc marker.

use std::f64::consts::{PI, TAU};

use crate::types::Point;

/// Sagitta magnitudes below this are treated as a straight segment.
pub const MIN_SAGITTA: f64 = 1e-20;

/// Minimum number of points emitted for any non-degenerate arc.
pub const MIN_ARC_POINTS: usize = 8;

/// Expand an arc into a polyline of points from `p0` to `p1`.
///
/// The circle radius follows from the chord length `L` and sagitta
/// magnitude `h` as `R = L^2/(8h) + h/2`; the center sits at the chord
/// midpoint, offset by `R - h` along the signed left normal. The sweep
/// direction is resolved by trying the wrapped angular span plus and
/// minus one full turn and keeping the candidate whose arc midpoint
/// reproduces the signed sagitta best.
///
/// The point count is `ceil(arc_length / target_segment_length)`,
/// clipped into `[MIN_ARC_POINTS, max_points]`, endpoints included.
///
/// Degenerate inputs yield minimal results instead of errors:
/// coincident endpoints produce `[p0]`, a sagitta below
/// [`MIN_SAGITTA`] produces the straight segment `[p0, p1]`.
///
/// Known limitation: for arcs whose sagitta approaches the chord
/// length (near-semicircle and beyond), the candidate spans score
/// almost equally and the search can settle on the shorter sweep.
/// Callers that need exact near-full-circle geometry should split the
/// arc upstream.
#[must_use]
pub fn expand(
    p0: Point,
    p1: Point,
    sagitta: f64,
    target_segment_length: f64,
    max_points: usize,
) -> Vec<Point> {
    let chord_len = p0.distance(p1);
    if chord_len == 0.0 {
        return vec![p0];
    }
    if sagitta.abs() < MIN_SAGITTA {
        return vec![p0, p1];
    }

    // Unit chord direction and its left normal.
    let tx = (p1.x - p0.x) / chord_len;
    let ty = (p1.y - p0.y) / chord_len;
    let nx = -ty;
    let ny = tx;

    let sign = if sagitta > 0.0 { 1.0 } else { -1.0 };
    let h = sagitta.abs();
    let radius = chord_len * chord_len / (8.0 * h) + h / 2.0;

    // The center sits opposite the bulge for minor arcs; past the
    // half-chord sagitta the offset flips sign and it crosses onto
    // the bulge side.
    let mid = Point::new((p0.x + p1.x) / 2.0, (p0.y + p1.y) / 2.0);
    let center_offset = radius - h;
    let center = Point::new(
        mid.x - sign * center_offset * nx,
        mid.y - sign * center_offset * ny,
    );

    let ang0 = (p0.y - center.y).atan2(p0.x - center.x);
    let ang1 = (p1.y - center.y).atan2(p1.x - center.x);
    let wrapped = wrap_to_pi(ang1 - ang0);

    // The wrapped span is ambiguous up to a full turn: test all three
    // and keep the one whose arc midpoint lands on the requested side
    // at the requested height.
    let mut best_span = wrapped;
    let mut best_err = f64::INFINITY;
    for span in [wrapped, wrapped + TAU, wrapped - TAU] {
        let ang_mid = span.mul_add(0.5, ang0);
        let mx = radius.mul_add(ang_mid.cos(), center.x);
        let my = radius.mul_add(ang_mid.sin(), center.y);
        let side = (mx - mid.x).mul_add(nx, (my - mid.y) * ny);
        let err = (side - sign * h).abs();
        if err < best_err {
            best_err = err;
            best_span = span;
        }
    }

    let arc_length = best_span.abs() * radius;
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let count = ((arc_length / target_segment_length).ceil())
        .clamp(MIN_ARC_POINTS as f64, max_points.max(MIN_ARC_POINTS) as f64)
        as usize;

    (0..count)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f64 / (count - 1) as f64;
            let ang = (t * best_span) + ang0;
            Point::new(
                radius.mul_add(ang.cos(), center.x),
                radius.mul_add(ang.sin(), center.y),
            )
        })
        .collect()
}

/// Wrap an angle into `[-pi, pi)`.
fn wrap_to_pi(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    /// Chord midpoint and its left normal for a horizontal chord
    /// `(0,0) -> (2,0)`: midpoint `(1,0)`, left normal `(0,1)`.
    fn quarter_chord() -> (Point, Point) {
        (Point::new(0.0, 0.0), Point::new(2.0, 0.0))
    }

    #[test]
    fn coincident_endpoints_yield_single_point() {
        let p = Point::new(3.0, 4.0);
        let result = expand(p, p, 0.5, 0.1, 100);
        assert_eq!(result, vec![p]);
    }

    #[test]
    fn zero_sagitta_yields_straight_segment() {
        let (p0, p1) = quarter_chord();
        let result = expand(p0, p1, 0.0, 0.1, 100);
        assert_eq!(result, vec![p0, p1]);
    }

    #[test]
    fn tiny_sagitta_treated_as_straight() {
        let (p0, p1) = quarter_chord();
        let result = expand(p0, p1, 1e-21, 0.1, 100);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn endpoints_are_included() {
        let (p0, p1) = quarter_chord();
        let result = expand(p0, p1, 0.4, 0.05, 500);
        let first = result[0];
        let last = *result.last().unwrap();
        assert!(first.distance(p0) < EPS, "first = {first:?}");
        assert!(last.distance(p1) < EPS, "last = {last:?}");
    }

    #[test]
    fn positive_sagitta_bulges_left() {
        // Chord along +x: left is +y. The arc midpoint must sit at
        // y = +sagitta above the chord midpoint.
        let (p0, p1) = quarter_chord();
        let sagitta = 0.5;
        let result = expand(p0, p1, sagitta, 0.01, 2000);
        let mid = result[result.len() / 2];
        assert!((mid.y - sagitta).abs() < 1e-3, "midpoint = {mid:?}");
        assert!((mid.x - 1.0).abs() < 1e-2, "midpoint = {mid:?}");
    }

    #[test]
    fn negative_sagitta_bulges_right() {
        let (p0, p1) = quarter_chord();
        let result = expand(p0, p1, -0.5, 0.01, 2000);
        let mid = result[result.len() / 2];
        assert!((mid.y + 0.5).abs() < 1e-3, "midpoint = {mid:?}");
    }

    #[test]
    fn semicircle_sagitta_recovers_height() {
        // h = L/2 makes the arc a semicircle: R = 1, center at the
        // chord midpoint, peak at (1, 1).
        let (p0, p1) = quarter_chord();
        let result = expand(p0, p1, 1.0, 0.01, 2000);
        let peak = result
            .iter()
            .fold(f64::NEG_INFINITY, |acc, p| acc.max(p.y));
        assert!((peak - 1.0).abs() < 1e-3, "peak = {peak}");
    }

    #[test]
    fn all_points_lie_on_the_circle() {
        let (p0, p1) = quarter_chord();
        let h = 0.4;
        // R = L^2/(8h) + h/2 = 4/3.2 + 0.2 = 1.45
        let radius = 2.0 * 2.0 / (8.0 * h) + h / 2.0;
        let center = Point::new(1.0, h - radius);
        let result = expand(p0, p1, h, 0.01, 2000);
        for p in &result {
            assert!(
                (p.distance(center) - radius).abs() < EPS,
                "point {p:?} off circle (r = {radius})",
            );
        }
    }

    #[test]
    fn minimum_point_count_enforced() {
        let (p0, p1) = quarter_chord();
        // Huge target segment length: still at least MIN_ARC_POINTS.
        let result = expand(p0, p1, 0.3, 1e9, 2000);
        assert_eq!(result.len(), MIN_ARC_POINTS);
    }

    #[test]
    fn maximum_point_count_enforced() {
        let (p0, p1) = quarter_chord();
        let result = expand(p0, p1, 0.3, 1e-9, 50);
        assert_eq!(result.len(), 50);
    }

    #[test]
    fn point_count_tracks_segment_length() {
        let (p0, p1) = quarter_chord();
        let coarse = expand(p0, p1, 0.5, 0.1, 10_000);
        let fine = expand(p0, p1, 0.5, 0.01, 10_000);
        assert!(fine.len() > coarse.len());
    }

    #[test]
    fn wrap_to_pi_range() {
        for angle in [-7.0, -PI, 0.0, 1.0, PI, 9.0] {
            let wrapped = wrap_to_pi(angle);
            assert!((-PI..PI).contains(&wrapped), "{angle} -> {wrapped}");
        }
        assert!((wrap_to_pi(TAU + 0.25) - 0.25).abs() < EPS);
        assert!((wrap_to_pi(-TAU - 0.25) + 0.25).abs() < EPS);
    }
}
