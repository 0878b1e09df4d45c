//! Wire format for raw paths: sentinel-tagged coordinate pairs.
//!
//! The layout store hands paths over as flat `(x, y)` pairs. Ordinary
//! pairs are coordinates; a pair whose `y` equals [`SENTINEL_Y`] is an
//! arc marker whose `x` carries the signed sagitta. The sentinel is
//! the maximum representable `f64`, reserved as a type tag and never a
//! legitimate coordinate.
//!
//! The pipeline itself never sees the sentinel: [`decode`] translates
//! pairs into explicit [`PathVertex`] values at this boundary, and
//! [`encode`] produces the wire form for callers that need to hand a
//! path back.

use crate::types::{PathVertex, Point};

/// Reserved `y` value tagging a pair as an arc marker
/// (`1.7976931348623157e308`, the maximum finite `f64`).
pub const SENTINEL_Y: f64 = f64::MAX;

/// Decode wire pairs into explicit path vertices.
///
/// The sentinel is matched bit-exactly: any other `y`, however close,
/// is an ordinary coordinate.
#[must_use]
pub fn decode(pairs: &[(f64, f64)]) -> Vec<PathVertex> {
    pairs
        .iter()
        .map(|&(x, y)| {
            if y.to_bits() == SENTINEL_Y.to_bits() {
                PathVertex::ArcMarker { sagitta: x }
            } else {
                PathVertex::Point(Point::new(x, y))
            }
        })
        .collect()
}

/// Encode path vertices back into wire pairs.
#[must_use]
pub fn encode(path: &[PathVertex]) -> Vec<(f64, f64)> {
    path.iter()
        .map(|vertex| match *vertex {
            PathVertex::Point(p) => (p.x, p.y),
            PathVertex::ArcMarker { sagitta } => (sagitta, SENTINEL_Y),
        })
        .collect()
}
