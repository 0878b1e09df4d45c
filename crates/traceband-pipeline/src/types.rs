//! Shared types for the traceband pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A 2D point in layout coordinates (length units, e.g. meters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// A sequence of connected points forming a path or polygon outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

/// One element of a raw, arc-annotated path.
///
/// Raw paths mix ordinary coordinates with arc markers. A marker
/// describes the circular arc connecting its nearest ordinary
/// neighbors: the signed sagitta is the perpendicular distance from
/// the chord midpoint to the arc, positive when the arc bulges to the
/// left of the chord direction.
///
/// The external wire format encodes markers as `(sagitta, SENTINEL_Y)`
/// pairs; [`wire::decode`](crate::wire::decode) translates that
/// convention into this explicit union at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathVertex {
    /// An ordinary coordinate on the path.
    Point(Point),
    /// A circular arc between the neighboring ordinary points.
    ArcMarker {
        /// Signed arc height (left of the chord direction is positive).
        sagitta: f64,
    },
}

/// Spectral shaping model for the width field.
///
/// Selects the frequency-domain decay profile `H(k)`, which controls
/// the smoothness of the synthesized width variation. All models share
/// the same cutoff frequency `kc = 1 / correlation_length`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidthModel {
    /// `H = 1/sqrt(1 + (k/kc)^2)` — the roughest decay.
    Exponential,
    /// `H = exp(-(k/kc)^2)` — the smoothest decay.
    Gaussian,
    /// `H = 1/(1 + (k/kc)^2)` — roughness between exponential and gaussian.
    #[default]
    Matern32,
    /// `H = 1` below `kc`, `0` above — hard cutoff.
    BandLimited,
}

impl WidthModel {
    /// The canonical lowercase name, as used in the wire/config format.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Exponential => "exponential",
            Self::Gaussian => "gaussian",
            Self::Matern32 => "matern32",
            Self::BandLimited => "band_limited",
        }
    }
}

impl fmt::Display for WidthModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WidthModel {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exponential" => Ok(Self::Exponential),
            "gaussian" => Ok(Self::Gaussian),
            "matern32" => Ok(Self::Matern32),
            "band_limited" => Ok(Self::BandLimited),
            other => Err(TraceError::UnknownModel(other.to_owned())),
        }
    }
}

/// Configuration for one trace synthesis run.
///
/// Lengths (widths, correlation length, segment length) share the
/// layout's coordinate unit.
///
/// Serialized field names follow the external parameter record
/// (`mu_w`, `sigma_w`, `L_c`, ...), so configs exchanged with the
/// layout host deserialize directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Mean trace width.
    #[serde(rename = "mu_w")]
    pub mean_width: f64,

    /// Standard deviation of the width variation.
    #[serde(rename = "sigma_w")]
    pub width_std_dev: f64,

    /// Spatial correlation length of the width variation. Larger
    /// values produce slower width changes along the trace.
    #[serde(rename = "L_c")]
    pub correlation_length: f64,

    /// Spectral shaping model.
    pub model: WidthModel,

    /// Target segment length for arc tessellation. Smaller values
    /// produce smoother arcs (more points).
    #[serde(rename = "ds_arc")]
    pub arc_segment_length: f64,

    /// Number of uniform arc-length samples along the centerline.
    /// The output polygon has exactly twice this many vertices.
    /// Must be at least 2.
    #[serde(rename = "n_resample")]
    pub resample_count: usize,

    /// Seed for the width-field generator. Identical seeds (with
    /// identical inputs) reproduce identical output.
    pub seed: u64,

    /// Optional lower clamp on the width profile (process limit).
    #[serde(rename = "w_min")]
    pub width_min: Option<f64>,

    /// Optional upper clamp on the width profile (process limit).
    #[serde(rename = "w_max")]
    pub width_max: Option<f64>,
}

impl TraceConfig {
    /// Default mean trace width (0.1 mm in meters).
    pub const DEFAULT_MEAN_WIDTH: f64 = 1e-4;
    /// Default width standard deviation.
    pub const DEFAULT_WIDTH_STD_DEV: f64 = 2e-5;
    /// Default correlation length.
    pub const DEFAULT_CORRELATION_LENGTH: f64 = 2e-3;
    /// Default arc tessellation segment length.
    pub const DEFAULT_ARC_SEGMENT_LENGTH: f64 = 2e-4;
    /// Default centerline sample count.
    pub const DEFAULT_RESAMPLE_COUNT: usize = 1200;
    /// Default generator seed.
    pub const DEFAULT_SEED: u64 = 0;

    /// Check the configuration for values the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::InvalidConfig`] when `resample_count < 2`,
    /// when `arc_segment_length` is not a positive finite number, or
    /// when a clamp bound is non-finite or the bounds are inverted
    /// (`width_min > width_max`).
    pub fn validate(&self) -> Result<(), TraceError> {
        if self.resample_count < 2 {
            return Err(TraceError::InvalidConfig(format!(
                "resample_count must be at least 2, got {}",
                self.resample_count,
            )));
        }
        if !self.arc_segment_length.is_finite() || self.arc_segment_length <= 0.0 {
            return Err(TraceError::InvalidConfig(format!(
                "arc_segment_length must be positive and finite, got {}",
                self.arc_segment_length,
            )));
        }
        for (name, bound) in [("width_min", self.width_min), ("width_max", self.width_max)] {
            if let Some(value) = bound
                && !value.is_finite()
            {
                return Err(TraceError::InvalidConfig(format!(
                    "{name} must be finite, got {value}",
                )));
            }
        }
        if let (Some(lo), Some(hi)) = (self.width_min, self.width_max)
            && lo > hi
        {
            return Err(TraceError::InvalidConfig(format!(
                "width_min ({lo}) exceeds width_max ({hi})",
            )));
        }
        Ok(())
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            mean_width: Self::DEFAULT_MEAN_WIDTH,
            width_std_dev: Self::DEFAULT_WIDTH_STD_DEV,
            correlation_length: Self::DEFAULT_CORRELATION_LENGTH,
            model: WidthModel::default(),
            arc_segment_length: Self::DEFAULT_ARC_SEGMENT_LENGTH,
            resample_count: Self::DEFAULT_RESAMPLE_COUNT,
            seed: Self::DEFAULT_SEED,
            width_min: None,
            width_max: None,
        }
    }
}

/// Result of one trace synthesis run.
///
/// All four stages' outputs are preserved so callers can persist the
/// polygon, plot the width profile, or inspect the centerlines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceResult {
    /// Closed band polygon: the left boundary followed by the right
    /// boundary in reverse. Exactly `2 * resample_count` vertices.
    pub polygon: Polyline,

    /// Cumulative arc-length grid `s`, one value per centerline sample.
    pub arc_lengths: Vec<f64>,

    /// Width profile `w(s)`, same length as `arc_lengths`. Clamped
    /// into `[width_min, width_max]` when bounds were configured.
    pub widths: Vec<f64>,

    /// Uniformly resampled centerline, `resample_count` points.
    pub centerline: Polyline,

    /// Dense centerline with every arc marker expanded into segments.
    pub dense_centerline: Polyline,
}

/// Errors that can occur during trace synthesis.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// The path densified to nothing (e.g. only unresolvable arc markers).
    #[error("path contains no resolvable points")]
    EmptyPath,

    /// The configuration cannot be run as given.
    #[error("invalid trace configuration: {0}")]
    InvalidConfig(String),

    /// A width model name outside the recognized set.
    #[error("unknown width model \"{0}\" (expected exponential|gaussian|matern32|band_limited)")]
    UnknownModel(String),

    /// The inverse real FFT rejected its input.
    #[error("width field synthesis failed: {0}")]
    Fft(#[from] realfft::FftError),
}
