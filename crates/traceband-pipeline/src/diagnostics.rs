//! Pipeline diagnostics: timing, counts, and width statistics per stage.
//!
//! These diagnostics are permanent instrumentation intended for
//! parameter experimentation (correlation length, model, sample
//! counts) and for reporting achieved width statistics back to the
//! layout host. [`build_trace_diagnosed`] runs the same stages as
//! [`build_trace`](crate::build_trace) and collects metrics alongside
//! the result.
//!
//! The crate stays sans-IO: timestamps come from a caller-supplied
//! [`Clock`], so native callers can pass a monotonic clock while test
//! code can pass a deterministic one.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since [`std::time::Duration`] does not implement
//! serde traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{PathVertex, TraceConfig, TraceError, TraceResult, WidthModel};
use crate::{clamp_widths, densify, polygon, resample, width};

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque timestamp produced by [`Clock::now`].
    type Instant;

    /// The current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single trace synthesis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceDiagnostics {
    /// Stage 1: arc-marker expansion into the dense centerline.
    pub densify: StageDiagnostics,
    /// Stage 2: uniform arc-length resampling.
    pub resample: StageDiagnostics,
    /// Stage 3: spectral width-field synthesis.
    pub width_field: StageDiagnostics,
    /// Stage 4: width clamping (only when bounds are configured).
    pub clamp: Option<StageDiagnostics>,
    /// Stage 5: band polygon assembly.
    pub polygon: StageDiagnostics,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts and achieved width statistics.
    pub summary: TraceSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Densification metrics.
    Densify {
        /// Vertices in the raw path (points and markers).
        input_vertex_count: usize,
        /// Arc markers among them.
        arc_marker_count: usize,
        /// Points in the dense centerline.
        dense_point_count: usize,
    },
    /// Resampling metrics.
    Resample {
        /// Points in the dense centerline.
        dense_point_count: usize,
        /// Samples on the uniform grid.
        resampled_point_count: usize,
        /// Total centerline arc length.
        total_length: f64,
    },
    /// Width synthesis metrics.
    WidthField {
        /// Spectral model used.
        model: WidthModel,
        /// Correlation length used.
        correlation_length: f64,
        /// Statistics of the raw (pre-clamp) profile.
        stats: WidthStats,
    },
    /// Clamping metrics.
    Clamp {
        /// Configured lower bound.
        lower: Option<f64>,
        /// Configured upper bound.
        upper: Option<f64>,
        /// Samples that hit a bound.
        clamped_sample_count: usize,
    },
    /// Polygon assembly metrics.
    Polygon {
        /// Vertices in the closed band polygon.
        vertex_count: usize,
    },
}

/// High-level summary for the entire run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSummary {
    /// Vertices in the raw path.
    pub input_vertex_count: usize,
    /// Arc markers among them.
    pub arc_marker_count: usize,
    /// Points in the dense centerline.
    pub dense_point_count: usize,
    /// Samples on the uniform grid.
    pub resampled_point_count: usize,
    /// Vertices in the output polygon.
    pub polygon_vertex_count: usize,
    /// Total centerline arc length.
    pub total_length: f64,
    /// Statistics of the final (post-clamp) width profile.
    pub width: WidthStats,
}

/// Min/max/mean/std of a width profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidthStats {
    /// Smallest width.
    pub min: f64,
    /// Largest width.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl WidthStats {
    /// Compute statistics over a width profile. All zeros when empty.
    #[must_use]
    pub fn from_profile(widths: &[f64]) -> Self {
        if widths.is_empty() {
            return Self {
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                std_dev: 0.0,
            };
        }
        #[allow(clippy::cast_precision_loss)]
        let len = widths.len() as f64;
        let min = widths.iter().fold(f64::INFINITY, |acc, w| acc.min(*w));
        let max = widths.iter().fold(f64::NEG_INFINITY, |acc, w| acc.max(*w));
        let mean = widths.iter().sum::<f64>() / len;
        let variance = widths.iter().map(|w| (w - mean) * (w - mean)).sum::<f64>() / len;
        Self {
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
        }
    }
}

/// Run the full pipeline, collecting per-stage diagnostics.
///
/// Produces the same [`TraceResult`] as [`build_trace`](crate::build_trace)
/// for identical inputs; the clock only affects reported durations.
///
/// # Errors
///
/// Exactly the errors of [`build_trace`](crate::build_trace).
pub fn build_trace_diagnosed<C: Clock>(
    path: &[PathVertex],
    config: &TraceConfig,
    clock: &C,
) -> Result<(TraceResult, TraceDiagnostics), TraceError> {
    config.validate()?;
    let run_start = clock.now();

    let arc_marker_count = path
        .iter()
        .filter(|v| matches!(v, PathVertex::ArcMarker { .. }))
        .count();

    // 1. Densify.
    let start = clock.now();
    let dense = densify::densify(path, config.arc_segment_length);
    let densify_diag = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Densify {
            input_vertex_count: path.len(),
            arc_marker_count,
            dense_point_count: dense.len(),
        },
    };
    if dense.is_empty() {
        return Err(TraceError::EmptyPath);
    }

    // 2. Resample.
    let start = clock.now();
    let (centerline, arc_lengths) = resample::resample(&dense, config.resample_count)?;
    let total_length = arc_lengths.last().copied().unwrap_or(0.0);
    let resample_diag = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Resample {
            dense_point_count: dense.len(),
            resampled_point_count: centerline.len(),
            total_length,
        },
    };

    // 3. Width field.
    let start = clock.now();
    let mut widths = width::synthesize(
        &arc_lengths,
        config.mean_width,
        config.width_std_dev,
        config.correlation_length,
        config.model,
        config.seed,
    )?;
    let width_diag = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::WidthField {
            model: config.model,
            correlation_length: config.correlation_length,
            stats: WidthStats::from_profile(&widths),
        },
    };

    // 4. Optional clamp.
    let clamp_diag = if config.width_min.is_some() || config.width_max.is_some() {
        let start = clock.now();
        let clamped_sample_count = clamp_widths(&mut widths, config.width_min, config.width_max);
        Some(StageDiagnostics {
            duration: clock.elapsed(&start),
            metrics: StageMetrics::Clamp {
                lower: config.width_min,
                upper: config.width_max,
                clamped_sample_count,
            },
        })
    } else {
        None
    };

    // 5. Polygon.
    let start = clock.now();
    let band = polygon::build(&centerline, &widths);
    let polygon_diag = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Polygon {
            vertex_count: band.len(),
        },
    };

    let summary = TraceSummary {
        input_vertex_count: path.len(),
        arc_marker_count,
        dense_point_count: dense.len(),
        resampled_point_count: centerline.len(),
        polygon_vertex_count: band.len(),
        total_length,
        width: WidthStats::from_profile(&widths),
    };
    let diagnostics = TraceDiagnostics {
        densify: densify_diag,
        resample: resample_diag,
        width_field: width_diag,
        clamp: clamp_diag,
        polygon: polygon_diag,
        total_duration: clock.elapsed(&run_start),
        summary,
    };
    let result = TraceResult {
        polygon: band,
        arc_lengths,
        widths,
        centerline,
        dense_centerline: dense,
    };
    Ok((result, diagnostics))
}

impl TraceDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Trace Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Path: {} vertices ({} arc markers), length {:.6}",
            self.summary.input_vertex_count,
            self.summary.arc_marker_count,
            self.summary.total_length,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(78));

        let total_ms = duration_ms(self.total_duration);
        let stages: Vec<(&str, &StageDiagnostics)> = {
            let mut s = vec![
                ("Densify", &self.densify),
                ("Resample", &self.resample),
                ("Width Field", &self.width_field),
            ];
            if let Some(ref clamp) = self.clamp {
                s.push(("Clamp", clamp));
            }
            s.push(("Polygon", &self.polygon));
            s
        };

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        let w = &self.summary.width;
        lines.push(format!(
            "Width: min {:.6}  max {:.6}  mean {:.6}  std {:.6}",
            w.min, w.max, w.mean, w.std_dev,
        ));
        lines.push(format!(
            "Polygon vertices: {}",
            self.summary.polygon_vertex_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Densify {
            input_vertex_count,
            arc_marker_count,
            dense_point_count,
        } => {
            format!(
                "{input_vertex_count} vertices ({arc_marker_count} arcs) -> {dense_point_count} pts",
            )
        }
        StageMetrics::Resample {
            dense_point_count,
            resampled_point_count,
            total_length,
        } => {
            format!(
                "{dense_point_count} -> {resampled_point_count} pts, length {total_length:.6}",
            )
        }
        StageMetrics::WidthField {
            model,
            correlation_length,
            stats,
        } => {
            format!(
                "{model} Lc={correlation_length:.6} mean={:.6} std={:.6}",
                stats.mean, stats.std_dev,
            )
        }
        StageMetrics::Clamp {
            lower,
            upper,
            clamped_sample_count,
        } => {
            let lo = lower.map_or_else(|| "-".to_owned(), |v| format!("{v:.6}"));
            let hi = upper.map_or_else(|| "-".to_owned(), |v| format!("{v:.6}"));
            format!("[{lo}, {hi}] clamped {clamped_sample_count} samples")
        }
        StageMetrics::Polygon { vertex_count } => format!("{vertex_count} vertices"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::types::Point;

    /// Clock backed by [`std::time::Instant`], for tests.
    struct TestClock;

    impl Clock for TestClock {
        type Instant = Instant;

        fn now(&self) -> Instant {
            Instant::now()
        }

        fn elapsed(&self, since: &Instant) -> Duration {
            since.elapsed()
        }
    }

    fn straight_path() -> Vec<PathVertex> {
        vec![
            PathVertex::Point(Point::new(0.0, 0.0)),
            PathVertex::ArcMarker { sagitta: 0.2 },
            PathVertex::Point(Point::new(1.0, 0.0)),
        ]
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let d = Duration::from_millis(1234);
        assert!((duration_ms(d) - 1234.0).abs() < 0.01);
    }

    #[test]
    fn width_stats_of_profile() {
        let stats = WidthStats::from_profile(&[1.0, 2.0, 3.0, 4.0]);
        assert!((stats.min - 1.0).abs() < f64::EPSILON);
        assert!((stats.max - 4.0).abs() < f64::EPSILON);
        assert!((stats.mean - 2.5).abs() < f64::EPSILON);
        assert!((stats.std_dev - 1.25f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn width_stats_of_empty_profile() {
        let stats = WidthStats::from_profile(&[]);
        assert!((stats.mean - 0.0).abs() < f64::EPSILON);
        assert!((stats.std_dev - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn diagnosed_run_matches_plain_run() {
        let path = straight_path();
        let config = TraceConfig {
            resample_count: 64,
            ..TraceConfig::default()
        };
        let plain = crate::build_trace(&path, &config).unwrap();
        let (diagnosed, _) = build_trace_diagnosed(&path, &config, &TestClock).unwrap();
        assert_eq!(plain, diagnosed);
    }

    #[test]
    fn summary_counts_are_consistent() {
        let path = straight_path();
        let config = TraceConfig {
            resample_count: 32,
            ..TraceConfig::default()
        };
        let (result, diagnostics) = build_trace_diagnosed(&path, &config, &TestClock).unwrap();
        let summary = &diagnostics.summary;
        assert_eq!(summary.input_vertex_count, 3);
        assert_eq!(summary.arc_marker_count, 1);
        assert_eq!(summary.dense_point_count, result.dense_centerline.len());
        assert_eq!(summary.resampled_point_count, 32);
        assert_eq!(summary.polygon_vertex_count, 64);
        assert!(summary.total_length > 1.0);
    }

    #[test]
    fn clamp_stage_present_only_with_bounds() {
        let path = straight_path();
        let config = TraceConfig {
            resample_count: 16,
            ..TraceConfig::default()
        };
        let (_, without) = build_trace_diagnosed(&path, &config, &TestClock).unwrap();
        assert!(without.clamp.is_none());

        let config = TraceConfig {
            width_min: Some(9e-5),
            width_max: Some(1.1e-4),
            ..config
        };
        let (result, with) = build_trace_diagnosed(&path, &config, &TestClock).unwrap();
        let clamp = with.clamp.unwrap();
        assert!(matches!(
            clamp.metrics,
            StageMetrics::Clamp {
                lower: Some(_),
                upper: Some(_),
                ..
            },
        ));
        for w in &result.widths {
            assert!((9e-5..=1.1e-4).contains(w));
        }
    }

    #[test]
    fn report_names_every_stage() {
        let path = straight_path();
        let config = TraceConfig {
            resample_count: 16,
            width_min: Some(5e-5),
            ..TraceConfig::default()
        };
        let (_, diagnostics) = build_trace_diagnosed(&path, &config, &TestClock).unwrap();
        let report = diagnostics.report();
        for stage in ["Densify", "Resample", "Width Field", "Clamp", "Polygon"] {
            assert!(report.contains(stage), "missing {stage} in report");
        }
    }

    #[test]
    fn diagnostics_serde_round_trip() {
        let path = straight_path();
        let config = TraceConfig {
            resample_count: 16,
            ..TraceConfig::default()
        };
        let (_, diagnostics) = build_trace_diagnosed(&path, &config, &TestClock).unwrap();
        let json = serde_json::to_string(&diagnostics).unwrap();
        let deserialized: TraceDiagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(
            deserialized.summary.polygon_vertex_count,
            diagnostics.summary.polygon_vertex_count,
        );
        assert_eq!(deserialized.summary.width, diagnostics.summary.width);
    }
}
