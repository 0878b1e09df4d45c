//! traceband-pipeline: Pure stochastic trace-width synthesis (sans-IO).
//!
//! Turns a sparse, arc-annotated 2D path into a closed band polygon
//! whose width varies stochastically along its length:
//! arc expansion -> densification -> arc-length resampling ->
//! spectral width synthesis -> optional clamping -> normal offsetting.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! paths and returns structured data. Reading paths from a layout
//! store and writing polygons back belong to the caller; the wire
//! format they use is handled by [`wire`].
//!
//! Every run is deterministic: the width field's random generator is
//! constructed from the configured seed inside the call and never
//! shared, so identical `(path, config)` inputs reproduce identical
//! output and independent invocations can run on worker threads
//! freely.

pub mod arc;
pub mod densify;
pub mod diagnostics;
pub mod polygon;
pub mod resample;
pub mod types;
pub mod width;
pub mod wire;

pub use diagnostics::{Clock, TraceDiagnostics, WidthStats, build_trace_diagnosed};
pub use types::{PathVertex, Point, Polyline, TraceConfig, TraceError, TraceResult, WidthModel};
pub use wire::SENTINEL_Y;

/// Run the full trace synthesis pipeline.
///
/// # Pipeline steps
///
/// 1. Validate the configuration (fail fast on inverted clamp bounds
///    and unusable sample counts)
/// 2. Densify the path, expanding every arc marker into segments
/// 3. Resample the dense centerline onto a uniform arc-length grid
/// 4. Synthesize the seeded width field on that grid
/// 5. Clamp the width profile into `[width_min, width_max]` when
///    bounds are configured
/// 6. Offset the centerline by the local half-width into the closed
///    band polygon
///
/// # Errors
///
/// Returns [`TraceError::InvalidConfig`] for configurations rejected
/// by [`TraceConfig::validate`], [`TraceError::EmptyPath`] if the path
/// densifies to nothing (e.g. it holds only unresolvable arc markers),
/// and [`TraceError::Fft`] if the spectral transform rejects its
/// buffers.
pub fn build_trace(path: &[PathVertex], config: &TraceConfig) -> Result<TraceResult, TraceError> {
    // 1. Fail fast on unusable configurations.
    config.validate()?;

    // 2. Arc markers -> dense centerline.
    let dense = densify::densify(path, config.arc_segment_length);
    if dense.is_empty() {
        return Err(TraceError::EmptyPath);
    }

    // 3. Uniform arc-length grid.
    let (centerline, arc_lengths) = resample::resample(&dense, config.resample_count)?;

    // 4. Seeded width field over the grid.
    let mut widths = width::synthesize(
        &arc_lengths,
        config.mean_width,
        config.width_std_dev,
        config.correlation_length,
        config.model,
        config.seed,
    )?;

    // 5. Optional process-limit clamp.
    if config.width_min.is_some() || config.width_max.is_some() {
        clamp_widths(&mut widths, config.width_min, config.width_max);
    }

    // 6. Band polygon.
    let band = polygon::build(&centerline, &widths);

    Ok(TraceResult {
        polygon: band,
        arc_lengths,
        widths,
        centerline,
        dense_centerline: dense,
    })
}

/// Clamp a width profile elementwise, returning how many samples hit
/// a bound. Missing bounds leave that side open.
pub(crate) fn clamp_widths(widths: &mut [f64], lower: Option<f64>, upper: Option<f64>) -> usize {
    let lo = lower.unwrap_or(f64::NEG_INFINITY);
    let hi = upper.unwrap_or(f64::INFINITY);
    let mut clamped = 0;
    for w in widths.iter_mut() {
        if *w < lo {
            *w = lo;
            clamped += 1;
        } else if *w > hi {
            *w = hi;
            clamped += 1;
        }
    }
    clamped
}
