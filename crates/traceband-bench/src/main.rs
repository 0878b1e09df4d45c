//! traceband-bench: CLI tool for trace synthesis parameter experimentation
//! and diagnostics.
//!
//! Runs the trace-width pipeline on a given path file with configurable
//! parameters, printing detailed per-stage diagnostics. Useful for:
//!
//! - Comparing spectral models (`exponential` vs `gaussian` vs
//!   `matern32` vs `band_limited`)
//! - Tuning correlation length, width sigma, and sample counts
//! - Measuring per-stage durations to identify bottlenecks
//! - Checking achieved width statistics against process limits
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin traceband-bench -- [OPTIONS] <PATH_FILE>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use traceband_pipeline::diagnostics::{Clock, TraceDiagnostics, build_trace_diagnosed};
use traceband_pipeline::{TraceConfig, WidthModel, wire};

/// Trace synthesis parameter experimentation and diagnostics.
///
/// Runs the trace-width pipeline on a given path with configurable
/// parameters and prints detailed per-stage timing and count
/// diagnostics.
#[derive(Parser)]
#[command(name = "traceband-bench", version)]
struct Cli {
    /// Path to the input path file: JSON `[[x, y], ...]` pairs, with
    /// arc markers encoded as `[sagitta, 1.7976931348623157e308]`.
    path_file: PathBuf,

    /// Mean trace width.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_MEAN_WIDTH)]
    mean_width: f64,

    /// Standard deviation of the width variation.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_WIDTH_STD_DEV)]
    width_std_dev: f64,

    /// Spatial correlation length of the width variation.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_CORRELATION_LENGTH)]
    correlation_length: f64,

    /// Spectral shaping model.
    #[arg(long, value_enum, default_value_t = Model::Matern32)]
    model: Model,

    /// Target arc tessellation segment length.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_ARC_SEGMENT_LENGTH)]
    arc_segment_length: f64,

    /// Centerline sample count.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_RESAMPLE_COUNT, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(2..))]
    resample_count: usize,

    /// Width-field generator seed; run `i` of `--runs` uses `seed + i`.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_SEED)]
    seed: u64,

    /// Lower width clamp (process limit).
    #[arg(long)]
    width_min: Option<f64>,

    /// Upper width clamp (process limit).
    #[arg(long)]
    width_max: Option<f64>,

    /// Number of runs, each with the seed offset by one.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Write the first run's full result (polygon, width profile,
    /// centerlines) as JSON to this file.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Full trace config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored
    /// (the per-run seed offset still applies). The JSON must be a
    /// valid `TraceConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Spectral shaping model selection.
#[derive(Clone, Copy, ValueEnum)]
enum Model {
    /// `1/sqrt(1 + (k/kc)^2)` — the roughest decay.
    Exponential,
    /// `exp(-(k/kc)^2)` — the smoothest decay.
    Gaussian,
    /// `1/(1 + (k/kc)^2)` — intermediate roughness.
    Matern32,
    /// Hard cutoff at the correlation frequency.
    BandLimited,
}

/// Maps the local CLI [`Model`] enum to [`WidthModel`].
const fn model_to_pipeline(m: Model) -> WidthModel {
    match m {
        Model::Exponential => WidthModel::Exponential,
        Model::Gaussian => WidthModel::Gaussian,
        Model::Matern32 => WidthModel::Matern32,
        Model::BandLimited => WidthModel::BandLimited,
    }
}

/// Build a [`TraceConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.  Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<TraceConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(TraceConfig {
        mean_width: cli.mean_width,
        width_std_dev: cli.width_std_dev,
        correlation_length: cli.correlation_length,
        model: model_to_pipeline(cli.model),
        arc_segment_length: cli.arc_segment_length,
        resample_count: cli.resample_count,
        seed: cli.seed,
        width_min: cli.width_min,
        width_max: cli.width_max,
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let base_config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let path_bytes = match std::fs::read(&cli.path_file) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.path_file.display());
            return ExitCode::FAILURE;
        }
    };
    let pairs: Vec<(f64, f64)> = match serde_json::from_slice(&path_bytes) {
        Ok(pairs) => pairs,
        Err(e) => {
            eprintln!("Error parsing {}: {e}", cli.path_file.display());
            return ExitCode::FAILURE;
        }
    };
    let path = wire::decode(&pairs);

    eprintln!("Path: {} ({} vertices)", cli.path_file.display(), path.len());
    eprintln!("Config: {base_config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for (run, seed) in (base_config.seed..).take(cli.runs).enumerate() {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} (seed {seed}) ---", run + 1, cli.runs);
        }
        let config = TraceConfig {
            seed,
            ..base_config.clone()
        };

        match build_trace_diagnosed(&path, &config, &StdClock) {
            Ok((result, diagnostics)) => {
                if cli.json {
                    match serde_json::to_string_pretty(&diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                }

                // Write the result on the first run only.
                if run == 0
                    && let Some(ref output_path) = cli.output
                {
                    let json = match serde_json::to_string_pretty(&result) {
                        Ok(json) => json,
                        Err(e) => {
                            eprintln!("Error serializing result: {e}");
                            return ExitCode::FAILURE;
                        }
                    };
                    match std::fs::write(output_path, &json) {
                        Ok(()) => {
                            eprintln!(
                                "Result written to {} ({} bytes)",
                                output_path.display(),
                                json.len(),
                            );
                        }
                        Err(e) => {
                            eprintln!("Error writing {}: {e}", output_path.display());
                        }
                    }
                }

                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    // Print summary when multiple runs.
    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all: &[TraceDiagnostics]) {
    let len = all.len() as f64;
    let mean_ms = all
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .sum::<f64>()
        / len;

    let width_mean_lo = all
        .iter()
        .map(|d| d.summary.width.mean)
        .fold(f64::INFINITY, f64::min);
    let width_mean_hi = all
        .iter()
        .map(|d| d.summary.width.mean)
        .fold(f64::NEG_INFINITY, f64::max);
    let width_std_lo = all
        .iter()
        .map(|d| d.summary.width.std_dev)
        .fold(f64::INFINITY, f64::min);
    let width_std_hi = all
        .iter()
        .map(|d| d.summary.width.std_dev)
        .fold(f64::NEG_INFINITY, f64::max);

    println!("=== Summary over {} runs ===", all.len());
    println!("Mean duration: {mean_ms:.3}ms");
    println!("Width mean across seeds: [{width_mean_lo:.6}, {width_mean_hi:.6}]");
    println!("Width std  across seeds: [{width_std_lo:.6}, {width_std_hi:.6}]");
}
