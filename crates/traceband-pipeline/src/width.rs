//! Spectral width-field synthesis: seeded colored noise over arc length.
//!
//! Draws white Gaussian noise in the frequency domain, scales it by a
//! smoothness-selecting shape function `H(k)`, and inverse-transforms
//! back to a real sequence. The result is renormalized to the exact
//! requested mean and standard deviation, so the shape function only
//! controls how the variation is distributed along the trace, not its
//! amplitude. The real FFT keeps synthesis at `O(n log n)`.
//!
//! This is step 4 of the pipeline, run on the uniform arc-length grid
//! produced by [`resample`](crate::resample::resample).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use realfft::num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner};

use crate::types::{TraceError, WidthModel};

/// Floor applied to the correlation length before inversion.
const CORRELATION_FLOOR: f64 = 1e-30;

/// Floor applied to the sample standard deviation before division.
const STD_FLOOR: f64 = 1e-30;

/// Synthesize a width profile over the uniform grid `s`.
///
/// The generator is constructed from `seed` inside this call and
/// never shared, so identical inputs reproduce identical output and
/// concurrent invocations cannot perturb each other.
///
/// Fewer than two samples, or a degenerate grid with zero spacing
/// (a zero-length path), yield a constant `mean` profile.
///
/// # Errors
///
/// Returns [`TraceError::Fft`] if the inverse transform rejects its
/// input buffers.
pub fn synthesize(
    s: &[f64],
    mean: f64,
    std_dev: f64,
    correlation_length: f64,
    model: WidthModel,
    seed: u64,
) -> Result<Vec<f64>, TraceError> {
    let n = s.len();
    if n < 2 {
        return Ok(vec![mean; n]);
    }
    let ds = s[1] - s[0];
    if ds <= 0.0 {
        return Ok(vec![mean; n]);
    }

    let bins = n / 2 + 1;
    let cutoff = 1.0 / correlation_length.max(CORRELATION_FLOOR);

    let mut rng = StdRng::seed_from_u64(seed);
    let re: Vec<f64> = (0..bins).map(|_| rng.sample(StandardNormal)).collect();
    let im: Vec<f64> = (0..bins).map(|_| rng.sample(StandardNormal)).collect();

    #[allow(clippy::cast_precision_loss)]
    let mut spectrum: Vec<Complex<f64>> = (0..bins)
        .map(|i| {
            // Non-negative frequency axis in cycles per unit length.
            let k = i as f64 / (n as f64 * ds);
            let h = shape(model, k, cutoff);
            Complex::new(re[i] * h, im[i] * h)
        })
        .collect();

    // The complex-to-real transform ignores the imaginary parts of the
    // DC bin and (for even n) the Nyquist bin; realfft rejects inputs
    // where they are nonzero, so zero them explicitly.
    spectrum[0].im = 0.0;
    if n % 2 == 0 {
        spectrum[bins - 1].im = 0.0;
    }

    let mut planner = RealFftPlanner::<f64>::new();
    let inverse = planner.plan_fft_inverse(n);
    let mut signal = inverse.make_output_vec();
    inverse.process(&mut spectrum, &mut signal)?;

    // Renormalize to the exact target mean and standard deviation.
    // The floor keeps a spectrally-collapsed field (e.g. band_limited
    // with a huge correlation length passes only the DC bin) finite.
    #[allow(clippy::cast_precision_loss)]
    let len = signal.len() as f64;
    let sample_mean = signal.iter().sum::<f64>() / len;
    let variance = signal
        .iter()
        .map(|x| (x - sample_mean) * (x - sample_mean))
        .sum::<f64>()
        / len;
    let scale = std_dev / (variance.sqrt() + STD_FLOOR);

    Ok(signal
        .iter()
        .map(|x| (x - sample_mean).mul_add(scale, mean))
        .collect())
}

/// Amplitude shaping function `H(k)` for the given model.
fn shape(model: WidthModel, k: f64, cutoff: f64) -> f64 {
    let ratio = k / cutoff;
    match model {
        WidthModel::BandLimited => {
            if k.abs() <= cutoff {
                1.0
            } else {
                0.0
            }
        }
        WidthModel::Gaussian => (-(ratio * ratio)).exp(),
        WidthModel::Exponential => 1.0 / ratio.mul_add(ratio, 1.0).sqrt(),
        WidthModel::Matern32 => 1.0 / ratio.mul_add(ratio, 1.0),
    }
}
