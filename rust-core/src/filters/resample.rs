//! Sample-rate changes: trimmed-mean decimation and Fourier resampling

use super::iir::filter_butterworth;
use super::params::FilterParams;
use crate::error::{Result, SignalError};
use crate::waveform::Waveform;
use rustfft::{num_complex::Complex, FftPlanner};

/// Order of the anti-alias lowpass applied before decimation
const ANTI_ALIAS_ORDER: usize = 3;

/// Margin below the new Nyquist frequency for the anti-alias cutoff (Hz)
const ANTI_ALIAS_MARGIN_HZ: f64 = 0.01;

/// Reduce the sample rate by an integer `factor`
///
/// Each full chunk of `factor` samples becomes the mean of its values once the
/// `factor / 3` smallest and largest have been discarded. A trailing partial
/// chunk is dropped.
///
/// # Arguments
/// * `waveform` - Input waveform
/// * `factor` - Chunk size, i.e. the downsample factor
/// * `anti_alias` - Lowpass just below the new Nyquist frequency first
pub fn downsample(waveform: &Waveform, factor: usize, anti_alias: bool) -> Result<Waveform> {
    if factor == 0 {
        return Err(SignalError::invalid("factor", "must be at least 1"));
    }
    if waveform.len() < factor {
        return Err(SignalError::InsufficientData {
            required: factor,
            actual: waveform.len(),
        });
    }
    if factor == 1 {
        return Ok(waveform.clone());
    }

    let new_rate = waveform.sample_rate() / factor as f64;

    let source = if anti_alias {
        let cutoff = new_rate / 2.0 - ANTI_ALIAS_MARGIN_HZ;
        let params = FilterParams::low_pass(cutoff)
            .butterworth()
            .with_order(ANTI_ALIAS_ORDER);
        filter_butterworth(waveform, &params)?
    } else {
        waveform.clone()
    };

    let trim = factor / 3;
    let mut sorted = Vec::with_capacity(factor);

    let reduced: Vec<f64> = source
        .samples()
        .chunks_exact(factor)
        .map(|chunk| {
            sorted.clear();
            sorted.extend_from_slice(chunk);
            sorted.sort_by(f64::total_cmp);
            let kept = &sorted[trim..factor - trim];
            kept.iter().sum::<f64>() / kept.len() as f64
        })
        .collect();

    log::debug!(
        "Downsampled {} -> {} samples ({} Hz -> {} Hz)",
        waveform.len(),
        reduced.len(),
        waveform.sample_rate(),
        new_rate
    );

    Ok(waveform.derive_at_rate(reduced, new_rate))
}

/// Resample to `num_samples` using the Fourier method
///
/// The spectrum is truncated or zero-padded; for even lengths the Nyquist
/// bin is merged (downsampling) or split in half (upsampling). The sample
/// rate scales by `num_samples / len`.
pub fn resample(waveform: &Waveform, num_samples: usize) -> Result<Waveform> {
    let nx = waveform.len();
    if num_samples == 0 {
        return Err(SignalError::invalid("num_samples", "must be at least 1"));
    }
    if nx == 0 {
        return Err(SignalError::InsufficientData { required: 1, actual: 0 });
    }

    let mut planner = FftPlanner::<f64>::new();

    let mut x: Vec<Complex<f64>> = waveform
        .samples()
        .iter()
        .map(|&s| Complex::new(s, 0.0))
        .collect();
    planner.plan_fft_forward(nx).process(&mut x);

    let n = num_samples.min(nx);
    let nyq = n / 2 + 1;
    let mut y = vec![Complex::new(0.0, 0.0); num_samples];

    // Non-negative frequencies
    y[..nyq].copy_from_slice(&x[..nyq]);
    // Negative frequencies
    if n > 2 {
        let neg = n - nyq;
        y[num_samples - neg..].copy_from_slice(&x[nx - neg..]);
    }

    if n % 2 == 0 {
        let half = n / 2;
        if num_samples < nx {
            // Fold the -N/2 component onto +N/2
            y[half] += x[nx - half];
        } else if num_samples > nx {
            y[half] *= 0.5;
            y[num_samples - half] = y[half];
        }
    }

    planner.plan_fft_inverse(num_samples).process(&mut y);

    let scale = 1.0 / nx as f64;
    let samples = y.iter().map(|c| c.re * scale).collect();
    let new_rate = waveform.sample_rate() * num_samples as f64 / nx as f64;

    Ok(waveform.derive_at_rate(samples, new_rate))
}
