//! FIR filter design using the windowing method
//!
//! Frequencies are normalized to the Nyquist frequency (units of π rad/sample),
//! so a cutoff of 1 Hz at a 50 Hz sample rate is 1 / 25 = 0.04.

use super::params::{FilterBand, FilterParams};
use super::windows::{generate_window, WindowType};
use crate::error::Result;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Design the FIR kernel described by `params` at `sample_rate`
pub fn design_fir(params: &FilterParams, sample_rate: f64) -> Result<Vec<f64>> {
    params.validate(sample_rate)?;

    let nyquist = sample_rate / 2.0;
    let length = params.fir_length(sample_rate);

    let h = match params.band {
        FilterBand::LowPass { cutoff_hz } => {
            design_lowpass_fir(cutoff_hz / nyquist, length, params.window)
        }
        FilterBand::HighPass { cutoff_hz } => {
            design_highpass_fir(cutoff_hz / nyquist, length, params.window)
        }
        FilterBand::BandPass { low_hz, high_hz } => {
            design_bandpass_fir(low_hz / nyquist, high_hz / nyquist, length, params.window)
        }
    };

    log::debug!(
        "Designed {:?} FIR: {} taps, {:?} window",
        params.band,
        h.len(),
        params.window
    );

    Ok(h)
}

/// Ideal lowpass impulse response sin(wc·n)/(π·n), centered on the kernel
fn ideal_lowpass(wc_rad: f64, n_shifted: f64) -> f64 {
    if n_shifted.abs() < 1e-10 {
        // Limit as n -> 0
        wc_rad / PI
    } else {
        (wc_rad * n_shifted).sin() / (PI * n_shifted)
    }
}

/// Design a bandpass FIR filter
///
/// # Algorithm
/// 1. Design unit-DC-gain lowpass kernels at both band edges
/// 2. Subtract them: the upper edge keeps, the lower edge removes
///
/// # Arguments
/// * `wc1`, `wc2` - Band edges (normalized, units of π)
/// * `length` - Number of taps (odd)
/// * `window_type` - Window applied to the ideal response
pub fn design_bandpass_fir(wc1: f64, wc2: f64, length: usize, window_type: WindowType) -> Vec<f64> {
    let upper = design_lowpass_fir(wc2, length, window_type);
    let lower = design_lowpass_fir(wc1, length, window_type);

    upper.iter().zip(lower.iter()).map(|(u, l)| u - l).collect()
}

/// Design a lowpass FIR filter with unit DC gain
pub fn design_lowpass_fir(cutoff: f64, length: usize, window_type: WindowType) -> Vec<f64> {
    let window = generate_window(window_type, length);
    let center = (length - 1) as f64 / 2.0;

    let mut h: Vec<f64> = (0..length)
        .map(|n| ideal_lowpass(cutoff * PI, n as f64 - center) * window[n])
        .collect();

    // Truncation leaves the DC gain slightly off 1.0
    let dc_gain: f64 = h.iter().sum();
    if dc_gain.abs() > 1e-12 {
        for coeff in h.iter_mut() {
            *coeff /= dc_gain;
        }
    }

    h
}

/// Design a highpass FIR filter by spectral inversion of the lowpass
pub fn design_highpass_fir(cutoff: f64, length: usize, window_type: WindowType) -> Vec<f64> {
    let mut h = design_lowpass_fir(cutoff, length, window_type);
    let center = (length - 1) / 2;

    // Highpass = impulse - lowpass
    for coeff in h.iter_mut() {
        *coeff = -*coeff;
    }
    h[center] += 1.0;

    h
}

/// Calculate frequency response at given frequencies
///
/// # Arguments
/// * `h` - Filter coefficients
/// * `frequencies` - Normalized frequencies (units of π rad/sample)
///
/// # Returns
/// Complex frequency response H(e^jω)
pub fn frequency_response(h: &[f64], frequencies: &[f64]) -> Vec<Complex64> {
    frequencies
        .iter()
        .map(|&omega| {
            let omega_rad = omega * PI;
            h.iter()
                .enumerate()
                .map(|(n, &h_n)| {
                    let phase = -(omega_rad * n as f64);
                    h_n * Complex64::new(phase.cos(), phase.sin())
                })
                .sum()
        })
        .collect()
}

/// Calculate magnitude response in dB
pub fn magnitude_response_db(h: &[f64], frequencies: &[f64]) -> Vec<f64> {
    frequency_response(h, frequencies)
        .iter()
        .map(|c| 20.0 * c.norm().max(1e-12).log10())
        .collect()
}
