//! Amplitude spectrum of a waveform
//!
//! Combines the FFT engine with windowing and amplitude correction, so that
//! a unit-amplitude sine shows up as a bin of magnitude ≈ 1.0.

use super::fft::FftEngine;
use super::windowing::{apply_window, window_correction_factor};
use crate::error::{Result, SignalError};
use crate::filters::windows::WindowType;
use crate::waveform::Waveform;
use serde::{Deserialize, Serialize};

/// Spectrum configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    /// Window applied before the FFT
    pub window: WindowType,

    /// FFT size is the next power of two ≥ len × zero_pad_factor
    pub zero_pad_factor: usize,

    /// Subtract the mean before windowing
    pub remove_mean: bool,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            window: WindowType::Hann,
            zero_pad_factor: 1,
            remove_mean: true,
        }
    }
}

/// One frequency bin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumBin {
    pub frequency_hz: f64,
    pub magnitude: f64,
}

/// Single-sided amplitude spectrum from 0 Hz to Nyquist
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    bins: Vec<SpectrumBin>,
    resolution_hz: f64,
}

impl Spectrum {
    pub fn bins(&self) -> &[SpectrumBin] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Spacing between neighbouring bins in Hz
    pub fn resolution_hz(&self) -> f64 {
        self.resolution_hz
    }

    pub fn magnitudes(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.magnitude).collect()
    }

    /// Min-max normalize magnitudes to [0, 1]
    ///
    /// A flat spectrum normalizes to all zeros.
    pub fn normalized(&self) -> Spectrum {
        let (min, max) = self
            .bins
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), b| {
                (lo.min(b.magnitude), hi.max(b.magnitude))
            });
        let range = max - min;

        let bins = self
            .bins
            .iter()
            .map(|b| SpectrumBin {
                frequency_hz: b.frequency_hz,
                magnitude: if range > 0.0 { (b.magnitude - min) / range } else { 0.0 },
            })
            .collect();

        Spectrum {
            bins,
            resolution_hz: self.resolution_hz,
        }
    }

    /// Index of the strongest bin with low_hz ≤ f ≤ high_hz
    ///
    /// # Returns
    /// `None` if no bin falls inside the band
    pub fn peak_in_band(&self, low_hz: f64, high_hz: f64) -> Option<usize> {
        self.bins
            .iter()
            .enumerate()
            .filter(|(_, b)| b.frequency_hz >= low_hz && b.frequency_hz <= high_hz)
            .max_by(|(_, a), (_, b)| a.magnitude.total_cmp(&b.magnitude))
            .map(|(idx, _)| idx)
    }
}

/// Largest padded FFT the analysis will allocate
pub const MAX_FFT_SIZE: usize = 1 << 24;

/// Compute the amplitude spectrum of `waveform`
pub fn compute_spectrum(waveform: &Waveform, config: &SpectrumConfig) -> Result<Spectrum> {
    if waveform.len() < 2 {
        return Err(SignalError::InsufficientData {
            required: 2,
            actual: waveform.len(),
        });
    }
    if config.zero_pad_factor == 0 {
        return Err(SignalError::invalid("zero_pad_factor", "must be at least 1"));
    }

    let n = waveform.len();
    let fft_size = n
        .checked_mul(config.zero_pad_factor)
        .and_then(usize::checked_next_power_of_two)
        .filter(|&size| size <= MAX_FFT_SIZE)
        .ok_or_else(|| {
            SignalError::invalid(
                "zero_pad_factor",
                format!(
                    "{} samples padded {}x exceed the FFT size limit of {}",
                    n, config.zero_pad_factor, MAX_FFT_SIZE
                ),
            )
        })?;
    let mut engine = FftEngine::new(fft_size)?;

    let mean = if config.remove_mean { waveform.mean() } else { 0.0 };
    let centered: Vec<f64> = waveform.samples().iter().map(|&x| x - mean).collect();
    let windowed = apply_window(&centered, config.window);

    // |X| · (n / Σw) · 2 / n, halved again for the unpaired DC and Nyquist bins
    let scale = window_correction_factor(config.window, n) * 2.0 / n as f64;
    let magnitudes = engine.compute_magnitude(&windowed)?;
    let last = magnitudes.len() - 1;

    let sample_rate = waveform.sample_rate();
    let bins = magnitudes
        .iter()
        .enumerate()
        .map(|(k, &mag)| {
            let edge = if k == 0 || k == last { 0.5 } else { 1.0 };
            SpectrumBin {
                frequency_hz: engine.bin_to_hz(k, sample_rate),
                magnitude: mag * scale * edge,
            }
        })
        .collect();

    log::debug!(
        "Spectrum: {} samples, FFT size {}, resolution {:.4} Hz",
        n,
        fft_size,
        sample_rate / fft_size as f64
    );

    Ok(Spectrum {
        bins,
        resolution_hz: sample_rate / fft_size as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn sine(freq: f64, amplitude: f64, sample_rate: f64, n: usize) -> Waveform {
        Waveform::new(
            (0..n)
                .map(|i| amplitude * (2.0 * PI * freq * i as f64 / sample_rate).sin())
                .collect(),
            sample_rate,
        )
        .unwrap()
    }

    #[test]
    fn test_unit_sine_amplitude() {
        // 8 cycles in 512 samples sits exactly on bin 8
        let wave = sine(1.0, 1.0, 64.0, 512);
        let spectrum = compute_spectrum(&wave, &SpectrumConfig::default()).unwrap();

        assert_eq!(spectrum.len(), 257);
        assert_abs_diff_eq!(spectrum.resolution_hz(), 0.125);

        let peak = spectrum.peak_in_band(0.0, 32.0).unwrap();
        assert_eq!(peak, 8);
        assert_abs_diff_eq!(spectrum.bins()[peak].magnitude, 1.0, epsilon = 0.02);
    }

    #[test]
    fn test_zero_padding_refines_grid() {
        let wave = sine(0.25, 2.0, 50.0, 3000);
        let config = SpectrumConfig {
            zero_pad_factor: 4,
            ..SpectrumConfig::default()
        };
        let spectrum = compute_spectrum(&wave, &config).unwrap();

        assert_eq!(spectrum.len(), 16384 / 2 + 1);
        let peak = spectrum.peak_in_band(0.1, 1.0).unwrap();
        assert_abs_diff_eq!(spectrum.bins()[peak].frequency_hz, 0.25, epsilon = 0.005);
        assert_abs_diff_eq!(spectrum.bins()[peak].magnitude, 2.0, epsilon = 0.05);
    }

    #[test]
    fn test_mean_removal() {
        let wave = Waveform::new(vec![3.0; 256], 10.0).unwrap();

        let removed = compute_spectrum(&wave, &SpectrumConfig::default()).unwrap();
        assert_abs_diff_eq!(removed.bins()[0].magnitude, 0.0, epsilon = 1e-9);

        let kept = compute_spectrum(
            &wave,
            &SpectrumConfig {
                remove_mean: false,
                window: WindowType::Rectangular,
                ..SpectrumConfig::default()
            },
        )
        .unwrap();
        assert_abs_diff_eq!(kept.bins()[0].magnitude, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_normalized_range() {
        let wave = sine(2.0, 5.0, 64.0, 512);
        let normalized = compute_spectrum(&wave, &SpectrumConfig::default())
            .unwrap()
            .normalized();

        let mags = normalized.magnitudes();
        let max = mags.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = mags.iter().cloned().fold(f64::INFINITY, f64::min);
        assert_abs_diff_eq!(max, 1.0);
        assert_abs_diff_eq!(min, 0.0);
    }

    #[test]
    fn test_spectrum_errors() {
        let single = Waveform::new(vec![1.0], 10.0).unwrap();
        assert!(matches!(
            compute_spectrum(&single, &SpectrumConfig::default()),
            Err(SignalError::InsufficientData { required: 2, actual: 1 })
        ));

        let wave = sine(1.0, 1.0, 64.0, 64);
        let config = SpectrumConfig {
            zero_pad_factor: 0,
            ..SpectrumConfig::default()
        };
        assert!(compute_spectrum(&wave, &config).is_err());

        for zero_pad_factor in [MAX_FFT_SIZE, usize::MAX] {
            let config = SpectrumConfig {
                zero_pad_factor,
                ..SpectrumConfig::default()
            };
            assert!(matches!(
                compute_spectrum(&wave, &config),
                Err(SignalError::InvalidParameter { name: "zero_pad_factor", .. })
            ));
        }
    }
}
