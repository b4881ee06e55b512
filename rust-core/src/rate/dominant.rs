//! Dominant-frequency breathing rate from the amplitude spectrum

use super::{ensure_min_duration, BreathingRate, FrequencyBand};
use crate::error::{ensure_positive, Result, SignalError};
use crate::filters::windows::WindowType;
use crate::spectrum::{compute_spectrum, SpectrumConfig};
use crate::waveform::Waveform;
use serde::{Deserialize, Serialize};

/// Band peaks at or below this fraction of the waveform's peak amplitude count as silence
const SILENCE_RATIO: f64 = 1e-9;

/// Largest accepted `zero_pad_factor`
pub const MAX_ZERO_PAD_FACTOR: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FftRateConfig {
    pub band: FrequencyBand,

    /// Shortest accepted input; `None` means one period of `band.low_hz`
    pub min_duration_s: Option<f64>,

    pub zero_pad_factor: usize,

    pub window: WindowType,
}

impl Default for FftRateConfig {
    fn default() -> Self {
        Self {
            band: FrequencyBand::default(),
            min_duration_s: None,
            zero_pad_factor: 8,
            window: WindowType::Hann,
        }
    }
}

impl FftRateConfig {
    pub fn min_duration_s(&self) -> f64 {
        self.min_duration_s.unwrap_or(1.0 / self.band.low_hz)
    }

    pub fn validate(&self, sample_rate: f64) -> Result<()> {
        self.band.validate(sample_rate)?;
        if let Some(min_duration_s) = self.min_duration_s {
            ensure_positive("min_duration_s", min_duration_s)?;
        }
        if !(1..=MAX_ZERO_PAD_FACTOR).contains(&self.zero_pad_factor) {
            return Err(SignalError::invalid(
                "zero_pad_factor",
                format!(
                    "must be within 1..={} (got {})",
                    MAX_ZERO_PAD_FACTOR, self.zero_pad_factor
                ),
            ));
        }
        Ok(())
    }
}

/// Breathing rate from the strongest spectral peak inside `config.band`
///
/// The peak bin is refined by fitting a parabola through it and its two
/// neighbours.
pub fn estimate_rate_fft(waveform: &Waveform, config: &FftRateConfig) -> Result<BreathingRate> {
    config.validate(waveform.sample_rate())?;
    ensure_min_duration(waveform.len(), waveform.sample_rate(), config.min_duration_s())?;

    let spectrum = compute_spectrum(
        waveform,
        &SpectrumConfig {
            window: config.window,
            zero_pad_factor: config.zero_pad_factor,
            remove_mean: true,
        },
    )?;

    let band = config.band;
    let peak = spectrum.peak_in_band(band.low_hz, band.high_hz).ok_or_else(|| {
        SignalError::NoBreathDetected(format!(
            "no spectrum bins between {} and {} Hz",
            band.low_hz, band.high_hz
        ))
    })?;

    let mags = spectrum.magnitudes();
    if mags[peak] <= SILENCE_RATIO * waveform.peak_abs() {
        return Err(SignalError::NoBreathDetected(format!(
            "no spectral energy between {} and {} Hz",
            band.low_hz, band.high_hz
        )));
    }

    let offset = if peak > 0 && peak + 1 < mags.len() {
        parabolic_offset(mags[peak - 1], mags[peak], mags[peak + 1])
    } else {
        0.0
    };
    let frequency_hz = (peak as f64 + offset) * spectrum.resolution_hz();

    log::debug!(
        "Dominant bin {} ({:.4} Hz), refined to {:.4} Hz",
        peak,
        spectrum.bins()[peak].frequency_hz,
        frequency_hz
    );

    Ok(BreathingRate::from_frequency(frequency_hz))
}

/// Vertex of the parabola through three equally spaced points, in bins relative to the middle
fn parabolic_offset(alpha: f64, beta: f64, gamma: f64) -> f64 {
    let denom = alpha - 2.0 * beta + gamma;
    if denom.abs() > f64::EPSILON {
        (0.5 * (alpha - gamma) / denom).clamp(-0.5, 0.5)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn tone(freq: f64, sample_rate: f64, seconds: f64) -> Waveform {
        let n = (seconds * sample_rate).round() as usize;
        Waveform::new(
            (0..n)
                .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin())
                .collect(),
            sample_rate,
        )
        .unwrap()
    }

    #[test]
    fn test_dominant_frequency() {
        for freq in [0.2, 0.25, 0.33, 0.6] {
            let rate = estimate_rate_fft(&tone(freq, 50.0, 60.0), &FftRateConfig::default()).unwrap();
            assert_abs_diff_eq!(rate.frequency_hz, freq, epsilon = 0.003);
            assert_abs_diff_eq!(rate.breaths_per_minute, freq * 60.0, epsilon = 0.2);
            assert_eq!(rate.events, None);
        }
    }

    #[test]
    fn test_ignores_out_of_band_energy() {
        let breath = tone(0.25, 50.0, 60.0);
        let hum = tone(5.0, 50.0, 60.0).scaled(3.0);
        let offset = Waveform::new(vec![2.0; breath.len()], 50.0).unwrap();
        let mixed = breath.mix(&hum).unwrap().mix(&offset).unwrap();

        let rate = estimate_rate_fft(&mixed, &FftRateConfig::default()).unwrap();
        assert_abs_diff_eq!(rate.breaths_per_minute, 15.0, epsilon = 0.2);
    }

    #[test]
    fn test_parabolic_offset() {
        assert_abs_diff_eq!(parabolic_offset(1.0, 2.0, 1.0), 0.0);
        assert!(parabolic_offset(1.0, 2.0, 1.5) > 0.0);
        assert!(parabolic_offset(1.5, 2.0, 1.0) < 0.0);
        assert_abs_diff_eq!(parabolic_offset(1.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn test_errors() {
        // One period of 0.1 Hz is 10 s
        let short = tone(0.25, 50.0, 8.0);
        assert!(matches!(
            estimate_rate_fft(&short, &FftRateConfig::default()),
            Err(SignalError::InsufficientData { required: 500, actual: 400 })
        ));

        let silent = Waveform::new(vec![0.0; 1500], 50.0).unwrap();
        assert!(matches!(
            estimate_rate_fft(&silent, &FftRateConfig::default()),
            Err(SignalError::NoBreathDetected(_))
        ));

        let offset_only = Waveform::new(vec![0.5; 1500], 50.0).unwrap();
        assert!(matches!(
            estimate_rate_fft(&offset_only, &FftRateConfig::default()),
            Err(SignalError::NoBreathDetected(_))
        ));

        let config = FftRateConfig {
            band: FrequencyBand { low_hz: 0.1, high_hz: 40.0 },
            ..FftRateConfig::default()
        };
        assert!(matches!(
            estimate_rate_fft(&tone(0.25, 50.0, 60.0), &config),
            Err(SignalError::InvalidParameter { .. })
        ));

        for zero_pad_factor in [0, MAX_ZERO_PAD_FACTOR + 1, usize::MAX] {
            let config = FftRateConfig {
                zero_pad_factor,
                ..FftRateConfig::default()
            };
            assert!(matches!(
                estimate_rate_fft(&tone(0.25, 50.0, 60.0), &config),
                Err(SignalError::InvalidParameter { name: "zero_pad_factor", .. })
            ));
        }
    }

    #[test]
    fn test_faint_breathing_is_not_silence() {
        let faint = tone(0.25, 50.0, 60.0).scaled(1e-10);

        let rate = estimate_rate_fft(&faint, &FftRateConfig::default()).unwrap();
        assert_abs_diff_eq!(rate.breaths_per_minute, 15.0, epsilon = 0.2);

        let counted = crate::rate::estimate_rate_peaks(&faint, &crate::rate::PeakConfig::default()).unwrap();
        assert_abs_diff_eq!(counted.breaths_per_minute, rate.breaths_per_minute, epsilon = 0.2);
    }
}
