//! Breathing rate estimation
//!
//! Two independent estimators over a filtered waveform:
//! - [`estimate_rate_peaks`] counts breaths in the time domain
//! - [`estimate_rate_fft`] picks the dominant frequency of the breathing band

pub mod peaks;
pub mod dominant;

pub use peaks::{estimate_rate_peaks, PeakConfig, PeakMethod};
pub use dominant::{estimate_rate_fft, FftRateConfig};

use crate::error::{ensure_positive, Result, SignalError};
use serde::{Deserialize, Serialize};

/// Breathing rate estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreathingRate {
    pub breaths_per_minute: f64,
    pub frequency_hz: f64,
    /// Peaks or crossings the estimate is based on (time-domain estimators only)
    pub events: Option<usize>,
}

impl BreathingRate {
    pub fn from_frequency(frequency_hz: f64) -> Self {
        Self {
            breaths_per_minute: frequency_hz * 60.0,
            frequency_hz,
            events: None,
        }
    }

    /// Rate from event timestamps: 60 · (events − 1) / (t_last − t_first)
    pub(crate) fn from_event_times(times: &[f64]) -> Result<Self> {
        let (Some(&first), Some(&last)) = (times.first(), times.last()) else {
            return Err(SignalError::NoBreathDetected("no breathing events found".into()));
        };
        if times.len() < 2 || last <= first {
            return Err(SignalError::NoBreathDetected(format!(
                "need at least two breathing events, found {}",
                times.len()
            )));
        }

        let frequency_hz = (times.len() - 1) as f64 / (last - first);
        Ok(Self {
            events: Some(times.len()),
            ..Self::from_frequency(frequency_hz)
        })
    }
}

/// Plausible breathing frequencies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    pub low_hz: f64,
    pub high_hz: f64,
}

impl Default for FrequencyBand {
    /// 6 to 60 breaths per minute
    fn default() -> Self {
        Self {
            low_hz: 0.1,
            high_hz: 1.0,
        }
    }
}

impl FrequencyBand {
    pub fn from_bpm(low_bpm: f64, high_bpm: f64) -> Self {
        Self {
            low_hz: low_bpm / 60.0,
            high_hz: high_bpm / 60.0,
        }
    }

    /// Require 0 < low < high ≤ nyquist
    pub fn validate(&self, sample_rate: f64) -> Result<()> {
        ensure_positive("band.low_hz", self.low_hz)?;
        ensure_positive("band.high_hz", self.high_hz)?;
        if self.low_hz >= self.high_hz {
            return Err(SignalError::invalid(
                "band.low_hz",
                format!("must be below band.high_hz ({} >= {})", self.low_hz, self.high_hz),
            ));
        }
        let nyquist = sample_rate / 2.0;
        if self.high_hz > nyquist {
            return Err(SignalError::invalid(
                "band.high_hz",
                format!("{} Hz is above the Nyquist frequency ({} Hz)", self.high_hz, nyquist),
            ));
        }
        Ok(())
    }
}

/// Fail with `InsufficientData` when `len` samples at `sample_rate` cover less than `min_duration_s`
pub(crate) fn ensure_min_duration(len: usize, sample_rate: f64, min_duration_s: f64) -> Result<()> {
    let required = (min_duration_s * sample_rate).ceil() as usize;
    if len < required {
        return Err(SignalError::InsufficientData {
            required,
            actual: len,
        });
    }
    Ok(())
}
