//! Immutable sampled waveform
//!
//! Every operation in this crate consumes a `&Waveform` and produces a new one;
//! samples are never mutated after construction.

use crate::error::{ensure_positive, Result, SignalError};

/// Real-valued samples at a fixed sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f64>,
    sample_rate: f64,
    start_time: f64,
}

impl Waveform {
    /// Create a waveform starting at t = 0
    ///
    /// # Arguments
    /// * `samples` - Sample values
    /// * `sample_rate` - Sample rate in Hz (must be > 0)
    pub fn new(samples: Vec<f64>, sample_rate: f64) -> Result<Self> {
        ensure_positive("sample_rate", sample_rate)?;
        if let Some(idx) = samples.iter().position(|s| !s.is_finite()) {
            return Err(SignalError::invalid(
                "samples",
                format!("sample {} is not finite", idx),
            ));
        }

        Ok(Self {
            samples,
            sample_rate,
            start_time: 0.0,
        })
    }

    /// Set the timestamp origin (seconds)
    pub fn with_start_time(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }

    /// Derive a waveform with new samples but the same rate and origin
    pub(crate) fn derive(&self, samples: Vec<f64>) -> Self {
        Self {
            samples,
            sample_rate: self.sample_rate,
            start_time: self.start_time,
        }
    }

    /// Derive a waveform with new samples at a different rate
    pub(crate) fn derive_at_rate(&self, samples: Vec<f64>, sample_rate: f64) -> Self {
        Self {
            samples,
            sample_rate,
            start_time: self.start_time,
        }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn nyquist(&self) -> f64 {
        self.sample_rate / 2.0
    }

    /// Duration in seconds (len / sample_rate)
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    /// Timestamp of sample `index` in seconds
    pub fn time_at(&self, index: usize) -> f64 {
        self.start_time + index as f64 / self.sample_rate
    }

    /// Time axis in seconds, one entry per sample
    pub fn times(&self) -> Vec<f64> {
        (0..self.samples.len()).map(|n| self.time_at(n)).collect()
    }

    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Largest absolute sample value
    pub fn peak_abs(&self) -> f64 {
        self.samples.iter().fold(0.0, |acc: f64, &s| acc.max(s.abs()))
    }

    /// Root-mean-square level
    pub fn rms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = self.samples.iter().map(|s| s * s).sum();
        (sum_sq / self.samples.len() as f64).sqrt()
    }

    /// Copy with the mean subtracted
    pub fn detrended(&self) -> Self {
        let mean = self.mean();
        self.derive(self.samples.iter().map(|&s| s - mean).collect())
    }

    /// Multiply every sample by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        self.derive(self.samples.iter().map(|&s| s * factor).collect())
    }

    /// Sample-wise sum of two waveforms with equal rate and length
    pub fn mix(&self, other: &Waveform) -> Result<Self> {
        if (self.sample_rate - other.sample_rate).abs() > f64::EPSILON * self.sample_rate {
            return Err(SignalError::invalid(
                "other",
                format!(
                    "sample rate mismatch ({} Hz vs {} Hz)",
                    self.sample_rate, other.sample_rate
                ),
            ));
        }
        if self.len() != other.len() {
            return Err(SignalError::invalid(
                "other",
                format!("length mismatch ({} vs {} samples)", self.len(), other.len()),
            ));
        }

        Ok(self.derive(
            self.samples
                .iter()
                .zip(other.samples.iter())
                .map(|(&a, &b)| a + b)
                .collect(),
        ))
    }

    /// Trailing segment of at most `seconds` seconds
    pub fn tail(&self, seconds: f64) -> Result<Self> {
        ensure_positive("window_s", seconds)?;
        let count = ((seconds * self.sample_rate).round() as usize).min(self.len());
        let skip = self.len() - count;
        Ok(Self {
            samples: self.samples[skip..].to_vec(),
            sample_rate: self.sample_rate,
            start_time: self.time_at(skip),
        })
    }
}
