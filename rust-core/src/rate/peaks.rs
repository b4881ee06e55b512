//! Time-domain breath counting

use super::{ensure_min_duration, BreathingRate};
use crate::error::{ensure_positive, Result, SignalError};
use crate::waveform::Waveform;
use serde::{Deserialize, Serialize};

/// What counts as one breath
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PeakMethod {
    /// Local maxima above the threshold level
    #[default]
    LocalMaxima,
    /// Rising zero crossings of the mean-removed signal
    ZeroCrossings,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakConfig {
    pub method: PeakMethod,

    /// Local maxima: level = mean + threshold · (max − mean).
    /// Zero crossings: hysteresis = threshold · max |x − mean|.
    pub threshold: f64,

    /// Peaks closer than this are merged, keeping the higher one
    pub min_peak_distance_s: f64,

    /// Analyse only the trailing window (seconds); `None` uses everything
    pub window_s: Option<f64>,

    pub min_duration_s: f64,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            method: PeakMethod::LocalMaxima,
            threshold: 0.3,
            min_peak_distance_s: 1.0,
            window_s: None,
            min_duration_s: 10.0,
        }
    }
}

impl PeakConfig {
    pub fn zero_crossings() -> Self {
        Self {
            method: PeakMethod::ZeroCrossings,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.threshold) {
            return Err(SignalError::invalid(
                "threshold",
                format!("must be within [0, 1) (got {})", self.threshold),
            ));
        }
        if !self.min_peak_distance_s.is_finite() || self.min_peak_distance_s < 0.0 {
            return Err(SignalError::invalid(
                "min_peak_distance_s",
                format!("must be a finite value >= 0 (got {})", self.min_peak_distance_s),
            ));
        }
        if let Some(window_s) = self.window_s {
            ensure_positive("window_s", window_s)?;
        }
        ensure_positive("min_duration_s", self.min_duration_s)
    }
}

/// Count breaths and convert the mean event interval to breaths per minute
pub fn estimate_rate_peaks(waveform: &Waveform, config: &PeakConfig) -> Result<BreathingRate> {
    config.validate()?;

    let segment = match config.window_s {
        Some(window_s) => waveform.tail(window_s)?,
        None => waveform.clone(),
    };
    ensure_min_duration(segment.len(), segment.sample_rate(), config.min_duration_s)?;

    let times: Vec<f64> = match config.method {
        PeakMethod::LocalMaxima => {
            let min_distance = (config.min_peak_distance_s * segment.sample_rate()).round() as usize;
            find_peaks(segment.samples(), config.threshold, min_distance)
                .into_iter()
                .map(|idx| segment.time_at(idx))
                .collect()
        }
        PeakMethod::ZeroCrossings => rising_crossings(segment.samples(), config.threshold)
            .into_iter()
            .map(|pos| segment.start_time() + pos / segment.sample_rate())
            .collect(),
    };

    log::debug!(
        "{:?}: {} events over {:.1} s",
        config.method,
        times.len(),
        segment.duration()
    );

    BreathingRate::from_event_times(&times)
}

/// Indices of local maxima above mean + threshold · (max − mean)
///
/// A peak within `min_distance` samples of the previous one replaces it only if higher.
fn find_peaks(samples: &[f64], threshold: f64, min_distance: usize) -> Vec<usize> {
    if samples.len() < 3 {
        return Vec::new();
    }

    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max <= mean {
        return Vec::new();
    }
    let level = mean + threshold * (max - mean);

    let mut peaks: Vec<usize> = Vec::new();
    for i in 1..samples.len() - 1 {
        let x = samples[i];
        if x <= level || x <= samples[i - 1] || x < samples[i + 1] {
            continue;
        }

        match peaks.last().copied() {
            Some(prev) if i - prev < min_distance => {
                if x > samples[prev] {
                    let last = peaks.len() - 1;
                    peaks[last] = i;
                }
            }
            _ => peaks.push(i),
        }
    }

    peaks
}

/// Fractional sample positions of rising zero crossings of the mean-removed signal
///
/// The signal must drop below −hysteresis before the next crossing counts.
fn rising_crossings(samples: &[f64], threshold: f64) -> Vec<f64> {
    if samples.len() < 2 {
        return Vec::new();
    }

    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let centered: Vec<f64> = samples.iter().map(|&x| x - mean).collect();
    let hysteresis = threshold * centered.iter().fold(0.0, |acc: f64, &x| acc.max(x.abs()));

    let mut crossings = Vec::new();
    let mut armed = false;
    for i in 1..centered.len() {
        let (prev, cur) = (centered[i - 1], centered[i]);
        if prev < -hysteresis {
            armed = true;
        }
        if armed && prev < 0.0 && cur >= 0.0 {
            // Linear interpolation between the two samples
            crossings.push((i - 1) as f64 + (-prev) / (cur - prev));
            armed = false;
        }
    }

    crossings
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn breathing(bpm: f64, sample_rate: f64, seconds: f64) -> Waveform {
        let freq = bpm / 60.0;
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
    fn test_local_maxima_rate() {
        for bpm in [10.0, 15.0, 24.0] {
            let rate = estimate_rate_peaks(&breathing(bpm, 50.0, 60.0), &PeakConfig::default()).unwrap();
            assert_abs_diff_eq!(rate.breaths_per_minute, bpm, epsilon = 0.1);
        }

        let rate = estimate_rate_peaks(&breathing(15.0, 50.0, 60.0), &PeakConfig::default()).unwrap();
        assert_eq!(rate.events, Some(15));
    }

    #[test]
    fn test_zero_crossing_rate() {
        let rate = estimate_rate_peaks(&breathing(15.0, 50.0, 60.0), &PeakConfig::zero_crossings()).unwrap();
        assert_abs_diff_eq!(rate.breaths_per_minute, 15.0, epsilon = 0.05);
        assert_eq!(rate.events, Some(14));
    }

    #[test]
    fn test_close_peaks_keep_the_higher() {
        let samples = [0.0, 0.8, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.9, 0.0];
        assert_eq!(find_peaks(&samples, 0.3, 3), vec![3, 8]);
        assert_eq!(find_peaks(&samples, 0.3, 1), vec![1, 3, 8]);
    }

    #[test]
    fn test_crossings_need_hysteresis() {
        // Small wiggle around zero between two real breaths
        let samples = [-1.0, 1.0, -0.05, 0.05, -0.05, 0.05, -1.0, 1.0];
        let crossings = rising_crossings(&samples, 0.3);
        assert_eq!(crossings.len(), 2);
        assert_abs_diff_eq!(crossings[0], 0.5);
        assert_abs_diff_eq!(crossings[1], 6.5);
    }

    #[test]
    fn test_trailing_window() {
        // 10 bpm for 40 s then 20 bpm for the last 30 s
        let slow = breathing(10.0, 50.0, 40.0);
        let fast = breathing(20.0, 50.0, 30.0);
        let samples: Vec<f64> = slow.samples().iter().chain(fast.samples()).cloned().collect();
        let wave = Waveform::new(samples, 50.0).unwrap();

        let config = PeakConfig {
            window_s: Some(30.0),
            ..PeakConfig::default()
        };
        let rate = estimate_rate_peaks(&wave, &config).unwrap();
        assert_abs_diff_eq!(rate.breaths_per_minute, 20.0, epsilon = 0.1);
    }

    #[test]
    fn test_errors() {
        let short = breathing(15.0, 50.0, 5.0);
        assert!(matches!(
            estimate_rate_peaks(&short, &PeakConfig::default()),
            Err(SignalError::InsufficientData { required: 500, actual: 250 })
        ));

        let flat = Waveform::new(vec![0.5; 1000], 50.0).unwrap();
        assert!(matches!(
            estimate_rate_peaks(&flat, &PeakConfig::default()),
            Err(SignalError::NoBreathDetected(_))
        ));
        assert!(matches!(
            estimate_rate_peaks(&flat, &PeakConfig::zero_crossings()),
            Err(SignalError::NoBreathDetected(_))
        ));

        let bad = PeakConfig {
            threshold: 1.5,
            ..PeakConfig::default()
        };
        assert!(matches!(
            estimate_rate_peaks(&flat, &bad),
            Err(SignalError::InvalidParameter { .. })
        ));
    }
}
