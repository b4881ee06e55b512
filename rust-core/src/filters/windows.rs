//! Window functions for FIR design and spectral analysis

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    /// Hann window: w[n] = 0.5 - 0.5*cos(2πn/(M-1))
    /// Mainlobe width: 8π/M, Sidelobe attenuation: ~44 dB
    Hann,

    /// Hamming window: w[n] = 0.54 - 0.46*cos(2πn/(M-1))
    /// Mainlobe width: 8π/M, Sidelobe attenuation: ~53 dB
    #[default]
    Hamming,

    /// Blackman window: w[n] = 0.42 - 0.5*cos(2πn/(M-1)) + 0.08*cos(4πn/(M-1))
    /// Mainlobe width: 12π/M, Sidelobe attenuation: ~74 dB
    Blackman,

    /// Rectangular window (no windowing)
    Rectangular,
}

impl WindowType {
    /// Calculate required filter length M for a given transition width
    /// (Oppenheim & Schafer, Table 7.1)
    ///
    /// # Arguments
    /// * `delta_omega` - Transition width in radians/sample
    ///
    /// # Returns
    /// Filter length M (odd, for a symmetric Type I kernel)
    pub fn calculate_filter_length(&self, delta_omega: f64) -> usize {
        let m = (self.mainlobe_width_factor() * PI / delta_omega).ceil() as usize;

        if m % 2 == 0 {
            m + 1
        } else {
            m
        }
    }

    /// Filter length for a transition width given in Hz
    pub fn filter_length_for_transition(&self, transition_hz: f64, sample_rate: f64) -> usize {
        let delta_omega = 2.0 * PI * transition_hz / sample_rate;
        self.calculate_filter_length(delta_omega)
    }

    /// Get mainlobe width factor
    pub fn mainlobe_width_factor(&self) -> f64 {
        match self {
            WindowType::Hann => 8.0,
            WindowType::Hamming => 8.0,
            WindowType::Blackman => 12.0,
            WindowType::Rectangular => 4.0,
        }
    }

    /// Approximate peak sidelobe level of a windowed-sinc filter in dB
    pub fn stopband_attenuation_db(&self) -> f64 {
        match self {
            WindowType::Hann => -44.0,
            WindowType::Hamming => -53.0,
            WindowType::Blackman => -74.0,
            WindowType::Rectangular => -21.0,
        }
    }
}

/// Generate window coefficients
///
/// # Arguments
/// * `window_type` - Type of window function
/// * `length` - Number of samples (M)
///
/// # Returns
/// Vector of window coefficients w[n] for n = 0..M-1
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    // Degenerate lengths: the cosine terms are undefined for M = 1
    if length < 2 {
        return vec![1.0; length];
    }

    let m = length as f64;

    match window_type {
        WindowType::Hann => (0..length)
            .map(|n| {
                let angle = 2.0 * PI * n as f64 / (m - 1.0);
                0.5 - 0.5 * angle.cos()
            })
            .collect(),

        WindowType::Hamming => (0..length)
            .map(|n| {
                let angle = 2.0 * PI * n as f64 / (m - 1.0);
                0.54 - 0.46 * angle.cos()
            })
            .collect(),

        WindowType::Blackman => (0..length)
            .map(|n| {
                let angle1 = 2.0 * PI * n as f64 / (m - 1.0);
                let angle2 = 4.0 * PI * n as f64 / (m - 1.0);
                0.42 - 0.5 * angle1.cos() + 0.08 * angle2.cos()
            })
            .collect(),

        WindowType::Rectangular => vec![1.0; length],
    }
}
