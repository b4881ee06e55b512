//! Windowing applied to time-domain signals before the FFT

use crate::filters::windows::{generate_window, WindowType};

/// Apply window to signal
///
/// # Arguments
/// * `signal` - Input signal
/// * `window_type` - Type of window to apply
///
/// # Returns
/// Windowed signal
pub fn apply_window(signal: &[f64], window_type: WindowType) -> Vec<f64> {
    let window = generate_window(window_type, signal.len());

    signal
        .iter()
        .zip(window.iter())
        .map(|(&s, &w)| s * w)
        .collect()
}

/// Amplitude correction for a window of `length` samples
///
/// Windowing lowers the amplitude seen by the FFT; multiplying the magnitude
/// by length / Σw restores it.
pub fn window_correction_factor(window_type: WindowType, length: usize) -> f64 {
    let window = generate_window(window_type, length);
    let sum: f64 = window.iter().sum();
    if sum <= 0.0 {
        return 1.0;
    }
    length as f64 / sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_window() {
        let signal = vec![1.0; 101];
        let windowed = apply_window(&signal, WindowType::Hamming);

        assert_eq!(windowed.len(), 101);
        assert!((windowed[50] - 1.0).abs() < 1e-10);
        assert!(windowed[0] < 0.1);
        assert!(windowed[100] < 0.1);
    }

    #[test]
    fn test_correction_factor() {
        let factor_rect = window_correction_factor(WindowType::Rectangular, 100);
        let factor_hann = window_correction_factor(WindowType::Hann, 1000);

        assert!((factor_rect - 1.0).abs() < 1e-12);
        // Hann coherent gain is 0.5
        assert!((factor_hann - 2.0).abs() < 0.01);
    }
}
