//! Spectral analysis with FFT

pub mod fft;
pub mod windowing;
pub mod analysis;

pub use fft::FftEngine;
pub use windowing::{apply_window, window_correction_factor};
pub use analysis::{compute_spectrum, Spectrum, SpectrumBin, SpectrumConfig};
