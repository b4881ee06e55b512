//! Respiration Lab - respiratory signal simulation and analysis
//!
//! Generates noisy synthetic breathing waveforms, filters them, and estimates
//! the breathing rate by peak counting and by FFT dominant-frequency detection.

pub mod error;
pub mod waveform;
pub mod generator;
pub mod filters;
pub mod spectrum;
pub mod rate;
pub mod plot;
pub mod config;

pub use error::{Result, SignalError};
pub use waveform::Waveform;
pub use generator::{generate, sine_wave, unit_impulse, ImpulsePosition, NoiseKind, NoiseSpec, SignalSpec};
pub use filters::{downsample, filter_waveform, median_filter, resample, FilterBand, FilterDesign, FilterParams, WindowType};
pub use spectrum::{compute_spectrum, Spectrum, SpectrumConfig};
pub use rate::{estimate_rate_fft, estimate_rate_peaks, BreathingRate, FftRateConfig, FrequencyBand, PeakConfig, PeakMethod};
pub use config::{DemoConfig, PlotConfig};
