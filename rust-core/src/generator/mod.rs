//! Synthetic respiratory signals
//!
//! A breathing waveform is a sinusoid at the breathing frequency, optionally
//! overlaid with interference tones, additive noise and bursts of motion
//! artifacts. Generation is a pure function of the `SignalSpec` and its seed.

pub mod noise;

pub use noise::NoiseGenerator;

use crate::error::{ensure_below_nyquist, ensure_positive, Result, SignalError};
use crate::waveform::Waveform;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Additive noise distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NoiseKind {
    None,
    /// Amplitude is the standard deviation
    #[default]
    Gaussian,
    /// Amplitude is the half-range
    Uniform,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSpec {
    pub kind: NoiseKind,
    pub amplitude: f64,
}

impl Default for NoiseSpec {
    fn default() -> Self {
        Self {
            kind: NoiseKind::Gaussian,
            amplitude: 0.1,
        }
    }
}

impl NoiseSpec {
    pub fn none() -> Self {
        Self {
            kind: NoiseKind::None,
            amplitude: 0.0,
        }
    }

    pub fn gaussian(amplitude: f64) -> Self {
        Self {
            kind: NoiseKind::Gaussian,
            amplitude,
        }
    }

    pub fn uniform(amplitude: f64) -> Self {
        Self {
            kind: NoiseKind::Uniform,
            amplitude,
        }
    }
}

/// Sinusoidal interference, e.g. mains hum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub frequency_hz: f64,
    pub amplitude: f64,
}

/// Erratic movement: bursts of extra Gaussian noise
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionArtifacts {
    /// Chance that a burst starts at any given sample
    pub probability: f64,
    /// Burst length in samples
    pub burst_len: usize,
    /// Standard deviation of the burst noise
    pub amplitude: f64,
}

/// Parameters of a synthetic respiratory waveform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalSpec {
    pub duration_s: f64,
    pub sample_rate_hz: f64,
    pub breathing_rate_bpm: f64,
    pub amplitude: f64,
    pub noise: NoiseSpec,
    pub tones: Vec<Tone>,
    pub motion_artifacts: Option<MotionArtifacts>,
    /// `None` seeds from OS entropy
    pub seed: Option<u64>,
}

impl Default for SignalSpec {
    fn default() -> Self {
        Self {
            duration_s: 60.0,
            sample_rate_hz: 50.0,
            breathing_rate_bpm: 15.0,
            amplitude: 1.0,
            noise: NoiseSpec::default(),
            tones: Vec::new(),
            motion_artifacts: None,
            seed: None,
        }
    }
}

impl SignalSpec {
    /// Breathing frequency in Hz
    pub fn breathing_frequency_hz(&self) -> f64 {
        self.breathing_rate_bpm / 60.0
    }

    /// Number of samples the spec produces
    pub fn num_samples(&self) -> usize {
        (self.duration_s * self.sample_rate_hz).round() as usize
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("duration_s", self.duration_s)?;
        ensure_positive("sample_rate_hz", self.sample_rate_hz)?;
        ensure_positive("breathing_rate_bpm", self.breathing_rate_bpm)?;
        ensure_below_nyquist(
            "breathing_rate_bpm",
            self.breathing_frequency_hz(),
            self.sample_rate_hz,
        )?;
        ensure_finite("amplitude", self.amplitude)?;
        ensure_non_negative("noise.amplitude", self.noise.amplitude)?;

        for tone in &self.tones {
            ensure_below_nyquist("tones.frequency_hz", tone.frequency_hz, self.sample_rate_hz)?;
            ensure_finite("tones.amplitude", tone.amplitude)?;
        }

        if let Some(motion) = &self.motion_artifacts {
            if !(0.0..=1.0).contains(&motion.probability) {
                return Err(SignalError::invalid(
                    "motion_artifacts.probability",
                    format!("must be within [0, 1] (got {})", motion.probability),
                ));
            }
            if motion.burst_len == 0 {
                return Err(SignalError::invalid(
                    "motion_artifacts.burst_len",
                    "must be at least 1 sample",
                ));
            }
            ensure_non_negative("motion_artifacts.amplitude", motion.amplitude)?;
        }

        if self.num_samples() == 0 {
            return Err(SignalError::invalid(
                "duration_s",
                format!(
                    "{} s at {} Hz yields no samples",
                    self.duration_s, self.sample_rate_hz
                ),
            ));
        }

        Ok(())
    }
}

fn ensure_finite(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(SignalError::invalid(name, format!("must be finite (got {})", value)));
    }
    Ok(())
}

fn ensure_non_negative(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SignalError::invalid(
            name,
            format!("must be a finite value >= 0 (got {})", value),
        ));
    }
    Ok(())
}

/// Generate the waveform described by `spec`
///
/// # Returns
/// `round(duration_s × sample_rate_hz)` samples starting at t = 0
pub fn generate(spec: &SignalSpec) -> Result<Waveform> {
    spec.validate()?;

    let n = spec.num_samples();
    let fs = spec.sample_rate_hz;
    let mut samples = sinusoid(n, fs, spec.breathing_frequency_hz(), spec.amplitude);

    for tone in &spec.tones {
        for (s, t) in samples
            .iter_mut()
            .zip(sinusoid(n, fs, tone.frequency_hz, tone.amplitude))
        {
            *s += t;
        }
    }

    let mut rng = NoiseGenerator::new(spec.seed);

    let noise = match spec.noise.kind {
        NoiseKind::None => Vec::new(),
        NoiseKind::Gaussian => rng.gaussian_samples(n, spec.noise.amplitude),
        NoiseKind::Uniform => rng.uniform_samples(n, spec.noise.amplitude),
    };
    for (s, e) in samples.iter_mut().zip(noise) {
        *s += e;
    }

    if let Some(motion) = &spec.motion_artifacts {
        let bursts = add_motion_artifacts(&mut samples, motion, &mut rng);
        log::debug!("Added {} motion artifact bursts", bursts);
    }

    log::debug!(
        "Generated {} samples at {} Hz ({} breaths/min, noise {:?} {})",
        n,
        fs,
        spec.breathing_rate_bpm,
        spec.noise.kind,
        spec.noise.amplitude
    );

    Waveform::new(samples, fs)
}

/// Add noise bursts in place, returning how many started
fn add_motion_artifacts(samples: &mut [f64], motion: &MotionArtifacts, rng: &mut NoiseGenerator) -> usize {
    let mut bursts = 0;
    for i in 0..samples.len() {
        if rng.unit() < motion.probability {
            bursts += 1;
            let end = (i + motion.burst_len).min(samples.len());
            for s in &mut samples[i..end] {
                *s += motion.amplitude * rng.gaussian();
            }
        }
    }
    bursts
}

fn sinusoid(n: usize, sample_rate: f64, frequency: f64, amplitude: f64) -> Vec<f64> {
    (0..n)
        .map(|i| amplitude * (2.0 * PI * frequency * i as f64 / sample_rate).sin())
        .collect()
}

/// Plain sinusoid with `round(duration × sample_rate)` samples
pub fn sine_wave(duration_s: f64, sample_rate_hz: f64, frequency_hz: f64, amplitude: f64) -> Result<Waveform> {
    ensure_positive("duration_s", duration_s)?;
    ensure_positive("sample_rate_hz", sample_rate_hz)?;
    ensure_below_nyquist("frequency_hz", frequency_hz, sample_rate_hz)?;
    ensure_finite("amplitude", amplitude)?;

    let n = (duration_s * sample_rate_hz).round() as usize;
    Waveform::new(sinusoid(n, sample_rate_hz, frequency_hz, amplitude), sample_rate_hz)
}

/// Where `unit_impulse` places its single non-zero sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImpulsePosition {
    #[default]
    Start,
    /// Index len / 2
    Middle,
}

/// A single 1.0 sample among zeros, for inspecting impulse responses
pub fn unit_impulse(len: usize, sample_rate_hz: f64, position: ImpulsePosition) -> Result<Waveform> {
    if len == 0 {
        return Err(SignalError::invalid("len", "must be at least 1"));
    }

    let mut samples = vec![0.0; len];
    let index = match position {
        ImpulsePosition::Start => 0,
        ImpulsePosition::Middle => len / 2,
    };
    samples[index] = 1.0;

    Waveform::new(samples, sample_rate_hz)
}
