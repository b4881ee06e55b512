//! Butterworth IIR filters as cascaded second-order sections
//!
//! Sections are designed with the bilinear transform (pre-warped at the
//! cutoff) and applied forward then backward, which squares the magnitude
//! response and cancels the phase.

use super::fir::odd_extension;
use super::params::{FilterBand, FilterParams};
use crate::error::{Result, SignalError};
use crate::waveform::Waveform;
use std::f64::consts::PI;

/// One biquad in Direct Form II Transposed, a0 normalized to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Biquad {
    fn normalized(b: [f64; 3], a: [f64; 3]) -> Self {
        Self {
            b0: b[0] / a[0],
            b1: b[1] / a[0],
            b2: b[2] / a[0],
            a1: a[1] / a[0],
            a2: a[2] / a[0],
        }
    }

    /// Second-order lowpass with quality factor `q`
    fn lowpass(w0: f64, q: f64) -> Self {
        let (sin, cos) = w0.sin_cos();
        let alpha = sin / (2.0 * q);
        Self::normalized(
            [(1.0 - cos) / 2.0, 1.0 - cos, (1.0 - cos) / 2.0],
            [1.0 + alpha, -2.0 * cos, 1.0 - alpha],
        )
    }

    /// Second-order highpass with quality factor `q`
    fn highpass(w0: f64, q: f64) -> Self {
        let (sin, cos) = w0.sin_cos();
        let alpha = sin / (2.0 * q);
        Self::normalized(
            [(1.0 + cos) / 2.0, -(1.0 + cos), (1.0 + cos) / 2.0],
            [1.0 + alpha, -2.0 * cos, 1.0 - alpha],
        )
    }

    /// First-order lowpass stored as a degenerate biquad
    fn first_order_lowpass(w0: f64) -> Self {
        let k = (w0 / 2.0).tan();
        Self {
            b0: k / (1.0 + k),
            b1: k / (1.0 + k),
            b2: 0.0,
            a1: (k - 1.0) / (k + 1.0),
            a2: 0.0,
        }
    }

    /// First-order highpass stored as a degenerate biquad
    fn first_order_highpass(w0: f64) -> Self {
        let k = (w0 / 2.0).tan();
        Self {
            b0: 1.0 / (1.0 + k),
            b1: -1.0 / (1.0 + k),
            b2: 0.0,
            a1: (k - 1.0) / (k + 1.0),
            a2: 0.0,
        }
    }

    /// Gain at DC: (b0 + b1 + b2) / (1 + a1 + a2)
    pub fn dc_gain(&self) -> f64 {
        (self.b0 + self.b1 + self.b2) / (1.0 + self.a1 + self.a2)
    }

    /// Delay-line state that makes a constant `input` a fixed point
    fn steady_state(&self, input: f64) -> (f64, f64) {
        let output = self.dc_gain() * input;
        let z2 = self.b2 * input - self.a2 * output;
        let z1 = self.b1 * input - self.a1 * output + z2;
        (z1, z2)
    }
}

/// Kind of Butterworth section cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Response {
    Low,
    High,
}

/// Butterworth filter of a given order at `cutoff_hz`
fn butterworth_sections(order: usize, cutoff_hz: f64, sample_rate: f64, response: Response) -> Vec<Biquad> {
    let w0 = 2.0 * PI * cutoff_hz / sample_rate;
    let mut sections = Vec::with_capacity(order / 2 + 1);

    // Pole pair k of an order-N prototype has Q = 1 / (2·sin((2k+1)π / 2N))
    for k in 0..order / 2 {
        let q = 1.0 / (2.0 * ((2 * k + 1) as f64 * PI / (2.0 * order as f64)).sin());
        sections.push(match response {
            Response::Low => Biquad::lowpass(w0, q),
            Response::High => Biquad::highpass(w0, q),
        });
    }

    if order % 2 == 1 {
        sections.push(match response {
            Response::Low => Biquad::first_order_lowpass(w0),
            Response::High => Biquad::first_order_highpass(w0),
        });
    }

    sections
}

/// Design the section cascade described by `params`
///
/// Bandpass is a highpass at the lower edge followed by a lowpass at the upper edge.
pub fn design_butterworth(params: &FilterParams, sample_rate: f64) -> Result<Vec<Biquad>> {
    params.validate(sample_rate)?;
    let order = params.butterworth_order();

    let sections = match params.band {
        FilterBand::LowPass { cutoff_hz } => {
            butterworth_sections(order, cutoff_hz, sample_rate, Response::Low)
        }
        FilterBand::HighPass { cutoff_hz } => {
            butterworth_sections(order, cutoff_hz, sample_rate, Response::High)
        }
        FilterBand::BandPass { low_hz, high_hz } => {
            let mut sections = butterworth_sections(order, low_hz, sample_rate, Response::High);
            sections.extend(butterworth_sections(order, high_hz, sample_rate, Response::Low));
            sections
        }
    };

    log::debug!(
        "Designed {:?} Butterworth: order {}, {} sections",
        params.band,
        order,
        sections.len()
    );

    Ok(sections)
}

/// Run the cascade once over `data`, starting from the steady state of `data[0]`
fn run_cascade(sections: &[Biquad], data: &[f64]) -> Vec<f64> {
    let mut output = data.to_vec();

    for section in sections {
        let Some(&first) = output.first() else {
            break;
        };
        let (mut z1, mut z2) = section.steady_state(first);

        for sample in output.iter_mut() {
            let x = *sample;
            let y = section.b0 * x + z1;
            z1 = section.b1 * x - section.a1 * y + z2;
            z2 = section.b2 * x - section.a2 * y;
            *sample = y;
        }
    }

    output
}

/// Shortest padding `filtfilt` accepts for a filter of this order
pub fn min_filtfilt_padding(order: usize) -> usize {
    3 * (order + 1)
}

/// Padding that lets the start-up transient settle: three periods of the
/// lowest cutoff, never less than `min_filtfilt_padding`
pub fn filtfilt_padding(order: usize, sample_rate: f64, lowest_cutoff_hz: f64) -> usize {
    let settle = (3.0 * sample_rate / lowest_cutoff_hz).ceil() as usize;
    settle.max(min_filtfilt_padding(order))
}

/// Forward-backward filtering with odd extension padding
pub fn filtfilt(sections: &[Biquad], data: &[f64], pad: usize) -> Result<Vec<f64>> {
    if data.len() <= pad {
        return Err(SignalError::InsufficientData {
            required: pad + 1,
            actual: data.len(),
        });
    }

    let extended = odd_extension(data, pad);

    let mut forward = run_cascade(sections, &extended);
    forward.reverse();
    let mut backward = run_cascade(sections, &forward);
    backward.reverse();

    Ok(backward[pad..pad + data.len()].to_vec())
}

/// Zero-phase Butterworth filtering of a waveform
pub fn filter_butterworth(waveform: &Waveform, params: &FilterParams) -> Result<Waveform> {
    let sections = design_butterworth(params, waveform.sample_rate())?;

    let (order, lowest_cutoff) = match params.band {
        FilterBand::LowPass { cutoff_hz } | FilterBand::HighPass { cutoff_hz } => {
            (params.butterworth_order(), cutoff_hz)
        }
        FilterBand::BandPass { low_hz, .. } => (2 * params.butterworth_order(), low_hz),
    };

    let required = min_filtfilt_padding(order) + 1;
    if waveform.len() < required {
        return Err(SignalError::InsufficientData {
            required,
            actual: waveform.len(),
        });
    }

    let mut pad = filtfilt_padding(order, waveform.sample_rate(), lowest_cutoff);
    if pad >= waveform.len() {
        log::warn!(
            "Waveform of {} samples is shorter than the settling padding ({}); edges may ring",
            waveform.len(),
            pad
        );
        pad = waveform.len() - 1;
    }

    let filtered = filtfilt(&sections, waveform.samples(), pad)?;
    Ok(waveform.derive(filtered))
}
