//! Zero-phase FIR filtering
//!
//! The kernel runs causally over an odd-symmetric extension of the waveform and
//! the output is shifted back by the group delay, so a symmetric kernel yields
//! a same-length result with no time shift.

use super::fast_fir::FftConvolver;
use crate::error::{Result, SignalError};
use crate::waveform::Waveform;

/// Kernels longer than this use FFT overlap-add instead of direct convolution
pub const DIRECT_CONVOLUTION_MAX_TAPS: usize = 128;

/// Streaming convolution engine
pub trait Convolver {
    /// Convolve the next block of input (output has the input's length)
    fn process_block(&mut self, input: &[f64]) -> Vec<f64>;

    /// Clear the delay line / overlap state
    fn reset(&mut self);

    /// Number of taps
    fn kernel_len(&self) -> usize;
}

/// Direct-form FIR with a ring-buffer delay line
pub struct DirectConvolver {
    /// Filter coefficients h[n]
    coefficients: Vec<f64>,

    /// Previous M samples, written at `cursor`
    state_buffer: Vec<f64>,

    cursor: usize,
}

impl DirectConvolver {
    /// Create a convolver for the given coefficients (at least one tap)
    pub fn new(coefficients: Vec<f64>) -> Self {
        let state_buffer = vec![0.0; coefficients.len()];

        Self {
            coefficients,
            state_buffer,
            cursor: 0,
        }
    }

    /// Process single sample
    ///
    /// # Arguments
    /// * `input` - Input sample x[n]
    ///
    /// # Returns
    /// Filtered output sample y[n]
    #[inline]
    pub fn process_sample(&mut self, input: f64) -> f64 {
        let length = self.coefficients.len();
        self.state_buffer[self.cursor] = input;

        // y[n] = Σ h[k] * x[n-k], read back through the ring buffer
        let mut output = 0.0;
        for (k, &coeff) in self.coefficients.iter().enumerate() {
            let idx = (self.cursor + length - k) % length;
            output += coeff * self.state_buffer[idx];
        }

        self.cursor = (self.cursor + 1) % length;

        output
    }
}

impl Convolver for DirectConvolver {
    fn process_block(&mut self, input: &[f64]) -> Vec<f64> {
        input.iter().map(|&x| self.process_sample(x)).collect()
    }

    fn reset(&mut self) {
        self.state_buffer.fill(0.0);
        self.cursor = 0;
    }

    fn kernel_len(&self) -> usize {
        self.coefficients.len()
    }
}

/// Pick the convolution engine for a kernel of this length
pub fn convolver_for(coefficients: Vec<f64>) -> Box<dyn Convolver> {
    if coefficients.len() > DIRECT_CONVOLUTION_MAX_TAPS {
        Box::new(FftConvolver::new(coefficients))
    } else {
        Box::new(DirectConvolver::new(coefficients))
    }
}

/// Extend `data` by `pad` samples on each side, mirrored through the end points
///
/// Left: 2·x[0] - x[pad..1], right: 2·x[n-1] - x[n-2..n-1-pad].
/// Requires `pad < data.len()`.
pub(crate) fn odd_extension(data: &[f64], pad: usize) -> Vec<f64> {
    let n = data.len();
    let first = data[0];
    let last = data[n - 1];

    let mut extended = Vec::with_capacity(n + 2 * pad);
    extended.extend((1..=pad).rev().map(|i| 2.0 * first - data[i]));
    extended.extend_from_slice(data);
    extended.extend((1..=pad).map(|i| 2.0 * last - data[n - 1 - i]));

    extended
}

/// Apply a symmetric odd-length FIR kernel without phase shift
///
/// Fails with `InsufficientData` when the waveform is shorter than the kernel.
pub fn filter_zero_phase(waveform: &Waveform, kernel: Vec<f64>) -> Result<Waveform> {
    let taps = kernel.len();
    if taps == 0 || taps % 2 == 0 {
        return Err(SignalError::invalid(
            "kernel",
            format!("zero-phase filtering needs an odd number of taps (got {})", taps),
        ));
    }
    if waveform.len() < taps {
        return Err(SignalError::InsufficientData {
            required: taps,
            actual: waveform.len(),
        });
    }

    let delay = (taps - 1) / 2;
    let extended = odd_extension(waveform.samples(), delay);

    let mut convolver = convolver_for(kernel);
    let filtered = convolver.process_block(&extended);

    log::debug!(
        "Zero-phase FIR: {} taps over {} samples (group delay {})",
        convolver.kernel_len(),
        waveform.len(),
        delay
    );

    // Output sample i sits at extended index i + delay, delayed by another `delay`
    let start = 2 * delay;
    Ok(waveform.derive(filtered[start..start + waveform.len()].to_vec()))
}
