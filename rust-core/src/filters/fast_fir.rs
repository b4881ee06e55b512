//! FFT-based fast convolution for long FIR kernels
//!
//! Overlap-add with frequency-domain multiplication:
//! O(N log N) instead of O(N*M) for time-domain convolution.

use super::fir::Convolver;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Smallest input block handed to the FFT
const MIN_BLOCK_SIZE: usize = 1024;

/// Overlap-add FIR convolver
pub struct FftConvolver {
    /// Kernel in the frequency domain
    h_fft: Vec<Complex<f64>>,

    /// FFT size (power of 2, >= block_size + filter_length - 1)
    fft_size: usize,

    /// Input block size
    block_size: usize,

    filter_length: usize,

    /// Tail carried into the next block (filter_length - 1 samples)
    overlap: Vec<f64>,

    fft: Arc<dyn Fft<f64>>,
    ifft: Arc<dyn Fft<f64>>,

    /// Reusable work buffer
    work: Vec<Complex<f64>>,
}

impl FftConvolver {
    /// Create a convolver; the block size is at least the kernel length
    ///
    /// # Arguments
    /// * `coefficients` - Filter coefficients h[n] (at least one tap)
    pub fn new(coefficients: Vec<f64>) -> Self {
        let filter_length = coefficients.len();
        let block_size = filter_length.next_power_of_two().max(MIN_BLOCK_SIZE);
        let fft_size = (block_size + filter_length - 1).next_power_of_two();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let ifft = planner.plan_fft_inverse(fft_size);

        let mut h_fft = vec![Complex::new(0.0, 0.0); fft_size];
        for (slot, &coeff) in h_fft.iter_mut().zip(coefficients.iter()) {
            *slot = Complex::new(coeff, 0.0);
        }
        fft.process(&mut h_fft);

        Self {
            h_fft,
            fft_size,
            block_size,
            filter_length,
            overlap: vec![0.0; filter_length - 1],
            fft,
            ifft,
            work: vec![Complex::new(0.0, 0.0); fft_size],
        }
    }

    /// Convolve one block of at most `block_size` samples
    fn process_chunk(&mut self, input: &[f64], output: &mut Vec<f64>) {
        let n = input.len();
        let tail_len = self.filter_length - 1;

        // 1. Zero-padded complex input
        for (i, slot) in self.work.iter_mut().enumerate() {
            *slot = Complex::new(if i < n { input[i] } else { 0.0 }, 0.0);
        }

        // 2-4. Forward FFT, multiply, inverse FFT
        self.fft.process(&mut self.work);
        for (x, h) in self.work.iter_mut().zip(self.h_fft.iter()) {
            *x *= *h;
        }
        self.ifft.process(&mut self.work);

        let scale = 1.0 / self.fft_size as f64;

        // 5. Overlap-add with the tail of the previous block
        for i in 0..n {
            let carried = if i < tail_len { self.overlap[i] } else { 0.0 };
            output.push(self.work[i].re * scale + carried);
        }

        // 6. New tail: this block's spill plus any older tail not consumed yet
        let mut next_overlap = vec![0.0; tail_len];
        for (j, slot) in next_overlap.iter_mut().enumerate() {
            let carried = if n + j < tail_len { self.overlap[n + j] } else { 0.0 };
            *slot = self.work[n + j].re * scale + carried;
        }
        self.overlap = next_overlap;
    }
}

impl Convolver for FftConvolver {
    fn process_block(&mut self, input: &[f64]) -> Vec<f64> {
        let mut output = Vec::with_capacity(input.len());
        for chunk in input.chunks(self.block_size) {
            self.process_chunk(chunk, &mut output);
        }
        output
    }

    fn reset(&mut self) {
        self.overlap.fill(0.0);
    }

    fn kernel_len(&self) -> usize {
        self.filter_length
    }
}
