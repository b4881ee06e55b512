//! Median filter
//!
//! Replaces each sample by the median of its neighbourhood. Effective against
//! isolated spikes, much less so against periodic interference.

use crate::error::{Result, SignalError};
use crate::waveform::Waveform;

/// Median-filter a waveform with an odd `kernel_size`, zero-padding the edges
pub fn median_filter(waveform: &Waveform, kernel_size: usize) -> Result<Waveform> {
    if kernel_size == 0 || kernel_size % 2 == 0 {
        return Err(SignalError::invalid(
            "kernel_size",
            format!("must be odd and positive (got {})", kernel_size),
        ));
    }

    let samples = waveform.samples();
    let half = kernel_size / 2;
    let mut neighbourhood = Vec::with_capacity(kernel_size);

    let filtered = (0..samples.len())
        .map(|i| {
            neighbourhood.clear();
            for offset in 0..kernel_size {
                // Index i + offset - half, zero outside the waveform
                let value = (i + offset)
                    .checked_sub(half)
                    .and_then(|j| samples.get(j))
                    .copied()
                    .unwrap_or(0.0);
                neighbourhood.push(value);
            }
            neighbourhood.sort_by(f64::total_cmp);
            neighbourhood[half]
        })
        .collect();

    Ok(waveform.derive(filtered))
}
