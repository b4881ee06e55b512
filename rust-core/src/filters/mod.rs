//! Filter design and zero-phase waveform filtering

pub mod windows;
pub mod params;
pub mod design;
pub mod fir;
pub mod fast_fir;
pub mod iir;
pub mod median;
pub mod resample;

pub use windows::{WindowType, generate_window};
pub use params::{FilterBand, FilterDesign, FilterParams};
pub use design::{design_fir, design_bandpass_fir, design_lowpass_fir, design_highpass_fir, frequency_response, magnitude_response_db};
pub use fir::{filter_zero_phase, Convolver, DirectConvolver};
pub use fast_fir::FftConvolver;
pub use iir::{design_butterworth, filter_butterworth, Biquad};
pub use median::median_filter;
pub use resample::{downsample, resample};

use crate::error::Result;
use crate::waveform::Waveform;

/// Low-, high- or band-pass filter a waveform
///
/// Returns a new waveform of the same length with no phase shift. Fails with
/// `InvalidParameter` for cutoffs outside (0, Nyquist) and `InsufficientData`
/// when the waveform is shorter than the filter needs.
pub fn filter_waveform(waveform: &Waveform, params: &FilterParams) -> Result<Waveform> {
    match params.design {
        FilterDesign::WindowedSinc => {
            let kernel = design_fir(params, waveform.sample_rate())?;
            filter_zero_phase(waveform, kernel)
        }
        FilterDesign::Butterworth => filter_butterworth(waveform, params),
    }
}
