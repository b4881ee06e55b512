//! Filter parameter record passed by value into filter operations

use super::windows::WindowType;
use crate::error::{ensure_below_nyquist, Result, SignalError};
use serde::{Deserialize, Serialize};

/// Butterworth order used when none is given
pub const DEFAULT_BUTTERWORTH_ORDER: usize = 5;

/// Highest accepted Butterworth order
pub const MAX_BUTTERWORTH_ORDER: usize = 20;

/// Pass band of a filter, frequencies in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterBand {
    LowPass { cutoff_hz: f64 },
    HighPass { cutoff_hz: f64 },
    BandPass { low_hz: f64, high_hz: f64 },
}

/// Filter design method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterDesign {
    /// Linear-phase FIR designed with the window method
    #[default]
    WindowedSinc,

    /// Butterworth IIR applied forward and backward
    Butterworth,
}

/// Filter configuration: band, order, window and design method
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    pub band: FilterBand,

    /// FIR: taps - 1. Butterworth: number of poles. `None` picks a default.
    #[serde(default)]
    pub order: Option<usize>,

    #[serde(default)]
    pub window: WindowType,

    #[serde(default)]
    pub design: FilterDesign,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self::low_pass(1.0)
    }
}

impl FilterParams {
    pub fn low_pass(cutoff_hz: f64) -> Self {
        Self::with_band(FilterBand::LowPass { cutoff_hz })
    }

    pub fn high_pass(cutoff_hz: f64) -> Self {
        Self::with_band(FilterBand::HighPass { cutoff_hz })
    }

    pub fn band_pass(low_hz: f64, high_hz: f64) -> Self {
        Self::with_band(FilterBand::BandPass { low_hz, high_hz })
    }

    fn with_band(band: FilterBand) -> Self {
        Self {
            band,
            order: None,
            window: WindowType::Hamming,
            design: FilterDesign::WindowedSinc,
        }
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_window(mut self, window: WindowType) -> Self {
        self.window = window;
        self
    }

    pub fn butterworth(mut self) -> Self {
        self.design = FilterDesign::Butterworth;
        self
    }

    /// Check the band against the Nyquist frequency of `sample_rate`
    pub fn validate(&self, sample_rate: f64) -> Result<()> {
        match self.band {
            FilterBand::LowPass { cutoff_hz } | FilterBand::HighPass { cutoff_hz } => {
                ensure_below_nyquist("cutoff_hz", cutoff_hz, sample_rate)?;
            }
            FilterBand::BandPass { low_hz, high_hz } => {
                ensure_below_nyquist("low_hz", low_hz, sample_rate)?;
                ensure_below_nyquist("high_hz", high_hz, sample_rate)?;
                if low_hz >= high_hz {
                    return Err(SignalError::invalid(
                        "low_hz",
                        format!("band edges must satisfy low < high (got {} >= {})", low_hz, high_hz),
                    ));
                }
            }
        }

        if let Some(order) = self.order {
            if order == 0 {
                return Err(SignalError::invalid("order", "must be at least 1"));
            }
            if self.design == FilterDesign::Butterworth && order > MAX_BUTTERWORTH_ORDER {
                return Err(SignalError::invalid(
                    "order",
                    format!("Butterworth order is limited to {}", MAX_BUTTERWORTH_ORDER),
                ));
            }
        }

        Ok(())
    }

    /// Number of FIR taps (always odd)
    ///
    /// Without an explicit order the length follows from the window's
    /// mainlobe width and a transition band of half the narrowest band
    /// feature (cutoff, distance to Nyquist, or band width).
    pub fn fir_length(&self, sample_rate: f64) -> usize {
        match self.order {
            Some(order) => order + 1 + order % 2,
            None => {
                let nyquist = sample_rate / 2.0;
                let narrowest = match self.band {
                    FilterBand::LowPass { cutoff_hz } | FilterBand::HighPass { cutoff_hz } => {
                        cutoff_hz.min(nyquist - cutoff_hz)
                    }
                    FilterBand::BandPass { low_hz, high_hz } => {
                        low_hz.min(nyquist - high_hz).min(high_hz - low_hz)
                    }
                };
                self.window
                    .filter_length_for_transition(narrowest / 2.0, sample_rate)
            }
        }
    }

    pub fn butterworth_order(&self) -> usize {
        self.order.unwrap_or(DEFAULT_BUTTERWORTH_ORDER)
    }
}
