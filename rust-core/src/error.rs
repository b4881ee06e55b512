//! Error type shared by every signal operation

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Insufficient data: need at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("No breathing detected: {0}")]
    NoBreathDetected(String),

    #[error("FFT processing failed: {0}")]
    Fft(String),

    #[error("Failed to render plot: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, SignalError>;

impl SignalError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SignalError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Reject values that are not finite and strictly positive
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SignalError::invalid(
            name,
            format!("must be a finite value > 0 (got {})", value),
        ));
    }
    Ok(())
}

/// Reject frequencies outside (0, nyquist)
pub(crate) fn ensure_below_nyquist(name: &'static str, frequency: f64, sample_rate: f64) -> Result<()> {
    ensure_positive(name, frequency)?;
    let nyquist = sample_rate / 2.0;
    if frequency >= nyquist {
        return Err(SignalError::invalid(
            name,
            format!("{} Hz is not below the Nyquist frequency ({} Hz)", frequency, nyquist),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SignalError::InsufficientData { required: 10, actual: 3 };
        assert_eq!(err.to_string(), "Insufficient data: need at least 10 samples, got 3");

        let err = SignalError::invalid("sample_rate", "must be > 0");
        assert!(err.to_string().contains("sample_rate"));
    }

    #[test]
    fn test_nyquist_check() {
        assert!(ensure_below_nyquist("cutoff", 1.0, 50.0).is_ok());
        assert!(ensure_below_nyquist("cutoff", 25.0, 50.0).is_err());
        assert!(ensure_below_nyquist("cutoff", -1.0, 50.0).is_err());
        assert!(ensure_positive("duration", f64::NAN).is_err());
    }
}
