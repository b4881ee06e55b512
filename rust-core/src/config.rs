//! Demo scenario configuration
//!
//! Every section and field is optional in the YAML file; missing values fall
//! back to the defaults, which describe a 60 s recording at 50 Hz breathing at
//! 15 breaths/min with Gaussian noise of 0.1, low-pass filtered at 1 Hz.

use crate::filters::FilterParams;
use crate::generator::SignalSpec;
use crate::rate::{FftRateConfig, PeakConfig};
use anyhow::Context;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub enabled: bool,
    pub output_dir: PathBuf,
    /// Upper frequency limit of the spectrum plot
    pub max_spectrum_freq_hz: f64,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: PathBuf::from("plots"),
            max_spectrum_freq_hz: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DemoConfig {
    pub signal: SignalSpec,
    pub filter: FilterParams,
    pub peaks: PeakConfig,
    pub fft: FftRateConfig,
    pub plot: PlotConfig,
}

impl DemoConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {:?}", path);

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;
        let config = Self::from_yaml(&contents)
            .with_context(|| format!("Failed to parse YAML configuration from {:?}", path))?;

        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(contents: &str) -> anyhow::Result<Self> {
        let config: DemoConfig = serde_yml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section before any work starts
    pub fn validate(&self) -> crate::Result<()> {
        self.signal.validate()?;
        self.filter.validate(self.signal.sample_rate_hz)?;
        self.peaks.validate()?;
        self.fft.validate(self.signal.sample_rate_hz)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{FilterBand, FilterDesign};
    use crate::rate::PeakMethod;
    use std::io::Write;

    #[test]
    fn test_defaults_describe_the_scenario() {
        let config = DemoConfig::default();

        assert_eq!(config.signal.duration_s, 60.0);
        assert_eq!(config.signal.sample_rate_hz, 50.0);
        assert_eq!(config.signal.breathing_rate_bpm, 15.0);
        assert_eq!(config.signal.noise.amplitude, 0.1);
        assert_eq!(config.filter.band, FilterBand::LowPass { cutoff_hz: 1.0 });
        assert!(config.plot.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
signal:
  breathing_rate_bpm: 20
  seed: 3
filter:
  band:
    type: band_pass
    low_hz: 0.1
    high_hz: 1.0
  order: 4
  design: butterworth
peaks:
  method: zero_crossings
plot:
  enabled: false
"#;
        let config = DemoConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.signal.breathing_rate_bpm, 20.0);
        assert_eq!(config.signal.duration_s, 60.0);
        assert_eq!(config.filter.design, FilterDesign::Butterworth);
        assert_eq!(config.filter.order, Some(4));
        assert_eq!(config.peaks.method, PeakMethod::ZeroCrossings);
        assert_eq!(config.peaks.threshold, 0.3);
        assert!(!config.plot.enabled);
        assert_eq!(config.plot.output_dir, PathBuf::from("plots"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let yaml = "filter:\n  band:\n    type: low_pass\n    cutoff_hz: 30.0\n";
        assert!(DemoConfig::from_yaml(yaml).is_err());

        assert!(DemoConfig::from_yaml("signal:\n  duration_s: -1\n").is_err());
        assert!(DemoConfig::from_yaml("signal: [1, 2]\n").is_err());

        assert!(DemoConfig::from_yaml("fft:\n  zero_pad_factor: 0\n").is_err());
        assert!(DemoConfig::from_yaml("fft:\n  zero_pad_factor: 100000000000\n").is_err());
        assert!(DemoConfig::from_yaml("fft:\n  min_duration_s: -5\n").is_err());
        assert!(DemoConfig::from_yaml("fft:\n  zero_pad_factor: 16\n  min_duration_s: 20\n").is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "signal:\n  sample_rate_hz: 125").unwrap();

        let config = DemoConfig::from_file(file.path()).unwrap();
        assert_eq!(config.signal.sample_rate_hz, 125.0);

        let missing = DemoConfig::from_file("/nonexistent/config.yaml");
        assert!(missing.is_err());
    }
}
