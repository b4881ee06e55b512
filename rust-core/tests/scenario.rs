use approx::assert_abs_diff_eq;
use respiration_lab::plot::{plot_spectrum, plot_waveforms};
use respiration_lab::{
    compute_spectrum, downsample, estimate_rate_fft, estimate_rate_peaks, filter_waveform,
    generate, resample, sine_wave, DemoConfig, FftRateConfig, FilterParams, NoiseSpec,
    PeakConfig, SignalSpec, SpectrumConfig, Waveform,
};

fn scenario(seed: u64) -> SignalSpec {
    SignalSpec {
        seed: Some(seed),
        ..DemoConfig::default().signal
    }
}

fn difference_rms(a: &Waveform, b: &Waveform) -> f64 {
    a.mix(&b.scaled(-1.0)).unwrap().rms()
}

fn dominant_frequency(waveform: &Waveform) -> f64 {
    let spectrum = compute_spectrum(
        waveform,
        &SpectrumConfig {
            zero_pad_factor: 8,
            ..SpectrumConfig::default()
        },
    )
    .unwrap();
    let peak = spectrum.peak_in_band(0.05, waveform.nyquist()).unwrap();
    spectrum.bins()[peak].frequency_hz
}

#[test]
fn test_scenario_rates_within_one_breath() {
    let config = DemoConfig::default();

    for seed in [1, 2, 3] {
        let raw = generate(&scenario(seed)).unwrap();
        assert_eq!(raw.len(), 3000);

        for params in [config.filter, config.filter.butterworth()] {
            let filtered = filter_waveform(&raw, &params).unwrap();

            let peaks = estimate_rate_peaks(&filtered, &PeakConfig::default()).unwrap();
            let crossings = estimate_rate_peaks(&filtered, &PeakConfig::zero_crossings()).unwrap();
            let fft = estimate_rate_fft(&filtered, &FftRateConfig::default()).unwrap();

            for rate in [peaks, crossings, fft] {
                assert_abs_diff_eq!(rate.breaths_per_minute, 15.0, epsilon = 1.0);
            }
            assert!((peaks.breaths_per_minute - fft.breaths_per_minute).abs() < 1.0);
        }
    }
}

#[test]
fn test_sample_count_matches_duration() {
    for (duration_s, sample_rate_hz) in [(60.0, 50.0), (10.0, 125.0), (2.5, 4.0)] {
        let spec = SignalSpec {
            duration_s,
            sample_rate_hz,
            ..scenario(0)
        };
        let wave = generate(&spec).unwrap();
        assert_eq!(wave.len(), (duration_s * sample_rate_hz).round() as usize);
        assert_abs_diff_eq!(wave.duration(), duration_s, epsilon = 1e-9);
    }
}

#[test]
fn test_lowpass_keeps_dominant_frequency() {
    let sine = sine_wave(60.0, 50.0, 0.3, 1.0).unwrap();

    for params in [FilterParams::low_pass(1.0), FilterParams::low_pass(1.0).butterworth()] {
        let filtered = filter_waveform(&sine, &params).unwrap();
        assert_abs_diff_eq!(dominant_frequency(&filtered), dominant_frequency(&sine), epsilon = 0.005);
        assert_abs_diff_eq!(dominant_frequency(&filtered), 0.3, epsilon = 0.005);
    }
}

#[test]
fn test_refiltering_changes_little() {
    let raw = generate(&scenario(11)).unwrap();

    for params in [FilterParams::low_pass(1.0), FilterParams::low_pass(1.0).butterworth()] {
        let once = filter_waveform(&raw, &params).unwrap();
        let twice = filter_waveform(&once, &params).unwrap();

        let first_change = difference_rms(&once, &raw);
        let second_change = difference_rms(&twice, &once);
        assert!(
            second_change < 0.2 * first_change,
            "{:?}: {} vs {}",
            params.design,
            second_change,
            first_change
        );
    }
}

#[test]
fn test_clean_signal_estimators_agree() {
    let spec = SignalSpec {
        breathing_rate_bpm: 12.0,
        noise: NoiseSpec::none(),
        ..scenario(0)
    };
    let clean = generate(&spec).unwrap();

    let peaks = estimate_rate_peaks(&clean, &PeakConfig::default()).unwrap();
    let fft = estimate_rate_fft(&clean, &FftRateConfig::default()).unwrap();

    assert_abs_diff_eq!(peaks.breaths_per_minute, 12.0, epsilon = 0.1);
    assert_abs_diff_eq!(fft.breaths_per_minute, 12.0, epsilon = 0.1);
}

#[test]
fn test_rate_survives_sample_rate_changes() {
    let raw = generate(&scenario(5)).unwrap();
    let filtered = filter_waveform(&raw, &FilterParams::low_pass(1.0)).unwrap();

    let decimated = downsample(&filtered, 5, true).unwrap();
    assert_eq!(decimated.len(), 600);
    assert_abs_diff_eq!(decimated.sample_rate(), 10.0);

    let resampled = resample(&filtered, 1200).unwrap();
    assert_abs_diff_eq!(resampled.sample_rate(), 20.0);

    for wave in [decimated, resampled] {
        let rate = estimate_rate_fft(&wave, &FftRateConfig::default()).unwrap();
        assert_abs_diff_eq!(rate.breaths_per_minute, 15.0, epsilon = 1.0);
    }
}

#[test]
fn test_plots_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let raw = generate(&scenario(8)).unwrap();
    let filtered = filter_waveform(&raw, &FilterParams::low_pass(1.0)).unwrap();

    let waves = dir.path().join("waveforms.svg");
    plot_waveforms(&waves, "Scenario", &[("Raw", &raw), ("Filtered", &filtered)]).unwrap();

    let spectrum = compute_spectrum(&filtered, &SpectrumConfig::default())
        .unwrap()
        .normalized();
    let spectrum_path = dir.path().join("spectrum.svg");
    plot_spectrum(&spectrum_path, "Spectrum", &spectrum, 2.0).unwrap();

    for path in [waves, spectrum_path] {
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("<svg"), "{:?} is not an SVG", path);
    }
}
