//! Respiration demo
//!
//! Generates a noisy breathing signal, filters it, prints breathing rate
//! estimates and writes waveform and spectrum plots.

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use respiration_lab::filters::{design_fir, magnitude_response_db};
use respiration_lab::plot::{plot_spectrum, plot_waveforms};
use respiration_lab::{
    compute_spectrum, estimate_rate_fft, estimate_rate_peaks, filter_waveform, generate,
    unit_impulse, BreathingRate, DemoConfig, FilterDesign, ImpulsePosition, SpectrumConfig,
    WindowType,
};
use std::fs;
use std::path::PathBuf;

/// Simulate a respiratory signal and estimate its breathing rate
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML scenario file (defaults are used for anything it leaves out)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory for the SVG plots
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Seed for the noise generator
    #[arg(short, long)]
    seed: Option<u64>,

    /// Skip writing plots
    #[arg(long, default_value_t = false)]
    no_plot: bool,
}

fn report(method: &str, estimate: respiration_lab::Result<BreathingRate>) {
    match estimate {
        Ok(rate) => match rate.events {
            Some(events) => println!(
                "{:<14} {:6.2} breaths/min ({:.3} Hz, {} events)",
                method, rate.breaths_per_minute, rate.frequency_hz, events
            ),
            None => println!(
                "{:<14} {:6.2} breaths/min ({:.3} Hz)",
                method, rate.breaths_per_minute, rate.frequency_hz
            ),
        },
        Err(e) => {
            warn!("{} estimate failed: {}", method, e);
            println!("{:<14} no estimate ({})", method, e);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DemoConfig::from_file(path)?,
        None => DemoConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.signal.seed = Some(seed);
    }
    if let Some(dir) = args.output_dir {
        config.plot.output_dir = dir;
    }
    if args.no_plot {
        config.plot.enabled = false;
    }
    config.validate().context("Invalid scenario configuration")?;

    // Generate
    let raw = generate(&config.signal).context("Failed to generate signal")?;
    info!(
        "Generated {:.1} s at {} Hz: {} samples, mean {:.3}, rms {:.3}, peak {:.3}",
        raw.duration(),
        raw.sample_rate(),
        raw.len(),
        raw.mean(),
        raw.rms(),
        raw.peak_abs()
    );

    // Filter
    if config.filter.design == FilterDesign::WindowedSinc {
        let kernel = design_fir(&config.filter, raw.sample_rate())?;
        let probe = [0.0, 2.0 * config.signal.breathing_frequency_hz() / raw.sample_rate()];
        let gains = magnitude_response_db(&kernel, &probe);
        info!(
            "FIR kernel: {} taps, {:.2} dB at DC, {:.2} dB at the breathing frequency, {:?} stopband near {} dB",
            kernel.len(),
            gains[0],
            gains[1],
            config.filter.window,
            config.filter.window.stopband_attenuation_db()
        );
    }
    let filtered = filter_waveform(&raw, &config.filter).context("Failed to filter signal")?;
    info!(
        "Filtered with {:?} ({:?}): rms {:.3}",
        config.filter.band,
        config.filter.design,
        filtered.rms()
    );

    // Analyze
    println!(
        "Simulated rate: {:.2} breaths/min",
        config.signal.breathing_rate_bpm
    );
    report("Peak counting", estimate_rate_peaks(&filtered, &config.peaks));
    report("FFT", estimate_rate_fft(&filtered, &config.fft));

    // Plot
    if !config.plot.enabled {
        info!("Plotting disabled");
        return Ok(());
    }

    let dir = &config.plot.output_dir;
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {:?}", dir))?;

    let waveform_path = dir.join("waveforms.svg");
    plot_waveforms(
        &waveform_path,
        "Respiratory signal",
        &[("Raw", &raw), ("Filtered", &filtered)],
    )
    .with_context(|| format!("Failed to plot {:?}", waveform_path))?;

    let spectrum_config = SpectrumConfig {
        window: config.fft.window,
        zero_pad_factor: config.fft.zero_pad_factor,
        remove_mean: true,
    };
    let spectrum = compute_spectrum(&filtered, &spectrum_config)?.normalized();
    let spectrum_path = dir.join("spectrum.svg");
    plot_spectrum(
        &spectrum_path,
        "Filtered signal spectrum (normalized)",
        &spectrum,
        config.plot.max_spectrum_freq_hz,
    )
    .with_context(|| format!("Failed to plot {:?}", spectrum_path))?;

    // Frequency response of the filter, measured on a centered impulse
    let impulse = unit_impulse(raw.len(), raw.sample_rate(), ImpulsePosition::Middle)?;
    let response = filter_waveform(&impulse, &config.filter)?;
    let response_spectrum = compute_spectrum(
        &response,
        &SpectrumConfig {
            window: WindowType::Rectangular,
            zero_pad_factor: 1,
            remove_mean: false,
        },
    )?
    .normalized();
    let response_path = dir.join("impulse_response.svg");
    plot_spectrum(
        &response_path,
        "Filter impulse response spectrum (normalized)",
        &response_spectrum,
        raw.nyquist(),
    )
    .with_context(|| format!("Failed to plot {:?}", response_path))?;

    info!("Plots written to {:?}", dir);
    Ok(())
}
