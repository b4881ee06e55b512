//! SVG plots of waveforms and spectra

use crate::error::{Result, SignalError};
use crate::spectrum::Spectrum;
use crate::waveform::Waveform;
use plotters::prelude::*;
use std::path::Path;

const PANEL_WIDTH: u32 = 1200;
const PANEL_HEIGHT: u32 = 320;

fn plot_error(context: &str, e: impl std::fmt::Display) -> SignalError {
    SignalError::Plot(format!("{}: {}", context, e))
}

/// Value range padded so flat data still gets a visible axis
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (-1.0, 1.0);
    }
    let margin = if max > min { 0.05 * (max - min) } else { 1.0 };
    (min - margin, max + margin)
}

/// Stack one panel per waveform, sharing nothing but the title
///
/// # Arguments
/// * `path` - Output SVG file
/// * `title` - Figure title
/// * `series` - (label, waveform) pairs, top to bottom
pub fn plot_waveforms(path: &Path, title: &str, series: &[(&str, &Waveform)]) -> Result<()> {
    if series.is_empty() {
        return Err(SignalError::invalid("series", "nothing to plot"));
    }
    if let Some((_, empty)) = series.iter().find(|(_, w)| w.is_empty()) {
        return Err(SignalError::InsufficientData {
            required: 1,
            actual: empty.len(),
        });
    }

    let height = PANEL_HEIGHT * series.len() as u32 + 40;
    let root = SVGBackend::new(path, (PANEL_WIDTH, height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_error("Failed to fill drawing area", e))?;
    let root = root
        .titled(title, ("sans-serif", 24.0).into_font())
        .map_err(|e| plot_error("Failed to draw title", e))?;

    let panels = root.split_evenly((series.len(), 1));
    for (idx, ((label, waveform), panel)) in series.iter().zip(panels.iter()).enumerate() {
        let t0 = waveform.start_time();
        let t1 = waveform.time_at(waveform.len() - 1).max(t0 + 1.0 / waveform.sample_rate());
        let (y0, y1) = padded_range(waveform.samples().iter().copied());

        let mut chart = ChartBuilder::on(panel)
            .caption(*label, ("sans-serif", 18.0).into_font())
            .margin(10)
            .x_label_area_size(35)
            .y_label_area_size(55)
            .build_cartesian_2d(t0..t1, y0..y1)
            .map_err(|e| plot_error("Failed to build chart", e))?;

        chart
            .configure_mesh()
            .x_desc("Time [s]")
            .y_desc("Amplitude")
            .draw()
            .map_err(|e| plot_error("Failed to draw mesh", e))?;

        chart
            .draw_series(LineSeries::new(
                waveform.times().into_iter().zip(waveform.samples().iter().copied()),
                Palette99::pick(idx).stroke_width(1),
            ))
            .map_err(|e| plot_error("Failed to draw series", e))?;
    }

    root.present().map_err(|e| plot_error("Failed to write plot", e))?;
    log::debug!("Wrote {} waveform panels to {}", series.len(), path.display());
    Ok(())
}

/// Plot spectrum magnitudes from 0 Hz up to `max_freq_hz`
pub fn plot_spectrum(path: &Path, title: &str, spectrum: &Spectrum, max_freq_hz: f64) -> Result<()> {
    if !max_freq_hz.is_finite() || max_freq_hz <= 0.0 {
        return Err(SignalError::invalid(
            "max_freq_hz",
            format!("must be a finite value > 0 (got {})", max_freq_hz),
        ));
    }

    let bins: Vec<(f64, f64)> = spectrum
        .bins()
        .iter()
        .filter(|b| b.frequency_hz <= max_freq_hz)
        .map(|b| (b.frequency_hz, b.magnitude))
        .collect();
    if bins.len() < 2 {
        return Err(SignalError::InsufficientData {
            required: 2,
            actual: bins.len(),
        });
    }

    let root = SVGBackend::new(path, (PANEL_WIDTH, 2 * PANEL_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_error("Failed to fill drawing area", e))?;

    let x_max = bins[bins.len() - 1].0;
    let (_, y_max) = padded_range(bins.iter().map(|&(_, m)| m));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24.0).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)
        .map_err(|e| plot_error("Failed to build chart", e))?;

    chart
        .configure_mesh()
        .x_desc("Frequency [Hz]")
        .y_desc("Magnitude")
        .draw()
        .map_err(|e| plot_error("Failed to draw mesh", e))?;

    chart
        .draw_series(LineSeries::new(bins, BLUE.stroke_width(1)))
        .map_err(|e| plot_error("Failed to draw series", e))?;

    root.present().map_err(|e| plot_error("Failed to write plot", e))?;
    log::debug!("Wrote spectrum plot to {}", path.display());
    Ok(())
}
