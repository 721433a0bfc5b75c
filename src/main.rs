// src/main.rs
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use pulseinsight::drivers::{
    hex_dump, render_series_png, Analysis, ChartOptions, CsvSource, DecodePipeline, PlotStyle,
};
use pulseinsight::DecoderConfig;

#[derive(Parser, Debug)]
#[command(name = "pulseinsight", version, about = "Analyze RS-485/422 bus voltage captures")]
struct Cli {
    /// Line rate in bits per second
    #[arg(long, visible_alias = "baud", global = true)]
    baudrate: Option<u32>,
    /// Chart width in pixels
    #[arg(long, short = 'W', visible_alias = "Wpx", global = true)]
    width: Option<u32>,
    /// Chart height in pixels
    #[arg(long, short = 'H', visible_alias = "Hpx", global = true)]
    height: Option<u32>,
    /// Moving-average window for the filtered chart
    #[arg(long, global = true)]
    window: Option<usize>,
    /// JSON file with decoder settings; flags take precedence
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a CSV capture (time, A-line volts, B-line volts)
    Csv { file: PathBuf },
}

impl Cli {
    fn decoder_config(&self) -> Result<DecoderConfig> {
        let mut config = match &self.config {
            Some(path) => DecoderConfig::from_json_file(path)
                .with_context(|| format!("cannot load config {}", path.display()))?,
            None => DecoderConfig::default(),
        };
        if let Some(baud_rate) = self.baudrate {
            config.baud_rate = baud_rate;
        }
        if let Some(width) = self.width {
            config.image_width = width;
        }
        if let Some(height) = self.height {
            config.image_height = height;
        }
        if let Some(window) = self.window {
            config.window_size = window;
        }
        config.validate()?;
        Ok(config)
    }
}

/// `<dir>/<stem>_<ext>_<suffix>.png` next to the capture.
fn chart_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}_{}_{suffix}.png", ext.to_string_lossy()),
        None => format!("{stem}_{suffix}.png"),
    };
    input.with_file_name(name)
}

fn write_charts(input: &Path, analysis: &Analysis, style: &PlotStyle) {
    let time = "time (s)";
    let volts = "voltage (V)";
    let normalised = "normalised [1, -1]";
    let charts = [
        (
            "voltage",
            &analysis.raw,
            ChartOptions::new("A/B line voltage over time", time, volts),
        ),
        (
            "filtered",
            &analysis.smoothed,
            ChartOptions::new("after low-pass filter", time, volts),
        ),
        (
            "reshaped",
            &analysis.reshaped,
            ChartOptions::new("after reshaping", time, normalised),
        ),
        (
            "uart",
            &analysis.reshaped,
            ChartOptions::new("UART", time, normalised)
                .with_trace(&analysis.trace.bits, &analysis.trace.bytes),
        ),
    ];
    for (suffix, samples, options) in charts {
        let path = chart_path(input, suffix);
        let written = render_series_png(samples, &options, style)
            .and_then(|png| std::fs::write(&path, png).map_err(Into::into));
        match written {
            Ok(()) => info!("wrote {}", path.display()),
            // charts are a convenience; the decode result still stands
            Err(err) => warn!("chart {} not written: {err}", path.display()),
        }
    }
}

fn insight_csv(path: &Path, config: DecoderConfig) -> Result<()> {
    println!("input file \"{}\"", path.display());
    let source = CsvSource::from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;
    let style = PlotStyle::with_size(config.image_width, config.image_height);
    let mut pipeline = DecodePipeline::new(source, config);
    let analysis = pipeline
        .run()
        .with_context(|| format!("failed to analyze {}", path.display()))?;

    write_charts(path, &analysis, &style);

    let octets = analysis.trace.octets();
    if !octets.is_empty() {
        print!("{}", hex_dump(&octets));
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = cli.decoder_config()?;
    match &cli.command {
        Command::Csv { file } => insight_csv(file, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_names_keep_the_extension() {
        let path = chart_path(Path::new("captures/bus1.csv"), "uart");
        assert_eq!(path, PathBuf::from("captures/bus1_csv_uart.png"));
        let bare = chart_path(Path::new("bus1"), "voltage");
        assert_eq!(bare, PathBuf::from("bus1_voltage.png"));
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from(["pulseinsight", "--baud", "19200", "-W", "800", "csv", "a.csv"])
            .unwrap();
        let config = cli.decoder_config().unwrap();
        assert_eq!(config.baud_rate, 19200);
        assert_eq!(config.image_width, 800);
        assert_eq!(config.image_height, 640);
        assert_eq!(config.window_size, 8);
    }

    #[test]
    fn zero_baud_rate_is_refused() {
        let cli = Cli::try_parse_from(["pulseinsight", "csv", "a.csv", "--baudrate", "0"]).unwrap();
        assert!(cli.decoder_config().is_err());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["pulseinsight"]).is_err());
    }
}
