use log::info;

use crate::config::DecoderConfig;
use crate::drivers::framer::{UartFramer, UartTrace};
use crate::drivers::segmenter::{reshape, Segmenter, SymbolInterval};
use crate::drivers::smoothing::MovingAverage;
use crate::drivers::source::SampleSource;
use crate::drivers::{DecodeError, Sample};

/// Every intermediate product of one decode, ready for charting.
#[derive(Clone, Debug)]
pub struct Analysis {
    pub raw: Vec<Sample>,
    pub smoothed: Vec<Sample>,
    pub intervals: Vec<SymbolInterval>,
    pub reshaped: Vec<Sample>,
    pub trace: UartTrace,
}

/// Runs smoothing and segmentation over the same raw capture, then frames
/// the segmented intervals. Smoothing only feeds the denoised chart.
pub fn analyze(raw: Vec<Sample>, config: &DecoderConfig) -> Result<Analysis, DecodeError> {
    config.validate()?;
    let smoothed = MovingAverage::new(config.window_size)?.apply(&raw)?;
    let segmenter = Segmenter::from_baud_rate(config.baud_rate)?;
    let intervals = segmenter.segment(&raw);
    let reshaped = reshape(&intervals);
    let trace = UartFramer::new().decode(&intervals)?;
    info!(
        "decoded {} bytes from {} samples ({} intervals)",
        trace.bytes.len(),
        raw.len(),
        intervals.len()
    );
    Ok(Analysis {
        raw,
        smoothed,
        intervals,
        reshaped,
        trace,
    })
}

/// High level pipeline that pulls a capture from a source and decodes it.
pub struct DecodePipeline<S: SampleSource> {
    source: S,
    config: DecoderConfig,
}

impl<S: SampleSource> DecodePipeline<S> {
    pub fn new(source: S, config: DecoderConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn run(&mut self) -> Result<Analysis, DecodeError> {
        let raw = self.source.load()?;
        analyze(raw, &self.config)
    }
}
