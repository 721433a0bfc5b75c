//! Differential segmentation: raw A/B readings to bit-length symbol intervals.
//!
//! The capture is first rebased so the first Space reading sits at t = 0.
//! Consecutive readings of the same polarity are then grouped into runs, and
//! a run never spans a full bit period: once the next reading would reach
//! one bit period past the run start, the run closes. The reading that
//! closes a run, whether by elapsed time, polarity flip or noise, is consumed
//! by the close and does not open the next run; only a reading that arrives
//! with no run open can start one. Noise-band readings never start a run.

use log::{debug, warn};

use crate::drivers::sample::{LineLevels, Symbol, THRESHOLD_VOLTS};
use crate::drivers::{DecodeError, Sample};

/// A single-polarity run treated downstream as exactly one bit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SymbolInterval {
    pub start_time: f64,
    pub end_time: f64,
    pub symbol: Symbol,
    /// Normalised line levels recorded at the opening reading.
    pub start_levels: LineLevels,
    /// Normalised line levels recorded at the closing reading.
    pub end_levels: LineLevels,
}

impl SymbolInterval {
    pub fn new(start_time: f64, end_time: f64, symbol: Symbol) -> Self {
        Self {
            start_time,
            end_time,
            symbol,
            start_levels: symbol.levels(),
            end_levels: symbol.levels(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Both boundaries carry the levels of the tagged symbol.
    pub fn is_consistent(&self) -> bool {
        self.start_levels == self.end_levels && self.start_levels == self.symbol.levels()
    }
}

struct Run {
    symbol: Symbol,
    start: f64,
    end: f64,
}

impl Run {
    fn close(self) -> SymbolInterval {
        SymbolInterval::new(self.start, self.end, self.symbol)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Segmenter {
    bit_period: f64,
}

impl Segmenter {
    pub fn from_baud_rate(baud_rate: u32) -> Result<Self, DecodeError> {
        if baud_rate == 0 {
            return Err(DecodeError::InvalidBaudRate);
        }
        Ok(Self {
            bit_period: 1.0 / f64::from(baud_rate),
        })
    }

    pub fn bit_period(&self) -> f64 {
        self.bit_period
    }

    /// Time of the first Space reading, if the capture has one.
    pub fn reference_time(&self, samples: &[Sample]) -> Option<f64> {
        samples
            .iter()
            .find(|s| s.differential() < -THRESHOLD_VOLTS)
            .map(|s| s.time)
    }

    /// Splits a time-ordered capture into symbol intervals on the rebased time axis.
    ///
    /// Without any Space reading the anchor falls back to 0.0 and times are
    /// left as captured.
    pub fn segment(&self, samples: &[Sample]) -> Vec<SymbolInterval> {
        let anchor = match self.reference_time(samples) {
            Some(t) => t,
            None => {
                warn!("no Space reading in capture; keeping the capture time base");
                0.0
            }
        };

        let mut intervals = Vec::new();
        let mut run: Option<Run> = None;
        for sample in samples {
            let time = sample.time - anchor;
            let symbol = sample.symbol(THRESHOLD_VOLTS);
            match run.take() {
                Some(mut open)
                    if symbol == Some(open.symbol) && time - open.start < self.bit_period =>
                {
                    open.end = time;
                    run = Some(open);
                }
                Some(done) => intervals.push(done.close()),
                None => {
                    run = symbol.map(|symbol| Run {
                        symbol,
                        start: time,
                        end: time,
                    });
                }
            }
        }
        if let Some(done) = run {
            intervals.push(done.close());
        }

        debug!(
            "segmented {} samples into {} intervals (anchor {anchor}s, bit period {}s)",
            samples.len(),
            intervals.len(),
            self.bit_period
        );
        intervals
    }
}

/// Two chart points per interval at its normalised boundary levels.
pub fn reshape(intervals: &[SymbolInterval]) -> Vec<Sample> {
    intervals
        .iter()
        .flat_map(|i| [i.start_levels.at(i.start_time), i.end_levels.at(i.end_time)])
        .collect()
}
