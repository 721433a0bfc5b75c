// Signal path: source -> smoothing / segmenter -> framer, plus chart and dump output.
pub mod dump;
pub mod error;
pub mod framer;
pub mod pipeline;
pub mod plot;
pub mod sample;
pub mod segmenter;
pub mod smoothing;
pub mod source;
#[cfg(test)]
pub(crate) mod testutil;

pub use dump::{hex_dump, HexDump};
pub use error::DecodeError;
pub use framer::{decode, DecodedBit, DecodedByte, FramerState, UartFramer, UartTrace};
pub use pipeline::{analyze, Analysis, DecodePipeline};
pub use plot::{render_series_png, ChartOptions, PlotStyle};
pub use sample::{LineLevels, Sample, Symbol, THRESHOLD_VOLTS};
pub use segmenter::{reshape, Segmenter, SymbolInterval};
pub use smoothing::{smooth, MovingAverage};
pub use source::{CsvSource, ManualSource, SampleSource};
