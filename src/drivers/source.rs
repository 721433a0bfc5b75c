use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, warn};

use crate::drivers::{DecodeError, Sample};

/// Lines ahead of the data: a header row and a channel-name row.
pub const PREAMBLE_LINES: usize = 2;
/// time, A-line voltage, B-line voltage.
pub const COLUMNS: usize = 3;

/// Something that can produce a fully materialised sample series.
pub trait SampleSource {
    fn load(&mut self) -> Result<Vec<Sample>, DecodeError>;
}

/// In-memory source useful for tests and deterministic replay.
pub struct ManualSource {
    samples: Vec<Sample>,
}

impl ManualSource {
    pub fn new(samples: impl IntoIterator<Item = Sample>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }
}

impl SampleSource for ManualSource {
    fn load(&mut self) -> Result<Vec<Sample>, DecodeError> {
        Ok(self.samples.clone())
    }
}

/// Oscilloscope CSV export: two preamble lines, then `time,A,B` rows.
pub struct CsvSource<R: Read> {
    reader: csv::Reader<R>,
}

impl CsvSource<File> {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let file = File::open(path.as_ref())?;
        debug!("opened {}", path.as_ref().display());
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> CsvSource<R> {
    pub fn from_reader(reader: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        Self { reader }
    }
}

impl<R: Read> SampleSource for CsvSource<R> {
    fn load(&mut self) -> Result<Vec<Sample>, DecodeError> {
        let mut records = self.reader.records();
        for _ in 0..PREAMBLE_LINES {
            match records.next() {
                Some(record) => {
                    record?;
                }
                None => {
                    return Err(DecodeError::MissingPreamble {
                        expected: PREAMBLE_LINES,
                    })
                }
            }
        }

        let mut samples = Vec::new();
        for (index, record) in records.enumerate() {
            let record = record?;
            // 1-based, counting the preamble
            let row = PREAMBLE_LINES + 1 + index;
            if record.len() != COLUMNS {
                warn!(
                    "column mismatch at row {row}: {} fields, expected {COLUMNS}",
                    record.len()
                );
            }
            let mut values = [0.0f64; COLUMNS];
            for (column, value) in values.iter_mut().enumerate() {
                *value = parse_field(record.get(column), row, column + 1)?;
            }
            samples.push(Sample::new(values[0], values[1], values[2]));
        }
        debug!("loaded {} samples", samples.len());
        Ok(samples)
    }
}

fn parse_field(field: Option<&str>, row: usize, column: usize) -> Result<f64, DecodeError> {
    match field {
        None | Some("") => {
            warn!("assigned zero to empty field at row {row}, column {column}");
            Ok(0.0)
        }
        Some(text) => text.parse::<f64>().map_err(|source| DecodeError::Parse {
            row,
            column,
            value: text.to_string(),
            source,
        }),
    }
}
