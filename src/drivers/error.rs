use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("baud rate must be greater than zero")]
    InvalidBaudRate,
    #[error("smoothing window must span at least one sample")]
    InvalidWindow,
    #[error("insufficient data: window of {window} samples but only {available} available")]
    InsufficientData { window: usize, available: usize },
    #[error("data inconsistency in symbol interval {index} (t = {start_time}s): boundary line levels disagree")]
    DataInconsistency { index: usize, start_time: f64 },
    #[error("input ended before the {expected}-line preamble was read")]
    MissingPreamble { expected: usize },
    #[error("row {row}, column {column}: cannot parse {value:?} as a number")]
    Parse {
        row: usize,
        column: usize,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error("failed to read csv input: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to render plot: {0}")]
    Plot(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("malformed configuration file: {0}")]
    ConfigFormat(#[from] serde_json::Error),
}

impl DecodeError {
    /// True for failures raised while acquiring the sample series, before any stage runs.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            DecodeError::MissingPreamble { .. }
                | DecodeError::Parse { .. }
                | DecodeError::Csv(_)
                | DecodeError::Io(_)
        )
    }
}

impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for DecodeError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        DecodeError::Plot(format!("{value:?}"))
    }
}

impl From<image::ImageError> for DecodeError {
    fn from(value: image::ImageError) -> Self {
        DecodeError::Plot(value.to_string())
    }
}
