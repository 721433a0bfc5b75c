use log::debug;

use crate::drivers::{DecodeError, Sample};

/// Causal moving-average over both line voltages.
///
/// Output sample `i` averages raw samples `i..i + window` and carries the
/// timestamp of raw sample `i + window`, so the output is `window` samples
/// shorter than the input.
#[derive(Clone, Copy, Debug)]
pub struct MovingAverage {
    window: usize,
}

impl MovingAverage {
    pub fn new(window: usize) -> Result<Self, DecodeError> {
        if window == 0 {
            return Err(DecodeError::InvalidWindow);
        }
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn apply(&self, samples: &[Sample]) -> Result<Vec<Sample>, DecodeError> {
        let window = self.window;
        if samples.len() < window {
            return Err(DecodeError::InsufficientData {
                window,
                available: samples.len(),
            });
        }
        let scale = window as f64;

        let (mut mean_a, mut mean_b) = samples[..window]
            .iter()
            .fold((0.0f64, 0.0f64), |(a, b), s| (a + s.voltage_a, b + s.voltage_b));
        mean_a /= scale;
        mean_b /= scale;

        let mut smoothed = Vec::with_capacity(samples.len() - window);
        for (oldest, newest) in samples.iter().zip(&samples[window..]) {
            smoothed.push(Sample::new(newest.time, mean_a, mean_b));
            // Slide: drop the oldest contribution, then add the newest.
            mean_a -= oldest.voltage_a / scale;
            mean_b -= oldest.voltage_b / scale;
            mean_a += newest.voltage_a / scale;
            mean_b += newest.voltage_b / scale;
        }
        debug!(
            "smoothed {} samples into {} (window {window})",
            samples.len(),
            smoothed.len()
        );
        Ok(smoothed)
    }
}

/// Convenience wrapper around [`MovingAverage`].
pub fn smooth(samples: &[Sample], window: usize) -> Result<Vec<Sample>, DecodeError> {
    MovingAverage::new(window)?.apply(samples)
}
