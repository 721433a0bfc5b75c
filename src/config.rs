//! Decoder configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::drivers::DecodeError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Line rate in bits per second.
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Moving-average span for the denoised chart.
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Chart width in pixels.
    #[serde(default = "default_image_width")]
    pub image_width: u32,
    /// Chart height in pixels.
    #[serde(default = "default_image_height")]
    pub image_height: u32,
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_window_size() -> usize {
    8
}

fn default_image_width() -> u32 {
    640 * 16
}

fn default_image_height() -> u32 {
    640
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            baud_rate: default_baud_rate(),
            window_size: default_window_size(),
            image_width: default_image_width(),
            image_height: default_image_height(),
        }
    }
}

impl DecoderConfig {
    pub fn from_json_str(text: &str) -> Result<Self, DecodeError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Seconds per bit slot.
    pub fn bit_period(&self) -> f64 {
        1.0 / f64::from(self.baud_rate)
    }

    pub fn validate(&self) -> Result<(), DecodeError> {
        if self.baud_rate == 0 {
            return Err(DecodeError::InvalidBaudRate);
        }
        if self.window_size == 0 {
            return Err(DecodeError::InvalidWindow);
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err(DecodeError::Config(format!(
                "image size {}x{} has a zero dimension",
                self.image_width, self.image_height
            )));
        }
        Ok(())
    }
}
