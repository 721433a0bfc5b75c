//! Recovers 8N1 UART bytes from differential RS-485/RS-422 voltage captures.
pub mod config;
pub mod drivers;

pub use config::DecoderConfig;
pub use drivers::DecodeError;
