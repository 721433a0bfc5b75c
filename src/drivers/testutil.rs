//! Synthetic RS-485 captures for tests.

use crate::drivers::Sample;

/// A/B voltages while the bus drives a Mark.
pub const MARK: (f64, f64) = (3.5, 1.5);
/// A/B voltages while the bus drives a Space.
pub const SPACE: (f64, f64) = (1.5, 3.5);

pub const SAMPLES_PER_BIT: usize = 10;
/// The simulated transmitter runs slightly slow against a 9600 baud decoder.
pub const TX_BIT_PERIOD: f64 = 1.0 / 9590.0;
/// Capture start relative to the scope trigger.
pub const CAPTURE_OFFSET: f64 = -2.0e-3;

/// 8N1 bits for back-to-back frames: start, data LSB first, stop.
pub fn frame_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 10);
    for byte in bytes {
        bits.push(0);
        bits.extend((0..8).map(|i| (byte >> i) & 1));
        bits.push(1);
    }
    bits
}

pub fn waveform(bits: &[u8]) -> Vec<Sample> {
    let dt = TX_BIT_PERIOD / SAMPLES_PER_BIT as f64;
    bits.iter()
        .flat_map(|bit| std::iter::repeat(*bit).take(SAMPLES_PER_BIT))
        .enumerate()
        .map(|(idx, bit)| {
            let (a, b) = if bit == 1 { MARK } else { SPACE };
            Sample::new(CAPTURE_OFFSET + idx as f64 * dt, a, b)
        })
        .collect()
}

/// Idle Mark bits around back-to-back frames carrying `bytes`.
pub fn uart_capture(bytes: &[u8], idle_before: usize, idle_after: usize) -> Vec<Sample> {
    let mut bits = vec![1u8; idle_before];
    bits.extend(frame_bits(bytes));
    bits.extend(std::iter::repeat(1u8).take(idle_after));
    waveform(&bits)
}
