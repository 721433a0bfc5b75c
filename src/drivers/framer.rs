//! 8N1 UART framing over symbol intervals.

use std::fmt;

use log::debug;

use crate::drivers::sample::Symbol;
use crate::drivers::segmenter::SymbolInterval;
use crate::drivers::DecodeError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramerState {
    Idle,
    Start,
    Bit0,
    Bit1,
    Bit2,
    Bit3,
    Bit4,
    Bit5,
    Bit6,
    Bit7,
    Stop,
    Error,
}

impl FramerState {
    /// Transition on one symbol. Stop and Error resynchronise on a Space
    /// without waiting for an idle gap.
    pub fn next(self, symbol: Symbol) -> FramerState {
        use FramerState::*;
        match (self, symbol) {
            (Idle, Symbol::Space) => Start,
            (Idle, Symbol::Mark) => Idle,
            (Start, _) => Bit0,
            (Bit0, _) => Bit1,
            (Bit1, _) => Bit2,
            (Bit2, _) => Bit3,
            (Bit3, _) => Bit4,
            (Bit4, _) => Bit5,
            (Bit5, _) => Bit6,
            (Bit6, _) => Bit7,
            (Bit7, Symbol::Space) => Error,
            (Bit7, Symbol::Mark) => Stop,
            (Stop, Symbol::Space) => Start,
            (Stop, Symbol::Mark) => Idle,
            (Error, Symbol::Space) => Start,
            (Error, Symbol::Mark) => Stop,
        }
    }

    /// Octet bit written on entry to a data state.
    fn data_position(self) -> Option<u8> {
        use FramerState::*;
        match self {
            Bit0 => Some(0),
            Bit1 => Some(1),
            Bit2 => Some(2),
            Bit3 => Some(3),
            Bit4 => Some(4),
            Bit5 => Some(5),
            Bit6 => Some(6),
            Bit7 => Some(7),
            Idle | Start | Stop | Error => None,
        }
    }
}

impl fmt::Display for FramerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.data_position() {
            Some(pos) => write!(f, "Bit#{pos}"),
            None => f.write_str(match self {
                FramerState::Idle => "IDLE",
                FramerState::Start => "START",
                FramerState::Stop => "STOP",
                _ => "ERROR",
            }),
        }
    }
}

/// One consumed interval and the state it led to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodedBit {
    pub start_time: f64,
    pub end_time: f64,
    pub state: FramerState,
    pub bit: u8,
}

impl fmt::Display for DecodedBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.bit, self.state)
    }
}

/// A complete frame, from its start bit to the end of its stop bit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodedByte {
    pub start_time: f64,
    pub end_time: f64,
    pub octet: u8,
}

impl fmt::Display for DecodedByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = if self.octet.is_ascii_graphic() || self.octet == b' ' {
            self.octet as char
        } else {
            '.'
        };
        write!(
            f,
            "({:08b}) {}, 0x{:02x}, '{}'",
            self.octet, self.octet, self.octet, shown
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UartTrace {
    pub bits: Vec<DecodedBit>,
    pub bytes: Vec<DecodedByte>,
}

impl UartTrace {
    pub fn octets(&self) -> Vec<u8> {
        self.bytes.iter().map(|b| b.octet).collect()
    }
}

/// Framer state for a single decode; consumed by [`UartFramer::decode`].
#[derive(Debug)]
pub struct UartFramer {
    state: FramerState,
    octet: u8,
    octet_start: f64,
}

impl Default for UartFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl UartFramer {
    pub fn new() -> Self {
        Self {
            state: FramerState::Idle,
            octet: 0,
            octet_start: 0.0,
        }
    }

    pub fn state(&self) -> FramerState {
        self.state
    }

    /// Advances by one interval. Boundary levels must already be consistent.
    pub fn step(&mut self, interval: &SymbolInterval) -> (DecodedBit, Option<DecodedByte>) {
        let bit = interval.symbol.bit();
        let next = self.state.next(interval.symbol);

        if next == FramerState::Start {
            self.octet = 0;
            self.octet_start = interval.start_time;
        } else if let Some(pos) = next.data_position() {
            self.octet |= bit << pos;
        }

        // Every entry into Stop closes a byte, including the Error -> Stop
        // path, which carries the octet gathered before the bad stop slot.
        let byte = (next == FramerState::Stop).then(|| DecodedByte {
            start_time: self.octet_start,
            end_time: interval.end_time,
            octet: self.octet,
        });

        self.state = next;
        (
            DecodedBit {
                start_time: interval.start_time,
                end_time: interval.end_time,
                state: next,
                bit,
            },
            byte,
        )
    }

    /// Runs the whole interval sequence. Any inconsistent interval discards
    /// everything decoded so far.
    pub fn decode(mut self, intervals: &[SymbolInterval]) -> Result<UartTrace, DecodeError> {
        let mut trace = UartTrace::default();
        for (index, interval) in intervals.iter().enumerate() {
            if !interval.is_consistent() {
                return Err(DecodeError::DataInconsistency {
                    index,
                    start_time: interval.start_time,
                });
            }
            let (bit, byte) = self.step(interval);
            trace.bits.push(bit);
            trace.bytes.extend(byte);
        }
        debug!(
            "framed {} intervals into {} bytes, final state {}",
            intervals.len(),
            trace.bytes.len(),
            self.state
        );
        Ok(trace)
    }
}

/// Decodes with a fresh framer.
pub fn decode(intervals: &[SymbolInterval]) -> Result<UartTrace, DecodeError> {
    UartFramer::new().decode(intervals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::sample::LineLevels;
    use crate::drivers::sample::Symbol::{Mark, Space};

    const T: f64 = 1.0 / 9600.0;

    fn intervals(symbols: &[Symbol]) -> Vec<SymbolInterval> {
        symbols
            .iter()
            .enumerate()
            .map(|(k, s)| SymbolInterval::new(k as f64 * T, k as f64 * T + 0.9 * T, *s))
            .collect()
    }

    fn frame(byte: u8) -> Vec<Symbol> {
        let mut symbols = vec![Space];
        symbols.extend((0..8).map(|i| if (byte >> i) & 1 == 1 { Mark } else { Space }));
        symbols.push(Mark);
        symbols
    }

    #[test]
    fn decodes_single_frame() {
        let symbols = [Space, Mark, Space, Space, Space, Space, Space, Mark, Space, Mark];
        let input = intervals(&symbols);
        let trace = decode(&input).unwrap();
        assert_eq!(trace.octets(), vec![0x41]);
        assert_eq!(trace.bits.len(), symbols.len());
        let byte = trace.bytes[0];
        assert_eq!(byte.start_time, input[0].start_time);
        assert_eq!(byte.end_time, input[9].end_time);
        assert_eq!(trace.bits[0].state, FramerState::Start);
        assert_eq!(trace.bits[8].state, FramerState::Bit7);
        assert_eq!(trace.bits[9].state, FramerState::Stop);
    }

    #[test]
    fn idle_marks_are_traced_but_ignored() {
        let trace = decode(&intervals(&[Mark, Mark, Mark])).unwrap();
        assert!(trace.bytes.is_empty());
        assert!(trace.bits.iter().all(|b| b.state == FramerState::Idle && b.bit == 1));
    }

    #[test]
    fn empty_input_gives_empty_trace() {
        let trace = decode(&[]).unwrap();
        assert_eq!(trace, UartTrace::default());
    }

    #[test]
    fn back_to_back_frames_need_no_idle_gap() {
        let mut symbols = frame(0x41);
        symbols.extend(frame(0x00));
        symbols.extend(frame(0xff));
        let trace = decode(&intervals(&symbols)).unwrap();
        assert_eq!(trace.octets(), vec![0x41, 0x00, 0xff]);
        assert!(trace.bytes.windows(2).all(|w| w[0].end_time < w[1].start_time));
    }

    #[test]
    fn space_in_stop_slot_errors_then_resynchronises() {
        let mut symbols = frame(0x41);
        *symbols.last_mut().unwrap() = Space;
        symbols.push(Space);
        let trace = decode(&intervals(&symbols)).unwrap();
        assert!(trace.bytes.is_empty());
        assert_eq!(trace.bits[9].state, FramerState::Error);
        assert_eq!(trace.bits[10].state, FramerState::Start);
    }

    #[test]
    fn resynchronised_frame_decodes() {
        let mut symbols = frame(0x41);
        *symbols.last_mut().unwrap() = Space;
        // the Space that errored is followed by a fresh frame's start bit
        symbols.extend(frame(0x42));
        let trace = decode(&intervals(&symbols)).unwrap();
        assert_eq!(trace.octets(), vec![0x42]);
        assert_eq!(trace.bytes[0].start_time, 10.0 * T);
    }

    #[test]
    fn mark_after_error_closes_the_pending_octet() {
        let mut symbols = frame(0x41);
        *symbols.last_mut().unwrap() = Space;
        symbols.push(Mark);
        let input = intervals(&symbols);
        let trace = decode(&input).unwrap();
        assert_eq!(trace.bits[9].state, FramerState::Error);
        assert_eq!(trace.bits[10].state, FramerState::Stop);
        assert_eq!(trace.octets(), vec![0x41]);
        assert_eq!(trace.bytes[0].start_time, input[0].start_time);
        assert_eq!(trace.bytes[0].end_time, input[10].end_time);
    }

    #[test]
    fn stop_then_mark_returns_to_idle() {
        let mut symbols = frame(0x30);
        symbols.push(Mark);
        let trace = decode(&intervals(&symbols)).unwrap();
        assert_eq!(trace.bits.last().unwrap().state, FramerState::Idle);
        assert_eq!(trace.octets(), vec![0x30]);
    }

    #[test]
    fn mismatched_boundary_levels_abort_decode() {
        let mut input = intervals(&frame(0x41));
        input[4].end_levels = LineLevels { a: 1.0, b: -1.0 };
        input[4].symbol = Space;
        input[4].start_levels = Space.levels();
        let err = decode(&input).unwrap_err();
        assert!(matches!(err, DecodeError::DataInconsistency { index: 4, .. }));
    }

    #[test]
    fn symbol_disagreeing_with_levels_is_inconsistent() {
        let mut input = intervals(&[Space, Mark]);
        input[1].symbol = Space;
        assert!(matches!(
            decode(&input),
            Err(DecodeError::DataInconsistency { index: 1, .. })
        ));
    }

    #[test]
    fn transition_table_is_total() {
        use super::FramerState::*;
        let states = [
            Idle, Start, Bit0, Bit1, Bit2, Bit3, Bit4, Bit5, Bit6, Bit7, Stop, Error,
        ];
        for state in states {
            for symbol in [Mark, Space] {
                let next = state.next(symbol);
                assert!(states.contains(&next));
            }
        }
        assert_eq!(Idle.next(Space), Start);
        assert_eq!(Bit7.next(Space), Error);
        assert_eq!(Error.next(Mark), Stop);
        assert_eq!(Stop.next(Space), Start);
    }

    #[test]
    fn labels_render_for_charts() {
        let bit = DecodedBit {
            start_time: 0.0,
            end_time: 0.0,
            state: FramerState::Bit3,
            bit: 1,
        };
        assert_eq!(bit.to_string(), "1 (Bit#3)");
        let byte = DecodedByte {
            start_time: 0.0,
            end_time: 0.0,
            octet: 0x41,
        };
        assert_eq!(byte.to_string(), "(01000001) 65, 0x41, 'A'");
        let control = DecodedByte { octet: 0x0a, ..byte };
        assert_eq!(control.to_string(), "(00001010) 10, 0x0a, '.'");
        assert_eq!(FramerState::Error.to_string(), "ERROR");
    }
}
