/// Decision boundary between Mark, Space and the noise band, in volts.
pub const THRESHOLD_VOLTS: f64 = 1.0;

/// One reading of the differential pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Capture time in seconds.
    pub time: f64,
    /// A-line voltage in volts.
    pub voltage_a: f64,
    /// B-line voltage in volts.
    pub voltage_b: f64,
}

impl Sample {
    pub fn new(time: f64, voltage_a: f64, voltage_b: f64) -> Self {
        Self {
            time,
            voltage_a,
            voltage_b,
        }
    }

    /// A minus B. Positive on Mark, negative on Space.
    pub fn differential(&self) -> f64 {
        self.voltage_a - self.voltage_b
    }

    /// Classifies the reading against `threshold`; `None` inside the noise band.
    pub fn symbol(&self, threshold: f64) -> Option<Symbol> {
        let d = self.differential();
        if d > threshold {
            Some(Symbol::Mark)
        } else if d < -threshold {
            Some(Symbol::Space)
        } else {
            None
        }
    }
}

/// Logical line state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    /// Logical 1, A above B.
    Mark,
    /// Logical 0, B above A.
    Space,
}

impl Symbol {
    pub fn bit(self) -> u8 {
        match self {
            Symbol::Mark => 1,
            Symbol::Space => 0,
        }
    }

    /// Normalised A/B levels used for the reshaped waveform.
    pub fn levels(self) -> LineLevels {
        match self {
            Symbol::Mark => LineLevels { a: 1.0, b: -1.0 },
            Symbol::Space => LineLevels { a: -1.0, b: 1.0 },
        }
    }
}

/// A pair of normalised line levels at an interval boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineLevels {
    pub a: f64,
    pub b: f64,
}

impl LineLevels {
    pub fn at(self, time: f64) -> Sample {
        Sample::new(time, self.a, self.b)
    }
}
