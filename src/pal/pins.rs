//! PAL16L8 pin numbering and naming
//!
//! The read-out adapter presents EPROM address lines A0..A17 to the PAL
//! input pins and records the output pins on EPROM data lines D0..D7.
//! Pin 10 is GND and pin 20 is VCC, so the address lines skip pin 10.

use super::error::AnalyzeError;

pub const NUM_INPUTS: usize = 18;
pub const NUM_OUTPUTS: usize = 8;

/// A10..A17 double as high-z probe lines for D0..D7; the probe line for
/// data bit `d` is address bit `d + PROBE_BASE`.
pub const PROBE_BASE: usize = NUM_INPUTS - NUM_OUTPUTS;

/// EPROM address bit position (0 for A0, 1 for A1, ...) to PAL pin number.
pub fn addr_bit_to_pin(bitpos: usize) -> usize {
    if bitpos <= 8 {
        // A0..A8 are connected to pins 1..9
        bitpos + 1
    } else {
        // Pin 10 is GND, so A9..A17 are connected to pins 11..19
        bitpos + 2
    }
}

/// PAL pin number (1..=19, excluding GND pin 10) to EPROM address bit position.
pub fn pin_to_addr_bit(pin: usize) -> usize {
    if pin <= 9 { pin - 1 } else { pin - 2 }
}

/// EPROM data bit position (0 for D0, ...) to PAL pin number (12..=19).
pub fn data_bit_to_pin(bitpos: usize) -> usize {
    bitpos + 12
}

/// The address bit whose line is wired (via a resistor) to the given output,
/// used to probe whether the PAL actively drives that output.
pub fn probe_addr_bit(data_bit: usize) -> usize {
    data_bit + PROBE_BASE
}

/// Names for the 18 usable pins, stored in pin-number order (1..9, 11..19),
/// which is also EPROM address bit order.
#[derive(Debug, Clone)]
pub struct PinNames {
    names: Vec<String>,
}

impl PinNames {
    /// The default naming `pin1`..`pin9`, `pin11`..`pin19`.
    pub fn default_names() -> Self {
        let names = (1..=9)
            .chain(11..=19)
            .map(|n| format!("pin{n}"))
            .collect();
        Self { names }
    }

    /// User supplied names, one per usable pin in pin-number order (no names
    /// for GND and VCC).
    pub fn from_names(names: Vec<String>) -> Result<Self, AnalyzeError> {
        if names.len() != NUM_INPUTS {
            return Err(AnalyzeError::PinNameCount { count: names.len() });
        }
        Ok(Self { names })
    }

    pub fn by_addr_bit(&self, bitpos: usize) -> &str {
        &self.names[bitpos]
    }

    pub fn by_pin(&self, pin: usize) -> &str {
        self.by_addr_bit(pin_to_addr_bit(pin))
    }

    /// Length of the longest name, used for column alignment.
    pub fn max_len(&self) -> usize {
        self.names.iter().map(String::len).max().unwrap_or(0)
    }

    /// (pin number, name) pairs in pin-number order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        (1..=9)
            .chain(11..=19)
            .zip(self.names.iter().map(String::as_str))
    }
}
