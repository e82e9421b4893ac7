use std::fmt;

/// Errors that can occur while analyzing a PAL dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeError {
    /// The dump does not hold one byte for each of the 2^18 input patterns
    DumpSize { len: usize },
    /// The number of user supplied pin names does not match the usable pins
    PinNameCount { count: usize },
    /// A combination with dependencies never shows the pin actively driven
    NoDrivenPattern { pin: String },
}

impl fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzeError::DumpSize { len } => {
                write!(f, "dump with 262144 bytes expected, got {len} bytes")
            }
            AnalyzeError::PinNameCount { count } => {
                write!(
                    f,
                    "wrong number of pin names: got {count}, expected 18 (no names for GND and VCC)"
                )
            }
            AnalyzeError::NoDrivenPattern { pin } => {
                write!(
                    f,
                    "could not find input combination which does not lead to high-z for pin {pin}"
                )
            }
        }
    }
}

impl std::error::Error for AnalyzeError {}
