use std::fmt;

/// Errors that can occur while lexing, assembling or serializing equations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// The lexer hit a character no token matches
    InvalidCharacter { line: usize, text: String },
    /// A token sequence that does not fit the grammar
    Syntax {
        line: usize,
        expected: &'static str,
        found: String,
    },
    /// A constant equation with a value other than 0 or 1
    InvalidConstant { line: usize, number: u64 },
    /// The sub-identifier of a dotted equation is not OE
    InvalidSubIdentifier { line: usize, name: String },
    DuplicatePinNumber { line: usize, number: u64 },
    DuplicatePinName { line: usize, name: String },
    /// Level equations must be negated (the output buffer inverts)
    NonNegatedEquation { name: String },
    /// OE equations must not be negated
    NegatedOeEquation { name: String },
    /// The AND array has 7 product rows per output
    TooManyProducts { name: String },
    /// The OE term is a single product row
    TooManyOeProducts { name: String },
    /// An equation references pins without a PIN declaration
    UndefinedPins { name: String, pins: Vec<String> },
    /// A pin required by the fuse layout has no PIN declaration
    MissingPinDeclaration { number: usize },
    /// Fuse rows exist only for output pins 12..=19
    InvalidPinNumber { number: usize },
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmError::InvalidCharacter { line, text } => {
                write!(f, "invalid character in line {line} (\"{text}\")")
            }
            AsmError::Syntax {
                line,
                expected,
                found,
            } => {
                write!(f, "invalid syntax in line {line} (expected {expected}, got {found})")
            }
            AsmError::InvalidConstant { line, number } => {
                write!(f, "invalid syntax in line {line} (expected 0/1, got {number})")
            }
            AsmError::InvalidSubIdentifier { line, name } => {
                write!(f, "invalid sub-identifier '{name}' in line {line}")
            }
            AsmError::DuplicatePinNumber { line, number } => {
                write!(f, "duplicate pin number {number} in line {line}")
            }
            AsmError::DuplicatePinName { line, name } => {
                write!(f, "duplicate pin name '{name}' in line {line}")
            }
            AsmError::NonNegatedEquation { name } => {
                write!(f, "non-negated equations unsupported ({name})")
            }
            AsmError::NegatedOeEquation { name } => {
                write!(f, "negated OE equations unsupported ({name})")
            }
            AsmError::TooManyProducts { name } => {
                write!(f, "more than 7 products are not supported ({name})")
            }
            AsmError::TooManyOeProducts { name } => {
                write!(f, "more than 1 OE product is not supported ({name})")
            }
            AsmError::UndefinedPins { name, pins } => {
                write!(
                    f,
                    "equation for {name} contains undefined pin(s): {}",
                    pins.join(", ")
                )
            }
            AsmError::MissingPinDeclaration { number } => {
                write!(f, "no PIN declaration for pin {number}")
            }
            AsmError::InvalidPinNumber { number } => {
                write!(f, "got invalid pin number ({number})")
            }
        }
    }
}

impl std::error::Error for AsmError {}
