// GAL16V8 assembly: equation files to JEDEC fuse maps
//
// The lexer tokenizes the equation DSL written by pete, the assembler maps
// sums of products onto AND-array fuse rows, and the JEDEC writer emits the
// framed fuse file for the device programmer. Only the GAL16V8 in simple
// combinatorial mode is supported.

pub mod assembler;
pub mod error;
pub mod jedec;
pub mod lexer;

pub use assembler::{Assembler, Equation, Literal, SumOfProducts};
pub use error::AsmError;
pub use jedec::{FUSE_COUNT, JedWriter};
pub use lexer::{LexOutput, Token, TokenKind, tokenize};

/// Wire a fully assembled fuse set into a JEDEC writer configured for the
/// GAL16V8 in purely combinatorial mode.
pub fn build_jed(assembler: &Assembler) -> Result<JedWriter, AsmError> {
    let mut writer = JedWriter::new();

    for pin_number in (12..=19).rev() {
        let oe_fuses = assembler
            .pin_oe_fusemap(pin_number)
            .ok_or(AsmError::MissingPinDeclaration { number: pin_number })?;
        let term_fuses = assembler
            .pin_fusemap(pin_number)
            .ok_or(AsmError::MissingPinDeclaration { number: pin_number })?;

        writer.set_pin_oe_term(pin_number, oe_fuses)?;
        writer.set_pin_terms(pin_number, term_fuses)?;
        // XOR = 0: active low output
        writer.set_output_polarity(pin_number, false)?;
        // AC1 = 1: combinatorial
        writer.set_ac1_bit(pin_number, true)?;
        writer.set_product_term_disable_bits(pin_number, &[true; 8])?;
    }

    // SYN = 1, AC0 = 1: purely combinatorial mode (pins 1 and 11 are
    // ordinary inputs)
    writer.set_syn(true);
    writer.set_ac0(true);

    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_jed_sets_device_mode() {
        let source: String = (1..=9)
            .chain(11..=19)
            .map(|n| format!("PIN {n}=pin{n};\n"))
            .collect::<String>()
            + "!pin12 = !pin1;\npin12.oe = pin3;\n";

        let mut assembler = Assembler::new();
        assembler.assemble(&tokenize(&source).unwrap().tokens).unwrap();
        let writer = build_jed(&assembler).unwrap();
        let text = String::from_utf8_lossy(&writer.to_bytes()).into_owned();

        // SYN, AC0 and all AC1 bits are set for simple combinatorial mode
        assert!(text.contains("*L2120 11111111\r\n"));
        assert!(text.contains("*L2192 1\r\n"));
        assert!(text.contains("*L2193 1\r\n"));
        // All product-term-disable bits set
        assert!(text.contains(&format!("*L2128 {}\r\n", "1".repeat(64))));
        // Polarity row stays zero (active low) and is omitted
        assert!(!text.contains("*L2048"));
    }

    #[test]
    fn test_build_jed_requires_assembled_outputs() {
        let assembler = Assembler::new();
        assert_eq!(
            build_jed(&assembler).unwrap_err(),
            AsmError::MissingPinDeclaration { number: 19 }
        );
    }
}
