//! JedWriter: JEDEC fuse file serialization for the GAL16V8
//!
//! The 2194 fuses are laid out as 2048 AND-array fuses (8 outputs x 256),
//! followed by the 8 XOR (polarity) fuses, the 64 signature fuses, the 8 AC1
//! fuses, the 64 product-term-disable fuses, SYN and AC0.

use super::error::AsmError;

pub const FUSE_COUNT: usize = 2194;

const MATRIX_FUSES: usize = 2048;
const XOR_OFFSET: usize = 2048;
const SIGNATURE_OFFSET: usize = 2056;
const AC1_OFFSET: usize = 2120;
const PTD_OFFSET: usize = 2128;
const SYN_OFFSET: usize = 2192;
const AC0_OFFSET: usize = 2193;

#[derive(Debug)]
pub struct JedWriter {
    fuses: Vec<bool>,
}

impl JedWriter {
    pub fn new() -> Self {
        Self {
            fuses: vec![false; FUSE_COUNT],
        }
    }

    fn pin_index(pin_number: usize) -> Result<usize, AsmError> {
        if !(12..=19).contains(&pin_number) {
            return Err(AsmError::InvalidPinNumber { number: pin_number });
        }
        Ok(19 - pin_number)
    }

    /// The 32 OE-term fuses of one output pin.
    pub fn set_pin_oe_term(&mut self, pin_number: usize, statuses: &[bool; 32]) -> Result<(), AsmError> {
        let offset = Self::pin_index(pin_number)? * 256;
        self.fuses[offset..offset + 32].copy_from_slice(statuses);
        Ok(())
    }

    /// The 7 x 32 product-term fuses of one output pin.
    pub fn set_pin_terms(&mut self, pin_number: usize, statuses: &[bool; 224]) -> Result<(), AsmError> {
        let offset = Self::pin_index(pin_number)? * 256 + 32;
        self.fuses[offset..offset + 224].copy_from_slice(statuses);
        Ok(())
    }

    /// XOR fuse; 0 keeps the output active low.
    pub fn set_output_polarity(&mut self, pin_number: usize, status: bool) -> Result<(), AsmError> {
        let index = Self::pin_index(pin_number)?;
        self.fuses[XOR_OFFSET + index] = status;
        Ok(())
    }

    /// No functionality, just 64 bits for a project name or similar.
    pub fn set_signature(&mut self, statuses: &[bool; 64]) {
        self.fuses[SIGNATURE_OFFSET..SIGNATURE_OFFSET + 64].copy_from_slice(statuses);
    }

    /// With AC0 = 1, the AC1 bits of all outputs must be 1 for combinatorial
    /// mode.
    pub fn set_ac1_bit(&mut self, pin_number: usize, status: bool) -> Result<(), AsmError> {
        let index = Self::pin_index(pin_number)?;
        self.fuses[AC1_OFFSET + index] = status;
        Ok(())
    }

    pub fn set_product_term_disable_bits(
        &mut self,
        pin_number: usize,
        statuses: &[bool; 8],
    ) -> Result<(), AsmError> {
        let index = Self::pin_index(pin_number)?;
        self.fuses[PTD_OFFSET + 8 * index..PTD_OFFSET + 8 * index + 8].copy_from_slice(statuses);
        Ok(())
    }

    pub fn set_syn(&mut self, status: bool) {
        self.fuses[SYN_OFFSET] = status;
    }

    pub fn set_ac0(&mut self, status: bool) {
        self.fuses[AC0_OFFSET] = status;
    }

    fn fuse_line(&self, offset: usize, len: usize) -> String {
        self.fuses[offset..offset + len]
            .iter()
            .map(|&fuse| if fuse { '1' } else { '0' })
            .collect()
    }

    /// Serialize the framed JEDEC file: STX, commands, fuse checksum, ETX and
    /// the transmission checksum. Lines end with CRLF.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data: Vec<u8> = Vec::new();

        // STX
        data.push(0x02);

        data.extend_from_slice(b"Device: GAL16V8\r\n");

        // Default fuse state for unspecified fuses
        data.extend_from_slice(b"*F0\r\n");

        // Security fuse
        data.extend_from_slice(b"*G0\r\n");

        // Number of fuses in device
        data.extend_from_slice(format!("*QF{FUSE_COUNT}\r\n").as_bytes());

        // All-zero lines are covered by *F0 and omitted
        let emit = |data: &mut Vec<u8>, offset: usize, len: usize| {
            let line = self.fuse_line(offset, len);
            if line.contains('1') {
                data.extend_from_slice(format!("*L{offset:04} {line}\r\n").as_bytes());
            }
        };

        for offset in (0..MATRIX_FUSES).step_by(32) {
            emit(&mut data, offset, 32);
        }
        emit(&mut data, XOR_OFFSET, 8);
        emit(&mut data, SIGNATURE_OFFSET, 64);
        emit(&mut data, AC1_OFFSET, 8);
        emit(&mut data, PTD_OFFSET, 64);
        emit(&mut data, SYN_OFFSET, 1);
        emit(&mut data, AC0_OFFSET, 1);

        // The fuse checksum is the 16 bit sum of all the 8 bit fuse values,
        // the first fuse of each group being the least significant bit
        let mut fuse_checksum: u32 = 0;
        for chunk in self.fuses.chunks(8) {
            let mut value = 0u32;
            for (i, &fuse) in chunk.iter().enumerate() {
                if fuse {
                    value |= 1 << i;
                }
            }
            fuse_checksum += value;
        }
        data.extend_from_slice(format!("*C{:04x}\r\n", fuse_checksum & 0xffff).as_bytes());

        // End of commands
        data.extend_from_slice(b"*\r\n");

        // ETX
        data.push(0x03);

        // The transmission checksum is a 16 bit sum of all bytes between
        // (and including) the STX and ETX markers
        let transmission: u32 = data.iter().map(|&b| u32::from(b)).sum::<u32>() & 0xffff;
        data.extend_from_slice(format!("{transmission:04x}").as_bytes());

        data
    }
}

impl Default for JedWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing() {
        let writer = JedWriter::new();
        let data = writer.to_bytes();

        assert_eq!(data[0], 0x02);
        assert_eq!(data[data.len() - 5], 0x03);
        let text = String::from_utf8_lossy(&data);
        assert!(text.contains("Device: GAL16V8\r\n"));
        assert!(text.contains("*F0\r\n"));
        assert!(text.contains("*G0\r\n"));
        assert!(text.contains("*QF2194\r\n"));
        // An empty fuse map writes no *L lines and checksums to zero
        assert!(!text.contains("*L"));
        assert!(text.contains("*C0000\r\n"));
    }

    #[test]
    fn test_transmission_checksum_covers_stx_to_etx() {
        let mut writer = JedWriter::new();
        writer.set_syn(true);
        writer.set_ac0(true);
        let data = writer.to_bytes();

        let framed = &data[..data.len() - 4];
        let expected: u32 = framed.iter().map(|&b| u32::from(b)).sum::<u32>() & 0xffff;
        let suffix = std::str::from_utf8(&data[data.len() - 4..]).unwrap();
        assert_eq!(u32::from_str_radix(suffix, 16).unwrap(), expected);
    }

    #[test]
    fn test_mode_fuses() {
        let mut writer = JedWriter::new();
        writer.set_syn(true);
        writer.set_ac0(true);
        let text = String::from_utf8_lossy(&writer.to_bytes()).into_owned();

        assert!(text.contains("*L2192 1\r\n"));
        assert!(text.contains("*L2193 1\r\n"));
        // SYN at 2192 is bit 0 and AC0 at 2193 is bit 1 of the last group
        assert!(text.contains("*C0003\r\n"));
    }

    #[test]
    fn test_fuse_rows_land_at_pin_offsets() {
        let mut writer = JedWriter::new();
        let mut oe = [false; 32];
        oe[0] = true;
        // Pin 19 is row index 0, pin 12 is row index 7
        writer.set_pin_oe_term(19, &oe).unwrap();
        writer.set_pin_oe_term(12, &oe).unwrap();
        let mut terms = [false; 224];
        terms[0] = true;
        writer.set_pin_terms(19, &terms).unwrap();

        let text = String::from_utf8_lossy(&writer.to_bytes()).into_owned();
        assert!(text.contains("*L0000 10000000000000000000000000000000\r\n"));
        assert!(text.contains("*L0032 10000000000000000000000000000000\r\n"));
        assert!(text.contains("*L1792 10000000000000000000000000000000\r\n"));
    }

    #[test]
    fn test_polarity_and_disable_rows() {
        let mut writer = JedWriter::new();
        writer.set_output_polarity(19, true).unwrap();
        for pin in 12..=19 {
            writer.set_product_term_disable_bits(pin, &[true; 8]).unwrap();
        }

        let text = String::from_utf8_lossy(&writer.to_bytes()).into_owned();
        assert!(text.contains("*L2048 10000000\r\n"));
        assert!(text.contains(&format!("*L2128 {}\r\n", "1".repeat(64))));
    }

    #[test]
    fn test_invalid_pin_rejected() {
        let mut writer = JedWriter::new();
        assert_eq!(
            writer.set_output_polarity(11, false).unwrap_err(),
            AsmError::InvalidPinNumber { number: 11 }
        );
        assert_eq!(
            writer.set_pin_oe_term(20, &[false; 32]).unwrap_err(),
            AsmError::InvalidPinNumber { number: 20 }
        );
    }
}
