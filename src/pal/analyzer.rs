//! PalAnalyzer: dependency and tri-state analysis over the EPROM dump
//!
//! The dump holds one byte per 18-bit input pattern. Output pins of a
//! PAL16L8 can be tri-stated, so the adapter wires address lines A10..A17
//! through resistors to output pins D0..D7: toggling such a probe line flips
//! the recorded data bit exactly when the PAL is NOT driving the pin, because
//! an actively driven output overrides the resistor. This module uses that
//! differential observation to separate level dependencies from
//! output-enable dependencies and to classify minterms per output pin.

use super::error::AnalyzeError;
use super::pins::{
    addr_bit_to_pin, data_bit_to_pin, probe_addr_bit, NUM_INPUTS, NUM_OUTPUTS, PROBE_BASE,
};

/// Number of bytes in a full truth-table dump.
pub const DUMP_LEN: usize = 1 << NUM_INPUTS;

const ADDR_MASK: u32 = (DUMP_LEN - 1) as u32;

/// The raw truth-table dump, validated to cover every input pattern.
#[derive(Debug)]
pub struct Dump {
    data: Vec<u8>,
}

impl Dump {
    pub fn new(data: Vec<u8>) -> Result<Self, AnalyzeError> {
        if data.len() != DUMP_LEN {
            return Err(AnalyzeError::DumpSize { len: data.len() });
        }
        Ok(Self { data })
    }

    #[inline]
    fn byte(&self, addr: u32) -> u8 {
        self.data[addr as usize]
    }
}

/// Discovered dependencies for one output pin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PinDependencies {
    /// Input bits that influence the driven level
    pub depends_mask: u32,
    /// Input bits that influence the high-z state
    pub oe_depends_mask: u32,
    /// Pin was observed actively driven low at least once
    pub seen_low: bool,
    /// Pin was observed actively driven high at least once
    pub seen_high: bool,
}

/// Classified level minterms over the variables named by `var_bits`
/// (ascending address bit positions; bit j of a minterm corresponds to
/// `var_bits[j]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTerms {
    pub var_bits: Vec<usize>,
    pub pos: Vec<u64>,
    pub neg: Vec<u64>,
    pub dontcare: Vec<u64>,
}

/// Classified output-enable minterms; positive means the pin is driven.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OeTerms {
    pub var_bits: Vec<usize>,
    pub pos: Vec<u64>,
    pub neg: Vec<u64>,
}

pub struct Analyzer<'a> {
    dump: &'a Dump,
}

impl<'a> Analyzer<'a> {
    pub fn new(dump: &'a Dump) -> Self {
        Self { dump }
    }

    /// Discover, for every output pin, which inputs influence its driven
    /// level and which influence its high-z state.
    pub fn discover_all(&self) -> [PinDependencies; NUM_OUTPUTS] {
        let mut deps = [PinDependencies::default(); NUM_OUTPUTS];

        // Iterate over a 17 bit pattern and insert the 18th bit at each
        // position in turn, comparing the dump with that bit clear and set.
        for i in 0..1u32 << (NUM_INPUTS - 1) {
            for bitpos in 0..NUM_INPUTS {
                let bit = 1u32 << bitpos;
                let low = i & (bit - 1);
                let addr = ((i ^ low) << 1) | low;

                let data0 = self.dump.byte(addr);
                let data1 = self.dump.byte(addr | bit);

                for p in 0..NUM_OUTPUTS {
                    // A pin can never depend on itself: its input level
                    // cannot control its own output level or its own high-z
                    // state through the PAL logic.
                    if addr_bit_to_pin(bitpos) == data_bit_to_pin(p) {
                        continue;
                    }

                    let out_bit = 1u8 << p;
                    let probe_bit = 1u32 << probe_addr_bit(p);

                    // Toggling the probe line changes the data bit exactly
                    // when the pin is in high-z state.
                    let highz_on_bitclear = (self.dump.byte(addr & !probe_bit)
                        ^ self.dump.byte(addr | probe_bit))
                        & out_bit
                        != 0;
                    let highz_on_bitset = (self.dump.byte((addr | bit) & !probe_bit)
                        ^ self.dump.byte((addr | bit) | probe_bit))
                        & out_bit
                        != 0;

                    if highz_on_bitclear != highz_on_bitset {
                        deps[p].oe_depends_mask |= bit;
                    }

                    // A level change observed only under a high-z condition
                    // folds into the don't-care cells during minimization and
                    // must not create a false dependency.
                    if (data0 ^ data1) & out_bit != 0 && !highz_on_bitclear && !highz_on_bitset {
                        deps[p].depends_mask |= bit;
                    }

                    if !highz_on_bitclear {
                        if data0 & out_bit == 0 {
                            deps[p].seen_low = true;
                        } else {
                            deps[p].seen_high = true;
                        }
                    }
                    if !highz_on_bitset {
                        if data1 & out_bit == 0 {
                            deps[p].seen_low = true;
                        } else {
                            deps[p].seen_high = true;
                        }
                    }
                }
            }
        }

        deps
    }

    /// Classify every assignment of the level dependencies as a positive,
    /// negative or don't-care minterm.
    pub fn classify_level(
        &self,
        data_bit: usize,
        deps: &PinDependencies,
        pin_name: &str,
    ) -> Result<LevelTerms, AnalyzeError> {
        let out_bit = 1u8 << data_bit;
        let probe_bit = 1u32 << probe_addr_bit(data_bit);

        // The pin's own probe line is suppressed from the variable list
        let vars_mask = deps.depends_mask & !probe_bit;
        let other_mask = ADDR_MASK ^ vars_mask;

        let mut terms = LevelTerms {
            var_bits: set_bits(vars_mask),
            pos: Vec::new(),
            neg: Vec::new(),
            dontcare: Vec::new(),
        };

        for (minterm, addr) in subsets(vars_mask).enumerate() {
            // The bits outside vars_mask default to 0, which might put this
            // output into high-z; search the remaining inputs for a
            // combination where the pin is actively driven.
            let mut data = None;
            for other in subsets(other_mask) {
                let probed = addr | other;
                if (self.dump.byte(probed) ^ self.dump.byte(probed ^ probe_bit)) & out_bit == 0 {
                    data = Some(self.dump.byte(probed));
                    break;
                }
            }
            let Some(data) = data else {
                return Err(AnalyzeError::NoDrivenPattern {
                    pin: pin_name.to_string(),
                });
            };

            // Pins 12..19 act as outputs and inputs at the same time, so the
            // PAL itself can override an externally applied level. The
            // combination is reachable under the feedback wiring only if some
            // assignment of the remaining inputs makes A10..A17 agree with
            // D0..D7; otherwise it is a don't-care.
            let mut is_input_relevant = false;
            for other in subsets(other_mask) {
                let probed = addr | other;
                if (probed >> PROBE_BASE) & 0xff == u32::from(self.dump.byte(probed)) {
                    is_input_relevant = true;
                    break;
                }
            }

            if !is_input_relevant {
                terms.dontcare.push(minterm as u64);
            } else if data & out_bit == 0 {
                terms.neg.push(minterm as u64);
            } else {
                terms.pos.push(minterm as u64);
            }
        }

        Ok(terms)
    }

    /// Classify every assignment of the output-enable dependencies: the
    /// minterm is positive when the pin is driven and negative when it
    /// floats.
    pub fn classify_oe(&self, data_bit: usize, deps: &PinDependencies) -> OeTerms {
        let out_bit = 1u8 << data_bit;
        let probe_bit = 1u32 << probe_addr_bit(data_bit);

        let mut terms = OeTerms {
            var_bits: set_bits(deps.oe_depends_mask),
            pos: Vec::new(),
            neg: Vec::new(),
        };

        for (minterm, addr) in subsets(deps.oe_depends_mask).enumerate() {
            if (self.dump.byte(addr) ^ self.dump.byte(addr | probe_bit)) & out_bit != 0 {
                terms.neg.push(minterm as u64);
            } else {
                terms.pos.push(minterm as u64);
            }
        }

        terms
    }
}

/// Positions of the set bits of `mask`, ascending.
fn set_bits(mask: u32) -> Vec<usize> {
    (0..NUM_INPUTS).filter(|&b| mask & (1 << b) != 0).collect()
}

/// Enumerate every assignment to the set bits of `mask`. The n-th yielded
/// address scatters the bits of n onto the mask positions, so the compact
/// minterm value and the expanded address stay in step.
fn subsets(mask: u32) -> impl Iterator<Item = u32> {
    let bits: Vec<u32> = (0..NUM_INPUTS)
        .filter(|&b| mask & (1 << b) != 0)
        .map(|b| 1u32 << b)
        .collect();

    (0u32..1 << bits.len()).map(move |n| {
        let mut r = 0;
        for (j, &bit) in bits.iter().enumerate() {
            if n & (1 << j) != 0 {
                r |= bit;
            }
        }
        r
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pal::testutil::{bit, synth_dump};

    #[test]
    fn test_subsets_enumerates_in_compact_order() {
        let values: Vec<u32> = subsets(0b1010).collect();
        assert_eq!(values, vec![0b0000, 0b0010, 0b1000, 0b1010]);
        assert_eq!(subsets(0).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_dump_size_is_checked() {
        assert_eq!(
            Dump::new(vec![0; 42]).unwrap_err(),
            AnalyzeError::DumpSize { len: 42 }
        );
    }

    #[test]
    fn test_and_gate_with_enable() {
        // D0 = A0 & A1, D0.oe = A2; all other outputs stay high-z
        let dump = synth_dump(|a| (bit(a, 0) & bit(a, 1), bit(a, 2)));
        let analyzer = Analyzer::new(&dump);
        let deps = analyzer.discover_all();

        assert_eq!(deps[0].depends_mask, 0b011);
        assert_eq!(deps[0].oe_depends_mask, 0b100);
        assert!(deps[0].seen_low);
        assert!(deps[0].seen_high);

        let level = analyzer.classify_level(0, &deps[0], "pin12").unwrap();
        assert_eq!(level.var_bits, vec![0, 1]);
        assert_eq!(level.pos, vec![3]);
        assert_eq!(level.neg, vec![0, 1, 2]);
        assert!(level.dontcare.is_empty());

        let oe = analyzer.classify_oe(0, &deps[0]);
        assert_eq!(oe.var_bits, vec![2]);
        assert_eq!(oe.pos, vec![1]);
        assert_eq!(oe.neg, vec![0]);

        // The seven unused outputs have no dependencies and were never driven
        for p in 1..NUM_OUTPUTS {
            assert_eq!(deps[p], PinDependencies::default());
        }
    }

    #[test]
    fn test_constant_pins() {
        // D3 is stuck high, D4 stuck low, both always enabled
        let dump = synth_dump(|_| (0b0000_1000, 0b0001_1000));
        let analyzer = Analyzer::new(&dump);
        let deps = analyzer.discover_all();

        assert_eq!(deps[3].depends_mask, 0);
        assert!(deps[3].seen_high);
        assert!(!deps[3].seen_low);

        assert_eq!(deps[4].depends_mask, 0);
        assert!(deps[4].seen_low);
        assert!(!deps[4].seen_high);

        assert_eq!(deps[3].oe_depends_mask, 0);
        assert_eq!(deps[4].oe_depends_mask, 0);
    }

    #[test]
    fn test_own_probe_line_never_becomes_a_dependency() {
        // D1 echoes its own probe line A11 while driven: the analyzer must
        // not report a self dependency.
        let dump = synth_dump(|a| ((bit(a, 11) << 1), 0b0000_0010));
        let analyzer = Analyzer::new(&dump);
        let deps = analyzer.discover_all();
        assert_eq!(deps[1].depends_mask & (1 << 11), 0);
        assert_eq!(deps[1].oe_depends_mask, 0);
    }

    #[test]
    fn test_independent_bits_leave_output_unchanged() {
        // High-z-correctness: toggling any bit outside depends_mask leaves
        // the driven level unchanged wherever the pin is driven.
        let dump = synth_dump(|a| (bit(a, 0) ^ bit(a, 5), 1));
        let analyzer = Analyzer::new(&dump);
        let deps = analyzer.discover_all();
        assert_eq!(deps[0].depends_mask, 0b10_0001);

        let level = analyzer.classify_level(0, &deps[0], "pin12").unwrap();
        assert_eq!(level.var_bits, vec![0, 5]);
        assert_eq!(level.pos, vec![1, 2]);
        assert_eq!(level.neg, vec![0, 3]);
    }

    #[test]
    fn test_dependency_on_another_pins_feedback_line() {
        // D0 follows A12, the line that doubles as D2's probe. D2 floats, so
        // A12 is an ordinary input here and both of its assignments are
        // reachable under the feedback rule.
        let dump = synth_dump(|a| (bit(a, 12), 0b0000_0001));
        let analyzer = Analyzer::new(&dump);
        let deps = analyzer.discover_all();
        assert_eq!(deps[0].depends_mask, 1 << 12);

        let level = analyzer.classify_level(0, &deps[0], "pin12").unwrap();
        assert_eq!(level.var_bits, vec![12]);
        assert_eq!(level.pos, vec![1]);
        assert_eq!(level.neg, vec![0]);
        assert!(level.dontcare.is_empty());
    }
}
