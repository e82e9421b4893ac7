// PAL16L8 dump analysis
//
// Turns an exhaustive 2^18-byte truth-table dump into per-pin dependency
// masks, classified minterm lists and minimized equations. The adapter's
// high-z probe wiring (A10..A17 feeding D0..D7 through resistors) lets the
// analyzer tell a driven pin from a floating one.

pub mod analyzer;
pub mod equations;
pub mod error;
pub mod pins;

pub use analyzer::{Analyzer, DUMP_LEN, Dump, LevelTerms, OeTerms, PinDependencies};
pub use equations::{
    PinEquations, Syntax, analyze_pal, equations_file, level_equation, oe_equation,
    truthtable_file,
};
pub use error::AnalyzeError;
pub use pins::{NUM_INPUTS, NUM_OUTPUTS, PinNames};

#[cfg(test)]
pub(crate) mod testutil {
    use super::analyzer::{DUMP_LEN, Dump};
    use super::pins::PROBE_BASE;

    /// Model the adapter hardware: for every address, each output pin shows
    /// its driven level when enabled and otherwise floats to its probe line.
    pub fn synth_dump(pal: impl Fn(u32) -> (u8, u8)) -> Dump {
        let data = (0..DUMP_LEN as u32)
            .map(|addr| {
                let (levels, enabled) = pal(addr);
                let probes = ((addr >> PROBE_BASE) & 0xff) as u8;
                (levels & enabled) | (probes & !enabled)
            })
            .collect();
        Dump::new(data).expect("synthesized dump has the right size")
    }

    pub fn bit(addr: u32, pos: usize) -> u8 {
        ((addr >> pos) & 1) as u8
    }
}
