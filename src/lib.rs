//! Pete Library
//!
//! A Rust library for reverse engineering combinatorial PAL16L8 devices from
//! exhaustive EPROM dumps. The `pal` module turns a 2^18-byte truth-table
//! dump into per-pin minimized equations; the `qm` module provides the
//! underlying Quine-McCluskey / Petrick Boolean minimization; the `gal`
//! module assembles the resulting equation files into a GAL16V8 JEDEC
//! fuse map.

pub mod gal; // Equation DSL lexer, fuse assembler and JEDEC writer
pub mod pal; // Dump analysis: dependencies, tri-state, minterm classification
pub mod qm; // Quine-McCluskey algorithm and Petrick's method

// Re-export the main types
pub use qm::{Cube, PetricksMethod, PrimeImplicant, QuineMcCluskey, Solution};

/// Convenience function to minimize a Boolean function (up to 64 variables)
/// given as a list of minterms and a list of don't-care terms.
pub fn simplify_minterms(numvars: usize, minterms: &[u64], dontcareterms: &[u64]) -> Solution {
    let mut qm = QuineMcCluskey::new(numvars);
    qm.set_minterms(minterms);
    qm.set_dontcareterms(dontcareterms);
    PetricksMethod::new(&qm.prime_implicants()).solve()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simplify_two_variables() {
        let Solution::Covers(covers) = simplify_minterms(2, &[1, 2, 3], &[]) else {
            panic!("expected covers");
        };
        assert_eq!(covers.len(), 1);
        let mut cover = covers[0].clone();
        cover.sort();
        assert_eq!(cover, vec![Cube::new(0b01, 0b01), Cube::new(0b10, 0b10)]);
    }

    #[test]
    fn test_simplify_always_true() {
        assert_eq!(simplify_minterms(1, &[0, 1], &[]), Solution::Always);
    }

    #[test]
    fn test_simplify_always_false() {
        assert_eq!(simplify_minterms(2, &[], &[0, 1, 2, 3]), Solution::Never);
    }

    #[test]
    fn test_simplify_single_literal() {
        let Solution::Covers(covers) = simplify_minterms(3, &[1, 3, 5, 7], &[]) else {
            panic!("expected covers");
        };
        assert_eq!(covers, vec![vec![Cube::new(0b001, 0b001)]]);
    }

    #[test]
    fn test_simplify_with_dontcareterms() {
        // d(9,14) lets the classic 4-variable example collapse to 3 products
        let Solution::Covers(covers) = simplify_minterms(4, &[4, 8, 10, 11, 12, 15], &[9, 14])
        else {
            panic!("expected covers");
        };
        for cover in &covers {
            assert_eq!(cover.len(), 3);
            assert_eq!(cover.iter().map(|c| c.literal_count()).sum::<u32>(), 7);
        }
    }
}
