//! QuineMcCluskey: prime implicant extraction via the tabular method
//!
//! Implicants are grouped into tables keyed by their mask (the set of
//! variables still present). Combining two implicants that differ in exactly
//! one masked bit moves the result into the table with that bit removed from
//! the mask, so iteration proceeds in one direction only: fewer mask bits
//! each step. An implicant that was never combined is a prime implicant.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::cube::Cube;

/// A prime implicant together with the indices (positions in the input
/// minterm list) of the minterms it covers. Don't-care terms confer no
/// coverage: they need not be covered by the final expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimeImplicant {
    pub cube: Cube,
    pub covered: BTreeSet<u32>,
}

struct TrueImplicant {
    covered: BTreeSet<u32>,
    was_combined: bool,
}

/// One table of the worklist: all cubes sharing a single mask. Patterns are
/// kept in insertion order so traversal is FIFO and the output is stable.
#[derive(Default)]
struct ImplicantTable {
    true_implicants: HashMap<u64, TrueImplicant>,
    true_order: Vec<u64>,
    dontcare_implicants: HashSet<u64>,
    dontcare_order: Vec<u64>,
}

impl ImplicantTable {
    fn add_true(&mut self, pattern: u64, covered: BTreeSet<u32>) {
        match self.true_implicants.entry(pattern) {
            Entry::Occupied(mut e) => {
                // Same cube reached along a different combination path:
                // merge the coverage instead of duplicating the implicant.
                e.get_mut().covered.extend(covered);
            }
            Entry::Vacant(e) => {
                e.insert(TrueImplicant {
                    covered,
                    was_combined: false,
                });
                self.true_order.push(pattern);
            }
        }
    }

    fn add_dontcare(&mut self, pattern: u64) {
        if self.dontcare_implicants.insert(pattern) {
            self.dontcare_order.push(pattern);
        }
    }
}

/// Computes the prime implicants of a Boolean function given as lists of
/// minterms and don't-care terms.
pub struct QuineMcCluskey {
    numvars: usize,
    minterms: Vec<u64>,
    dontcareterms: Vec<u64>,
}

impl QuineMcCluskey {
    pub fn new(numvars: usize) -> Self {
        assert!(numvars <= 64, "at most 64 variables are supported");
        Self {
            numvars,
            minterms: Vec::new(),
            dontcareterms: Vec::new(),
        }
    }

    pub fn set_minterms(&mut self, minterms: &[u64]) {
        self.minterms = minterms.to_vec();
    }

    pub fn set_dontcareterms(&mut self, dontcareterms: &[u64]) {
        self.dontcareterms = dontcareterms.to_vec();
    }

    fn full_mask(&self) -> u64 {
        if self.numvars == 0 {
            0
        } else {
            u64::MAX >> (64 - self.numvars)
        }
    }

    /// Compute all prime implicants.
    ///
    /// Every returned cube evaluates to true only at listed minterms or
    /// don't-cares, and no returned cube is a proper sub-cube of another.
    pub fn prime_implicants(&self) -> Vec<PrimeImplicant> {
        let full_mask = self.full_mask();

        let mut pending: BTreeMap<u64, ImplicantTable> = BTreeMap::new();
        let seed = pending.entry(full_mask).or_default();
        for (i, &minterm) in self.minterms.iter().enumerate() {
            assert!(minterm <= full_mask, "minterm {minterm} out of range");
            seed.add_true(minterm, BTreeSet::from([i as u32]));
        }
        for &term in &self.dontcareterms {
            assert!(term <= full_mask, "don't-care term {term} out of range");
            seed.add_dontcare(term);
        }

        let mut prime_implicants = Vec::new();

        // Pop the largest mask first. A combined cube always lands at a
        // strictly smaller mask than the table it came from, so each table is
        // complete by the time it is popped.
        while let Some((mask, mut table)) = pending.pop_last() {
            let snapshot = table.true_order.clone();
            for pattern in snapshot {
                for b in 0..self.numvars {
                    let bit = 1u64 << b;
                    if mask & bit == 0 {
                        continue;
                    }

                    let partner = pattern ^ bit;
                    let combined_mask = mask ^ bit;

                    if table.true_implicants.contains_key(&partner) {
                        let mut covered = table.true_implicants[&pattern].covered.clone();
                        covered.extend(table.true_implicants[&partner].covered.iter().copied());

                        mark_combined(&mut table, pattern);
                        mark_combined(&mut table, partner);

                        pending
                            .entry(combined_mask)
                            .or_default()
                            .add_true(pattern & combined_mask, covered);
                    } else if table.dontcare_implicants.contains(&partner) {
                        // Combining with a don't-care eliminates the variable
                        // but adds no coverage.
                        let covered = table.true_implicants[&pattern].covered.clone();
                        mark_combined(&mut table, pattern);

                        pending
                            .entry(combined_mask)
                            .or_default()
                            .add_true(pattern & combined_mask, covered);
                    }
                }
            }

            for &pattern in &table.true_order {
                let attrs = &table.true_implicants[&pattern];
                if !attrs.was_combined {
                    prime_implicants.push(PrimeImplicant {
                        cube: Cube::new(pattern, mask),
                        covered: attrs.covered.clone(),
                    });
                }
            }

            // Pure don't-care cubes are propagated so that higher-order
            // combinations can use them, but they are never emitted.
            let dc_snapshot = table.dontcare_order.clone();
            for pattern in dc_snapshot {
                for b in 0..self.numvars {
                    let bit = 1u64 << b;
                    if mask & bit == 0 {
                        continue;
                    }
                    if table.dontcare_implicants.contains(&(pattern ^ bit)) {
                        pending
                            .entry(mask ^ bit)
                            .or_default()
                            .add_dontcare(pattern & (mask ^ bit));
                    }
                }
            }
        }

        prime_implicants
    }
}

fn mark_combined(table: &mut ImplicantTable, pattern: u64) {
    if let Some(attrs) = table.true_implicants.get_mut(&pattern) {
        attrs.was_combined = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primes(numvars: usize, minterms: &[u64], dontcareterms: &[u64]) -> Vec<PrimeImplicant> {
        let mut qm = QuineMcCluskey::new(numvars);
        qm.set_minterms(minterms);
        qm.set_dontcareterms(dontcareterms);
        qm.prime_implicants()
    }

    fn cube_set(result: &[PrimeImplicant]) -> BTreeSet<(u64, u64)> {
        result.iter().map(|p| (p.cube.pattern(), p.cube.mask())).collect()
    }

    #[test]
    fn test_no_minterms_no_primes() {
        assert!(primes(3, &[], &[]).is_empty());
        assert!(primes(3, &[], &[0, 1, 2, 3, 4, 5, 6, 7]).is_empty());
    }

    #[test]
    fn test_full_space_collapses_to_universal_cube() {
        let result = primes(2, &[0, 1, 2, 3], &[]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].cube, Cube::universal());
        assert_eq!(result[0].covered, BTreeSet::from([0, 1, 2, 3]));
    }

    #[test]
    fn test_full_space_with_dontcares() {
        let result = primes(2, &[1], &[0, 2, 3]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].cube, Cube::universal());
        // Only the real minterm is counted as covered
        assert_eq!(result[0].covered, BTreeSet::from([0]));
    }

    #[test]
    fn test_single_minterm() {
        let result = primes(3, &[5], &[]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].cube, Cube::new(0b101, 0b111));
        assert_eq!(result[0].covered, BTreeSet::from([0]));
    }

    #[test]
    fn test_textbook_four_variables() {
        // Classic McCluskey example: f(3..0) = Σ(4,8,10,11,12,15) + d(9,14)
        let result = primes(4, &[4, 8, 10, 11, 12, 15], &[9, 14]);

        assert_eq!(
            cube_set(&result),
            BTreeSet::from([
                (0b0100, 0b0111), // -100
                (0b1000, 0b1100), // 10--
                (0b1000, 0b1001), // 1--0
                (0b1010, 0b1010), // 1-1-
            ])
        );

        // Coverage is reported against input positions, don't-cares excluded.
        // Input order: [4, 8, 10, 11, 12, 15] -> indices 0..=5.
        let by_cube: HashMap<(u64, u64), &BTreeSet<u32>> = result
            .iter()
            .map(|p| ((p.cube.pattern(), p.cube.mask()), &p.covered))
            .collect();
        assert_eq!(by_cube[&(0b0100, 0b0111)], &BTreeSet::from([0, 4]));
        assert_eq!(by_cube[&(0b1000, 0b1100)], &BTreeSet::from([1, 2, 3]));
        assert_eq!(by_cube[&(0b1000, 0b1001)], &BTreeSet::from([1, 2, 4]));
        assert_eq!(by_cube[&(0b1010, 0b1010)], &BTreeSet::from([2, 3, 5]));
    }

    #[test]
    fn test_soundness_and_coverage() {
        // Every prime must be true only on minterms or don't-cares, and the
        // union of covered indices must equal the set of minterm indices.
        let minterms = [1u64, 3, 7, 11, 15];
        let dontcareterms = [0u64, 2, 5];
        let result = primes(4, &minterms, &dontcareterms);

        let on: BTreeSet<u64> = minterms.iter().copied().collect();
        let dc: BTreeSet<u64> = dontcareterms.iter().copied().collect();

        for p in &result {
            for x in 0u64..16 {
                if p.cube.covers(x) {
                    assert!(on.contains(&x) || dc.contains(&x), "{:?} covers {}", p.cube, x);
                }
            }
        }

        let mut covered = BTreeSet::new();
        for p in &result {
            covered.extend(p.covered.iter().copied());
        }
        assert_eq!(covered, (0..minterms.len() as u32).collect::<BTreeSet<_>>());
    }

    #[test]
    fn test_no_subsumed_cubes() {
        let result = primes(4, &[0, 1, 2, 3, 5, 7, 8, 10, 12, 13, 15], &[]);
        for a in &result {
            for b in &result {
                if a.cube == b.cube {
                    continue;
                }
                let strict_subcube = a.cube.mask() & b.cube.mask() == b.cube.mask()
                    && a.cube.mask() != b.cube.mask()
                    && a.cube.pattern() & b.cube.mask() == b.cube.pattern();
                assert!(!strict_subcube, "{:?} is subsumed by {:?}", a.cube, b.cube);
            }
        }
    }

    #[test]
    fn test_duplicate_terms_are_harmless() {
        let plain = primes(3, &[1, 3, 5, 7], &[2]);
        let repeated = primes(3, &[1, 3, 1, 5, 7, 7], &[2, 2]);
        assert_eq!(cube_set(&plain), cube_set(&repeated));
    }

    #[test]
    fn test_merges_coverage_across_combination_paths() {
        // 0,1,2,3 combine towards the same cube along two paths; the covered
        // set must be the union, not the last writer.
        let result = primes(2, &[0, 1, 2, 3], &[]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].covered.len(), 4);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_minterm_out_of_range() {
        primes(2, &[4], &[]);
    }
}
