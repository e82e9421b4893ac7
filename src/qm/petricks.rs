//! PetricksMethod: exact minimum-cost cover selection
//!
//! Builds the product-of-sums over prime-implicant selectors, multiplies it
//! out into a sum of products (applying the absorption law at every step) and
//! keeps the covers with the fewest products, then the fewest literals.

use std::collections::BTreeSet;

use super::cube::Cube;
use super::quine_mccluskey::PrimeImplicant;

/// Result of the minimization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Solution {
    /// The function is the tautology.
    Always,
    /// The function has an empty on-set.
    Never,
    /// One or more minimum covers; all have the same product count and the
    /// same literal count. Callers that need a single result pick the first,
    /// but the order between equally-minimal covers is not significant.
    Covers(Vec<Vec<Cube>>),
}

/// Set of prime-implicant selector indices.
///
/// Subset testing dominates the multiplication step, so charts with at most
/// 64 primes use a plain bitset; wider charts fall back to a sorted unique
/// vector.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SelectorSet {
    Bits(u64),
    Wide(Vec<u16>),
}

impl SelectorSet {
    fn collect(indices: &[usize], wide: bool) -> Self {
        if wide {
            let mut v: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
            v.sort_unstable();
            v.dedup();
            SelectorSet::Wide(v)
        } else {
            let mut bits = 0u64;
            for &i in indices {
                bits |= 1 << i;
            }
            SelectorSet::Bits(bits)
        }
    }

    fn singleton(index: usize, wide: bool) -> Self {
        Self::collect(&[index], wide)
    }

    fn len(&self) -> usize {
        match self {
            SelectorSet::Bits(bits) => bits.count_ones() as usize,
            SelectorSet::Wide(v) => v.len(),
        }
    }

    fn union(&self, other: &Self) -> Self {
        match (self, other) {
            (SelectorSet::Bits(a), SelectorSet::Bits(b)) => SelectorSet::Bits(a | b),
            (SelectorSet::Wide(a), SelectorSet::Wide(b)) => {
                let mut v = a.clone();
                v.extend_from_slice(b);
                v.sort_unstable();
                v.dedup();
                SelectorSet::Wide(v)
            }
            _ => unreachable!("selector representations never mix within one chart"),
        }
    }

    fn is_subset(&self, other: &Self) -> bool {
        match (self, other) {
            (SelectorSet::Bits(a), SelectorSet::Bits(b)) => a & b == *a,
            (SelectorSet::Wide(a), SelectorSet::Wide(b)) => {
                let mut it = b.iter();
                a.iter().all(|x| it.any(|y| y == x))
            }
            _ => unreachable!("selector representations never mix within one chart"),
        }
    }

    fn indices(&self) -> Vec<usize> {
        match self {
            SelectorSet::Bits(bits) => (0..64).filter(|i| bits & (1 << i) != 0).collect(),
            SelectorSet::Wide(v) => v.iter().map(|&i| i as usize).collect(),
        }
    }
}

pub struct PetricksMethod {
    prime_implicants: Vec<PrimeImplicant>,
}

impl PetricksMethod {
    pub fn new(prime_implicants: &[PrimeImplicant]) -> Self {
        Self {
            prime_implicants: prime_implicants.to_vec(),
        }
    }

    pub fn solve(&self) -> Solution {
        let product_of_sums = self.product_of_sums();
        let sum_of_products = multiply_out(product_of_sums);
        self.pick_minimum(sum_of_products)
    }

    /// Build one sum per covered minterm, dropping sums that are redundant by
    /// the absorption law before anything is multiplied out: if the selector
    /// set of one sum is a subset of another's, the larger sum is satisfied
    /// whenever the smaller one is.
    fn product_of_sums(&self) -> Vec<Vec<SelectorSet>> {
        let wide = self.prime_implicants.len() > 64;

        let mut all_mintermidxs = BTreeSet::new();
        for p in &self.prime_implicants {
            all_mintermidxs.extend(p.covered.iter().copied());
        }

        struct SumInfo {
            covered_by: SelectorSet,
            absorbed: bool,
        }
        let mut infos: Vec<SumInfo> = Vec::new();

        for &mintermidx in &all_mintermidxs {
            let covering: Vec<usize> = self
                .prime_implicants
                .iter()
                .enumerate()
                .filter(|(_, p)| p.covered.contains(&mintermidx))
                .map(|(i, _)| i)
                .collect();
            let covered_by = SelectorSet::collect(&covering, wide);

            let mut absorbed = false;
            for info in infos.iter_mut() {
                if info.covered_by.is_subset(&covered_by) {
                    absorbed = true;
                } else if covered_by.is_subset(&info.covered_by) {
                    info.absorbed = true;
                }
            }
            infos.push(SumInfo {
                covered_by,
                absorbed,
            });
        }

        infos
            .into_iter()
            .filter(|info| !info.absorbed)
            .map(|info| {
                info.covered_by
                    .indices()
                    .into_iter()
                    .map(|i| SelectorSet::singleton(i, wide))
                    .collect()
            })
            .collect()
    }

    fn pick_minimum(&self, sum_of_products: Vec<SelectorSet>) -> Solution {
        if sum_of_products.is_empty() {
            // No products: the boolean expression is always false
            return Solution::Never;
        }

        let min_products = sum_of_products.iter().map(SelectorSet::len).min().unwrap_or(0);
        let candidates: Vec<&SelectorSet> = sum_of_products
            .iter()
            .filter(|p| p.len() == min_products)
            .collect();

        let literal_sum = |sel: &SelectorSet| -> u32 {
            sel.indices()
                .into_iter()
                .map(|i| self.prime_implicants[i].cube.literal_count())
                .sum()
        };
        let min_literals = candidates.iter().map(|p| literal_sum(p)).min().unwrap_or(0);
        let winners: Vec<&SelectorSet> = candidates
            .into_iter()
            .filter(|p| literal_sum(p) == min_literals)
            .collect();

        // A lone singleton selecting the universal cube means something like
        // "A + !A" was the original input: the expression is always true.
        if winners.len() == 1 && min_products == 1 {
            let idx = winners[0].indices()[0];
            if self.prime_implicants[idx].cube.mask() == 0 {
                return Solution::Always;
            }
        }

        Solution::Covers(
            winners
                .into_iter()
                .map(|sel| {
                    sel.indices()
                        .into_iter()
                        .map(|i| self.prime_implicants[i].cube)
                        .collect()
                })
                .collect(),
        )
    }
}

/// Fold-multiply the sums left to right, applying the distributive law.
/// Each summand is a selector set, so X*X = X happens on union.
fn multiply_out(product_of_sums: Vec<Vec<SelectorSet>>) -> Vec<SelectorSet> {
    let mut sums = product_of_sums.into_iter();
    let Some(mut sumterm) = sums.next() else {
        return Vec::new();
    };

    for sum in sums {
        let mut multsum = Vec::with_capacity(sumterm.len() * sum.len());
        for summand1 in &sumterm {
            for summand2 in &sum {
                multsum.push(summand1.union(summand2));
            }
        }
        sumterm = absorb(multsum);
    }

    sumterm
}

/// Apply the absorption law X + XY = X pairwise, first writer wins.
fn absorb(sumterm: Vec<SelectorSet>) -> Vec<SelectorSet> {
    let mut simplified: Vec<SelectorSet> = Vec::new();

    'terms: for term in sumterm {
        for kept in simplified.iter_mut() {
            if term.is_subset(kept) {
                *kept = term;
                continue 'terms;
            } else if kept.is_subset(&term) {
                continue 'terms;
            }
        }
        simplified.push(term);
    }

    simplified
}
