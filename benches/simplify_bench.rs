// Benchmark for the minimization core on randomly generated functions
//
// The density is kept moderate so that Petrick's multiplication step stays
// within a sane chart width while still exercising the absorption paths.

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use pete::simplify_minterms;
use rand::{Rng, SeedableRng, rngs::StdRng};

fn generate_minterms(numvars: usize, density_percent: u32, seed: u64) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..1u64 << numvars)
        .filter(|_| rng.random_range(0..100) < density_percent)
        .collect()
}

fn bench_simplify(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplify_minterms");

    for &numvars in &[4usize, 6, 8] {
        let minterms = generate_minterms(numvars, 30, 42);
        group.bench_function(format!("{numvars}_vars"), |b| {
            b.iter(|| simplify_minterms(black_box(numvars), black_box(&minterms), &[]));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_simplify);
criterion_main!(benches);
