// Boolean minimization: Quine-McCluskey with Petrick's method
//
// The tabular method computes all prime implicants of a function given by
// minterms and don't-care terms; Petrick's method then selects the covers
// with the fewest products and, among those, the fewest literals.

pub mod cube;
pub mod petricks;
pub mod quine_mccluskey;

pub use cube::Cube;
pub use petricks::{PetricksMethod, Solution};
pub use quine_mccluskey::{PrimeImplicant, QuineMcCluskey};
