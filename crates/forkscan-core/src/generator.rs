//! Deterministic pseudo-random input arrays.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generate `len` non-negative integers from `seed`.
///
/// The same seed and length always give the same array for a given `rand`
/// release.
pub fn generate_array(seed: u64, len: usize) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(0..=i32::MAX)).collect()
}
