//! # Height Noise
//!
//! The seeded noise field behind terrain height.
//!
//! World seeds are 64-bit; `noise::Perlin` takes a 32-bit seed and shuffles its 256-entry
//! permutation table from it. The two halves of the world seed are folded together so that
//! seeds differing only in their high bits still produce different fields.

use ::noise::Perlin;

/// Folds a 64-bit world seed into the 32-bit seed of the noise field.
pub fn fold_seed(seed: i64) -> u32 {
    let bits = seed as u64;
    (bits >> 32) as u32 ^ bits as u32
}

/// The noise field of the world with seed `seed`.
pub fn noise_field(seed: i64) -> Perlin {
    Perlin::new(fold_seed(seed))
}
