//! Deterministic element data for tests and benchmarks.
//!
//! Generators are seeded ChaCha8 streams, so a given `(seed, n)` always
//! yields the same values on every platform.

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessel_core::{Element, Scalar};

/// `0.0, 1.0, ..., (n - 1) as f64`.
pub fn ramp_f64(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

/// `n` uniform `f64` values in `[-1e6, 1e6)`.
pub fn random_f64s(seed: u64, n: usize) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            // 53 random mantissa bits -> [0, 1).
            let unit = (rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
            unit * 2e6 - 1e6
        })
        .collect()
}

/// `n` arbitrary `i32` values.
pub fn random_i32s(seed: u64, n: usize) -> Vec<i32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.next_u32() as i32).collect()
}

/// `n` arbitrary bytes.
pub fn random_u8s(seed: u64, n: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut out = vec![0u8; n];
    rng.fill_bytes(&mut out);
    out
}

/// Tag each value with its kind, as a dynamic host would hand it over.
pub fn scalars<T: Element>(values: &[T]) -> Vec<Scalar> {
    values.iter().map(|v| v.into_scalar()).collect()
}
