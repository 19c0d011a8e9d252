//! Benchmark workloads for Tessel blocks.
//!
//! Provides deterministic, pre-sized inputs shared by the criterion
//! benches:
//!
//! - [`reference_block`]: 1M random `f64` elements
//! - [`reference_scalars`]: the same values as kind-tagged host scalars
//! - [`strided_views`]: views of a block at the benchmarked strides

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tessel_block::{Block, BlockView};
use tessel_core::Scalar;
use tessel_test_utils::fixtures;

/// Element count of the reference workload.
pub const REFERENCE_LEN: usize = 1 << 20;

/// Strides exercised by the view benchmarks, including a reversed walk.
pub const STRIDES: [isize; 4] = [1, 2, 16, -1];

/// A block of [`REFERENCE_LEN`] random `f64` values in `[-1e6, 1e6)`.
pub fn reference_block(seed: u64) -> Block<'static, f64> {
    Block::from_values(&fixtures::random_f64s(seed, REFERENCE_LEN))
        .expect("reference workload fits in memory")
}

/// The reference values as host scalars, for dynamic-construction benches.
pub fn reference_scalars(seed: u64) -> Vec<Scalar> {
    fixtures::scalars(&fixtures::random_f64s(seed, REFERENCE_LEN))
}

/// One full-coverage view of `block` per entry in [`STRIDES`], paired with
/// its stride.
///
/// A positive stride `s` selects every `s`-th element from the front; a
/// negative stride walks back from the last element.
pub fn strided_views<'a>(block: &Block<'a, f64>) -> Vec<(isize, BlockView<'a, f64>)> {
    let n = block.len();
    STRIDES
        .iter()
        .filter_map(|&stride| {
            let step = stride.unsigned_abs();
            let len = n.div_ceil(step);
            let start = if stride < 0 { n.checked_sub(1)? } else { 0 };
            block.slice(start, len, stride).ok().map(|v| (stride, v))
        })
        .collect()
}
