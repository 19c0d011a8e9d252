//! Tessel: typed numeric blocks with reference-counted storage and
//! zero-copy strided views.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Tessel sub-crates. For most users, adding `tessel` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tessel::prelude::*;
//!
//! let block = Block::from_values(&[2.0, 3.0, 4.0]).unwrap();
//! assert_eq!(block.get(1).unwrap(), 3.0);
//!
//! // A view shares storage with its block.
//! let evens = block.slice(0, 2, 2).unwrap();
//! evens.set(1, 9.0).unwrap();
//! assert_eq!(block.to_vec(), vec![2.0, 3.0, 9.0]);
//!
//! // Casting copies into a new owned block of the target kind.
//! let ints: Block<'_, i32> = block.cast().unwrap();
//! assert_eq!(ints.to_vec(), vec![2, 3, 9]);
//!
//! // Dynamic hosts work through the kind-erased AnyBlock.
//! let dynamic = AnyBlock::from_f64s(ElementKind::UInt8, &[1.0, 255.0]).unwrap();
//! assert_eq!(dynamic.get(1).unwrap(), Scalar::UInt8(255));
//! assert!(matches!(
//!     dynamic.set(0, Scalar::Float64(256.0)),
//!     Err(BlockError::KindMismatch { .. })
//! ));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tessel-core` | Element kinds, scalars, conversion policy, errors |
//! | [`block`] | `tessel-block` | Blocks, views, iteration, element-wise operations |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Element kinds, scalars, conversion policy and errors (`tessel-core`).
pub use tessel_core as types;

/// Blocks, views and their operations (`tessel-block`).
///
/// [`block::Block`] and [`block::BlockView`] are the statically typed API;
/// [`block::AnyBlock`] and [`block::AnyView`] dispatch over the kind at
/// runtime.
pub use tessel_block as block;

/// Common imports for typical Tessel usage.
///
/// ```rust
/// use tessel::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use tessel_core::{BlockError, Element, ElementKind, Scalar};

    // Blocks and views
    pub use tessel_block::{AnyBlock, AnyView, Block, BlockConfig, BlockView, CmpOp, LogicOp};
}
