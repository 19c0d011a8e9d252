//! Core types for Tessel typed numeric blocks.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! closed set of element kinds, the sealed [`Element`] trait that the
//! generic block implementation is parameterised over, the kind-erased
//! [`Scalar`] value used at host boundaries, the cross-kind conversion
//! policy, and the [`BlockError`] taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod convert;
pub mod error;
pub mod kind;
pub mod scalar;

pub use error::BlockError;
pub use kind::{Element, ElementKind};
pub use scalar::Scalar;
