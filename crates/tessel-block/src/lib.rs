//! Reference-counted typed numeric blocks with zero-copy strided views.
//!
//! A [`Block`] is a contiguous run of `f64`, `i32` or `u8` elements behind a
//! shared handle. Storage is either owned (allocated here, released once
//! when the last handle drops) or borrowed from the caller (never released,
//! lifetime-bounded by the borrow). A [`BlockView`] addresses a strided,
//! offset subset of the same storage without copying.
//!
//! # Architecture
//!
//! ```text
//! Block<'a, T> ─┐
//! BlockView<'a, T> ─┼─ Rc<Storage<'a, T>> ── Owned(Box<[Cell<T>]>)
//! Iter<'a, T> ─┘                          ├─ Borrowed(&'a [Cell<T>])
//!                                         └─ ReadOnly(&'a [T])
//! AnyBlock / AnyView: closed enums over the three kinds for dynamic hosts
//! ```
//!
//! Sharing is single-threaded: blocks are `!Send` and `!Sync`.
//!
//! This crate is one of two that may contain `unsafe` code (along with
//! `tessel-ffi`), confined to wrapping raw host regions.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod any;
pub mod block;
pub mod config;
pub mod iter;
pub mod ops;
mod span;
mod storage;
pub mod view;

// Public re-exports for the primary API surface.
pub use any::{AnyBlock, AnyView};
pub use block::Block;
pub use config::BlockConfig;
pub use iter::Iter;
pub use ops::{CmpOp, LogicOp};
pub use view::BlockView;
