//! Python bindings for Tessel typed numeric blocks.
//!
//! This crate provides PyO3 bindings wrapping the C FFI layer
//! (`tessel-ffi`). The native extension is named `_tessel`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![allow(unsafe_code)]

use pyo3::prelude::*;

mod block;
mod error;
mod handle;

/// The native `_tessel` extension module.
#[pymodule]
fn _tessel(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<block::Kind>()?;
    m.add_class::<block::Block>()?;
    Ok(())
}
