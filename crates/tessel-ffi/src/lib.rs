//! C FFI bindings for Tessel typed numeric blocks.
//!
//! Exposes a C-compatible API for language bindings. Blocks and views are
//! named by generation-checked `u64` handles; every function returns an
//! `i32` [`TesselStatus`](status::TesselStatus) and writes results through
//! out-pointers. This crate is one of two that may contain `unsafe` code
//! (along with `tessel-block`).
//!
//! Blocks are single-threaded, so handle tables live in thread-local
//! storage: a handle is only valid on the thread that created it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run an FFI body, converting a caught panic into `Panicked`.
///
/// The body evaluates to an `i32` status; `return` inside it returns from
/// the guarded closure.
macro_rules! ffi_guard {
    ($body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| -> i32 { $body })) {
            Ok(code) => code,
            Err(_) => $crate::status::TesselStatus::Panicked as i32,
        }
    };
}

/// Write `value` through an out-pointer already checked for null.
macro_rules! write_out {
    ($out:expr, $value:expr) => {{
        // SAFETY: callers check `$out` for null first; the C caller
        // guarantees it is aligned and writable.
        unsafe { *$out = $value };
    }};
}

pub mod block;
pub mod config;
mod handle;
pub mod status;
pub mod types;

pub use status::TesselStatus;
pub use types::TesselKind;
