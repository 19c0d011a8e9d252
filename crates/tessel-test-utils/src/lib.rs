//! Test utilities and fixtures for Tessel development.
//!
//! Provides deterministic value generators ([`fixtures`]), an instrumented
//! global allocator for release accounting ([`alloc`]), and a one-call
//! tracing setup for tests that want to see block lifecycle events.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod alloc;
pub mod fixtures;

pub use alloc::CountingAllocator;

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::TRACE)
        .try_init();
}
