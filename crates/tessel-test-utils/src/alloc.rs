//! A counting global allocator.
//!
//! Install it in an integration test binary with
//!
//! ```ignore
//! #[global_allocator]
//! static ALLOC: CountingAllocator = CountingAllocator;
//! ```
//!
//! then [`watch`](CountingAllocator::watch) a byte size unique to the test.
//! Only allocations of exactly that size are counted, which keeps the
//! harness's own allocations out of the numbers.

#![allow(unsafe_code)]

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

static WATCHED: AtomicUsize = AtomicUsize::new(0);
static ALLOCS: AtomicUsize = AtomicUsize::new(0);
static DEALLOCS: AtomicUsize = AtomicUsize::new(0);

/// Forwards to [`System`], counting allocations of the watched size.
pub struct CountingAllocator;

impl CountingAllocator {
    /// Start counting allocations of exactly `size` bytes and reset both
    /// counters. A size of 0 disables counting.
    pub fn watch(size: usize) {
        WATCHED.store(size, Ordering::SeqCst);
        ALLOCS.store(0, Ordering::SeqCst);
        DEALLOCS.store(0, Ordering::SeqCst);
    }

    /// Allocations of the watched size since the last [`watch`](Self::watch).
    pub fn allocations() -> usize {
        ALLOCS.load(Ordering::SeqCst)
    }

    /// Deallocations of the watched size since the last
    /// [`watch`](Self::watch).
    pub fn deallocations() -> usize {
        DEALLOCS.load(Ordering::SeqCst)
    }

    /// Allocations not yet released.
    pub fn live() -> usize {
        Self::allocations().saturating_sub(Self::deallocations())
    }

    fn record(counter: &AtomicUsize, size: usize) {
        let watched = WATCHED.load(Ordering::Relaxed);
        if watched != 0 && size == watched {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// SAFETY: every method forwards to `System` with the caller's arguments
// unchanged; the counters never affect the returned memory.
unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // SAFETY: forwarded contract.
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            Self::record(&ALLOCS, layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        // SAFETY: forwarded contract.
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            Self::record(&ALLOCS, layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        Self::record(&DEALLOCS, layout.size());
        // SAFETY: forwarded contract.
        unsafe { System.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // SAFETY: forwarded contract.
        let new = unsafe { System.realloc(ptr, layout, new_size) };
        if !new.is_null() {
            Self::record(&DEALLOCS, layout.size());
            Self::record(&ALLOCS, new_size);
        }
        new
    }
}
