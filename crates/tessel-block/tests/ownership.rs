//! Integration test: owned storage is released exactly once.
//!
//! Installs a counting global allocator and watches a byte size no other
//! allocation in this binary uses. Views, clones and iterators share the
//! storage without ever releasing it; the final handle to drop releases
//! it once. Borrowed regions are never released by a block.

use tessel_block::{AnyBlock, Block};
use tessel_core::ElementKind;
use tessel_test_utils::CountingAllocator;

#[global_allocator]
static ALLOC: CountingAllocator = CountingAllocator;

const COUNT: usize = 12_347;
const BYTES: usize = COUNT * std::mem::size_of::<f64>();

// All scenarios share the global counters, so they run in one test.
#[test]
fn storage_release_accounting() {
    // ── Views and clones never free; the last handle frees once ─────
    CountingAllocator::watch(BYTES);
    let block = Block::<f64>::allocate(COUNT).unwrap();
    assert_eq!(CountingAllocator::allocations(), 1);

    let outer = block.slice(10, 100, 3).unwrap();
    let inner = outer.slice(99, 50, -2).unwrap();
    let clone = block.clone();
    let iter = block.iter();
    assert_eq!(block.strong_count(), 5);

    drop(inner);
    drop(outer);
    assert_eq!(CountingAllocator::deallocations(), 0);
    drop(block);
    drop(clone);
    assert_eq!(CountingAllocator::deallocations(), 0);
    assert_eq!(iter.len(), COUNT);
    drop(iter);
    assert_eq!(CountingAllocator::deallocations(), 1);
    assert_eq!(CountingAllocator::live(), 0);

    // ── A view keeps storage alive after its block is gone ─────────
    CountingAllocator::watch(BYTES);
    let view = {
        let block = Block::<f64>::allocate(COUNT).unwrap();
        block.set(COUNT - 1, 4.5).unwrap();
        block.slice(COUNT - 1, 1, 1).unwrap()
    };
    assert_eq!(CountingAllocator::deallocations(), 0);
    assert_eq!(view.get(0), Ok(4.5));
    drop(view);
    assert_eq!(CountingAllocator::allocations(), 1);
    assert_eq!(CountingAllocator::deallocations(), 1);

    // ── Kind-erased handles follow the same rule ────────────────────
    CountingAllocator::watch(BYTES);
    let any = AnyBlock::allocate(ElementKind::Float64, COUNT).unwrap();
    let any_view = any.slice(0, 2, 1).unwrap();
    drop(any);
    assert_eq!(CountingAllocator::deallocations(), 0);
    drop(any_view);
    assert_eq!(CountingAllocator::deallocations(), 1);

    // ── Borrowed regions are never released by the block ────────────
    let mut region = vec![0.0f64; COUNT];
    CountingAllocator::watch(BYTES);
    {
        let wrapped = Block::wrap(&mut region);
        let view = wrapped.slice(0, 10, 1).unwrap();
        view.fill(1.0).unwrap();
    }
    assert_eq!(CountingAllocator::deallocations(), 0);
    assert_eq!(region[9], 1.0);
    drop(region);
    assert_eq!(CountingAllocator::deallocations(), 1);

    CountingAllocator::watch(0);
}
