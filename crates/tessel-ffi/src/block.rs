//! Block and view handles across the C ABI.
//!
//! Every handle names an [`AnyView`]: a freshly allocated or wrapped block
//! is stored as its full-length view, and `tessel_block_slice` stores the
//! derived view under a new handle. Destroying a handle drops that view's
//! share of the storage; owned storage is released when the last handle
//! onto it is destroyed, and wrapped host memory is never released.

use std::cell::RefCell;
use std::ffi::c_void;

use tessel_block::{AnyBlock, AnyView};
use tessel_core::{BlockError, Scalar};

use crate::config;
use crate::handle::HandleTable;
use crate::status::TesselStatus;
use crate::types::parse_kind;

thread_local! {
    static BLOCKS: RefCell<HandleTable<AnyView<'static>>> = const { RefCell::new(HandleTable::new()) };
}

fn insert(view: AnyView<'static>) -> u64 {
    BLOCKS.with(|t| t.borrow_mut().insert(view))
}

fn get_view(handle: u64) -> Option<AnyView<'static>> {
    BLOCKS.with(|t| t.borrow().get(handle).cloned())
}

fn status(err: &BlockError) -> i32 {
    TesselStatus::from(err) as i32
}

/// Number of live handles on this thread.
pub(crate) fn live_handles() -> usize {
    BLOCKS.with(|t| t.borrow().len())
}

// ── Construction ────────────────────────────────────────────────

/// Allocate a zero-filled owning block of `count` elements of `kind`.
///
/// `count == 0` yields a valid empty block. Returns `AllocationFailed` if
/// the size overflows or exceeds this thread's budget.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tessel_block_alloc(kind: i32, count: usize, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return TesselStatus::InvalidArgument as i32;
        }
        let Some(kind) = parse_kind(kind) else {
            return TesselStatus::InvalidArgument as i32;
        };
        match AnyBlock::allocate_with(&config::current(), kind, count) {
            Ok(block) => {
                write_out!(out, insert(block.view()));
                TesselStatus::Ok as i32
            }
            Err(e) => status(&e),
        }
    })
}

/// Copy `n` doubles into a new owning block of `kind`.
///
/// Each value must be exactly representable in `kind`, otherwise
/// `KindMismatch` is returned and no block is created. `values` may be
/// null when `n == 0`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tessel_block_from_f64(
    kind: i32,
    values: *const f64,
    n: usize,
    out: *mut u64,
) -> i32 {
    ffi_guard!({
        if out.is_null() || (values.is_null() && n > 0) {
            return TesselStatus::InvalidArgument as i32;
        }
        let Some(kind) = parse_kind(kind) else {
            return TesselStatus::InvalidArgument as i32;
        };
        let values: &[f64] = if n == 0 {
            &[]
        } else {
            // SAFETY: non-null checked above; caller guarantees `n` readable
            // doubles.
            unsafe { std::slice::from_raw_parts(values, n) }
        };
        match AnyBlock::from_f64s_with(&config::current(), kind, values) {
            Ok(block) => {
                write_out!(out, insert(block.view()));
                TesselStatus::Ok as i32
            }
            Err(e) => status(&e),
        }
    })
}

/// Alias `count` elements of `kind` at `ptr` without copying.
///
/// The memory is never released by the library. The caller must keep it
/// valid, and must not free or reuse it, until every handle derived from
/// the returned one has been destroyed. A null or misaligned `ptr` with
/// `count > 0`, or a `count` whose byte size exceeds `PTRDIFF_MAX`,
/// returns `InvalidRange`. With `writable == 0` every write through the
/// handle returns `ImmutableBuffer`.
///
/// The caller may keep reading and writing the region itself while
/// handles are live, whatever `writable` says; such writes are visible
/// through every handle onto it.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tessel_block_wrap(
    kind: i32,
    ptr: *mut c_void,
    count: usize,
    writable: u8,
    out: *mut u64,
) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return TesselStatus::InvalidArgument as i32;
        }
        let Some(kind) = parse_kind(kind) else {
            return TesselStatus::InvalidArgument as i32;
        };
        // SAFETY: validity of the region for the life of every derived
        // handle is the C caller's contract above.
        let wrapped = unsafe { AnyBlock::wrap_raw(kind, ptr.cast(), count, writable != 0) };
        match wrapped {
            Ok(block) => {
                write_out!(out, insert(block.view()));
                TesselStatus::Ok as i32
            }
            Err(e) => status(&e),
        }
    })
}

/// Destroy a block or view handle.
///
/// Destroying a view never releases storage other handles still use.
/// Returns `InvalidHandle` for a stale or unknown handle, so destroying
/// twice is harmless.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tessel_block_destroy(handle: u64) -> i32 {
    ffi_guard!({
        // Drop the view after the table borrow ends: releasing storage logs.
        let removed = BLOCKS.with(|t| t.borrow_mut().remove(handle));
        match removed {
            Some(view) => {
                tracing::trace!(handle, len = view.len(), "destroyed block handle");
                drop(view);
                TesselStatus::Ok as i32
            }
            None => TesselStatus::InvalidHandle as i32,
        }
    })
}

// ── Metadata ────────────────────────────────────────────────────

/// Number of logical elements behind `handle`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tessel_block_len(handle: u64, out: *mut usize) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return TesselStatus::InvalidArgument as i32;
        }
        let Some(view) = get_view(handle) else {
            return TesselStatus::InvalidHandle as i32;
        };
        write_out!(out, view.len());
        TesselStatus::Ok as i32
    })
}

/// Element kind tag (`TesselKind`) of `handle`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tessel_block_kind(handle: u64, out: *mut i32) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return TesselStatus::InvalidArgument as i32;
        }
        let Some(view) = get_view(handle) else {
            return TesselStatus::InvalidHandle as i32;
        };
        write_out!(out, view.kind() as i32);
        TesselStatus::Ok as i32
    })
}

/// `1` if writes through `handle` are permitted, `0` for read-only wraps.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tessel_block_is_writable(handle: u64, out: *mut u8) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return TesselStatus::InvalidArgument as i32;
        }
        let Some(view) = get_view(handle) else {
            return TesselStatus::InvalidHandle as i32;
        };
        write_out!(out, u8::from(view.is_writable()));
        TesselStatus::Ok as i32
    })
}

// ── Element access ──────────────────────────────────────────────

/// Read element `index` as a double.
///
/// Negative indices return `OutOfRange`; they never count from the end.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tessel_block_get(handle: u64, index: i64, out: *mut f64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return TesselStatus::InvalidArgument as i32;
        }
        let Some(view) = get_view(handle) else {
            return TesselStatus::InvalidHandle as i32;
        };
        match view.get(index) {
            Ok(value) => {
                write_out!(out, value.to_f64());
                TesselStatus::Ok as i32
            }
            Err(e) => status(&e),
        }
    })
}

/// Overwrite element `index` with `value`.
///
/// `value` must be exactly representable in the handle's kind
/// (`KindMismatch` otherwise). The write is visible through every handle
/// sharing the storage.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tessel_block_set(handle: u64, index: i64, value: f64) -> i32 {
    ffi_guard!({
        let Some(view) = get_view(handle) else {
            return TesselStatus::InvalidHandle as i32;
        };
        match view.set(index, Scalar::Float64(value)) {
            Ok(()) => TesselStatus::Ok as i32,
            Err(e) => status(&e),
        }
    })
}

/// Create a view handle selecting `length` elements from `start`, stepping
/// by `stride`.
///
/// Indices are relative to `handle`, which may itself be a view. Returns
/// `InvalidRange` when `stride == 0`, `start < 0`, or the last selected
/// index falls outside `handle`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tessel_block_slice(
    handle: u64,
    start: i64,
    length: usize,
    stride: isize,
    out: *mut u64,
) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return TesselStatus::InvalidArgument as i32;
        }
        let Some(view) = get_view(handle) else {
            return TesselStatus::InvalidHandle as i32;
        };
        match view.slice(start, length, stride) {
            Ok(sub) => {
                write_out!(out, insert(sub));
                TesselStatus::Ok as i32
            }
            Err(e) => status(&e),
        }
    })
}

// ── Conversion ──────────────────────────────────────────────────

/// Copy the logical elements of `handle`, in order, into `out` as doubles.
///
/// Returns `BufferTooSmall` without writing if `out_len` is less than the
/// handle's length.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tessel_block_copy_to_f64(handle: u64, out: *mut f64, out_len: usize) -> i32 {
    ffi_guard!({
        let Some(view) = get_view(handle) else {
            return TesselStatus::InvalidHandle as i32;
        };
        let len = view.len();
        if len == 0 {
            return TesselStatus::Ok as i32;
        }
        if out.is_null() {
            return TesselStatus::InvalidArgument as i32;
        }
        if out_len < len {
            return TesselStatus::BufferTooSmall as i32;
        }
        let values = view.to_f64_vec();
        // SAFETY: `out` points to at least `out_len >= len` writable doubles
        // per caller contract; the source is a fresh Vec.
        unsafe {
            std::ptr::copy_nonoverlapping(values.as_ptr(), out, len);
        }
        TesselStatus::Ok as i32
    })
}

/// Copy `handle` into a new contiguous owning block of `kind`.
///
/// Narrowing conversions truncate toward zero and saturate; NaN becomes 0.
/// Casting to the handle's own kind makes a contiguous copy.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tessel_block_cast(handle: u64, kind: i32, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return TesselStatus::InvalidArgument as i32;
        }
        let Some(kind) = parse_kind(kind) else {
            return TesselStatus::InvalidArgument as i32;
        };
        let Some(view) = get_view(handle) else {
            return TesselStatus::InvalidHandle as i32;
        };
        match view.cast_to_with(&config::current(), kind) {
            Ok(block) => {
                write_out!(out, insert(block.view()));
                TesselStatus::Ok as i32
            }
            Err(e) => status(&e),
        }
    })
}

/// Set every logical element of `handle` to `value`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tessel_block_fill(handle: u64, value: f64) -> i32 {
    ffi_guard!({
        let Some(view) = get_view(handle) else {
            return TesselStatus::InvalidHandle as i32;
        };
        match view.fill(Scalar::Float64(value)) {
            Ok(()) => TesselStatus::Ok as i32,
            Err(e) => status(&e),
        }
    })
}

/// Pointer to the first element of a contiguous handle.
///
/// The pointer addresses `len` elements of the handle's kind, laid out as
/// a flat native array, and stays valid while any handle onto the storage
/// is alive. Returns `InvalidArgument` for strided views.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn tessel_block_data_ptr(handle: u64, out: *mut *const c_void) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return TesselStatus::InvalidArgument as i32;
        }
        let Some(view) = get_view(handle) else {
            return TesselStatus::InvalidHandle as i32;
        };
        if !view.is_contiguous() {
            return TesselStatus::InvalidArgument as i32;
        }
        write_out!(out, view.as_ptr().cast());
        TesselStatus::Ok as i32
    })
}
