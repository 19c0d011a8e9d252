//! TesselStatus -> Python exception mapping with recovery hints.

use pyo3::exceptions::{PyIndexError, PyMemoryError, PyRuntimeError, PyTypeError, PyValueError};
use pyo3::PyResult;

/// Check an FFI status code. Returns `Ok(())` on success, raises a typed
/// Python exception with a recovery hint on error.
pub(crate) fn check_status(code: i32) -> PyResult<()> {
    if code == 0 {
        return Ok(());
    }
    let (msg, hint) = error_detail(code);
    let full = format!("tessel error {code}: {msg}\n  Hint: {hint}");
    match code {
        // Index outside the block or view → IndexError
        -2 => Err(PyIndexError::new_err(full)),

        // Value not representable in the block's kind → TypeError
        -5 => Err(PyTypeError::new_err(full)),

        // Allocation failure → MemoryError
        -4 => Err(PyMemoryError::new_err(full)),

        // Caller-fixable arguments → ValueError
        -3 | -6 | -7 | -8 | -9 => Err(PyValueError::new_err(full)),

        // Everything else → RuntimeError
        _ => Err(PyRuntimeError::new_err(full)),
    }
}

/// Returns `(message, recovery_hint)` for each FFI status code.
fn error_detail(code: i32) -> (&'static str, &'static str) {
    match code {
        -1 => (
            "invalid handle (already destroyed?)",
            "The Block has been destroyed, or is being used from a thread \
             other than the one that created it. If using a context manager, \
             access is only valid inside the `with` block.",
        ),
        -2 => (
            "index out of range",
            "Valid indices are 0 <= i < len(block). Negative indices do not \
             count from the end.",
        ),
        -3 => (
            "invalid slice range",
            "stride must be non-zero, start must be >= 0, and the last \
             selected index start + (length - 1) * stride must lie inside \
             the block. A zero-length slice is valid for 0 <= start <= len.",
        ),
        -4 => (
            "allocation failed",
            "The requested block is too large for available memory or the \
             configured allocation budget. Reduce the element count.",
        ),
        -5 => (
            "value not representable in the block's kind",
            "Int32 and UInt8 blocks only accept whole numbers inside their \
             range (UInt8: 0..=255). Use a Float64 block, or convert the \
             value before storing it.",
        ),
        -6 => (
            "block is read-only",
            "The block wraps a read-only NumPy array. Make the array \
             writeable before wrapping it, or copy it with Block.from_numpy().",
        ),
        -7 => (
            "operand lengths differ",
            "Element-wise operations need operands of equal length.",
        ),
        -8 => (
            "invalid argument",
            "An argument is out of its accepted domain, e.g. an unknown kind \
             or a strided view where a contiguous block is required.",
        ),
        -9 => (
            "caller-provided buffer too small",
            "The output buffer must hold at least len(block) elements.",
        ),
        -128 => (
            "internal panic caught at the FFI boundary",
            "This is a bug in tessel. The block may be left in an \
             unspecified state; please report it with a reproducer.",
        ),
        _ => (
            "unknown tessel error",
            "An unrecognized error code was returned from the FFI layer. \
             This may indicate a version mismatch between the Python \
             bindings and the native library.",
        ),
    }
}
