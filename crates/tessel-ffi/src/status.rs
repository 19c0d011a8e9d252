//! C-compatible status codes.
//!
//! [`TesselStatus`] is a `repr(i32)` enum covering every error condition a
//! block operation or the FFI layer itself can report. Values are
//! ABI-stable.

use tessel_core::BlockError;

/// C-compatible status code returned by all FFI functions.
///
/// `Ok` = 0, all errors are negative.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TesselStatus {
    /// Success.
    Ok = 0,
    /// Handle is invalid, was already destroyed, or belongs to another
    /// thread.
    InvalidHandle = -1,
    /// Element index outside the block or view.
    OutOfRange = -2,
    /// Slice parameters violate the slicing rule, or a wrapped pointer is
    /// null or misaligned.
    InvalidRange = -3,
    /// Storage could not be obtained or exceeds the allocation budget.
    AllocationFailed = -4,
    /// A value is not exactly representable in the block's kind.
    KindMismatch = -5,
    /// Write through a read-only wrapped region.
    ImmutableBuffer = -6,
    /// Element-wise operands of different lengths.
    ShapeMismatch = -7,
    /// A null out-pointer, unknown kind tag, or non-contiguous handle where
    /// a flat array is required.
    InvalidArgument = -8,
    /// Caller-provided buffer is too small.
    BufferTooSmall = -9,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&BlockError> for TesselStatus {
    fn from(e: &BlockError) -> Self {
        match e {
            BlockError::AllocationFailure { .. } => TesselStatus::AllocationFailed,
            BlockError::OutOfRange { .. } => TesselStatus::OutOfRange,
            BlockError::InvalidRange { .. } => TesselStatus::InvalidRange,
            BlockError::KindMismatch { .. } => TesselStatus::KindMismatch,
            BlockError::ImmutableBuffer => TesselStatus::ImmutableBuffer,
            BlockError::ShapeMismatch { .. } => TesselStatus::ShapeMismatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::ElementKind;

    #[test]
    fn status_code_values_are_stable() {
        assert_eq!(TesselStatus::Ok as i32, 0);
        assert_eq!(TesselStatus::InvalidHandle as i32, -1);
        assert_eq!(TesselStatus::OutOfRange as i32, -2);
        assert_eq!(TesselStatus::InvalidRange as i32, -3);
        assert_eq!(TesselStatus::AllocationFailed as i32, -4);
        assert_eq!(TesselStatus::KindMismatch as i32, -5);
        assert_eq!(TesselStatus::ImmutableBuffer as i32, -6);
        assert_eq!(TesselStatus::ShapeMismatch as i32, -7);
        assert_eq!(TesselStatus::InvalidArgument as i32, -8);
        assert_eq!(TesselStatus::BufferTooSmall as i32, -9);
        assert_eq!(TesselStatus::Panicked as i32, -128);
    }

    #[test]
    fn block_error_to_status() {
        assert_eq!(
            TesselStatus::from(&BlockError::AllocationFailure {
                requested_bytes: 8,
                limit: Some(4)
            }),
            TesselStatus::AllocationFailed
        );
        assert_eq!(
            TesselStatus::from(&BlockError::OutOfRange { index: -1, len: 0 }),
            TesselStatus::OutOfRange
        );
        assert_eq!(
            TesselStatus::from(&BlockError::invalid_range(0, 1, 0, 1)),
            TesselStatus::InvalidRange
        );
        assert_eq!(
            TesselStatus::from(&BlockError::KindMismatch {
                expected: ElementKind::UInt8,
                found: "Float64 value 0.5".into()
            }),
            TesselStatus::KindMismatch
        );
        assert_eq!(
            TesselStatus::from(&BlockError::ImmutableBuffer),
            TesselStatus::ImmutableBuffer
        );
        assert_eq!(
            TesselStatus::from(&BlockError::ShapeMismatch {
                expected: 2,
                actual: 3
            }),
            TesselStatus::ShapeMismatch
        );
    }
}
