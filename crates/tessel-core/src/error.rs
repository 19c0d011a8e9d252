//! Error types for block construction, access and conversion.

use std::error::Error;
use std::fmt;

use crate::kind::ElementKind;

/// Errors raised by block and view operations.
///
/// Every variant is reported synchronously at the call that caused it.
/// Only [`BlockError::AllocationFailure`] describes an environmental
/// condition; the rest signal a caller bug that can be fixed by retrying
/// with corrected arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockError {
    /// Storage for the requested element count could not be obtained.
    AllocationFailure {
        /// Number of bytes requested (`usize::MAX` if the size overflowed).
        requested_bytes: usize,
        /// Configured allocation budget, if one rejected the request.
        limit: Option<usize>,
    },
    /// An element index outside `[0, len)`.
    OutOfRange {
        /// The offending index as supplied by the caller.
        index: i64,
        /// Length of the block or view.
        len: usize,
    },
    /// View parameters that violate the slicing invariant.
    InvalidRange {
        /// Requested starting index.
        start: i64,
        /// Requested logical length.
        length: usize,
        /// Requested stride.
        stride: isize,
        /// Length of the block or view being sliced.
        len: usize,
    },
    /// A value or block of an incompatible element kind.
    KindMismatch {
        /// The kind the operation required.
        expected: ElementKind,
        /// Description of what was supplied instead.
        found: String,
    },
    /// A write was attempted through a read-only borrowed block.
    ImmutableBuffer,
    /// Element-wise operands of different lengths.
    ShapeMismatch {
        /// Length of the left-hand operand.
        expected: usize,
        /// Length of the right-hand operand.
        actual: usize,
    },
}

impl BlockError {
    /// Build an [`BlockError::OutOfRange`] from an unsigned index.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::OutOfRange {
            index: i64::try_from(index).unwrap_or(i64::MAX),
            len,
        }
    }

    /// Build an [`BlockError::InvalidRange`] from an unsigned start.
    pub fn invalid_range(start: usize, length: usize, stride: isize, len: usize) -> Self {
        Self::InvalidRange {
            start: i64::try_from(start).unwrap_or(i64::MAX),
            length,
            stride,
            len,
        }
    }
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailure {
                requested_bytes,
                limit,
            } => {
                write!(f, "allocation of {requested_bytes} bytes failed")?;
                if let Some(limit) = limit {
                    write!(f, " (budget {limit} bytes)")?;
                }
                Ok(())
            }
            Self::OutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Self::InvalidRange {
                start,
                length,
                stride,
                len,
            } => {
                write!(
                    f,
                    "invalid range: start {start}, length {length}, stride {stride} for length {len}"
                )
            }
            Self::KindMismatch { expected, found } => {
                write!(f, "kind mismatch: expected {expected}, found {found}")
            }
            Self::ImmutableBuffer => write!(f, "block is read-only"),
            Self::ShapeMismatch { expected, actual } => {
                write!(f, "length mismatch: expected {expected}, got {actual}")
            }
        }
    }
}

impl Error for BlockError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_saturates_huge_indices() {
        let err = BlockError::out_of_range(usize::MAX, 4);
        assert_eq!(
            err,
            BlockError::OutOfRange {
                index: i64::MAX,
                len: 4
            }
        );
    }

    #[test]
    fn display_mentions_parameters() {
        let err = BlockError::invalid_range(2, 3, 0, 5);
        let msg = err.to_string();
        assert!(msg.contains("stride 0"));
        assert!(msg.contains("length 5"));

        let err = BlockError::AllocationFailure {
            requested_bytes: 64,
            limit: Some(32),
        };
        assert_eq!(err.to_string(), "allocation of 64 bytes failed (budget 32 bytes)");
    }

    #[test]
    fn kind_mismatch_display() {
        let err = BlockError::KindMismatch {
            expected: ElementKind::UInt8,
            found: "Float64 block".into(),
        };
        assert_eq!(
            err.to_string(),
            "kind mismatch: expected UInt8, found Float64 block"
        );
    }
}
