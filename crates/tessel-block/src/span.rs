//! Offset/length/stride addressing shared by views and iterators.

use tessel_core::BlockError;

/// Logical-to-physical index mapping over a storage region.
///
/// Logical index `i` maps to physical element `offset + i * stride`.
/// A span is only ever constructed through [`Span::full`] or
/// [`Span::subspan`], so every logical index below `len` maps inside the
/// storage it was validated against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) offset: usize,
    pub(crate) len: usize,
    pub(crate) stride: isize,
}

impl Span {
    /// The identity span covering `len` contiguous elements.
    pub(crate) fn full(len: usize) -> Self {
        Self {
            offset: 0,
            len,
            stride: 1,
        }
    }

    /// Physical index of logical index `i`. Caller guarantees `i < len`.
    #[inline]
    pub(crate) fn physical(&self, i: usize) -> usize {
        debug_assert!(i < self.len);
        (self.offset as isize + i as isize * self.stride) as usize
    }

    /// Whether logical neighbours are physically adjacent.
    pub(crate) fn is_contiguous(&self) -> bool {
        self.stride == 1 || self.len <= 1
    }

    /// Derive a span selecting `length` elements of `self`, starting at
    /// logical `start` and stepping by `stride`.
    ///
    /// Fails with [`BlockError::InvalidRange`] when `stride == 0`, when the
    /// last selected element would fall outside `[0, self.len)`, or when
    /// the composed stride of a multi-element selection overflows. A
    /// selection of zero or one element keeps `self.stride`.
    pub(crate) fn subspan(
        &self,
        start: usize,
        length: usize,
        stride: isize,
    ) -> Result<Span, BlockError> {
        check_slice(self.len, start, length, stride)?;
        // With at most one element the stride is never applied.
        let stride = if length <= 1 {
            self.stride
        } else {
            self.stride
                .checked_mul(stride)
                .ok_or_else(|| BlockError::invalid_range(start, length, stride, self.len))?
        };
        let offset = if length == 0 {
            self.offset
        } else {
            self.physical(start)
        };
        Ok(Span {
            offset,
            len: length,
            stride,
        })
    }
}

/// Validate slice parameters against a sequence of `len` elements.
///
/// Positive strides require `start + (length - 1) * stride < len`;
/// negative strides require `start < len` and
/// `start - (length - 1) * |stride| >= 0`. Empty selections are accepted
/// whenever `start <= len`.
pub(crate) fn check_slice(
    len: usize,
    start: usize,
    length: usize,
    stride: isize,
) -> Result<(), BlockError> {
    let invalid = || BlockError::invalid_range(start, length, stride, len);
    if stride == 0 {
        return Err(invalid());
    }
    if length == 0 {
        return if start <= len { Ok(()) } else { Err(invalid()) };
    }
    if start >= len {
        return Err(invalid());
    }
    let extent = (length - 1)
        .checked_mul(stride.unsigned_abs())
        .ok_or_else(invalid)?;
    if stride > 0 {
        match start.checked_add(extent) {
            Some(last) if last < len => Ok(()),
            _ => Err(invalid()),
        }
    } else if extent <= start {
        Ok(())
    } else {
        Err(invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_stride_is_rejected() {
        assert!(check_slice(10, 0, 1, 0).is_err());
        assert!(check_slice(10, 0, 0, 0).is_err());
    }

    #[test]
    fn positive_stride_bounds() {
        assert!(check_slice(10, 0, 10, 1).is_ok());
        assert!(check_slice(10, 0, 11, 1).is_err());
        assert!(check_slice(10, 1, 5, 2).is_ok()); // last = 9
        assert!(check_slice(10, 2, 5, 2).is_err()); // last = 10
    }

    #[test]
    fn negative_stride_bounds() {
        assert!(check_slice(10, 9, 10, -1).is_ok());
        assert!(check_slice(10, 9, 11, -1).is_err());
        assert!(check_slice(10, 8, 5, -2).is_ok()); // last = 0
        assert!(check_slice(10, 10, 1, -1).is_err());
    }

    #[test]
    fn empty_selection_needs_start_within_bounds() {
        assert!(check_slice(4, 4, 0, 1).is_ok());
        assert!(check_slice(4, 5, 0, 1).is_err());
        assert!(check_slice(0, 0, 0, 3).is_ok());
    }

    #[test]
    fn extent_overflow_is_invalid_not_panic() {
        assert!(check_slice(10, 1, usize::MAX, isize::MAX).is_err());
        assert!(check_slice(10, 9, usize::MAX, -2).is_err());
    }

    #[test]
    fn subspan_composes_offsets_and_strides() {
        let outer = Span::full(20).subspan(2, 9, 2).unwrap(); // 2,4,...,18
        assert_eq!(outer.offset, 2);
        assert_eq!(outer.stride, 2);
        let inner = outer.subspan(8, 3, -3).unwrap(); // logical 8,5,2 -> 18,12,6
        assert_eq!(inner.offset, 18);
        assert_eq!(inner.stride, -6);
        assert_eq!(
            (0..inner.len).map(|i| inner.physical(i)).collect::<Vec<_>>(),
            vec![18, 12, 6]
        );
    }

    #[test]
    fn single_element_of_wide_stride_view_is_valid() {
        let wide = Span {
            offset: 0,
            len: 2,
            stride: isize::MAX / 2,
        };
        let one = wide.subspan(1, 1, 3).unwrap();
        assert_eq!(one.len, 1);
        assert_eq!(one.stride, wide.stride);
        assert_eq!(one.physical(0), wide.physical(1));
        let none = wide.subspan(2, 0, -5).unwrap();
        assert_eq!((none.offset, none.len, none.stride), (0, 0, wide.stride));
        assert!(wide.subspan(0, 2, 3).is_err());
    }

    #[test]
    fn contiguity() {
        assert!(Span::full(5).is_contiguous());
        assert!(!Span::full(5).subspan(0, 3, 2).unwrap().is_contiguous());
        assert!(Span::full(5).subspan(4, 1, -1).unwrap().is_contiguous());
    }

    proptest! {
        #[test]
        fn accepted_slices_stay_in_bounds(
            len in 0usize..64,
            start in 0usize..70,
            length in 0usize..70,
            stride in -8isize..8,
        ) {
            if let Ok(span) = Span::full(len).subspan(start, length, stride) {
                for i in 0..span.len {
                    prop_assert!(span.physical(i) < len);
                }
            }
        }

        #[test]
        fn positive_stride_rule_matches_formula(
            len in 1usize..64,
            start in 0usize..64,
            length in 1usize..64,
            stride in 1isize..8,
        ) {
            let last = start + (length - 1) * stride as usize;
            prop_assert_eq!(check_slice(len, start, length, stride).is_ok(), last < len);
        }
    }
}
