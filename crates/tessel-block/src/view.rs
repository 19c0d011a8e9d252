//! Zero-copy strided windows onto block storage.

use std::fmt;
use std::rc::Rc;

use tessel_core::convert::saturating_cast;
use tessel_core::{BlockError, Element, ElementKind};

use crate::block::Block;
use crate::config::BlockConfig;
use crate::iter::Iter;
use crate::span::Span;
use crate::storage::Storage;

/// A strided, offset window onto a block's storage.
///
/// A view never owns memory. It shares the parent's storage handle, so the
/// parent's elements stay alive while the view does, but dropping a view
/// never releases anything. Reads and writes go straight to the shared
/// storage and are visible through the parent and every other view.
///
/// Logical index `i` addresses parent element `offset + i * stride`.
pub struct BlockView<'a, T: Element> {
    storage: Rc<Storage<'a, T>>,
    span: Span,
}

impl<'a, T: Element> BlockView<'a, T> {
    pub(crate) fn new(storage: Rc<Storage<'a, T>>, span: Span) -> Self {
        Self { storage, span }
    }

    /// The element kind.
    pub fn kind(&self) -> ElementKind {
        T::KIND
    }

    /// Number of logical elements.
    pub fn len(&self) -> usize {
        self.span.len
    }

    /// Whether the view selects no elements.
    pub fn is_empty(&self) -> bool {
        self.span.len == 0
    }

    /// Physical index of logical element 0 within the parent storage.
    pub fn offset(&self) -> usize {
        self.span.offset
    }

    /// Distance, in parent elements, between consecutive logical elements.
    pub fn stride(&self) -> isize {
        self.span.stride
    }

    /// Whether logical neighbours are adjacent in memory.
    pub fn is_contiguous(&self) -> bool {
        self.span.is_contiguous()
    }

    /// Number of elements in the parent storage.
    pub fn parent_len(&self) -> usize {
        self.storage.len()
    }

    /// Whether writes are permitted.
    pub fn is_writable(&self) -> bool {
        self.storage.is_writable()
    }

    /// Read logical element `index`.
    pub fn get(&self, index: usize) -> Result<T, BlockError> {
        if index >= self.span.len {
            return Err(BlockError::out_of_range(index, self.span.len));
        }
        Ok(self.storage.load(self.span.physical(index)))
    }

    /// Overwrite logical element `index` in the shared storage.
    pub fn set(&self, index: usize, value: T) -> Result<(), BlockError> {
        if index >= self.span.len {
            return Err(BlockError::out_of_range(index, self.span.len));
        }
        self.storage.store(self.span.physical(index), value)
    }

    /// A view of this view. Indices and stride are relative to `self`; the
    /// result addresses the same parent storage.
    pub fn slice(
        &self,
        start: usize,
        length: usize,
        stride: isize,
    ) -> Result<BlockView<'a, T>, BlockError> {
        let span = self.span.subspan(start, length, stride)?;
        Ok(Self::new(Rc::clone(&self.storage), span))
    }

    /// Lazily iterate over the logical elements in order.
    pub fn iter(&self) -> Iter<'a, T> {
        Iter::new(Rc::clone(&self.storage), self.span)
    }

    /// Copy the logical elements into a `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Copy the logical elements into a `Vec<f64>`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.iter().map(Element::to_f64).collect()
    }

    /// Copy the logical elements into a new contiguous owning block.
    pub fn to_block(&self) -> Result<Block<'static, T>, BlockError> {
        BlockConfig::default().collect(self.iter())
    }

    /// Copy into a new owning block of kind `U` under the saturating
    /// conversion policy.
    pub fn cast<U: Element>(&self) -> Result<Block<'static, U>, BlockError> {
        self.cast_with(&BlockConfig::default())
    }

    /// [`cast`](Self::cast) under an explicit allocation config.
    pub fn cast_with<U: Element>(
        &self,
        config: &BlockConfig,
    ) -> Result<Block<'static, U>, BlockError> {
        let out = config.collect(self.iter().map(saturating_cast::<T, U>))?;
        tracing::debug!(from = %T::KIND, to = %U::KIND, len = self.len(), "cast block");
        Ok(out)
    }

    /// Set every logical element to `value`.
    pub fn fill(&self, value: T) -> Result<(), BlockError> {
        self.map_in_place(|_| value)
    }

    /// Replace every logical element `x` with `f(x)`.
    ///
    /// Fails with [`BlockError::ImmutableBuffer`] before touching anything
    /// if the storage is read-only.
    pub fn map_in_place(&self, mut f: impl FnMut(T) -> T) -> Result<(), BlockError> {
        if !self.storage.is_writable() {
            return Err(BlockError::ImmutableBuffer);
        }
        for i in 0..self.span.len {
            let p = self.span.physical(i);
            self.storage.store(p, f(self.storage.load(p)))?;
        }
        Ok(())
    }

    /// A new owning block holding `f(x)` for every logical element `x`.
    pub fn map(&self, f: impl FnMut(T) -> T) -> Result<Block<'static, T>, BlockError> {
        BlockConfig::default().collect(self.iter().map(f))
    }

    /// Pointer to logical element 0.
    ///
    /// Only meaningful together with [`stride`](Self::stride); a contiguous
    /// view can be handed to routines expecting a flat array of
    /// [`len`](Self::len) elements.
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr().wrapping_add(self.span.offset)
    }

    /// Mutable pointer to logical element 0, or
    /// [`BlockError::ImmutableBuffer`] for read-only storage.
    pub fn as_mut_ptr(&self) -> Result<*mut T, BlockError> {
        let base = self.storage.as_mut_ptr().ok_or(BlockError::ImmutableBuffer)?;
        Ok(base.wrapping_add(self.span.offset))
    }

    /// Whether `self` and `other` address the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
    }

    /// Whether this view addresses `block`'s storage.
    pub fn is_view_of(&self, block: &Block<'a, T>) -> bool {
        Rc::ptr_eq(&self.storage, block.storage())
    }

    /// Check that `other` has the same logical length as `self`.
    pub(crate) fn check_same_len<U: Element>(
        &self,
        other: &BlockView<'_, U>,
    ) -> Result<(), BlockError> {
        if self.len() != other.len() {
            return Err(BlockError::ShapeMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(())
    }
}

impl<T: Element> Clone for BlockView<'_, T> {
    fn clone(&self) -> Self {
        Self {
            storage: Rc::clone(&self.storage),
            span: self.span,
        }
    }
}

impl<T: Element> fmt::Debug for BlockView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockView")
            .field("kind", &T::KIND)
            .field("offset", &self.span.offset)
            .field("len", &self.span.len)
            .field("stride", &self.span.stride)
            .finish()
    }
}

impl<T: Element> fmt::Display for BlockView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let limit = BlockConfig::DEFAULT_DISPLAY_LIMIT;
        f.write_str("[")?;
        for value in self.iter().take(limit) {
            f.write_str(" ")?;
            value.fmt_element(f)?;
        }
        if self.len() > limit {
            f.write_str(" ...")?;
        }
        f.write_str(" ]")
    }
}

impl<'a, T: Element> IntoIterator for &BlockView<'a, T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Block<'static, f64> {
        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
        Block::from_values(&values).unwrap()
    }

    #[test]
    fn end_to_end_slice_sequence() {
        let b = Block::<f64>::allocate(5).unwrap();
        for (i, x) in [1.0, 2.0, 3.0, 4.0, 5.0].into_iter().enumerate() {
            b.set(i, x).unwrap();
        }
        let v = b.slice(1, 3, 1).unwrap();
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn view_writes_are_visible_in_parent() {
        let b = ramp(6);
        let v = b.slice(2, 3, 1).unwrap();
        v.set(0, 99.0).unwrap();
        assert_eq!(b.get(2), Ok(99.0));
        assert!(v.is_view_of(&b));
    }

    #[test]
    fn parent_writes_are_visible_in_view() {
        let b = ramp(6);
        let v = b.slice(5, 3, -2).unwrap(); // 5, 3, 1
        b.set(3, -1.0).unwrap();
        assert_eq!(v.to_vec(), vec![5.0, -1.0, 1.0]);
    }

    #[test]
    fn invalid_slices_fail() {
        let b = ramp(5);
        assert!(matches!(
            b.slice(0, 2, 0),
            Err(BlockError::InvalidRange { stride: 0, .. })
        ));
        assert!(b.slice(3, 3, 1).is_err());
        assert!(b.slice(1, 3, -1).is_err());
        assert!(b.slice(5, 1, 1).is_err());
    }

    #[test]
    fn nested_views_compose() {
        let b = ramp(10);
        let evens = b.slice(0, 5, 2).unwrap(); // 0 2 4 6 8
        let back = evens.slice(4, 3, -1).unwrap(); // 8 6 4
        assert_eq!(back.to_vec(), vec![8.0, 6.0, 4.0]);
        assert_eq!(back.stride(), -2);
        assert_eq!(back.offset(), 8);
        assert!(evens.slice(4, 2, 1).is_err());
    }

    #[test]
    fn view_get_checks_logical_bounds() {
        let b = ramp(10);
        let v = b.slice(0, 3, 3).unwrap();
        assert_eq!(v.get(2), Ok(6.0));
        assert_eq!(v.get(3), Err(BlockError::OutOfRange { index: 3, len: 3 }));
    }

    #[test]
    fn view_keeps_parent_storage_alive() {
        let v = {
            let b = ramp(4);
            b.slice(1, 2, 1).unwrap()
        };
        assert_eq!(v.to_vec(), vec![1.0, 2.0]);
        assert_eq!(v.parent_len(), 4);
    }

    #[test]
    fn to_block_copies_and_detaches() {
        let b = ramp(6);
        let v = b.slice(1, 3, 2).unwrap();
        let copy = v.to_block().unwrap();
        copy.set(0, 100.0).unwrap();
        assert_eq!(b.get(1), Ok(1.0));
        assert_eq!(copy.to_vec(), vec![100.0, 3.0, 5.0]);
    }

    #[test]
    fn fill_touches_only_selected_elements() {
        let b = Block::<u8>::allocate(6).unwrap();
        b.slice(0, 3, 2).unwrap().fill(1).unwrap();
        assert_eq!(b.to_vec(), vec![1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn pointer_of_contiguous_view_is_offset_into_parent() {
        let b = ramp(8);
        let v = b.slice(3, 4, 1).unwrap();
        assert!(v.is_contiguous());
        assert_eq!(v.as_ptr(), b.as_ptr().wrapping_add(3));
        assert_eq!(v.as_mut_ptr().unwrap() as *const f64, v.as_ptr());
    }

    #[test]
    fn empty_view_at_end_is_valid() {
        let b = ramp(3);
        let v = b.slice(3, 0, 1).unwrap();
        assert!(v.is_empty());
        assert_eq!(v.to_vec(), Vec::<f64>::new());
        assert_eq!(v.to_string(), "[ ]");
    }

    #[test]
    fn cast_view_to_int() {
        let b = Block::from_values(&[3.9, -3.9, 1e20, f64::NAN]).unwrap();
        let ints = b.view().cast::<i32>().unwrap();
        assert_eq!(ints.to_vec(), vec![3, -3, i32::MAX, 0]);
    }
}
