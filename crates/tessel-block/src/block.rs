//! The shared, typed [`Block`] handle.

use std::fmt;
use std::ptr::NonNull;
use std::rc::Rc;

use tessel_core::{BlockError, Element, ElementKind};

use crate::config::BlockConfig;
use crate::iter::Iter;
use crate::span::Span;
use crate::storage::Storage;
use crate::view::BlockView;

/// A contiguous run of `T` elements behind a reference-counted handle.
///
/// Cloning a `Block` produces another handle onto the same storage; writes
/// through any clone, or through any [`BlockView`] derived from one, are
/// visible through all of them. Owned storage is released exactly once,
/// when the last block, view or iterator referencing it drops. Borrowed
/// storage (see [`Block::wrap`]) is never released, and the `'a` lifetime
/// keeps every handle from outliving the memory it aliases.
///
/// Blocks are deliberately `!Send` and `!Sync`: sharing is unsynchronised,
/// so a block stays on the thread that created it.
pub struct Block<'a, T: Element> {
    storage: Rc<Storage<'a, T>>,
}

impl<T: Element> Block<'static, T> {
    /// Allocate a zero-filled owning block of `count` elements.
    ///
    /// `count == 0` yields a valid empty block.
    pub fn allocate(count: usize) -> Result<Self, BlockError> {
        BlockConfig::default().allocate(count)
    }

    /// Allocate an owning block holding a copy of `values`.
    pub fn from_values(values: &[T]) -> Result<Self, BlockError> {
        BlockConfig::default().from_values(values)
    }
}

impl<'a, T: Element> Block<'a, T> {
    pub(crate) fn from_storage(storage: Storage<'a, T>) -> Self {
        Self {
            storage: Rc::new(storage),
        }
    }

    /// Alias a caller-owned slice without copying.
    ///
    /// Writes through the block land in `values`. The block and everything
    /// derived from it are bounded by the borrow.
    pub fn wrap(values: &'a mut [T]) -> Self {
        tracing::debug!(kind = %T::KIND, len = values.len(), "wrapped borrowed region");
        Self::from_storage(Storage::borrowed(values))
    }

    /// Alias a caller-owned slice for reading only.
    ///
    /// Every write through the block fails with
    /// [`BlockError::ImmutableBuffer`].
    pub fn wrap_read_only(values: &'a [T]) -> Self {
        tracing::debug!(kind = %T::KIND, len = values.len(), "wrapped read-only region");
        Self::from_storage(Storage::read_only(values))
    }

    /// Alias a raw `(pointer, len)` region handed over by an embedding
    /// environment, without copying or taking ownership.
    ///
    /// # Safety
    ///
    /// `ptr` must be aligned and valid for reads of `len` elements (and for
    /// writes, if `writable`) for as long as this block or any view or
    /// iterator derived from it exists, and `len * size_of::<T>()` must not
    /// exceed `isize::MAX`. The owner may keep reading and writing the
    /// region through raw pointers, even when `writable` is false, but must
    /// not hold a Rust reference into it meanwhile. For `len == 0` a
    /// dangling, aligned pointer is acceptable.
    #[allow(unsafe_code)]
    pub unsafe fn wrap_raw(ptr: NonNull<T>, len: usize, writable: bool) -> Self {
        tracing::debug!(kind = %T::KIND, len, writable, "wrapped raw region");
        // SAFETY: forwarded to the caller.
        Self::from_storage(unsafe { Storage::from_raw(ptr, len, writable) })
    }

    pub(crate) fn storage(&self) -> &Rc<Storage<'a, T>> {
        &self.storage
    }

    /// The element kind.
    pub fn kind(&self) -> ElementKind {
        T::KIND
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Whether the block holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the storage in bytes.
    pub fn size_bytes(&self) -> usize {
        self.len() * T::KIND.size_bytes()
    }

    /// Whether this block's storage is released when the last handle drops.
    pub fn is_owned(&self) -> bool {
        self.storage.is_owned()
    }

    /// Whether writes are permitted.
    pub fn is_writable(&self) -> bool {
        self.storage.is_writable()
    }

    /// Read the element at `index`.
    pub fn get(&self, index: usize) -> Result<T, BlockError> {
        if index >= self.len() {
            return Err(BlockError::out_of_range(index, self.len()));
        }
        Ok(self.storage.load(index))
    }

    /// Overwrite the element at `index`.
    ///
    /// The write is visible through every clone and view of this block.
    pub fn set(&self, index: usize, value: T) -> Result<(), BlockError> {
        if index >= self.len() {
            return Err(BlockError::out_of_range(index, self.len()));
        }
        self.storage.store(index, value)
    }

    /// A view covering the whole block.
    pub fn view(&self) -> BlockView<'a, T> {
        BlockView::new(Rc::clone(&self.storage), Span::full(self.len()))
    }

    /// A zero-copy view of `length` elements starting at `start`, stepping
    /// by `stride` (which may be negative).
    ///
    /// Fails with [`BlockError::InvalidRange`] if `stride == 0` or the last
    /// selected index falls outside the block.
    pub fn slice(
        &self,
        start: usize,
        length: usize,
        stride: isize,
    ) -> Result<BlockView<'a, T>, BlockError> {
        self.view().slice(start, length, stride)
    }

    /// Lazily iterate over the elements in index order.
    ///
    /// The iterator holds its own handle on the storage; calling `iter`
    /// again restarts from the first element.
    pub fn iter(&self) -> Iter<'a, T> {
        Iter::new(Rc::clone(&self.storage), Span::full(self.len()))
    }

    /// Copy the elements into a `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Copy the elements into a `Vec<f64>`, the host-native sequence form.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        self.iter().map(Element::to_f64).collect()
    }

    /// Copy into a new owning block of kind `U` under the saturating
    /// conversion policy (see [`tessel_core::convert`]).
    pub fn cast<U: Element>(&self) -> Result<Block<'static, U>, BlockError> {
        self.view().cast()
    }

    /// Set every element to `value`.
    pub fn fill(&self, value: T) -> Result<(), BlockError> {
        self.view().fill(value)
    }

    /// Replace every element `x` with `f(x)`.
    pub fn map_in_place(&self, f: impl FnMut(T) -> T) -> Result<(), BlockError> {
        self.view().map_in_place(f)
    }

    /// A new owning block holding `f(x)` for every element `x`.
    pub fn map(&self, f: impl FnMut(T) -> T) -> Result<Block<'static, T>, BlockError> {
        self.view().map(f)
    }

    /// Pointer to the first element of the flat native array.
    ///
    /// Dangling but aligned when the block is empty.
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr()
    }

    /// Mutable pointer to the first element, for routines that write into
    /// the block in place.
    ///
    /// Fails with [`BlockError::ImmutableBuffer`] on read-only wraps.
    pub fn as_mut_ptr(&self) -> Result<*mut T, BlockError> {
        self.storage.as_mut_ptr().ok_or(BlockError::ImmutableBuffer)
    }

    /// Whether `self` and `other` alias the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
    }

    /// Number of live blocks, views and iterators sharing this storage.
    pub fn strong_count(&self) -> usize {
        Rc::strong_count(&self.storage)
    }
}

impl<T: Element> Clone for Block<'_, T> {
    fn clone(&self) -> Self {
        Self {
            storage: Rc::clone(&self.storage),
        }
    }
}

impl<T: Element> fmt::Debug for Block<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("kind", &T::KIND)
            .field("len", &self.len())
            .field("owned", &self.is_owned())
            .field("writable", &self.is_writable())
            .finish()
    }
}

impl<T: Element> fmt::Display for Block<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.view(), f)
    }
}

impl<'a, T: Element> IntoIterator for &Block<'a, T> {
    type Item = T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
