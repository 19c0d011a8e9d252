//! Backing storage shared by blocks, views and iterators.
//!
//! Storage is either owned (a boxed slice released when the last shared
//! handle drops) or borrowed from memory the caller manages. Elements sit
//! behind [`Cell`] so aliasing handles can read and write the same region
//! without exclusive borrows; `Cell<T>` has the layout of `T`, so the
//! region is still a flat native array.

use std::cell::Cell;
use std::ptr::NonNull;

use tessel_core::{BlockError, Element};

enum Region<'a, T> {
    /// Allocated by this crate; freed on drop.
    Owned(Box<[Cell<T>]>),
    /// Memory owned elsewhere that the owner may still write.
    Borrowed { cells: &'a [Cell<T>], writable: bool },
    /// Memory behind a Rust shared borrow, immutable for `'a`.
    ReadOnly(&'a [T]),
}

/// A typed element region plus its ownership mode.
pub(crate) struct Storage<'a, T: Element> {
    region: Region<'a, T>,
}

impl<'a, T: Element> Storage<'a, T> {
    /// Wrap a caller-owned writable slice.
    pub(crate) fn borrowed(slice: &'a mut [T]) -> Self {
        Self {
            region: Region::Borrowed {
                cells: Cell::from_mut(slice).as_slice_of_cells(),
                writable: true,
            },
        }
    }

    /// Wrap a caller-owned read-only slice.
    pub(crate) fn read_only(slice: &'a [T]) -> Self {
        Self {
            region: Region::ReadOnly(slice),
        }
    }

    /// Wrap a raw region without taking ownership.
    ///
    /// The region is viewed as cells whatever `writable` says, so the owner
    /// may keep writing it through raw pointers while the storage is alive.
    /// `writable` only gates writes made through this storage.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads (and writes, if `writable`) of `len`
    /// properly aligned elements for all of `'a`, `len * size_of::<T>()`
    /// must not exceed `isize::MAX`, and no Rust reference into that memory
    /// may be held by other code during `'a`.
    #[allow(unsafe_code)]
    pub(crate) unsafe fn from_raw(ptr: NonNull<T>, len: usize, writable: bool) -> Self {
        // SAFETY: Cell<T> is repr(transparent) over T; the caller guarantees
        // `len` valid elements behind `ptr` and a size within isize::MAX.
        let cells = unsafe { std::slice::from_raw_parts(ptr.as_ptr() as *const Cell<T>, len) };
        Self {
            region: Region::Borrowed { cells, writable },
        }
    }

    /// Number of elements in the region.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        match &self.region {
            Region::Owned(cells) => cells.len(),
            Region::Borrowed { cells, .. } => cells.len(),
            Region::ReadOnly(values) => values.len(),
        }
    }

    /// Read the element at physical index `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len`. Callers validate indices first.
    #[inline]
    pub(crate) fn load(&self, i: usize) -> T {
        match &self.region {
            Region::Owned(cells) => cells[i].get(),
            Region::Borrowed { cells, .. } => cells[i].get(),
            Region::ReadOnly(values) => values[i],
        }
    }

    /// Write the element at physical index `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len`. Callers validate indices first.
    #[inline]
    pub(crate) fn store(&self, i: usize, value: T) -> Result<(), BlockError> {
        match &self.region {
            Region::Owned(cells) => cells[i].set(value),
            Region::Borrowed {
                cells,
                writable: true,
            } => cells[i].set(value),
            Region::Borrowed { .. } | Region::ReadOnly(_) => {
                return Err(BlockError::ImmutableBuffer)
            }
        }
        Ok(())
    }

    /// Whether dropping this storage releases memory.
    pub(crate) fn is_owned(&self) -> bool {
        matches!(self.region, Region::Owned(_))
    }

    /// Whether writes are permitted.
    pub(crate) fn is_writable(&self) -> bool {
        match &self.region {
            Region::Owned(_) => true,
            Region::Borrowed { writable, .. } => *writable,
            Region::ReadOnly(_) => false,
        }
    }

    /// Pointer to the first element. Dangling (but aligned) when empty.
    pub(crate) fn as_ptr(&self) -> *const T {
        match &self.region {
            Region::Owned(cells) => cells.as_ptr() as *const T,
            Region::Borrowed { cells, .. } => cells.as_ptr() as *const T,
            Region::ReadOnly(values) => values.as_ptr(),
        }
    }

    /// Mutable pointer to the first element, or `None` for read-only
    /// regions.
    pub(crate) fn as_mut_ptr(&self) -> Option<*mut T> {
        match &self.region {
            Region::Owned(cells) => Some(cells.as_ptr() as *mut T),
            Region::Borrowed {
                cells,
                writable: true,
            } => Some(cells.as_ptr() as *mut T),
            Region::Borrowed { .. } | Region::ReadOnly(_) => None,
        }
    }
}

impl<T: Element> Storage<'static, T> {
    /// Allocate an owned region holding exactly the items of `values`.
    ///
    /// The byte size is checked against `limit` and for overflow before
    /// anything is reserved; a failed reservation is reported instead of
    /// aborting.
    pub(crate) fn owned_from_iter<I>(values: I, limit: Option<usize>) -> Result<Self, BlockError>
    where
        I: ExactSizeIterator<Item = T>,
    {
        let len = values.len();
        let requested_bytes = checked_bytes::<T>(len, limit)?;
        let mut cells: Vec<Cell<T>> = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_| BlockError::AllocationFailure {
                requested_bytes,
                limit,
            })?;
        cells.extend(values.map(Cell::new));
        Ok(Self {
            region: Region::Owned(cells.into_boxed_slice()),
        })
    }
}

impl<T: Element> Drop for Storage<'_, T> {
    fn drop(&mut self) {
        if self.is_owned() {
            tracing::trace!(kind = %T::KIND, len = self.len(), "releasing owned block storage");
        }
    }
}

/// Byte size of `len` elements of `T`, checked against overflow and an
/// optional budget.
pub(crate) fn checked_bytes<T: Element>(
    len: usize,
    limit: Option<usize>,
) -> Result<usize, BlockError> {
    let bytes = len
        .checked_mul(T::KIND.size_bytes())
        .filter(|&b| b <= isize::MAX as usize)
        .ok_or(BlockError::AllocationFailure {
            requested_bytes: usize::MAX,
            limit,
        })?;
    match limit {
        Some(limit) if bytes > limit => Err(BlockError::AllocationFailure {
            requested_bytes: bytes,
            limit: Some(limit),
        }),
        _ => Ok(bytes),
    }
}
