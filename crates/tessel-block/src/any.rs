//! Kind-erased blocks and views for dynamically typed callers.
//!
//! [`AnyBlock`] and [`AnyView`] close over the three element kinds so that
//! hosts without static types (the C ABI, the Python extension) can hold a
//! block and decide its kind at run time. Values cross this layer as
//! [`Scalar`]s and indices as `i64`, so a negative index is reported as
//! [`BlockError::OutOfRange`] rather than being unrepresentable.

use std::fmt;
use std::ptr::NonNull;

use tessel_core::{BlockError, Element, ElementKind, Scalar};

use crate::block::Block;
use crate::config::BlockConfig;
use crate::ops::{mask, CmpOp, LogicOp};
use crate::view::BlockView;

macro_rules! dispatch {
    ($value:expr, $ty:ident, $b:ident => $body:expr) => {
        match $value {
            $ty::Float64($b) => $body,
            $ty::Int32($b) => $body,
            $ty::UInt8($b) => $body,
        }
    };
}

macro_rules! by_kind {
    ($kind:expr, $t:ident => $body:expr) => {
        match $kind {
            ElementKind::Float64 => {
                type $t = f64;
                $body
            }
            ElementKind::Int32 => {
                type $t = i32;
                $body
            }
            ElementKind::UInt8 => {
                type $t = u8;
                $body
            }
        }
    };
}

/// A [`Block`] of any element kind.
#[derive(Clone, Debug)]
pub enum AnyBlock<'a> {
    /// A `Float64` block.
    Float64(Block<'a, f64>),
    /// An `Int32` block.
    Int32(Block<'a, i32>),
    /// A `UInt8` block.
    UInt8(Block<'a, u8>),
}

/// A [`BlockView`] of any element kind.
#[derive(Clone, Debug)]
pub enum AnyView<'a> {
    /// A view onto `Float64` storage.
    Float64(BlockView<'a, f64>),
    /// A view onto `Int32` storage.
    Int32(BlockView<'a, i32>),
    /// A view onto `UInt8` storage.
    UInt8(BlockView<'a, u8>),
}

fn signed_index(index: i64, len: usize) -> Result<usize, BlockError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or(BlockError::OutOfRange { index, len })
}

fn at_index(err: BlockError, index: usize) -> BlockError {
    match err {
        BlockError::KindMismatch { expected, found } => BlockError::KindMismatch {
            expected,
            found: format!("{found} at index {index}"),
        },
        other => other,
    }
}

fn coerce_all<T: Element>(
    config: &BlockConfig,
    values: impl ExactSizeIterator<Item = Scalar>,
) -> Result<Block<'static, T>, BlockError> {
    crate::storage::checked_bytes::<T>(values.len(), config.max_bytes)?;
    let coerced = values
        .enumerate()
        .map(|(i, v)| v.coerce::<T>().map_err(|e| at_index(e, i)))
        .collect::<Result<Vec<T>, _>>()?;
    config.from_values(&coerced)
}

/// Validate a host pointer and wrap it as a typed block.
///
/// # Safety
///
/// Same contract as [`AnyBlock::wrap_raw`].
#[allow(unsafe_code)]
unsafe fn wrap_raw_typed<'a, T: Element>(
    ptr: *mut u8,
    count: usize,
    writable: bool,
) -> Result<Block<'a, T>, BlockError> {
    let typed = ptr.cast::<T>();
    if crate::storage::checked_bytes::<T>(count, None).is_err() {
        return Err(BlockError::invalid_range(0, count, 1, count));
    }
    let ptr = if count == 0 {
        NonNull::dangling()
    } else {
        match NonNull::new(typed) {
            Some(p) if typed.is_aligned() => p,
            _ => return Err(BlockError::invalid_range(0, count, 1, count)),
        }
    };
    // SAFETY: non-null and aligned checked above; validity for `count`
    // elements is forwarded to the caller.
    Ok(unsafe { Block::wrap_raw(ptr, count, writable) })
}

impl AnyBlock<'static> {
    /// Allocate a zero-filled owning block of `count` elements of `kind`.
    pub fn allocate(kind: ElementKind, count: usize) -> Result<Self, BlockError> {
        Self::allocate_with(&BlockConfig::default(), kind, count)
    }

    /// [`AnyBlock::allocate`] under an explicit allocation config.
    pub fn allocate_with(
        config: &BlockConfig,
        kind: ElementKind,
        count: usize,
    ) -> Result<Self, BlockError> {
        by_kind!(kind, T => config.allocate::<T>(count).map(Self::from))
    }

    /// Build an owning block of `kind` from host values.
    ///
    /// Each value must be exactly representable in `kind`; the first one
    /// that is not fails the whole call with [`BlockError::KindMismatch`]
    /// naming its index.
    pub fn from_values(kind: ElementKind, values: &[Scalar]) -> Result<Self, BlockError> {
        Self::from_values_with(&BlockConfig::default(), kind, values)
    }

    /// [`AnyBlock::from_values`] under an explicit allocation config.
    pub fn from_values_with(
        config: &BlockConfig,
        kind: ElementKind,
        values: &[Scalar],
    ) -> Result<Self, BlockError> {
        by_kind!(kind, T => coerce_all::<T>(config, values.iter().copied()).map(Self::from))
    }

    /// Build an owning block of `kind` from `f64` host values, with the
    /// same exact coercion as [`AnyBlock::from_values`].
    pub fn from_f64s(kind: ElementKind, values: &[f64]) -> Result<Self, BlockError> {
        Self::from_f64s_with(&BlockConfig::default(), kind, values)
    }

    /// [`AnyBlock::from_f64s`] under an explicit allocation config.
    pub fn from_f64s_with(
        config: &BlockConfig,
        kind: ElementKind,
        values: &[f64],
    ) -> Result<Self, BlockError> {
        let scalars = values.iter().copied().map(Scalar::Float64);
        by_kind!(kind, T => coerce_all::<T>(config, scalars).map(Self::from))
    }
}

impl<'a> AnyBlock<'a> {
    /// Alias a raw host region of `count` elements of `kind`.
    ///
    /// A null or misaligned `ptr` with `count > 0`, or a `count` whose byte
    /// size exceeds `isize::MAX`, is rejected with
    /// [`BlockError::InvalidRange`]. With `count == 0` the pointer is
    /// ignored.
    ///
    /// # Safety
    ///
    /// For `count > 0`, `ptr` must be valid for reads of `count` elements
    /// of `kind` (and for writes, if `writable`) for as long as the block
    /// or anything derived from it exists, and must not be accessed
    /// through conflicting Rust references during that time.
    #[allow(unsafe_code)]
    pub unsafe fn wrap_raw(
        kind: ElementKind,
        ptr: *mut u8,
        count: usize,
        writable: bool,
    ) -> Result<Self, BlockError> {
        // SAFETY: forwarded to the caller.
        by_kind!(kind, T => unsafe { wrap_raw_typed::<T>(ptr, count, writable) }.map(Self::from))
    }

    /// The element kind.
    pub fn kind(&self) -> ElementKind {
        dispatch!(self, AnyBlock, b => b.kind())
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        dispatch!(self, AnyBlock, b => b.len())
    }

    /// Whether the block holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the element data in bytes.
    pub fn size_bytes(&self) -> usize {
        dispatch!(self, AnyBlock, b => b.size_bytes())
    }

    /// Whether the storage was allocated by this library.
    pub fn is_owned(&self) -> bool {
        dispatch!(self, AnyBlock, b => b.is_owned())
    }

    /// Whether writes are permitted.
    pub fn is_writable(&self) -> bool {
        dispatch!(self, AnyBlock, b => b.is_writable())
    }

    /// A full-length view of the block.
    pub fn view(&self) -> AnyView<'a> {
        dispatch!(self, AnyBlock, b => AnyView::from(b.view()))
    }

    /// Read element `index`. See [`AnyView::get`].
    pub fn get(&self, index: i64) -> Result<Scalar, BlockError> {
        self.view().get(index)
    }

    /// Overwrite element `index`. See [`AnyView::set`].
    pub fn set(&self, index: i64, value: Scalar) -> Result<(), BlockError> {
        self.view().set(index, value)
    }

    /// A strided view. See [`AnyView::slice`].
    pub fn slice(&self, start: i64, length: usize, stride: isize) -> Result<AnyView<'a>, BlockError> {
        self.view().slice(start, length, stride)
    }

    /// Copy the elements out as scalars.
    pub fn to_scalars(&self) -> Vec<Scalar> {
        self.view().to_scalars()
    }

    /// Copy the elements out as `f64`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        dispatch!(self, AnyBlock, b => b.to_f64_vec())
    }

    /// Copy into a new owning block of `kind`. See [`AnyView::cast_to`].
    pub fn cast_to(&self, kind: ElementKind) -> Result<AnyBlock<'static>, BlockError> {
        self.view().cast_to(kind)
    }

    /// Set every element to `value`.
    pub fn fill(&self, value: Scalar) -> Result<(), BlockError> {
        self.view().fill(value)
    }

    /// Pointer to the first element.
    pub fn as_ptr(&self) -> *const u8 {
        dispatch!(self, AnyBlock, b => b.as_ptr().cast())
    }
}

impl<'a> AnyView<'a> {
    /// The element kind.
    pub fn kind(&self) -> ElementKind {
        dispatch!(self, AnyView, v => v.kind())
    }

    /// Number of logical elements.
    pub fn len(&self) -> usize {
        dispatch!(self, AnyView, v => v.len())
    }

    /// Whether the view selects no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distance between consecutive logical elements, in parent elements.
    pub fn stride(&self) -> isize {
        dispatch!(self, AnyView, v => v.stride())
    }

    /// Whether logical neighbours are adjacent in memory.
    pub fn is_contiguous(&self) -> bool {
        dispatch!(self, AnyView, v => v.is_contiguous())
    }

    /// Whether writes are permitted.
    pub fn is_writable(&self) -> bool {
        dispatch!(self, AnyView, v => v.is_writable())
    }

    /// Read logical element `index`.
    ///
    /// Negative indices are [`BlockError::OutOfRange`]; they never count
    /// from the end.
    pub fn get(&self, index: i64) -> Result<Scalar, BlockError> {
        let i = signed_index(index, self.len())?;
        dispatch!(self, AnyView, v => v.get(i).map(Element::into_scalar))
    }

    /// Overwrite logical element `index` with `value`, which must be
    /// exactly representable in the view's kind.
    pub fn set(&self, index: i64, value: Scalar) -> Result<(), BlockError> {
        let i = signed_index(index, self.len())?;
        dispatch!(self, AnyView, v => v.set(i, value.coerce()?))
    }

    /// A view of this view; see [`BlockView::slice`]. A negative `start`
    /// is [`BlockError::InvalidRange`].
    pub fn slice(&self, start: i64, length: usize, stride: isize) -> Result<AnyView<'a>, BlockError> {
        let Ok(first) = usize::try_from(start) else {
            return Err(BlockError::InvalidRange {
                start,
                length,
                stride,
                len: self.len(),
            });
        };
        dispatch!(self, AnyView, v => v.slice(first, length, stride).map(AnyView::from))
    }

    /// Copy the logical elements out as scalars.
    pub fn to_scalars(&self) -> Vec<Scalar> {
        dispatch!(self, AnyView, v => v.iter().map(Element::into_scalar).collect())
    }

    /// Copy the logical elements out as `f64`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        dispatch!(self, AnyView, v => v.to_f64_vec())
    }

    /// Copy into a new contiguous owning block of the same kind.
    pub fn to_block(&self) -> Result<AnyBlock<'static>, BlockError> {
        dispatch!(self, AnyView, v => v.to_block().map(AnyBlock::from))
    }

    /// Copy into a new owning block of `kind` under the saturating
    /// conversion policy of [`tessel_core::convert`].
    pub fn cast_to(&self, kind: ElementKind) -> Result<AnyBlock<'static>, BlockError> {
        self.cast_to_with(&BlockConfig::default(), kind)
    }

    /// [`cast_to`](Self::cast_to) under an explicit allocation config.
    pub fn cast_to_with(
        &self,
        config: &BlockConfig,
        kind: ElementKind,
    ) -> Result<AnyBlock<'static>, BlockError> {
        dispatch!(self, AnyView, v => by_kind!(kind, U => v.cast_with::<U>(config).map(AnyBlock::from)))
    }

    /// Set every logical element to `value`, which must be exactly
    /// representable in the view's kind.
    pub fn fill(&self, value: Scalar) -> Result<(), BlockError> {
        dispatch!(self, AnyView, v => v.fill(value.coerce()?))
    }

    /// Compare every element against `rhs`, both widened to `f64`.
    pub fn compare_scalar(&self, op: CmpOp, rhs: Scalar) -> Result<Block<'static, u8>, BlockError> {
        let rhs = rhs.to_f64();
        dispatch!(self, AnyView, v => mask(v.iter().map(|x| op.apply(x.to_f64(), rhs))))
    }

    /// Compare element-wise against an equal-length view of any kind,
    /// both widened to `f64`.
    pub fn compare(&self, op: CmpOp, rhs: &AnyView<'_>) -> Result<Block<'static, u8>, BlockError> {
        if self.len() != rhs.len() {
            return Err(BlockError::ShapeMismatch {
                expected: self.len(),
                actual: rhs.len(),
            });
        }
        let rhs = rhs.to_f64_vec();
        dispatch!(self, AnyView, v => mask(
            v.iter().zip(rhs).map(|(a, b)| op.apply(a.to_f64(), b))
        ))
    }

    /// Combine truthiness element-wise with an equal-length view of any
    /// kind.
    pub fn logical(&self, op: LogicOp, rhs: &AnyView<'_>) -> Result<Block<'static, u8>, BlockError> {
        dispatch!(self, AnyView, a => dispatch!(rhs, AnyView, b => a.logical(op, b)))
    }

    /// `1` where the element is zero.
    pub fn logical_not(&self) -> Result<Block<'static, u8>, BlockError> {
        dispatch!(self, AnyView, v => v.logical_not())
    }

    /// Whether every element is non-zero.
    pub fn all(&self) -> bool {
        dispatch!(self, AnyView, v => v.all())
    }

    /// Whether at least one element is non-zero.
    pub fn any(&self) -> bool {
        dispatch!(self, AnyView, v => v.any())
    }

    /// Whether no element is non-zero.
    pub fn none(&self) -> bool {
        dispatch!(self, AnyView, v => v.none())
    }

    /// Indices of the non-zero elements.
    pub fn where_nonzero(&self) -> Vec<usize> {
        dispatch!(self, AnyView, v => v.where_nonzero())
    }

    /// Indices split into `(non-zero, zero)`.
    pub fn partition_nonzero(&self) -> (Vec<usize>, Vec<usize>) {
        dispatch!(self, AnyView, v => v.partition_nonzero())
    }

    /// Sum of the elements in `f64`.
    pub fn sum(&self) -> f64 {
        dispatch!(self, AnyView, v => v.sum())
    }

    /// Pointer to logical element 0.
    pub fn as_ptr(&self) -> *const u8 {
        dispatch!(self, AnyView, v => v.as_ptr().cast())
    }
}

impl fmt::Display for AnyBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, AnyBlock, b => fmt::Display::fmt(b, f))
    }
}

impl fmt::Display for AnyView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, AnyView, v => fmt::Display::fmt(v, f))
    }
}

macro_rules! impl_conversions {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl<'a> From<Block<'a, $t>> for AnyBlock<'a> {
                fn from(block: Block<'a, $t>) -> Self {
                    Self::$variant(block)
                }
            }

            impl<'a> From<BlockView<'a, $t>> for AnyView<'a> {
                fn from(view: BlockView<'a, $t>) -> Self {
                    Self::$variant(view)
                }
            }

            impl<'a> TryFrom<AnyBlock<'a>> for Block<'a, $t> {
                type Error = BlockError;

                fn try_from(block: AnyBlock<'a>) -> Result<Self, BlockError> {
                    match block {
                        AnyBlock::$variant(b) => Ok(b),
                        other => Err(BlockError::KindMismatch {
                            expected: <$t as Element>::KIND,
                            found: format!("{} block", other.kind()),
                        }),
                    }
                }
            }

            impl<'a> TryFrom<AnyView<'a>> for BlockView<'a, $t> {
                type Error = BlockError;

                fn try_from(view: AnyView<'a>) -> Result<Self, BlockError> {
                    match view {
                        AnyView::$variant(v) => Ok(v),
                        other => Err(BlockError::KindMismatch {
                            expected: <$t as Element>::KIND,
                            found: format!("{} view", other.kind()),
                        }),
                    }
                }
            }
        )*
    };
}

impl_conversions!(f64 => Float64, i32 => Int32, u8 => UInt8);
