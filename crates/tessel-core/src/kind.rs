//! Element kinds and the sealed [`Element`] trait.
//!
//! [`ElementKind`] is the runtime tag for the closed set of supported element
//! types. [`Element`] is the compile-time side: it is implemented for exactly
//! `f64`, `i32` and `u8`, and carries the per-kind size and conversion table
//! that the generic block implementation dispatches through.

use std::fmt;

use crate::scalar::Scalar;

/// Runtime tag for a block's element type.
///
/// Values are ABI-stable and shared with the C bindings.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    /// IEEE-754 double precision float (`f64`).
    Float64 = 0,
    /// Two's-complement 32-bit signed integer (`i32`).
    Int32 = 1,
    /// Unsigned byte (`u8`).
    UInt8 = 2,
}

impl ElementKind {
    /// Every supported kind, in tag order.
    pub const ALL: [ElementKind; 3] = [Self::Float64, Self::Int32, Self::UInt8];

    /// Size of one element in bytes.
    pub const fn size_bytes(self) -> usize {
        match self {
            Self::Float64 => std::mem::size_of::<f64>(),
            Self::Int32 => std::mem::size_of::<i32>(),
            Self::UInt8 => std::mem::size_of::<u8>(),
        }
    }

    /// Required alignment of one element in bytes.
    pub const fn align_bytes(self) -> usize {
        match self {
            Self::Float64 => std::mem::align_of::<f64>(),
            Self::Int32 => std::mem::align_of::<i32>(),
            Self::UInt8 => std::mem::align_of::<u8>(),
        }
    }

    /// Whether the kind is an integer type.
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::Float64)
    }

    /// Human-readable kind name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Float64 => "Float64",
            Self::Int32 => "Int32",
            Self::UInt8 => "UInt8",
        }
    }

    /// Decode an ABI tag. Returns `None` for unknown values.
    pub fn from_tag(tag: i32) -> Option<Self> {
        match tag {
            0 => Some(Self::Float64),
            1 => Some(Self::Int32),
            2 => Some(Self::UInt8),
            _ => None,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f64 {}
    impl Sealed for i32 {}
    impl Sealed for u8 {}
}

/// A numeric element type that can be stored in a block.
///
/// Sealed: the set of kinds is closed, so every `match` on
/// [`ElementKind`] stays exhaustive.
pub trait Element:
    sealed::Sealed + Copy + PartialEq + PartialOrd + Default + fmt::Debug + 'static
{
    /// The runtime tag for this type.
    const KIND: ElementKind;

    /// Additive identity; the fill value of freshly allocated blocks.
    const ZERO: Self;

    /// Widen to `f64`. Exact for every supported kind.
    fn to_f64(self) -> f64;

    /// Convert from `f64` under the saturating cast policy
    /// (see [`convert`](crate::convert)).
    fn from_f64_saturating(value: f64) -> Self;

    /// Convert from `f64` only if the value is exactly representable.
    fn from_f64_exact(value: f64) -> Option<Self>;

    /// Wrap in the kind-erased [`Scalar`].
    fn into_scalar(self) -> Scalar;

    /// Truthiness used by logical operations and predicates.
    fn is_nonzero(self) -> bool;

    /// Render a single element the way block listings print it.
    fn fmt_element(self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl Element for f64 {
    const KIND: ElementKind = ElementKind::Float64;
    const ZERO: Self = 0.0;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64_saturating(value: f64) -> Self {
        value
    }

    #[inline]
    fn from_f64_exact(value: f64) -> Option<Self> {
        Some(value)
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Float64(self)
    }

    #[inline]
    fn is_nonzero(self) -> bool {
        self != 0.0
    }

    fn fmt_element(self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:.3e}")
    }
}

macro_rules! impl_integer_element {
    ($ty:ty, $kind:ident, $variant:ident) => {
        impl Element for $ty {
            const KIND: ElementKind = ElementKind::$kind;
            const ZERO: Self = 0;

            #[inline]
            fn to_f64(self) -> f64 {
                f64::from(self)
            }

            // `as` from float truncates toward zero, saturates at the
            // bounds and maps NaN to zero.
            #[inline]
            fn from_f64_saturating(value: f64) -> Self {
                value as $ty
            }

            #[inline]
            fn from_f64_exact(value: f64) -> Option<Self> {
                let in_range = value >= <$ty>::MIN as f64 && value <= <$ty>::MAX as f64;
                if in_range && value.fract() == 0.0 {
                    Some(value as $ty)
                } else {
                    None
                }
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }

            #[inline]
            fn is_nonzero(self) -> bool {
                self != 0
            }

            fn fmt_element(self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{self}")
            }
        }
    };
}

impl_integer_element!(i32, Int32, Int32);
impl_integer_element!(u8, UInt8, UInt8);
