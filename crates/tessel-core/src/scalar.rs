//! Kind-erased scalar values exchanged with dynamic hosts.

use std::fmt;

use crate::error::BlockError;
use crate::kind::{Element, ElementKind};

/// A single numeric value tagged with its element kind.
///
/// Host languages hand values across the boundary without static types;
/// `Scalar` carries the value together with the kind it arrived as.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    /// A double precision value.
    Float64(f64),
    /// A 32-bit signed integer.
    Int32(i32),
    /// An unsigned byte.
    UInt8(u8),
}

impl Scalar {
    /// The kind this value is tagged with.
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Float64(_) => ElementKind::Float64,
            Self::Int32(_) => ElementKind::Int32,
            Self::UInt8(_) => ElementKind::UInt8,
        }
    }

    /// Widen to `f64`. Exact for every kind.
    pub fn to_f64(self) -> f64 {
        match self {
            Self::Float64(v) => v,
            Self::Int32(v) => f64::from(v),
            Self::UInt8(v) => f64::from(v),
        }
    }

    /// Coerce into `T`, accepting only values `T` represents exactly.
    ///
    /// `3.0` becomes `3i32`; `3.5`, `NaN` or `256` aimed at an integer kind
    /// are rejected with [`BlockError::KindMismatch`].
    pub fn coerce<T: Element>(self) -> Result<T, BlockError> {
        T::from_f64_exact(self.to_f64()).ok_or_else(|| BlockError::KindMismatch {
            expected: T::KIND,
            found: format!("{} value {self}", self.kind()),
        })
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float64(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::UInt8(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<u8> for Scalar {
    fn from(v: u8) -> Self {
        Self::UInt8(v)
    }
}
