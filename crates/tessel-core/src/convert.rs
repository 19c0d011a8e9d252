//! Cross-kind conversion policy.
//!
//! Casting a block to another kind converts element-wise through `f64`,
//! which represents every `i32` and `u8` exactly. The narrowing step is
//! saturating for every pairing:
//!
//! | from \ to | Float64 | Int32 | UInt8 |
//! |-----------|---------|-------|-------|
//! | Float64   | copy    | truncate toward zero, saturate, NaN → 0 | truncate toward zero, saturate, NaN → 0 |
//! | Int32     | exact   | copy  | saturate to `0..=255` |
//! | UInt8     | exact   | exact | copy  |
//!
//! Host values entering a block (`from_values`, `set`) do not use this
//! policy; they go through [`Scalar::coerce`](crate::Scalar::coerce), which
//! rejects anything that is not exactly representable.

use crate::kind::Element;

/// Convert one element from `S` to `D` under the saturating policy.
#[inline]
pub fn saturating_cast<S: Element, D: Element>(value: S) -> D {
    D::from_f64_saturating(value.to_f64())
}
