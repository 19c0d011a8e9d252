//! Element-wise comparisons, logical masks, predicates and index search.
//!
//! Comparisons and logical operations produce a `Block<u8>` mask holding
//! `1` where the condition holds and `0` elsewhere. Truthiness follows
//! [`Element::is_nonzero`]: an element is true iff it is non-zero.

use tessel_core::{BlockError, Element};

use crate::block::Block;
use crate::config::BlockConfig;
use crate::view::BlockView;

/// Element-wise comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    /// `a == b`
    Eq,
    /// `a != b`
    Ne,
    /// `a > b`
    Gt,
    /// `a >= b`
    Ge,
    /// `a < b`
    Lt,
    /// `a <= b`
    Le,
}

impl CmpOp {
    /// Apply the operator to one pair of values.
    #[inline]
    pub fn apply<T: PartialOrd>(self, a: T, b: T) -> bool {
        match self {
            Self::Eq => a == b,
            Self::Ne => a != b,
            Self::Gt => a > b,
            Self::Ge => a >= b,
            Self::Lt => a < b,
            Self::Le => a <= b,
        }
    }
}

/// Element-wise logical operator over truthiness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicOp {
    /// Both non-zero.
    And,
    /// Either non-zero.
    Or,
    /// Exactly one non-zero.
    Xor,
}

impl LogicOp {
    #[inline]
    fn apply(self, a: bool, b: bool) -> bool {
        match self {
            Self::And => a && b,
            Self::Or => a || b,
            Self::Xor => a ^ b,
        }
    }
}

pub(crate) fn mask(bits: impl ExactSizeIterator<Item = bool>) -> Result<Block<'static, u8>, BlockError> {
    BlockConfig::default().collect(bits.map(u8::from))
}

impl<T: Element> BlockView<'_, T> {
    /// Compare every element against `rhs`.
    pub fn compare_scalar(&self, op: CmpOp, rhs: T) -> Result<Block<'static, u8>, BlockError> {
        mask(self.iter().map(|a| op.apply(a, rhs)))
    }

    /// Compare element-wise against an equal-length view of the same kind.
    pub fn compare(
        &self,
        op: CmpOp,
        rhs: &BlockView<'_, T>,
    ) -> Result<Block<'static, u8>, BlockError> {
        self.check_same_len(rhs)?;
        mask(self.iter().zip(rhs.iter()).map(|(a, b)| op.apply(a, b)))
    }

    /// Combine truthiness element-wise with an equal-length view of any
    /// kind.
    pub fn logical<U: Element>(
        &self,
        op: LogicOp,
        rhs: &BlockView<'_, U>,
    ) -> Result<Block<'static, u8>, BlockError> {
        self.check_same_len(rhs)?;
        mask(
            self.iter()
                .zip(rhs.iter())
                .map(|(a, b)| op.apply(a.is_nonzero(), b.is_nonzero())),
        )
    }

    /// `1` where the element is zero, `0` elsewhere.
    pub fn logical_not(&self) -> Result<Block<'static, u8>, BlockError> {
        mask(self.iter().map(|a| !a.is_nonzero()))
    }

    /// Whether every element is non-zero. True for an empty view.
    pub fn all(&self) -> bool {
        self.iter().all(Element::is_nonzero)
    }

    /// Whether at least one element is non-zero. False for an empty view.
    pub fn any(&self) -> bool {
        self.iter().any(Element::is_nonzero)
    }

    /// Whether no element is non-zero. True for an empty view.
    pub fn none(&self) -> bool {
        !self.any()
    }

    /// Logical indices of the non-zero elements, ascending.
    pub fn where_nonzero(&self) -> Vec<usize> {
        self.iter()
            .enumerate()
            .filter_map(|(i, x)| x.is_nonzero().then_some(i))
            .collect()
    }

    /// Logical indices split into `(non-zero, zero)`, each ascending.
    pub fn partition_nonzero(&self) -> (Vec<usize>, Vec<usize>) {
        let mut nonzero = Vec::new();
        let mut zero = Vec::new();
        for (i, x) in self.iter().enumerate() {
            if x.is_nonzero() {
                nonzero.push(i);
            } else {
                zero.push(i);
            }
        }
        (nonzero, zero)
    }

    /// Sum of the elements, accumulated in `f64`.
    pub fn sum(&self) -> f64 {
        self.iter().map(Element::to_f64).sum()
    }
}

impl<T: Element> Block<'_, T> {
    /// Compare every element against `rhs`. See [`BlockView::compare_scalar`].
    pub fn compare_scalar(&self, op: CmpOp, rhs: T) -> Result<Block<'static, u8>, BlockError> {
        self.view().compare_scalar(op, rhs)
    }

    /// Compare element-wise against a view. See [`BlockView::compare`].
    pub fn compare(
        &self,
        op: CmpOp,
        rhs: &BlockView<'_, T>,
    ) -> Result<Block<'static, u8>, BlockError> {
        self.view().compare(op, rhs)
    }

    /// Combine truthiness with a view. See [`BlockView::logical`].
    pub fn logical<U: Element>(
        &self,
        op: LogicOp,
        rhs: &BlockView<'_, U>,
    ) -> Result<Block<'static, u8>, BlockError> {
        self.view().logical(op, rhs)
    }

    /// See [`BlockView::logical_not`].
    pub fn logical_not(&self) -> Result<Block<'static, u8>, BlockError> {
        self.view().logical_not()
    }

    /// Whether every element is non-zero.
    pub fn all(&self) -> bool {
        self.view().all()
    }

    /// Whether at least one element is non-zero.
    pub fn any(&self) -> bool {
        self.view().any()
    }

    /// Whether no element is non-zero.
    pub fn none(&self) -> bool {
        self.view().none()
    }

    /// Indices of the non-zero elements.
    pub fn where_nonzero(&self) -> Vec<usize> {
        self.view().where_nonzero()
    }

    /// Indices split into `(non-zero, zero)`.
    pub fn partition_nonzero(&self) -> (Vec<usize>, Vec<usize>) {
        self.view().partition_nonzero()
    }

    /// Sum of the elements in `f64`.
    pub fn sum(&self) -> f64 {
        self.view().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_scalar_builds_mask() {
        let b = Block::from_values(&[1.0, 5.0, 3.0, 5.0]).unwrap();
        assert_eq!(b.compare_scalar(CmpOp::Eq, 5.0).unwrap().to_vec(), vec![0, 1, 0, 1]);
        assert_eq!(b.compare_scalar(CmpOp::Lt, 3.0).unwrap().to_vec(), vec![1, 0, 0, 0]);
        assert_eq!(b.compare_scalar(CmpOp::Ge, 3.0).unwrap().to_vec(), vec![0, 1, 1, 1]);
    }

    #[test]
    fn compare_views_elementwise() {
        let a = Block::from_values(&[1i32, 2, 3]).unwrap();
        let b = Block::from_values(&[3i32, 2, 1]).unwrap();
        assert_eq!(a.compare(CmpOp::Gt, &b.view()).unwrap().to_vec(), vec![0, 0, 1]);
        assert_eq!(a.compare(CmpOp::Ne, &b.view()).unwrap().to_vec(), vec![1, 0, 1]);
    }

    #[test]
    fn compare_rejects_length_mismatch() {
        let a = Block::from_values(&[1u8, 2, 3]).unwrap();
        let b = Block::from_values(&[1u8, 2]).unwrap();
        assert!(matches!(
            a.compare(CmpOp::Eq, &b.view()),
            Err(BlockError::ShapeMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn nan_compares_unequal() {
        let b = Block::from_values(&[f64::NAN]).unwrap();
        assert_eq!(b.compare_scalar(CmpOp::Eq, f64::NAN).unwrap().to_vec(), vec![0]);
        assert_eq!(b.compare_scalar(CmpOp::Ne, f64::NAN).unwrap().to_vec(), vec![1]);
    }

    #[test]
    fn logical_ops_mix_kinds() {
        let a = Block::from_values(&[0.0, 2.5, 0.0, -1.0]).unwrap();
        let b = Block::from_values(&[0u8, 1, 7, 0]).unwrap();
        let bv = b.view();
        assert_eq!(a.logical(LogicOp::And, &bv).unwrap().to_vec(), vec![0, 1, 0, 0]);
        assert_eq!(a.logical(LogicOp::Or, &bv).unwrap().to_vec(), vec![0, 1, 1, 1]);
        assert_eq!(a.logical(LogicOp::Xor, &bv).unwrap().to_vec(), vec![0, 0, 1, 1]);
        assert_eq!(a.logical_not().unwrap().to_vec(), vec![1, 0, 1, 0]);
    }

    #[test]
    fn predicates_on_empty_and_mixed() {
        let empty = Block::<i32>::allocate(0).unwrap();
        assert!(empty.all());
        assert!(!empty.any());
        assert!(empty.none());

        let mixed = Block::from_values(&[0i32, 4]).unwrap();
        assert!(!mixed.all());
        assert!(mixed.any());
        assert!(!mixed.none());
    }

    #[test]
    fn where_and_partition() {
        let b = Block::from_values(&[0u8, 3, 0, 1, 1]).unwrap();
        assert_eq!(b.where_nonzero(), vec![1, 3, 4]);
        assert_eq!(b.partition_nonzero(), (vec![1, 3, 4], vec![0, 2]));
        let v = b.slice(4, 3, -2).unwrap(); // 1, 0, 0
        assert_eq!(v.where_nonzero(), vec![0]);
    }

    #[test]
    fn sum_accumulates_in_f64() {
        let b = Block::from_values(&[200u8, 200, 200]).unwrap();
        assert_eq!(b.sum(), 600.0);
    }
}
