//! Block allocation parameters.

use tessel_core::{BlockError, Element};

use crate::block::Block;
use crate::storage::Storage;

/// Configuration for block allocation.
///
/// All owning constructors on [`Block`] use [`BlockConfig::default`];
/// go through a config explicitly to apply an allocation budget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockConfig {
    /// Upper bound on a single allocation, in bytes.
    ///
    /// Default: `None` (only the platform's `isize::MAX` limit applies).
    /// Requests above the budget fail with
    /// [`BlockError::AllocationFailure`] before any memory is reserved.
    pub max_bytes: Option<usize>,
}

impl BlockConfig {
    /// Maximum number of elements rendered by `Display` before `...`.
    pub const DEFAULT_DISPLAY_LIMIT: usize = 10;

    /// A config with no allocation budget.
    pub const fn new() -> Self {
        Self { max_bytes: None }
    }

    /// A config that rejects single allocations above `max_bytes`.
    pub const fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            max_bytes: Some(max_bytes),
        }
    }

    /// Allocate a zero-filled owning block of `count` elements.
    pub fn allocate<T: Element>(&self, count: usize) -> Result<Block<'static, T>, BlockError> {
        // Check the budget before building the fill iterator.
        crate::storage::checked_bytes::<T>(count, self.max_bytes)?;
        let storage =
            Storage::owned_from_iter(std::iter::repeat_n(T::ZERO, count), self.max_bytes)?;
        tracing::debug!(kind = %T::KIND, len = count, "allocated block");
        Ok(Block::from_storage(storage))
    }

    /// Allocate an owning block holding a copy of `values`.
    pub fn from_values<T: Element>(&self, values: &[T]) -> Result<Block<'static, T>, BlockError> {
        self.collect(values.iter().copied())
    }

    /// Allocate an owning block from an exact-size element iterator.
    pub(crate) fn collect<T, I>(&self, values: I) -> Result<Block<'static, T>, BlockError>
    where
        T: Element,
        I: ExactSizeIterator<Item = T>,
    {
        let storage = Storage::owned_from_iter(values, self.max_bytes)?;
        Ok(Block::from_storage(storage))
    }
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_budget() {
        assert_eq!(BlockConfig::default().max_bytes, None);
    }

    #[test]
    fn budget_applies_to_allocate_and_copy() {
        let config = BlockConfig::with_max_bytes(16);
        assert!(config.allocate::<f64>(2).is_ok());
        assert!(matches!(
            config.allocate::<f64>(3),
            Err(BlockError::AllocationFailure {
                requested_bytes: 24,
                limit: Some(16)
            })
        ));
        assert!(config.from_values(&[1u8; 16]).is_ok());
        assert!(config.from_values(&[1u8; 17]).is_err());
    }

    #[test]
    fn allocate_zero_fills() {
        let b = BlockConfig::new().allocate::<i32>(4).unwrap();
        assert_eq!(b.to_vec(), vec![0, 0, 0, 0]);
    }
}
