//! Element iteration over blocks and views.

use std::iter::FusedIterator;
use std::rc::Rc;

use tessel_core::Element;

use crate::span::Span;
use crate::storage::Storage;

/// Iterator over the elements of a [`Block`](crate::Block) or
/// [`BlockView`](crate::BlockView), in logical index order.
///
/// Holds its own handle on the storage, so it stays valid even if the
/// block it came from is dropped. Elements are read lazily: a write made
/// through an alias before the iterator reaches an index is observed.
/// A clone continues from the same position; call `iter()` again for a
/// fresh pass.
#[derive(Clone)]
pub struct Iter<'a, T: Element> {
    storage: Rc<Storage<'a, T>>,
    span: Span,
    front: usize,
    back: usize,
}

impl<'a, T: Element> Iter<'a, T> {
    pub(crate) fn new(storage: Rc<Storage<'a, T>>, span: Span) -> Self {
        Self {
            storage,
            front: 0,
            back: span.len,
            span,
        }
    }
}

impl<T: Element> Iterator for Iter<'_, T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        let value = self.storage.load(self.span.physical(self.front));
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl<T: Element> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(self.storage.load(self.span.physical(self.back)))
    }
}

impl<T: Element> ExactSizeIterator for Iter<'_, T> {}

impl<T: Element> FusedIterator for Iter<'_, T> {}
