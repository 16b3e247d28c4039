use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;

use crate::deque::Deque;
use crate::provider::{Global, MemoryProvider};

/// Iterator over shared references to the elements of a `Deque`
///
/// Each step goes through the index translator, so it costs the same at
/// block boundaries as anywhere else.
pub struct Iter<'a, T, A: MemoryProvider = Global> {
    deque: &'a Deque<T, A>,
    front: usize,
    back: usize,
}

impl<'a, T, A: MemoryProvider> Iter<'a, T, A> {
    pub(crate) fn new(deque: &'a Deque<T, A>) -> Self {
        Self {
            deque,
            front: 0,
            back: deque.len(),
        }
    }
}

impl<T, A: MemoryProvider> Clone for Iter<'_, T, A> {
    fn clone(&self) -> Self {
        Self {
            deque: self.deque,
            front: self.front,
            back: self.back,
        }
    }
}

impl<T: fmt::Debug, A: MemoryProvider> fmt::Debug for Iter<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T, A: MemoryProvider> Iterator for Iter<'a, T, A> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let item = self.deque.get(self.front);
        self.front += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl<T, A: MemoryProvider> DoubleEndedIterator for Iter<'_, T, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        self.deque.get(self.back)
    }
}

impl<T, A: MemoryProvider> ExactSizeIterator for Iter<'_, T, A> {}

impl<T, A: MemoryProvider> FusedIterator for Iter<'_, T, A> {}

/// Iterator over mutable references to the elements of a `Deque`
pub struct IterMut<'a, T, A: MemoryProvider = Global> {
    deque: &'a Deque<T, A>,
    front: usize,
    back: usize,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T, A: MemoryProvider> IterMut<'a, T, A> {
    /// Takes `&mut` so no other access to the elements exists while the
    /// iterator lives.
    pub(crate) fn new(deque: &'a mut Deque<T, A>) -> Self {
        let back = deque.len();
        Self {
            deque,
            front: 0,
            back,
            _marker: PhantomData,
        }
    }

    fn element(&self, index: usize) -> &'a mut T {
        debug_assert!(index < self.deque.len());
        // SAFETY: the deque was borrowed mutably for `'a`; element storage
        // lives outside the deque value, and every index is yielded once.
        unsafe { &mut *self.deque.element_ptr(index) }
    }
}

impl<'a, T, A: MemoryProvider> Iterator for IterMut<'a, T, A> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let item = self.element(self.front);
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T, A: MemoryProvider> DoubleEndedIterator for IterMut<'_, T, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.element(self.back))
    }
}

impl<T, A: MemoryProvider> ExactSizeIterator for IterMut<'_, T, A> {}

impl<T, A: MemoryProvider> FusedIterator for IterMut<'_, T, A> {}

/// Owning iterator over the elements of a `Deque`
pub struct IntoIter<T, A: MemoryProvider = Global> {
    deque: Deque<T, A>,
}

impl<T: fmt::Debug, A: MemoryProvider> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.deque).finish()
    }
}

impl<T, A: MemoryProvider> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.deque.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.deque.len();
        (remaining, Some(remaining))
    }
}

impl<T, A: MemoryProvider> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.deque.pop_back()
    }
}

impl<T, A: MemoryProvider> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: MemoryProvider> FusedIterator for IntoIter<T, A> {}

impl<'a, T, A: MemoryProvider> IntoIterator for &'a Deque<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: MemoryProvider> IntoIterator for &'a mut Deque<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, A: MemoryProvider> IntoIterator for Deque<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { deque: self }
    }
}
