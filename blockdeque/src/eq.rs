use core::cmp::Ordering;
use core::hash::{Hash, Hasher};

use crate::deque::Deque;
use crate::provider::MemoryProvider;

impl<T, U, A, B> PartialEq<Deque<U, B>> for Deque<T, A>
where
    T: PartialEq<U>,
    A: MemoryProvider,
    B: MemoryProvider,
{
    fn eq(&self, other: &Deque<U, B>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, A: MemoryProvider> Eq for Deque<T, A> {}

impl<T, U, A, const N: usize> PartialEq<[U; N]> for Deque<T, A>
where
    T: PartialEq<U>,
    A: MemoryProvider,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.len() == N && self.iter().eq(other.iter())
    }
}

impl<T, U, A> PartialEq<[U]> for Deque<T, A>
where
    T: PartialEq<U>,
    A: MemoryProvider,
{
    fn eq(&self, other: &[U]) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T, U, A> PartialEq<&[U]> for Deque<T, A>
where
    T: PartialEq<U>,
    A: MemoryProvider,
{
    fn eq(&self, other: &&[U]) -> bool {
        *self == **other
    }
}

/// Lexicographic; a proper prefix sorts first.
impl<T: PartialOrd, A: MemoryProvider> PartialOrd for Deque<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, A: MemoryProvider> Ord for Deque<T, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash, A: MemoryProvider> Hash for Deque<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for value in self {
            value.hash(state);
        }
    }
}
