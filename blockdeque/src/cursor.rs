//! Positions and cursors.
//!
//! A [`Position`] is a logical index detached from any borrow, so it stays
//! usable while the deque is mutated; it is resolved against the deque each
//! time it is used. A [`Cursor`] pairs a position with a shared borrow of
//! the deque for read-only, random-access traversal.
//!
//! Arithmetic never checks bounds. A position that ends up outside
//! `begin()..end()` resolves to `DequeError::OutOfRange`.

use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};
use core::ptr;

use crate::deque::Deque;
use crate::error::Result;
use crate::provider::MemoryProvider;

/// A logical index into a deque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position(usize);

impl Position {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl Add<isize> for Position {
    type Output = Self;

    fn add(self, offset: isize) -> Self {
        Self(self.0.wrapping_add_signed(offset))
    }
}

impl Sub<isize> for Position {
    type Output = Self;

    fn sub(self, offset: isize) -> Self {
        Self(self.0.wrapping_add_signed(offset.wrapping_neg()))
    }
}

impl AddAssign<isize> for Position {
    fn add_assign(&mut self, offset: isize) {
        *self = *self + offset;
    }
}

impl SubAssign<isize> for Position {
    fn sub_assign(&mut self, offset: isize) {
        *self = *self - offset;
    }
}

/// Signed distance between two positions.
impl Sub for Position {
    type Output = isize;

    #[allow(clippy::cast_possible_wrap)]
    fn sub(self, other: Self) -> isize {
        self.0.wrapping_sub(other.0) as isize
    }
}

/// A read-only cursor: a deque borrow plus a position.
///
/// Two cursors are equal when they borrow the same deque and sit at the
/// same position.
pub struct Cursor<'a, T, A: MemoryProvider> {
    deque: &'a Deque<T, A>,
    position: Position,
}

impl<'a, T, A: MemoryProvider> Cursor<'a, T, A> {
    pub(crate) fn new(deque: &'a Deque<T, A>, position: Position) -> Self {
        Self { deque, position }
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.position.index()
    }

    /// The element under the cursor.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::OutOfRange` if the cursor is not on an element.
    pub fn get(&self) -> Result<&'a T> {
        self.deque.resolve(self.position)
    }

    /// Element `offset` places away, without moving the cursor.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::OutOfRange` if no element is there.
    pub fn peek(&self, offset: isize) -> Result<&'a T> {
        self.deque.resolve(self.position + offset)
    }

    pub fn move_next(&mut self) {
        *self += 1;
    }

    pub fn move_prev(&mut self) {
        *self -= 1;
    }

    /// Whether the cursor sits one past the last element.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.position == self.deque.end()
    }
}

impl<T, A: MemoryProvider> Clone for Cursor<'_, T, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, A: MemoryProvider> Copy for Cursor<'_, T, A> {}

impl<T, A: MemoryProvider> PartialEq for Cursor<'_, T, A> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.deque, other.deque) && self.position == other.position
    }
}

impl<T, A: MemoryProvider> Eq for Cursor<'_, T, A> {}

/// Cursors over different deques are unordered.
impl<T, A: MemoryProvider> PartialOrd for Cursor<'_, T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        ptr::eq(self.deque, other.deque).then(|| self.position.cmp(&other.position))
    }
}

impl<T, A: MemoryProvider> fmt::Debug for Cursor<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.position.index())
            .field("len", &self.deque.len())
            .finish()
    }
}

impl<T, A: MemoryProvider> Add<isize> for Cursor<'_, T, A> {
    type Output = Self;

    fn add(mut self, offset: isize) -> Self {
        self.position += offset;
        self
    }
}

impl<T, A: MemoryProvider> Sub<isize> for Cursor<'_, T, A> {
    type Output = Self;

    fn sub(mut self, offset: isize) -> Self {
        self.position -= offset;
        self
    }
}

impl<T, A: MemoryProvider> AddAssign<isize> for Cursor<'_, T, A> {
    fn add_assign(&mut self, offset: isize) {
        self.position += offset;
    }
}

impl<T, A: MemoryProvider> SubAssign<isize> for Cursor<'_, T, A> {
    fn sub_assign(&mut self, offset: isize) {
        self.position -= offset;
    }
}
