use core::fmt;
use core::marker::PhantomData;
use core::mem;
use core::ops::{Index, IndexMut};
use core::ptr;

use crate::block::{Block, Directory, INITIAL_ROWS};
use crate::cursor::{Cursor, Position};
use crate::error::{DequeError, Result};
use crate::index;
use crate::iter::{Iter, IterMut};
use crate::provider::{Global, MemoryProvider};
use crate::raw;

/// Target block size in bytes when no capacity is requested.
const DEFAULT_BLOCK_BYTES: usize = 512;
/// Smallest block capacity picked automatically.
pub const MIN_BLOCK_CAPACITY: usize = 8;
/// Largest block capacity picked automatically.
pub const MAX_BLOCK_CAPACITY: usize = 4096;

fn default_block_capacity<T>() -> usize {
    match mem::size_of::<T>() {
        0 => MAX_BLOCK_CAPACITY,
        size => (DEFAULT_BLOCK_BYTES / size).clamp(MIN_BLOCK_CAPACITY, MAX_BLOCK_CAPACITY),
    }
}

/// A double-ended queue stored in fixed-capacity blocks behind a directory
/// of rows.
///
/// Elements never move when the deque grows: growing at either end adds a
/// block, and when the directory runs out of rows only the row handles are
/// moved, within it or into a larger one.
pub struct Deque<T, A: MemoryProvider = Global> {
    directory: Directory<T>,
    /// One retired block kept for the next growth.
    spare: Option<Block<T>>,
    provider: A,
    /// Slots per block; 0 until the first allocation picks it.
    block_capacity: usize,
    /// Column of the front element inside the begin-row block.
    head: usize,
    len: usize,
    _marker: PhantomData<T>,
}

// SAFETY: the deque owns its elements and storage exclusively.
unsafe impl<T: Send, A: MemoryProvider + Send> Send for Deque<T, A> {}
// SAFETY: shared access only hands out `&T`.
unsafe impl<T: Sync, A: MemoryProvider + Sync> Sync for Deque<T, A> {}

impl<T> Deque<T> {
    /// Creates an empty deque. Nothing is allocated until the first push.
    #[must_use]
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates an empty deque whose blocks hold `block_capacity` elements.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::InvalidConfiguration` if `block_capacity` is 0.
    pub fn with_block_capacity(block_capacity: usize) -> Result<Self> {
        Self::with_block_capacity_in(block_capacity, Global)
    }

    /// Creates a deque holding `len` clones of `value`.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` if storage cannot be obtained;
    /// nothing stays allocated in that case.
    pub fn from_elem(len: usize, value: T) -> Result<Self>
    where
        T: Clone,
    {
        Self::from_elem_in(len, value, Global)
    }
}

impl<T, A: MemoryProvider> Deque<T, A> {
    #[must_use]
    pub const fn new_in(provider: A) -> Self {
        Self {
            directory: Directory::unallocated(),
            spare: None,
            provider,
            block_capacity: 0,
            head: 0,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// # Errors
    ///
    /// Returns `DequeError::InvalidConfiguration` if `block_capacity` is 0.
    pub fn with_block_capacity_in(block_capacity: usize, provider: A) -> Result<Self> {
        if block_capacity == 0 {
            return Err(DequeError::InvalidConfiguration {
                reason: "block capacity must be at least 1",
            });
        }
        let mut deque = Self::new_in(provider);
        deque.block_capacity = block_capacity;
        Ok(deque)
    }

    /// Creates a deque holding `len` clones of `value`, with blocks sized
    /// for three times `len` so both ends have room to grow.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` if storage cannot be obtained;
    /// nothing stays allocated in that case.
    pub fn from_elem_in(len: usize, value: T, provider: A) -> Result<Self>
    where
        T: Clone,
    {
        let mut deque = Self::new_in(provider);
        if len == 0 {
            return Ok(deque);
        }
        deque.block_capacity = if mem::size_of::<T>() == 0 {
            MAX_BLOCK_CAPACITY
        } else {
            len.saturating_mul(3).clamp(MIN_BLOCK_CAPACITY, MAX_BLOCK_CAPACITY)
        };
        let head = deque.block_capacity.saturating_sub(len) / 2;
        deque.allocate_directory(INITIAL_ROWS, INITIAL_ROWS / 2, head)?;
        deque.resize(len, value)?;
        Ok(deque)
    }

    /// Copies this deque into fresh storage with the same block capacity and
    /// directory shape.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` if storage cannot be obtained.
    /// Everything built so far is released before returning.
    pub fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
        A: Clone,
    {
        let mut copy = Self::new_in(self.provider.clone());
        copy.block_capacity = self.block_capacity;
        if self.directory.is_allocated() {
            copy.allocate_directory(self.directory.row_count(), self.directory.begin_row(), self.head)?;
            copy.grow_back_with(self.len, |index| self[index].clone())?;
        }
        Ok(copy)
    }

    /// Replaces the contents with clones of `source`'s elements.
    ///
    /// Existing elements are overwritten in place with `clone_from`; extra
    /// ones are dropped, missing ones appended.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` if room for the appended
    /// elements cannot be obtained. The overwritten prefix keeps its new
    /// values and nothing is appended in that case.
    pub fn assign_from<B: MemoryProvider>(&mut self, source: &Deque<T, B>) -> Result<()>
    where
        T: Clone,
    {
        if self.block_capacity == 0 {
            self.block_capacity = source.block_capacity;
        }
        let shared = self.len.min(source.len);
        for (target, value) in self.iter_mut().zip(source.iter()).take(shared) {
            target.clone_from(value);
        }
        if source.len < self.len {
            self.truncate(source.len);
        } else if source.len > self.len {
            self.grow_back_with(source.len - shared, |offset| source[shared + offset].clone())?;
        }
        self.debug_check();
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slots per block; 0 until the first allocation fixes it.
    #[must_use]
    pub fn block_capacity(&self) -> usize {
        self.block_capacity
    }

    /// Rows in the directory, active or not.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.directory.row_count()
    }

    /// Slots in the blocks currently installed in the directory.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.directory.active_rows() * self.block_capacity
    }

    #[must_use]
    pub fn provider(&self) -> &A {
        &self.provider
    }

    /// # Safety
    ///
    /// `index` must address a slot in an installed block: any `index < len`,
    /// or `len` itself when the back block has room.
    pub(crate) unsafe fn element_ptr(&self, index: usize) -> *mut T {
        let slot = index::locate(self.directory.begin_row(), self.head, self.block_capacity, index);
        // SAFETY: guaranteed by the caller; `column < block_capacity`.
        unsafe { self.directory.block_unchecked(slot.row).slot(slot.column) }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        // SAFETY: `index < len`, so the slot is live.
        Some(unsafe { &*self.element_ptr(index) })
    }

    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        // SAFETY: `index < len`, and `&mut self` makes the access unique.
        Some(unsafe { &mut *self.element_ptr(index) })
    }

    /// # Safety
    ///
    /// `index` must be below `len`.
    #[must_use]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len);
        // SAFETY: guaranteed by the caller.
        unsafe { &*self.element_ptr(index) }
    }

    /// # Safety
    ///
    /// `index` must be below `len`.
    #[must_use]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);
        // SAFETY: guaranteed by the caller.
        unsafe { &mut *self.element_ptr(index) }
    }

    /// Checked access.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::OutOfRange` if `index >= len`.
    pub fn at(&self, index: usize) -> Result<&T> {
        let len = self.len;
        self.get(index).ok_or(DequeError::OutOfRange { index, len })
    }

    /// # Errors
    ///
    /// Returns `DequeError::OutOfRange` if `index >= len`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;
        self.get_mut(index).ok_or(DequeError::OutOfRange { index, len })
    }

    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    #[must_use]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.get(self.len.checked_sub(1)?)
    }

    #[must_use]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.get_mut(self.len.checked_sub(1)?)
    }

    /// Appends an element.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` if a new block or a larger
    /// directory is needed and cannot be obtained. The deque keeps its
    /// contents and `value` is dropped.
    pub fn push_back(&mut self, value: T) -> Result<()> {
        self.reserve_back(1)?;
        // SAFETY: `reserve_back` installed the block holding slot `len`.
        unsafe { self.provider.construct(self.element_ptr(self.len), value) };
        self.len += 1;
        self.debug_check();
        Ok(())
    }

    /// Prepends an element.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` if a new block or a larger
    /// directory is needed and cannot be obtained. The deque keeps its
    /// contents and `value` is dropped.
    pub fn push_front(&mut self, value: T) -> Result<()> {
        self.ensure_allocated()?;
        if self.head == 0 {
            self.grow_front()?;
        }
        self.head -= 1;
        // SAFETY: `head` now names a free slot of the begin-row block.
        unsafe { self.provider.construct(self.element_ptr(0), value) };
        self.len += 1;
        self.debug_check();
        Ok(())
    }

    /// Removes the last element. Once the back leaves its block, that block
    /// and any reserved ones past it are retired.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot `len` was live and is no longer counted.
        let value = unsafe { self.element_ptr(self.len).read() };
        let back = index::locate(self.directory.begin_row(), self.head, self.block_capacity, self.len);
        let emptied = back.column == 0;
        if self.len == 0 {
            self.recenter();
        }
        if emptied || self.len == 0 {
            self.release_trailing();
        }
        self.debug_check();
        Some(value)
    }

    /// Removes the first element. Once the front leaves its block, the block
    /// is retired.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        // SAFETY: slot 0 is live and is no longer counted below.
        let value = unsafe { self.element_ptr(0).read() };
        self.head += 1;
        self.len -= 1;
        if self.len == 0 {
            // Collapse the window to the begin row.
            self.recenter();
            self.release_trailing();
        } else if self.head == self.block_capacity {
            if let Some(block) = self.directory.detach_front() {
                self.retire_block(block);
            }
            self.head = 0;
        }
        self.debug_check();
        Some(value)
    }

    /// Inserts `value` so that it ends up at `position`.
    ///
    /// At the front or back this is a push; elsewhere the shorter side is
    /// shifted by one slot.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::OutOfRange` if `position` is past `end()`, and
    /// `DequeError::AllocationFailed` as for the pushes.
    pub fn insert(&mut self, position: Position, value: T) -> Result<Position> {
        let index = position.index();
        if index > self.len {
            return Err(DequeError::OutOfRange { index, len: self.len });
        }
        if index == 0 {
            self.push_front(value)?;
        } else if index == self.len {
            self.push_back(value)?;
        } else if index < self.len / 2 {
            self.push_front(value)?;
            for at in 0..index {
                self.exchange(at, at + 1);
            }
        } else {
            self.push_back(value)?;
            for at in (index..self.len - 1).rev() {
                self.exchange(at, at + 1);
            }
        }
        self.debug_check();
        Ok(position)
    }

    /// Removes and returns the element at `index`, shifting the shorter side
    /// to close the gap.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        if index < self.len / 2 {
            for at in (0..index).rev() {
                self.exchange(at, at + 1);
            }
            self.pop_front()
        } else {
            for at in index..self.len - 1 {
                self.exchange(at, at + 1);
            }
            self.pop_back()
        }
    }

    /// Drops the element at `position`. The returned position holds the
    /// element that followed it, or is `end()`.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::OutOfRange` if `position` does not name an
    /// element.
    pub fn erase(&mut self, position: Position) -> Result<Position> {
        let index = position.index();
        match self.remove(index) {
            Some(_) => Ok(position),
            None => Err(DequeError::OutOfRange { index, len: self.len }),
        }
    }

    fn exchange(&mut self, a: usize, b: usize) {
        debug_assert!(a < self.len && b < self.len);
        // SAFETY: both slots are live; `ptr::swap` allows them to coincide.
        unsafe { ptr::swap(self.element_ptr(a), self.element_ptr(b)) }
    }

    /// Resizes to `len` elements, cloning `value` into new slots at the back
    /// or dropping surplus ones.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` if the deque has to grow and
    /// storage cannot be obtained; the contents are unchanged in that case.
    pub fn resize(&mut self, len: usize, value: T) -> Result<()>
    where
        T: Clone,
    {
        self.resize_with(len, || value.clone())
    }

    /// Like [`resize`](Self::resize), producing new elements with `make`.
    ///
    /// # Errors
    ///
    /// As for `resize`.
    pub fn resize_with<F: FnMut() -> T>(&mut self, len: usize, mut make: F) -> Result<()> {
        if len <= self.len {
            self.truncate(len);
            return Ok(());
        }
        self.grow_back_with(len - self.len, |_| make())
    }

    /// Drops the elements past `len` and releases the blocks they leave
    /// empty. No effect if `len >= self.len()`.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        let old_len = mem::replace(&mut self.len, len);
        // SAFETY: `len..old_len` were live and are no longer counted.
        unsafe { self.destroy_logical(len, old_len) };
        if self.len == 0 {
            self.recenter();
        }
        self.release_trailing();
        self.debug_check();
    }

    /// Drops every element. The directory and the begin-row block are kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Exchanges the entire state of two deques, providers included.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Appends every element of `iter`.
    ///
    /// # Errors
    ///
    /// Stops at the first element that cannot be stored and returns
    /// `DequeError::AllocationFailed`; elements pushed before stay.
    pub fn try_extend<I: IntoIterator<Item = T>>(&mut self, iter: I) -> Result<()> {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve_back(lower)?;
        for value in iter {
            self.push_back(value)?;
        }
        Ok(())
    }

    /// Makes sure `additional` elements can be pushed at the back without
    /// allocating.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` or `DequeError::CapacityOverflow`.
    /// Blocks installed before the failure stay as spare capacity.
    pub fn reserve_back(&mut self, additional: usize) -> Result<()> {
        if additional == 0 {
            return Ok(());
        }
        self.ensure_allocated()?;
        let last = self
            .head
            .checked_add(self.len)
            .and_then(|end| end.checked_add(additional - 1))
            .ok_or(DequeError::CapacityOverflow)?;
        let needed_end = self.directory.begin_row() + last / self.block_capacity;
        let missing = needed_end.saturating_sub(self.directory.end_row());
        for remaining in (1..=missing).rev() {
            if !self.directory.has_room_back() {
                self.directory.regrow(&self.provider, 0, remaining)?;
            }
            let block = self.take_block()?;
            self.directory.attach_back(block);
        }
        Ok(())
    }

    #[must_use]
    pub fn iter(&self) -> Iter<'_, T, A> {
        Iter::new(self)
    }

    #[must_use]
    pub fn iter_mut(&mut self) -> IterMut<'_, T, A> {
        IterMut::new(self)
    }

    /// Position of the first element.
    #[must_use]
    pub fn begin(&self) -> Position {
        Position::new(0)
    }

    /// Position one past the last element.
    #[must_use]
    pub fn end(&self) -> Position {
        Position::new(self.len)
    }

    /// A cursor over this deque at `position`.
    #[must_use]
    pub fn cursor(&self, position: Position) -> Cursor<'_, T, A> {
        Cursor::new(self, position)
    }

    #[must_use]
    pub fn cursor_begin(&self) -> Cursor<'_, T, A> {
        self.cursor(self.begin())
    }

    #[must_use]
    pub fn cursor_end(&self) -> Cursor<'_, T, A> {
        self.cursor(self.end())
    }

    /// Element at `position`.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::OutOfRange` if `position` does not name an
    /// element.
    pub fn resolve(&self, position: Position) -> Result<&T> {
        self.at(position.index())
    }

    /// # Errors
    ///
    /// Returns `DequeError::OutOfRange` if `position` does not name an
    /// element.
    pub fn resolve_mut(&mut self, position: Position) -> Result<&mut T> {
        self.at_mut(position.index())
    }

    /// Position of an element borrowed from this deque, found from its
    /// address. Always `None` for zero-sized types.
    #[must_use]
    pub fn position_of(&self, element: &T) -> Option<Position> {
        let size = mem::size_of::<T>();
        if size == 0 || self.len == 0 {
            return None;
        }
        let address = ptr::from_ref(element) as usize;
        let (begin, end) = (self.directory.begin_row(), self.directory.end_row());
        (begin..=end).find_map(|row| {
            // SAFETY: `row` lies inside the window.
            let start = unsafe { self.directory.block_unchecked(row).slot(0) } as usize;
            let offset = address.checked_sub(start)?;
            if offset % size != 0 || offset / size >= self.block_capacity {
                return None;
            }
            let slot = index::Slot {
                row,
                column: offset / size,
            };
            if row == begin && slot.column < self.head {
                return None;
            }
            let logical = index::logical(begin, self.head, self.block_capacity, slot);
            (logical < self.len).then(|| Position::new(logical))
        })
    }

    /// Checks the structural invariants of the two-level storage.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::Corrupted` naming the first invariant that does
    /// not hold.
    pub fn check_invariants(&self) -> Result<()> {
        let corrupted = |invariant| Err(DequeError::Corrupted { invariant });
        if !self.directory.is_allocated() {
            if self.len != 0 || self.spare.is_some() {
                return corrupted("storage present without a directory");
            }
            return Ok(());
        }
        let (begin, end) = (self.directory.begin_row(), self.directory.end_row());
        if begin > end || end >= self.directory.row_count() {
            return corrupted("directory window out of order");
        }
        if self.block_capacity == 0 || self.head >= self.block_capacity {
            return corrupted("front cursor outside the begin-row block");
        }
        for (row, block) in self.directory.rows().iter().enumerate() {
            if block.is_some() != (begin..=end).contains(&row) {
                return corrupted("row occupancy disagrees with the window");
            }
        }
        let back = index::locate(begin, self.head, self.block_capacity, self.len);
        if back.row > end + 1 || (back.row == end + 1 && back.column != 0) {
            return corrupted("back cursor beyond the end row");
        }
        Ok(())
    }

    fn debug_check(&self) {
        debug_assert_eq!(self.check_invariants(), Ok(()));
    }

    /// Allocates the first directory and block if there are none yet.
    fn ensure_allocated(&mut self) -> Result<()> {
        if self.directory.is_allocated() {
            return Ok(());
        }
        if self.block_capacity == 0 {
            self.block_capacity = default_block_capacity::<T>();
        }
        self.allocate_directory(INITIAL_ROWS, INITIAL_ROWS / 2, self.block_capacity / 2)
    }

    fn allocate_directory(&mut self, row_count: usize, begin: usize, head: usize) -> Result<()> {
        debug_assert!(!self.directory.is_allocated());
        let first = self.take_block()?;
        match Directory::allocate(&self.provider, row_count, begin, first) {
            Ok(directory) => {
                self.directory = directory;
                self.head = head;
                Ok(())
            }
            Err((err, first)) => {
                // No spare may outlive a missing directory.
                // SAFETY: the block holds no live elements.
                unsafe { first.release(&self.provider, self.block_capacity) };
                Err(err)
            }
        }
    }

    /// Installs a block before the begin row and moves the front cursor to
    /// its end.
    fn grow_front(&mut self) -> Result<()> {
        if !self.directory.has_room_front() {
            self.directory.regrow(&self.provider, 1, 0)?;
        }
        let block = self.take_block()?;
        self.directory.attach_front(block);
        self.head = self.block_capacity;
        Ok(())
    }

    fn take_block(&mut self) -> Result<Block<T>> {
        match self.spare.take() {
            Some(block) => Ok(block),
            None => Block::allocate(&self.provider, self.block_capacity),
        }
    }

    fn retire_block(&mut self, block: Block<T>) {
        if self.spare.is_none() {
            self.spare = Some(block);
        } else {
            // SAFETY: the block holds no live elements.
            unsafe { block.release(&self.provider, self.block_capacity) };
        }
    }

    /// Moves the front cursor of an empty deque to the middle of its block.
    fn recenter(&mut self) {
        debug_assert_eq!(self.len, 0);
        self.head = self.block_capacity / 2;
    }

    /// Retires blocks past the one holding the last element.
    fn release_trailing(&mut self) {
        if !self.directory.is_allocated() {
            return;
        }
        let last = index::last_row(self.directory.begin_row(), self.head, self.block_capacity, self.len);
        while self.directory.end_row() > last {
            match self.directory.detach_back() {
                Some(block) => self.retire_block(block),
                None => break,
            }
        }
    }

    /// Constructs `additional` elements at the back, the `i`-th from
    /// `make(i)`. Either all of them are added or, if `make` panics, none.
    fn grow_back_with<F: FnMut(usize) -> T>(&mut self, additional: usize, mut make: F) -> Result<()> {
        self.reserve_back(additional)?;
        let start = self.len;
        let target = start + additional;
        let mut guard = GrowGuard { deque: self, start };
        while guard.deque.len < target {
            let index = guard.deque.len;
            let count = index::run_length(guard.deque.head, guard.deque.block_capacity, index).min(target - index);
            // SAFETY: `reserve_back` installed blocks up to slot `target - 1`
            // and slots past `len` are unconstructed.
            unsafe {
                let dst = guard.deque.element_ptr(index);
                raw::construct_range(&guard.deque.provider, dst, count, |offset| make(index - start + offset));
            }
            guard.deque.len += count;
        }
        mem::forget(guard);
        self.debug_check();
        Ok(())
    }

    /// Destroys the elements `from..to` one block run at a time, last first.
    ///
    /// # Safety
    ///
    /// The elements must be live and not counted by `len` any more.
    unsafe fn destroy_logical(&self, from: usize, to: usize) {
        let mut end = to;
        while end > from {
            let column = index::locate(self.directory.begin_row(), self.head, self.block_capacity, end - 1).column;
            let start = end.saturating_sub(column + 1).max(from);
            // SAFETY: `start..end` lies in one block and is live.
            unsafe { raw::destroy_range(&self.provider, self.element_ptr(start), end - start) };
            end = start;
        }
    }

    /// Returns every block and the directory to the provider. Elements must
    /// already be destroyed.
    fn release_storage(&mut self) {
        let (provider, capacity) = (&self.provider, self.block_capacity);
        let release = |block: Block<T>| {
            // SAFETY: no element is live any more.
            unsafe { block.release(provider, capacity) }
        };
        self.directory.drain_blocks(release);
        if let Some(block) = self.spare.take() {
            release(block);
        }
        let directory = mem::replace(&mut self.directory, Directory::unallocated());
        // SAFETY: the directory came from this provider and is now empty.
        unsafe { directory.release(&self.provider) };
        self.len = 0;
        self.head = 0;
    }
}

/// Rolls back a partially finished `grow_back_with`.
struct GrowGuard<'a, T, A: MemoryProvider> {
    deque: &'a mut Deque<T, A>,
    start: usize,
}

impl<T, A: MemoryProvider> Drop for GrowGuard<'_, T, A> {
    fn drop(&mut self) {
        let written = mem::replace(&mut self.deque.len, self.start);
        // SAFETY: `start..written` were constructed by the aborted growth.
        unsafe { self.deque.destroy_logical(self.start, written) };
    }
}

impl<T, A: MemoryProvider> Drop for Deque<T, A> {
    fn drop(&mut self) {
        /// Releases storage even if an element destructor panics.
        struct Release<'a, T, A: MemoryProvider>(&'a mut Deque<T, A>);

        impl<T, A: MemoryProvider> Drop for Release<'_, T, A> {
            fn drop(&mut self) {
                self.0.release_storage();
            }
        }

        let len = mem::replace(&mut self.len, 0);
        let guard = Release(self);
        // SAFETY: all `len` elements are live and no longer counted.
        unsafe { guard.0.destroy_logical(0, len) };
    }
}

impl<T, A: MemoryProvider + Default> Default for Deque<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: Clone, A: MemoryProvider + Clone> Clone for Deque<T, A> {
    #[allow(clippy::panic)]
    fn clone(&self) -> Self {
        self.try_clone()
            .unwrap_or_else(|err| panic!("failed to clone deque: {err}"))
    }

    #[allow(clippy::panic)]
    fn clone_from(&mut self, source: &Self) {
        if let Err(err) = self.assign_from(source) {
            panic!("failed to assign deque: {err}");
        }
    }
}

impl<T: fmt::Debug, A: MemoryProvider> fmt::Debug for Deque<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, A: MemoryProvider> Index<usize> for Deque<T, A> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        let len = self.len;
        match self.get(index) {
            Some(value) => value,
            None => panic!("Index {index} out of bounds for deque of length {len}"),
        }
    }
}

impl<T, A: MemoryProvider> IndexMut<usize> for Deque<T, A> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!("Index {index} out of bounds for deque of length {len}"),
        }
    }
}

#[allow(clippy::panic)]
impl<T, A: MemoryProvider> Extend<T> for Deque<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if let Err(err) = self.try_extend(iter) {
            panic!("failed to extend deque: {err}");
        }
    }
}

impl<'a, T: Copy + 'a, A: MemoryProvider> Extend<&'a T> for Deque<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> FromIterator<T> for Deque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Self::new();
        deque.extend(iter);
        deque
    }
}

impl<T, const N: usize> From<[T; N]> for Deque<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T> From<alloc::vec::Vec<T>> for Deque<T> {
    fn from(values: alloc::vec::Vec<T>) -> Self {
        values.into_iter().collect()
    }
}
