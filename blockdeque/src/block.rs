//! Two-level storage: fixed-capacity element blocks anchored by a directory
//! of rows.
//!
//! Neither type drops anything on its own. The owning deque decides which
//! slots are live and hands blocks and directories back to the provider
//! explicitly.

use core::mem;
use core::ptr::NonNull;
use core::slice;

use crate::error::{DequeError, Result};
use crate::provider::MemoryProvider;

/// Rows of a freshly allocated directory.
pub(crate) const INITIAL_ROWS: usize = 3;

/// A contiguous run of raw element slots. Occupancy is tracked by the deque.
#[derive(Debug)]
pub(crate) struct Block<T> {
    ptr: NonNull<T>,
}

impl<T> Block<T> {
    pub(crate) fn allocate<A: MemoryProvider>(provider: &A, capacity: usize) -> Result<Self> {
        Ok(Self {
            ptr: provider.allocate::<T>(capacity)?,
        })
    }

    /// # Safety
    ///
    /// `capacity` must be the value the block was allocated with and no slot
    /// may still be live.
    pub(crate) unsafe fn release<A: MemoryProvider>(self, provider: &A, capacity: usize) {
        // SAFETY: guaranteed by the caller.
        unsafe { provider.deallocate(self.ptr, capacity) }
    }

    /// # Safety
    ///
    /// `column` must be below the block capacity.
    pub(crate) unsafe fn slot(&self, column: usize) -> *mut T {
        // SAFETY: guaranteed by the caller.
        unsafe { self.ptr.as_ptr().add(column) }
    }
}

/// The outer level: `row_count` rows, each holding at most one block.
///
/// Rows `begin..=end` form the active window and hold blocks; every other
/// row is empty. A directory with zero rows stands for "nothing allocated".
#[derive(Debug)]
pub(crate) struct Directory<T> {
    rows: NonNull<Option<Block<T>>>,
    row_count: usize,
    begin: usize,
    end: usize,
}

impl<T> Directory<T> {
    pub(crate) const fn unallocated() -> Self {
        Self {
            rows: NonNull::dangling(),
            row_count: 0,
            begin: 0,
            end: 0,
        }
    }

    /// Allocates `row_count` empty rows and installs `first` at row `begin`.
    ///
    /// On failure `first` is handed back to the caller untouched.
    pub(crate) fn allocate<A: MemoryProvider>(
        provider: &A,
        row_count: usize,
        begin: usize,
        first: Block<T>,
    ) -> core::result::Result<Self, (DequeError, Block<T>)> {
        debug_assert!(begin < row_count);
        let rows = match Self::allocate_rows(provider, row_count) {
            Ok(rows) => rows,
            Err(err) => return Err((err, first)),
        };
        let mut directory = Self {
            rows,
            row_count,
            begin,
            end: begin,
        };
        directory.rows_mut()[begin] = Some(first);
        Ok(directory)
    }

    fn allocate_rows<A: MemoryProvider>(provider: &A, row_count: usize) -> Result<NonNull<Option<Block<T>>>> {
        let rows = provider.allocate::<Option<Block<T>>>(row_count)?;
        for row in 0..row_count {
            // SAFETY: `row < row_count`; rows are plain handles.
            unsafe { rows.as_ptr().add(row).write(None) };
        }
        Ok(rows)
    }

    pub(crate) fn is_allocated(&self) -> bool {
        self.row_count != 0
    }

    pub(crate) fn row_count(&self) -> usize {
        self.row_count
    }

    pub(crate) fn begin_row(&self) -> usize {
        self.begin
    }

    pub(crate) fn end_row(&self) -> usize {
        self.end
    }

    /// Number of rows in the active window.
    pub(crate) fn active_rows(&self) -> usize {
        if self.is_allocated() {
            self.end - self.begin + 1
        } else {
            0
        }
    }

    pub(crate) fn rows(&self) -> &[Option<Block<T>>] {
        // SAFETY: every row was initialized at allocation; an unallocated
        // directory yields an empty slice over a dangling pointer.
        unsafe { slice::from_raw_parts(self.rows.as_ptr(), self.row_count) }
    }

    fn rows_mut(&mut self) -> &mut [Option<Block<T>>] {
        // SAFETY: as in `rows`, and `&mut self` makes the access unique.
        unsafe { slice::from_raw_parts_mut(self.rows.as_ptr(), self.row_count) }
    }

    /// # Safety
    ///
    /// `row` must lie inside the active window.
    pub(crate) unsafe fn block_unchecked(&self, row: usize) -> &Block<T> {
        debug_assert!(self.begin <= row && row <= self.end);
        // SAFETY: rows inside the window hold blocks.
        unsafe { self.rows().get_unchecked(row).as_ref().unwrap_unchecked() }
    }

    /// Whether a row exists past the window's end.
    pub(crate) fn has_room_back(&self) -> bool {
        self.end + 1 < self.row_count
    }

    /// Whether a row exists before the window's start.
    pub(crate) fn has_room_front(&self) -> bool {
        self.begin > 0
    }

    /// Extends the window by one row at the back. Requires `has_room_back`.
    pub(crate) fn attach_back(&mut self, block: Block<T>) {
        debug_assert!(self.has_room_back());
        self.end += 1;
        let end = self.end;
        self.rows_mut()[end] = Some(block);
    }

    /// Extends the window by one row at the front. Requires `has_room_front`.
    pub(crate) fn attach_front(&mut self, block: Block<T>) {
        debug_assert!(self.has_room_front());
        self.begin -= 1;
        let begin = self.begin;
        self.rows_mut()[begin] = Some(block);
    }

    /// Shrinks the window by its first row, which must not be the last one.
    pub(crate) fn detach_front(&mut self) -> Option<Block<T>> {
        if self.begin >= self.end {
            return None;
        }
        let begin = self.begin;
        self.begin += 1;
        self.rows_mut()[begin].take()
    }

    /// Shrinks the window by its last row, which must not be the first one.
    pub(crate) fn detach_back(&mut self) -> Option<Block<T>> {
        if self.end <= self.begin {
            return None;
        }
        let end = self.end;
        self.end -= 1;
        self.rows_mut()[end].take()
    }

    /// Makes room for at least `front` free rows before the window and `back`
    /// free rows after it, centering the window.
    ///
    /// A directory with more than twice the rows needed is reused by shifting
    /// the window; otherwise the window moves into a larger directory. Only
    /// row handles move; element storage stays where it is. On failure the
    /// directory is unchanged.
    pub(crate) fn regrow<A: MemoryProvider>(&mut self, provider: &A, front: usize, back: usize) -> Result<()> {
        let active = self.active_rows();
        let spare = front.max(back).max(1);
        let wanted = spare
            .checked_mul(2)
            .and_then(|rows| rows.checked_add(active))
            .ok_or(DequeError::CapacityOverflow)?;
        if wanted.checked_mul(2).is_some_and(|rows| self.row_count > rows) {
            self.recenter(active);
            return Ok(());
        }
        let row_count = self
            .row_count
            .checked_mul(2)
            .ok_or(DequeError::CapacityOverflow)?
            .max(wanted);

        let mut grown = Self {
            rows: Self::allocate_rows(provider, row_count)?,
            row_count,
            begin: (row_count - active) / 2,
            end: (row_count - active) / 2 + active - 1,
        };
        let (old_begin, new_begin) = (self.begin, grown.begin);
        let moved = &mut self.rows_mut()[old_begin..old_begin + active];
        for (offset, row) in moved.iter_mut().enumerate() {
            grown.rows_mut()[new_begin + offset] = row.take();
        }

        let old = mem::replace(self, grown);
        // SAFETY: every block was moved out of the old rows.
        unsafe { old.release(provider) };
        Ok(())
    }

    /// Shifts the window to the middle of the existing rows.
    fn recenter(&mut self, active: usize) {
        let (old_begin, new_begin) = (self.begin, (self.row_count - active) / 2);
        if new_begin < old_begin {
            self.rows_mut()[new_begin..old_begin + active].rotate_left(old_begin - new_begin);
        } else {
            self.rows_mut()[old_begin..new_begin + active].rotate_right(new_begin - old_begin);
        }
        self.begin = new_begin;
        self.end = new_begin + active - 1;
    }

    /// Hands every block in the window to `sink`, then releases the rows.
    pub(crate) fn drain_blocks(&mut self, mut sink: impl FnMut(Block<T>)) {
        if !self.is_allocated() {
            return;
        }
        let (begin, end) = (self.begin, self.end);
        for row in &mut self.rows_mut()[begin..=end] {
            if let Some(block) = row.take() {
                sink(block);
            }
        }
    }

    /// Releases the row storage. Blocks still installed are leaked.
    ///
    /// # Safety
    ///
    /// `provider` must be the provider the directory was allocated from.
    pub(crate) unsafe fn release<A: MemoryProvider>(self, provider: &A) {
        if self.is_allocated() {
            // SAFETY: rows were allocated with this count.
            unsafe { provider.deallocate(self.rows, self.row_count) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Global, Limited};

    fn block(provider: &Limited) -> Block<u32> {
        Block::allocate(provider, 4).unwrap()
    }

    fn release_all(mut directory: Directory<u32>, provider: &Limited) {
        directory.drain_blocks(|block| unsafe { block.release(provider, 4) });
        unsafe { directory.release(provider) };
    }

    #[test]
    fn test_unallocated_directory() {
        let directory = Directory::<u32>::unallocated();
        assert!(!directory.is_allocated());
        assert_eq!(directory.active_rows(), 0);
        assert!(directory.rows().is_empty());
        unsafe { directory.release(&Global) };
    }

    #[test]
    fn test_window_attach_and_detach() {
        let provider = Limited::new(16);
        let mut directory = Directory::allocate(&provider, INITIAL_ROWS, 1, block(&provider)).unwrap();
        assert_eq!((directory.begin_row(), directory.end_row()), (1, 1));

        directory.attach_back(block(&provider));
        directory.attach_front(block(&provider));
        assert_eq!((directory.begin_row(), directory.end_row()), (0, 2));
        assert!(!directory.has_room_front());
        assert!(!directory.has_room_back());
        assert_eq!(provider.live(), 4);

        let front = directory.detach_front().unwrap();
        let back = directory.detach_back().unwrap();
        assert_eq!((directory.begin_row(), directory.end_row()), (1, 1));
        assert!(directory.detach_back().is_none());
        assert!(directory.detach_front().is_none());
        unsafe {
            front.release(&provider, 4);
            back.release(&provider, 4);
        }

        release_all(directory, &provider);
        assert_eq!(provider.live(), 0);
    }

    #[test]
    fn test_regrow_recenters_window() {
        let provider = Limited::new(16);
        let mut directory = Directory::allocate(&provider, INITIAL_ROWS, 1, block(&provider)).unwrap();
        directory.attach_back(block(&provider));
        let first = unsafe { directory.block_unchecked(1).slot(0) };

        directory.regrow(&provider, 0, 1).unwrap();
        assert_eq!(directory.row_count(), 6);
        assert_eq!(directory.active_rows(), 2);
        assert_eq!((directory.begin_row(), directory.end_row()), (2, 3));
        assert!(directory.has_room_front() && directory.has_room_back());
        // blocks keep their storage
        assert_eq!(unsafe { directory.block_unchecked(2).slot(0) }, first);
        assert!(directory.rows()[1].is_none());

        release_all(directory, &provider);
        assert_eq!(provider.live(), 0);
    }

    #[test]
    fn test_regrow_shifts_window_inside_roomy_directory() {
        let provider = Limited::new(16);
        let mut directory = Directory::allocate(&provider, 12, 10, block(&provider)).unwrap();
        directory.attach_back(block(&provider));
        let first = unsafe { directory.block_unchecked(10).slot(0) };

        directory.regrow(&provider, 0, 1).unwrap();
        assert_eq!(directory.row_count(), 12);
        assert_eq!((directory.begin_row(), directory.end_row()), (5, 6));
        assert_eq!(unsafe { directory.block_unchecked(5).slot(0) }, first);
        assert!(directory.rows()[10].is_none() && directory.rows()[11].is_none());
        // no new directory was requested
        assert_eq!(provider.peak(), 3);

        release_all(directory, &provider);
        assert_eq!(provider.live(), 0);
    }

    #[test]
    fn test_regrow_failure_keeps_directory() {
        let provider = Limited::new(2);
        let mut directory = Directory::allocate(&provider, INITIAL_ROWS, 1, block(&provider)).unwrap();

        assert!(matches!(
            directory.regrow(&provider, 1, 0),
            Err(DequeError::AllocationFailed { .. })
        ));
        assert_eq!(directory.row_count(), INITIAL_ROWS);
        assert_eq!(directory.active_rows(), 1);

        release_all(directory, &provider);
        assert_eq!(provider.live(), 0);
    }

    #[test]
    fn test_allocate_failure_returns_block() {
        let provider = Limited::new(1);
        let first = block(&provider);
        let (err, first) = Directory::allocate(&provider, INITIAL_ROWS, 1, first).unwrap_err();
        assert!(matches!(err, DequeError::AllocationFailed { .. }));
        unsafe { first.release(&provider, 4) };
        assert_eq!(provider.live(), 0);
    }
}
