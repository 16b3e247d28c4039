//! Logical index ↔ (row, column) translation.
//!
//! A deque's elements start at column `head` of the block in row
//! `begin_row` and run on through the following rows, `block_capacity`
//! slots per row.

/// Physical location of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    pub(crate) row: usize,
    pub(crate) column: usize,
}

/// Maps logical `index` to its slot. `block_capacity` must be non-zero.
#[inline]
pub(crate) fn locate(begin_row: usize, head: usize, block_capacity: usize, index: usize) -> Slot {
    let absolute = head + index;
    Slot {
        row: begin_row + absolute / block_capacity,
        column: absolute % block_capacity,
    }
}

/// Inverse of [`locate`]. `slot` must not precede the element at `head`.
#[inline]
pub(crate) fn logical(begin_row: usize, head: usize, block_capacity: usize, slot: Slot) -> usize {
    (slot.row - begin_row) * block_capacity + slot.column - head
}

/// Row holding the last of `len` elements, or `begin_row` when empty.
#[inline]
pub(crate) fn last_row(begin_row: usize, head: usize, block_capacity: usize, len: usize) -> usize {
    locate(begin_row, head, block_capacity, len.saturating_sub(1)).row
}

/// Elements stored from `index` to the end of its block.
#[inline]
pub(crate) fn run_length(head: usize, block_capacity: usize, index: usize) -> usize {
    block_capacity - (head + index) % block_capacity
}
