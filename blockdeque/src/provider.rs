//! Memory providers.
//!
//! A provider hands out raw, unconstructed storage. The deque uses one
//! provider for both element blocks and directory rows; the methods are
//! generic over the slot type so the same value serves both levels.

use alloc::alloc::{alloc, dealloc, Layout};
use core::cell::Cell;
use core::mem;
use core::ptr::NonNull;

use crate::error::{DequeError, Result};

/// Source of raw storage for blocks and directory rows.
///
/// # Safety
///
/// `allocate::<U>(n)` must return memory aligned for `U` and valid for `n`
/// values of `U`, which stays valid until it is handed back to `deallocate`
/// with the same `U` and `n`.
pub unsafe trait MemoryProvider {
    /// Acquires storage for `n` values of `U`. Nothing is constructed.
    ///
    /// # Errors
    ///
    /// Returns `DequeError::AllocationFailed` when the request cannot be
    /// satisfied and `DequeError::CapacityOverflow` when it cannot even be
    /// described.
    fn allocate<U>(&self, n: usize) -> Result<NonNull<U>>;

    /// Releases storage obtained from `allocate`.
    ///
    /// # Safety
    ///
    /// `ptr` must come from `self.allocate::<U>(n)` and must not be used
    /// afterwards.
    unsafe fn deallocate<U>(&self, ptr: NonNull<U>, n: usize);

    /// Moves `value` into an unconstructed slot.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writes and aligned.
    unsafe fn construct<U>(&self, ptr: *mut U, value: U) {
        // SAFETY: guaranteed by the caller.
        unsafe { ptr.write(value) }
    }

    /// Runs the destructor of a constructed slot, leaving it unconstructed.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live value that is not used afterwards.
    unsafe fn destroy<U>(&self, ptr: *mut U) {
        // SAFETY: guaranteed by the caller.
        unsafe { ptr.drop_in_place() }
    }
}

fn array_layout<U>(n: usize) -> Result<Layout> {
    Layout::array::<U>(n).map_err(|_| DequeError::CapacityOverflow)
}

/// The process-wide allocator.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Global;

// SAFETY: storage comes straight from the global allocator with the layout
// of `[U; n]`; zero-sized requests get a dangling, well-aligned pointer.
unsafe impl MemoryProvider for Global {
    fn allocate<U>(&self, n: usize) -> Result<NonNull<U>> {
        let layout = array_layout::<U>(n)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }
        // SAFETY: the layout has a non-zero size.
        let ptr = unsafe { alloc(layout) };
        NonNull::new(ptr.cast::<U>()).ok_or(DequeError::AllocationFailed {
            bytes: layout.size(),
        })
    }

    unsafe fn deallocate<U>(&self, ptr: NonNull<U>, n: usize) {
        if let Ok(layout) = Layout::array::<U>(n) {
            if layout.size() != 0 {
                // SAFETY: `ptr` was allocated above with this layout.
                unsafe { dealloc(ptr.as_ptr().cast(), layout) }
            }
        }
    }
}

// SAFETY: forwards to the referenced provider.
unsafe impl<P: MemoryProvider> MemoryProvider for &P {
    fn allocate<U>(&self, n: usize) -> Result<NonNull<U>> {
        (**self).allocate(n)
    }

    unsafe fn deallocate<U>(&self, ptr: NonNull<U>, n: usize) {
        // SAFETY: guaranteed by the caller.
        unsafe { (**self).deallocate(ptr, n) }
    }

    unsafe fn construct<U>(&self, ptr: *mut U, value: U) {
        // SAFETY: guaranteed by the caller.
        unsafe { (**self).construct(ptr, value) }
    }

    unsafe fn destroy<U>(&self, ptr: *mut U) {
        // SAFETY: guaranteed by the caller.
        unsafe { (**self).destroy(ptr) }
    }
}

/// A provider that refuses requests once `limit` allocations are live.
///
/// Every block and every directory counts as one allocation, whatever its
/// size. Clones start with no live allocations and the same limit.
///
/// ```
/// use blockdeque::{Deque, DequeError, Limited};
///
/// let provider = Limited::new(2);
/// let mut deque = Deque::with_block_capacity_in(4, &provider).unwrap();
///
/// // directory + first block
/// deque.push_back(1).unwrap();
/// deque.push_back(2).unwrap();
/// assert_eq!(provider.live(), 2);
///
/// // a third allocation is refused and the deque is left as it was
/// assert!(matches!(
///     deque.push_back(3),
///     Err(DequeError::AllocationFailed { .. })
/// ));
/// assert_eq!(deque.len(), 2);
/// ```
#[derive(Debug)]
pub struct Limited<A = Global> {
    inner: A,
    limit: Cell<usize>,
    live: Cell<usize>,
    peak: Cell<usize>,
}

impl Limited<Global> {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self::with_provider(Global, limit)
    }
}

impl<A> Limited<A> {
    #[must_use]
    pub fn with_provider(inner: A, limit: usize) -> Self {
        Self {
            inner,
            limit: Cell::new(limit),
            live: Cell::new(0),
            peak: Cell::new(0),
        }
    }

    /// Number of allocations handed out and not yet released.
    #[must_use]
    pub fn live(&self) -> usize {
        self.live.get()
    }

    /// Highest value `live` has reached.
    #[must_use]
    pub fn peak(&self) -> usize {
        self.peak.get()
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit.get()
    }

    /// Changes the limit. Allocations already live are not affected.
    pub fn set_limit(&self, limit: usize) {
        self.limit.set(limit);
    }
}

impl<A: Clone> Clone for Limited<A> {
    fn clone(&self) -> Self {
        Self::with_provider(self.inner.clone(), self.limit.get())
    }
}

// SAFETY: storage comes from the wrapped provider unchanged.
unsafe impl<A: MemoryProvider> MemoryProvider for Limited<A> {
    fn allocate<U>(&self, n: usize) -> Result<NonNull<U>> {
        if self.live.get() >= self.limit.get() {
            return Err(DequeError::AllocationFailed {
                bytes: mem::size_of::<U>().saturating_mul(n),
            });
        }
        let ptr = self.inner.allocate(n)?;
        let live = self.live.get() + 1;
        self.live.set(live);
        self.peak.set(self.peak.get().max(live));
        Ok(ptr)
    }

    unsafe fn deallocate<U>(&self, ptr: NonNull<U>, n: usize) {
        // SAFETY: guaranteed by the caller.
        unsafe { self.inner.deallocate(ptr, n) };
        self.live.set(self.live.get().saturating_sub(1));
    }

    unsafe fn construct<U>(&self, ptr: *mut U, value: U) {
        // SAFETY: guaranteed by the caller.
        unsafe { self.inner.construct(ptr, value) }
    }

    unsafe fn destroy<U>(&self, ptr: *mut U) {
        // SAFETY: guaranteed by the caller.
        unsafe { self.inner.destroy(ptr) }
    }
}
