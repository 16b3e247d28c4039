//! Construction and destruction of element ranges in raw storage.

use core::mem;

use crate::provider::MemoryProvider;

/// Destroys the constructed prefix of a range unless forgotten.
struct RangeGuard<'a, T, A: MemoryProvider> {
    provider: &'a A,
    start: *mut T,
    written: usize,
}

impl<T, A: MemoryProvider> Drop for RangeGuard<'_, T, A> {
    fn drop(&mut self) {
        // SAFETY: exactly `written` slots from `start` were constructed.
        unsafe { destroy_range(self.provider, self.start, self.written) };
    }
}

/// Constructs `len` elements into the unconstructed slots starting at `dst`;
/// the `i`-th element is produced by `make(i)`.
///
/// If `make` panics, every element constructed by this call is destroyed,
/// last first, before the panic resumes. Returns one past the last written
/// slot.
///
/// # Safety
///
/// `dst..dst + len` must be valid for writes and hold no live values.
pub(crate) unsafe fn construct_range<T, A, F>(provider: &A, dst: *mut T, len: usize, mut make: F) -> *mut T
where
    A: MemoryProvider,
    F: FnMut(usize) -> T,
{
    let mut guard = RangeGuard {
        provider,
        start: dst,
        written: 0,
    };
    while guard.written < len {
        let value = make(guard.written);
        // SAFETY: `written < len`, so the slot is in range and unconstructed.
        unsafe { provider.construct(dst.add(guard.written), value) };
        guard.written += 1;
    }
    mem::forget(guard);
    // SAFETY: in range per the caller's contract.
    unsafe { dst.add(len) }
}

/// Destroys `len` live elements starting at `begin`, back to front.
/// Returns `begin`.
///
/// # Safety
///
/// `begin..begin + len` must hold live values that are not used afterwards.
pub(crate) unsafe fn destroy_range<T, A: MemoryProvider>(provider: &A, begin: *mut T, len: usize) -> *mut T {
    let mut remaining = len;
    while remaining > 0 {
        remaining -= 1;
        // SAFETY: in range and live per the caller's contract.
        unsafe { provider.destroy(begin.add(remaining)) };
    }
    begin
}
