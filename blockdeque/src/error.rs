use thiserror::Error;

/// Result alias used by every fallible `Deque` operation.
pub type Result<T, E = DequeError> = core::result::Result<T, E>;

/// Error types for `Deque` operations
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum DequeError {
    /// Checked access past the last element
    #[error("Index out of range: index {index} is beyond deque length {len}")]
    OutOfRange {
        /// Index that was accessed
        index: usize,
        /// Current length of the deque
        len: usize,
    },
    /// The memory provider refused a request
    #[error("Allocation failed: provider could not supply {bytes} bytes")]
    AllocationFailed {
        /// Size of the refused request
        bytes: usize,
    },
    /// A size computation does not fit in `usize` or a `Layout`
    #[error("Capacity overflow: requested size exceeds the addressable range")]
    CapacityOverflow,
    /// Invalid parameter passed to a constructor
    #[error("Invalid deque configuration: {reason}")]
    InvalidConfiguration {
        /// Description of why configuration failed
        reason: &'static str,
    },
    /// A structural self-check failed
    #[error("Structural invariant violated: {invariant}")]
    Corrupted {
        /// The invariant that does not hold
        invariant: &'static str,
    },
}
