#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! `Deque`: a double-ended queue stored in fixed-size blocks.
//!
//! `Deque` offers amortized O(1) pushes and pops at both ends, O(1) indexed
//! access and double-ended iteration. Storage is two-level: a directory of
//! rows, each row owning one block of `block_capacity` raw slots.
//!
//! This crate is `no_std` compatible; it needs only `alloc`.
//!
//! Storage layout:
//!
//! ```text
//!  directory   row 0   row 1        row 2        row 3   row 4
//!             [ -- ] [ block ]    [ block ]    [ block ] [ -- ]
//!                     ..ab cdef    ghij klmn    op.. ....
//!                       ^ head                    ^ back
//! ```
//!
//! The element at logical index `i` lives at
//! `row = begin_row + (head + i) / block_capacity`,
//! `column = (head + i) % block_capacity`.
//!
//! # Performance Characteristics
//!
//! ## Time Complexity
//! - `push_back()`, `push_front()`: amortized O(1); a push that fills a
//!   block installs a new one, and a directory that runs out of rows is
//!   recentered or doubled, moving row handles only
//! - `pop_back()`, `pop_front()`: O(1)
//! - `get()`, `at()`, `[]`: O(1) via the index translator
//! - `insert()`, `remove()`, `erase()`: O(1) at either end, otherwise
//!   O(min(i, len - i)) swaps
//! - `resize()`, `truncate()`: O(changed elements)
//!
//! ## Memory
//! - Elements never move when the deque grows, so references handed out
//!   before a push stay valid after it (the borrow checker still requires
//!   them to end before the push).
//! - A block is retired as soon as the front or back leaves it, and an
//!   emptied deque keeps a single block. One retired block is cached.
//!
//! # Basic Usage
//!
//! ```
//! # use blockdeque::Deque;
//! let mut deque = Deque::from_elem(1, 1).unwrap();
//!
//! for value in 2..=6 {
//!     deque.push_front(value).unwrap();
//! }
//! deque.push_back(0).unwrap();
//!
//! assert_eq!(deque.len(), 7);
//! assert_eq!(deque, [6, 5, 4, 3, 2, 1, 0]);
//! assert_eq!(deque[1], 5);
//! assert_eq!(deque.front(), Some(&6));
//! assert_eq!(deque.back(), Some(&0));
//!
//! assert_eq!(deque.pop_front(), Some(6));
//! assert_eq!(deque.pop_back(), Some(0));
//! ```
//!
//! # Checked Access
//!
//! `at()` reports an out-of-range index as an error instead of panicking:
//!
//! ```
//! # use blockdeque::{Deque, DequeError};
//! let deque = Deque::from_elem(10, 2).unwrap();
//!
//! assert_eq!(deque.at(9), Ok(&2));
//! assert_eq!(
//!     deque.at(10),
//!     Err(DequeError::OutOfRange { index: 10, len: 10 })
//! );
//! ```
//!
//! # Positions and Cursors
//!
//! A `Position` is a plain logical index that survives mutation; a `Cursor`
//! borrows the deque and moves over it:
//!
//! ```
//! # use blockdeque::Deque;
//! let mut deque = Deque::from_elem(10, 1).unwrap();
//!
//! let first = deque.insert(deque.begin(), 2).unwrap();
//! deque.insert(deque.end(), 3).unwrap();
//! assert_eq!(deque.resolve(first), Ok(&2));
//! assert_eq!(deque.len(), 12);
//!
//! let cursor = deque.cursor_begin() + 11;
//! assert_eq!(cursor.get(), Ok(&3));
//! assert!((cursor + 1).is_end());
//! ```
//!
//! # Memory Providers
//!
//! Storage comes from a [`MemoryProvider`]. [`Global`] is the default;
//! [`Limited`] caps the number of live allocations:
//!
//! ```
//! # use blockdeque::{Deque, Limited};
//! let provider = Limited::new(8);
//! {
//!     let mut deque = Deque::with_block_capacity_in(4, &provider).unwrap();
//!     deque.extend(0..20);
//!     assert!(provider.live() > 1);
//! }
//! assert_eq!(provider.live(), 0);
//! ```

extern crate alloc;

mod block;
mod cursor;
mod deque;
mod eq;
mod error;
mod index;
mod iter;
mod provider;
mod raw;

pub use cursor::{Cursor, Position};
pub use deque::{Deque, MAX_BLOCK_CAPACITY, MIN_BLOCK_CAPACITY};
pub use error::{DequeError, Result};
pub use iter::{IntoIter, Iter, IterMut};
pub use provider::{Global, Limited, MemoryProvider};
