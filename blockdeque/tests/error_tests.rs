use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};

use blockdeque::{Deque, DequeError, Limited};

#[test]
fn test_at_reports_out_of_range() {
    let deque = Deque::from_elem(10, 2).unwrap();

    assert_eq!(deque.at(0), Ok(&2));
    assert_eq!(
        deque.at(10),
        Err(DequeError::OutOfRange { index: 10, len: 10 })
    );
    assert_eq!(deque.get(10), None);
}

#[test]
fn test_at_on_empty_deque() {
    let mut deque: Deque<u32> = Deque::new();

    assert_eq!(deque.at(0), Err(DequeError::OutOfRange { index: 0, len: 0 }));
    assert_eq!(
        deque.at_mut(3),
        Err(DequeError::OutOfRange { index: 3, len: 0 })
    );
}

#[test]
fn test_zero_block_capacity_is_rejected() {
    let result = Deque::<i32>::with_block_capacity(0);

    assert_eq!(
        result.unwrap_err(),
        DequeError::InvalidConfiguration {
            reason: "block capacity must be at least 1"
        }
    );
}

#[test]
fn test_error_messages() {
    let err = DequeError::OutOfRange { index: 4, len: 2 };
    assert_eq!(
        err.to_string(),
        "Index out of range: index 4 is beyond deque length 2"
    );

    let err = DequeError::AllocationFailed { bytes: 64 };
    assert_eq!(
        err.to_string(),
        "Allocation failed: provider could not supply 64 bytes"
    );

    let err = DequeError::InvalidConfiguration { reason: "nope" };
    assert_eq!(err.to_string(), "Invalid deque configuration: nope");
}

#[test]
fn test_first_allocation_refused() {
    let provider = Limited::new(0);
    let mut deque = Deque::new_in(&provider);

    assert!(matches!(
        deque.push_back(1),
        Err(DequeError::AllocationFailed { .. })
    ));
    assert!(matches!(
        deque.push_front(1),
        Err(DequeError::AllocationFailed { .. })
    ));
    assert!(deque.is_empty());
    assert_eq!(deque.row_count(), 0);
    assert_eq!(provider.live(), 0);
}

#[test]
fn test_refused_directory_leaves_no_block_behind() {
    let provider = Limited::new(1);
    let mut deque = Deque::new_in(&provider);

    // the block is granted, the directory is not
    assert!(deque.push_back(1).is_err());
    drop(deque);

    assert_eq!(provider.live(), 0);
    assert_eq!(provider.peak(), 1);
}

#[test]
fn test_push_front_refused_keeps_contents() {
    let provider = Limited::new(2);
    let mut deque = Deque::with_block_capacity_in(4, &provider).unwrap();

    deque.push_front(2).unwrap();
    deque.push_front(1).unwrap();
    assert!(deque.push_front(0).is_err());

    assert_eq!(deque, [1, 2]);
    assert_eq!(deque.check_invariants(), Ok(()));

    provider.set_limit(3);
    deque.push_front(0).unwrap();
    assert_eq!(deque, [0, 1, 2]);
}

#[test]
fn test_push_back_refused_during_directory_regrowth() {
    let provider = Limited::new(3);
    let mut deque = Deque::with_block_capacity_in(1, &provider).unwrap();

    deque.push_back(0).unwrap();
    deque.push_back(1).unwrap();
    assert_eq!(provider.live(), 3);

    // a third row needs a larger directory
    assert!(matches!(
        deque.push_back(2),
        Err(DequeError::AllocationFailed { .. })
    ));
    assert_eq!(deque, [0, 1]);
    assert_eq!(deque.row_count(), 3);
    assert_eq!(deque.check_invariants(), Ok(()));
}

#[test]
fn test_resize_refused_adds_nothing() {
    let provider = Limited::new(3);
    let mut deque = Deque::with_block_capacity_in(2, &provider).unwrap();
    deque.push_back(7).unwrap();

    assert!(deque.resize(50, 0).is_err());
    assert_eq!(deque, [7]);

    drop(deque);
    assert_eq!(provider.live(), 0);
}

#[test]
fn test_try_clone_refused_releases_partial_copy() {
    let provider = Limited::new(2);
    let mut deque = Deque::with_block_capacity_in(4, &provider).unwrap();
    deque.push_back('a').unwrap();
    assert_eq!(provider.live(), 2);

    provider.set_limit(3);
    assert!(matches!(
        deque.try_clone(),
        Err(DequeError::AllocationFailed { .. })
    ));
    assert_eq!(provider.live(), 2);
    assert_eq!(deque, ['a']);
}

#[test]
fn test_extend_panics_on_refusal() {
    let provider = Limited::new(2);
    let mut deque = Deque::with_block_capacity_in(2, &provider).unwrap();

    let result = catch_unwind(AssertUnwindSafe(|| deque.extend(0..10)));

    assert!(result.is_err());
}

thread_local! {
    static CLONES_LEFT: Cell<usize> = const { Cell::new(usize::MAX) };
    static LIVE: Cell<isize> = const { Cell::new(0) };
}

/// Counts live instances and panics on clone once its budget runs out.
struct Fragile(u32);

impl Fragile {
    fn new(value: u32) -> Self {
        LIVE.with(|live| live.set(live.get() + 1));
        Fragile(value)
    }
}

impl Clone for Fragile {
    fn clone(&self) -> Self {
        CLONES_LEFT.with(|left| {
            if left.get() == 0 {
                panic!("clone budget exhausted");
            }
            left.set(left.get() - 1);
        });
        Fragile::new(self.0)
    }
}

impl Drop for Fragile {
    fn drop(&mut self) {
        LIVE.with(|live| live.set(live.get() - 1));
    }
}

fn live_fragile() -> isize {
    LIVE.with(Cell::get)
}

#[test]
fn test_panicking_clone_rolls_back_resize() {
    let mut deque = Deque::with_block_capacity(3).unwrap();
    deque.push_back(Fragile::new(1)).unwrap();
    deque.push_back(Fragile::new(2)).unwrap();

    CLONES_LEFT.with(|left| left.set(5));
    let template = Fragile::new(9);
    let result = catch_unwind(AssertUnwindSafe(|| deque.resize(20, template)));
    CLONES_LEFT.with(|left| left.set(usize::MAX));

    assert!(result.is_err());
    assert_eq!(deque.len(), 2);
    assert_eq!(deque[1].0, 2);
    assert_eq!(deque.check_invariants(), Ok(()));
    assert_eq!(live_fragile(), 2);

    drop(deque);
    assert_eq!(live_fragile(), 0);
}

#[test]
fn test_panicking_clone_rolls_back_try_clone() {
    let source: Deque<Fragile> = (0..12).map(Fragile::new).collect();

    CLONES_LEFT.with(|left| left.set(7));
    let result = catch_unwind(AssertUnwindSafe(|| source.try_clone()));
    CLONES_LEFT.with(|left| left.set(usize::MAX));

    assert!(result.is_err());
    assert_eq!(live_fragile(), 12);
    assert_eq!(source.len(), 12);
}
