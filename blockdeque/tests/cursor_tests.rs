use blockdeque::{Deque, DequeError, Position};

#[test]
fn test_begin_and_end_positions() {
    let empty: Deque<u8> = Deque::new();
    assert_eq!(empty.begin(), empty.end());
    assert!(empty.cursor_begin().is_end());

    let deque = Deque::from_elem(4, 0u8).unwrap();
    assert_eq!(deque.begin(), Position::new(0));
    assert_eq!(deque.end(), Position::new(4));
    assert_eq!(deque.end() - deque.begin(), 4);
}

#[test]
fn test_cursor_walks_forward_and_backward() {
    let mut deque = Deque::with_block_capacity(3).unwrap();
    deque.extend(0..10);

    let mut cursor = deque.cursor_begin();
    let mut forward = Vec::new();
    while !cursor.is_end() {
        forward.push(*cursor.get().unwrap());
        cursor.move_next();
    }
    assert_eq!(forward, (0..10).collect::<Vec<_>>());

    let mut backward = Vec::new();
    while cursor != deque.cursor_begin() {
        cursor.move_prev();
        backward.push(*cursor.get().unwrap());
    }
    assert_eq!(backward, (0..10).rev().collect::<Vec<_>>());
}

#[test]
fn test_cursor_random_access_across_blocks() {
    let mut deque = Deque::with_block_capacity(4).unwrap();
    for value in (0..20).rev() {
        deque.push_front(value).unwrap();
    }

    let cursor = deque.cursor_begin() + 13;
    assert_eq!(cursor.get(), Ok(&13));
    assert_eq!(cursor.peek(-13), Ok(&0));
    assert_eq!(cursor.peek(6), Ok(&19));
    assert_eq!((cursor - 9).index(), 4);

    let mut moving = cursor;
    moving += 5;
    moving -= 2;
    assert_eq!(moving.get(), Ok(&16));
    assert_eq!(moving.position() - cursor.position(), 3);
}

#[test]
fn test_cursor_index_and_at_agree_everywhere() {
    let mut deque = Deque::with_block_capacity(3).unwrap();
    for value in 0..14 {
        deque.push_front(-value).unwrap();
        deque.push_back(value * 10).unwrap();
    }
    assert!(deque.capacity() > 3 * 3);

    for index in 0..deque.len() {
        let through_cursor = (deque.cursor_begin() + index as isize).get().unwrap();
        let through_position = deque.resolve(deque.begin() + index as isize).unwrap();
        assert_eq!(through_cursor, &deque[index]);
        assert_eq!(through_position, &deque[index]);
        assert_eq!(deque.at(index), Ok(&deque[index]));
        assert_eq!(deque.get(index), Some(&deque[index]));
    }
    assert!(deque.at(deque.len()).is_err());
}

#[test]
fn test_cursor_ordering() {
    let deque = Deque::from_elem(5, 'a').unwrap();
    let first = deque.cursor_begin();
    let third = first + 2;

    assert!(first < third);
    assert!(third > first);
    assert!(third <= deque.cursor_end());
    assert_eq!(deque.cursor(Position::new(2)), third);
}

#[test]
fn test_position_survives_mutation() {
    let mut deque: Deque<i32> = (0..8).collect();
    let position = Position::new(5);

    deque.push_back(8).unwrap();
    *deque.resolve_mut(position).unwrap() *= 10;
    deque.push_front(-1).unwrap();

    // the element moved one index up, the position did not
    assert_eq!(deque.resolve(position), Ok(&4));
    assert_eq!(deque.resolve(position + 1), Ok(&50));
}

#[test]
fn test_position_of_element() {
    let mut deque = Deque::with_block_capacity(2).unwrap();
    deque.extend([10, 20, 30, 40, 50]);

    let third = deque.get(2).unwrap();
    assert_eq!(deque.position_of(third), Some(Position::new(2)));

    let outside = 30;
    assert_eq!(deque.position_of(&outside), None);
}

#[test]
fn test_end_position_does_not_resolve() {
    let deque = Deque::from_elem(3, 1).unwrap();

    assert_eq!(
        deque.resolve(deque.end()),
        Err(DequeError::OutOfRange { index: 3, len: 3 })
    );
    assert_eq!(deque.cursor_end().get(), Err(DequeError::OutOfRange { index: 3, len: 3 }));
}

#[test]
fn test_position_before_begin_does_not_resolve() {
    let deque = Deque::from_elem(3, 1).unwrap();
    let before = deque.begin() - 1;

    assert!(matches!(deque.resolve(before), Err(DequeError::OutOfRange { .. })));
    assert_eq!(deque.resolve(before + 1), Ok(&1));
}

#[test]
fn test_insert_and_erase_through_positions() {
    let mut deque: Deque<char> = "acd".chars().collect();

    let at = deque.insert(deque.begin() + 1, 'b').unwrap();
    assert_eq!(deque.resolve(at), Ok(&'b'));

    let after = deque.erase(deque.end() - 2).unwrap();
    assert_eq!(deque.resolve(after), Ok(&'d'));

    assert_eq!(deque.iter().collect::<String>(), "abd");
    assert!(deque.insert(deque.end() + 1, 'z').is_err());
    assert!(deque.erase(deque.end()).is_err());
}
