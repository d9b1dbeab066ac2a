// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use proptest::prelude::*;

use super::*;

#[test]
fn empty_snapshot() {
    let history: History<u32> = History::new(4);
    assert!(history.is_empty());
    assert_eq!(history.snapshot(), Vec::<u32>::new());
}

#[test]
fn keeps_insertion_order_below_capacity() {
    let mut history = History::new(4);
    for n in 1..=3 {
        assert_eq!(history.push(n), None);
    }
    assert_eq!(history.snapshot(), vec![1, 2, 3]);
}

#[test]
fn evicts_oldest_past_capacity() {
    let mut history = History::new(3);
    history.push("a");
    history.push("b");
    history.push("c");
    assert_eq!(history.push("d"), Some("a"));
    assert_eq!(history.len(), 3);
    assert_eq!(history.snapshot(), vec!["b", "c", "d"]);
}

#[test]
fn fifty_first_push_drops_the_first() {
    let mut history = History::new(DEFAULT_HISTORY_CAPACITY);
    for n in 0..=50u32 {
        history.push(n);
    }
    assert_eq!(history.len(), 50);
    assert_eq!(history.iter().next(), Some(&1));
    assert!(!history.snapshot().contains(&0));
}

#[test]
fn zero_capacity_holds_one() {
    let mut history = History::new(0);
    history.push(1);
    history.push(2);
    assert_eq!(history.capacity(), 1);
    assert_eq!(history.snapshot(), vec![2]);
}

proptest! {
    #[test]
    fn snapshot_is_most_recent_suffix(
        capacity in 1usize..64,
        items in proptest::collection::vec(any::<u16>(), 0..200),
    ) {
        let mut history = History::new(capacity);
        for item in &items {
            history.push(*item);
            prop_assert!(history.len() <= capacity);
        }
        let keep = items.len().min(capacity);
        let expected = items[items.len() - keep..].to_vec();
        prop_assert_eq!(history.snapshot(), expected);
    }
}
