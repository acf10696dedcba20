//! Property tests that drive a `SlotList` and a `Vec` model through the same operations and
//! check that they agree, and that the slot chains stay well formed.

use std::collections::HashSet;

use proptest::prelude::*;
use slot_list::{Error, SlotList, WhenFull};

const CAPACITY: usize = 6;

#[derive(Clone, Debug)]
enum Op {
    InsertAt(u8, usize, WhenFull),
    InsertAfter(u8, u8, WhenFull),
    InsertBefore(u8, u8, WhenFull),
    RemoveAt(usize),
    RemoveAfter(u8),
    RemoveBefore(u8),
    Remove(u8),
    Sort,
    Clear,
}

fn arb_when_full() -> impl Strategy<Value = WhenFull> {
    prop_oneof![Just(WhenFull::Reject), Just(WhenFull::EvictFirst)]
}

fn arb_value() -> impl Strategy<Value = u8> {
    0_u8..8
}

fn arb_position() -> impl Strategy<Value = usize> {
    0_usize..CAPACITY + 2
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (arb_value(), arb_position(), arb_when_full())
            .prop_map(|(value, position, when_full)| Op::InsertAt(value, position, when_full)),
        2 => (arb_value(), arb_value(), arb_when_full())
            .prop_map(|(value, target, when_full)| Op::InsertAfter(value, target, when_full)),
        2 => (arb_value(), arb_value(), arb_when_full())
            .prop_map(|(value, target, when_full)| Op::InsertBefore(value, target, when_full)),
        2 => arb_position().prop_map(Op::RemoveAt),
        1 => arb_value().prop_map(Op::RemoveAfter),
        1 => arb_value().prop_map(Op::RemoveBefore),
        1 => arb_value().prop_map(Op::Remove),
        1 => Just(Op::Sort),
        1 => Just(Op::Clear),
    ]
}

/// Reference behavior expressed with a `Vec`.
#[derive(Debug, Default)]
struct Model {
    items: Vec<u8>,
}

impl Model {
    fn is_full(&self) -> bool {
        self.items.len() == CAPACITY
    }

    fn room(&self, when_full: WhenFull) -> Result<bool, Error> {
        if !self.is_full() {
            return Ok(false);
        }

        match when_full {
            WhenFull::EvictFirst => Ok(true),
            _ => Err(Error::CapacityExhausted { capacity: CAPACITY }),
        }
    }

    fn find(&self, value: u8) -> Result<usize, Error> {
        self.items
            .iter()
            .position(|item| *item == value)
            .ok_or(Error::TargetNotFound)
    }

    fn insert_at(&mut self, value: u8, position: usize, when_full: WhenFull) -> Result<(), Error> {
        if position >= CAPACITY || position > self.items.len() {
            return Err(Error::InvalidPosition { position });
        }

        if self.room(when_full)? {
            if position == 0 {
                self.items[0] = value;
            } else {
                self.items.remove(0);
                self.items.insert(position, value);
            }
        } else {
            self.items.insert(position, value);
        }

        Ok(())
    }

    fn insert_after(&mut self, value: u8, target: u8, when_full: WhenFull) -> Result<(), Error> {
        let index = self.find(target)?;

        if self.room(when_full)? {
            if index == 0 {
                self.items[0] = value;
            } else {
                self.items.remove(0);
                self.items.insert(index, value);
            }
        } else {
            self.items.insert(index + 1, value);
        }

        Ok(())
    }

    fn insert_before(&mut self, value: u8, target: u8, when_full: WhenFull) -> Result<(), Error> {
        let index = self.find(target)?;

        if self.room(when_full)? {
            if index == 0 {
                self.items[0] = value;
            } else {
                self.items.remove(0);
                self.items.insert(index - 1, value);
            }
        } else {
            self.items.insert(index, value);
        }

        Ok(())
    }

    fn remove_at(&mut self, position: usize) -> Result<u8, Error> {
        if position >= CAPACITY {
            return Err(Error::InvalidPosition { position });
        }

        if position >= self.items.len() {
            return Err(Error::NoSuchNeighbor);
        }

        Ok(self.items.remove(position))
    }

    fn remove_after(&mut self, target: u8) -> Result<u8, Error> {
        let index = self.find(target)? + 1;

        if index >= self.items.len() {
            return Err(Error::NoSuchNeighbor);
        }

        Ok(self.items.remove(index))
    }

    fn remove_before(&mut self, target: u8) -> Result<u8, Error> {
        let index = self.find(target)?;

        if index == 0 {
            return Err(Error::NoSuchNeighbor);
        }

        Ok(self.items.remove(index - 1))
    }

    fn remove(&mut self, value: u8) -> Result<u8, Error> {
        let index = self.find(value)?;
        Ok(self.items.remove(index))
    }
}

fn assert_well_formed(list: &SlotList<u8, CAPACITY>) -> Result<(), TestCaseError> {
    let in_use: Vec<usize> = list.slot_indices().collect();
    let free: Vec<usize> = list.free_slot_indices().collect();

    let in_use_set: HashSet<usize> = in_use.iter().copied().collect();
    let free_set: HashSet<usize> = free.iter().copied().collect();

    prop_assert_eq!(in_use_set.len(), in_use.len(), "in-use chain repeats a slot");
    prop_assert_eq!(free_set.len(), free.len(), "free chain repeats a slot");
    prop_assert!(in_use_set.is_disjoint(&free_set));
    prop_assert_eq!(in_use.len() + free.len(), CAPACITY);
    prop_assert!(in_use.iter().chain(&free).all(|slot| *slot < CAPACITY));
    prop_assert_eq!(list.is_empty(), in_use.is_empty());
    prop_assert_eq!(list.is_full(), free.is_empty());
    prop_assert_eq!(list.pool().free_len(), free.len());

    Ok(())
}

proptest! {
    #[test]
    fn agrees_with_vec_model(ops in prop::collection::vec(arb_op(), 1..64)) {
        let mut list = SlotList::<u8, CAPACITY>::new();
        let mut model = Model::default();

        for op in ops {
            match op {
                Op::InsertAt(value, position, when_full) => {
                    prop_assert_eq!(
                        list.insert_at(value, position, when_full),
                        model.insert_at(value, position, when_full)
                    );
                }
                Op::InsertAfter(value, target, when_full) => {
                    prop_assert_eq!(
                        list.insert_after(value, &target, when_full),
                        model.insert_after(value, target, when_full)
                    );
                }
                Op::InsertBefore(value, target, when_full) => {
                    prop_assert_eq!(
                        list.insert_before(value, &target, when_full),
                        model.insert_before(value, target, when_full)
                    );
                }
                Op::RemoveAt(position) => {
                    prop_assert_eq!(list.remove_at(position), model.remove_at(position));
                }
                Op::RemoveAfter(target) => {
                    prop_assert_eq!(list.remove_after(&target), model.remove_after(target));
                }
                Op::RemoveBefore(target) => {
                    prop_assert_eq!(list.remove_before(&target), model.remove_before(target));
                }
                Op::Remove(value) => {
                    prop_assert_eq!(list.remove(&value), model.remove(value));
                }
                Op::Sort => {
                    list.sort();
                    model.items.sort_unstable();
                }
                Op::Clear => {
                    list.clear();
                    model.items.clear();
                }
            }

            prop_assert_eq!(list.iter().copied().collect::<Vec<_>>(), model.items.clone());
            prop_assert_eq!(list.len(), model.items.len());
            assert_well_formed(&list)?;
        }
    }

    #[test]
    fn insert_then_search_finds_value(
        prefix in prop::collection::vec(0_u8..100, 0..CAPACITY),
        value in 100_u8..200,
        position_seed in any::<usize>(),
    ) {
        let mut list = SlotList::<u8, CAPACITY>::new();
        for (position, item) in prefix.iter().enumerate() {
            list.insert_at(*item, position, WhenFull::Reject).unwrap();
        }

        let len = list.len();
        let position = position_seed % (len + 1);

        prop_assert_eq!(list.insert_at(value, position, WhenFull::Reject), Ok(()));
        prop_assert_eq!(list.len(), len + 1);

        let found = list.search(&value);
        prop_assert!(found.is_some_and(|found| found <= position));
    }

    #[test]
    fn remove_at_shrinks_by_one(
        items in prop::collection::vec(0_u8..100, 1..=CAPACITY),
        position_seed in any::<usize>(),
    ) {
        let mut list = SlotList::<u8, CAPACITY>::new();
        for (position, item) in items.iter().enumerate() {
            list.insert_at(*item, position, WhenFull::Reject).unwrap();
        }

        let position = position_seed % items.len();

        prop_assert_eq!(list.remove_at(position), Ok(items[position]));
        prop_assert_eq!(list.len(), items.len() - 1);
        assert_well_formed(&list)?;
    }

    #[test]
    fn sort_yields_ordered_permutation(
        items in Just((0_u8..CAPACITY as u8).collect::<Vec<_>>()).prop_shuffle(),
        len in 0..=CAPACITY,
    ) {
        let items = &items[..len];

        let mut list = SlotList::<u8, CAPACITY>::new();
        for (position, item) in items.iter().enumerate() {
            list.insert_at(*item, position, WhenFull::Reject).unwrap();
        }

        list.sort();

        let sorted: Vec<u8> = list.iter().copied().collect();
        let mut expected = items.to_vec();
        expected.sort_unstable();

        prop_assert_eq!(sorted, expected);
        assert_well_formed(&list)?;
    }

    #[test]
    fn forced_insert_into_full_list_always_succeeds(
        items in prop::collection::vec(0_u8..100, CAPACITY),
        value in 100_u8..200,
        position in 0..CAPACITY,
    ) {
        let mut list = SlotList::<u8, CAPACITY>::new();
        for (position, item) in items.iter().enumerate() {
            list.insert_at(*item, position, WhenFull::Reject).unwrap();
        }

        prop_assert_eq!(list.insert_at(value, position, WhenFull::EvictFirst), Ok(()));

        let mut expected = items.clone();
        if position == 0 {
            expected[0] = value;
        } else {
            expected.remove(0);
            expected.insert(position, value);
        }

        prop_assert_eq!(list.iter().copied().collect::<Vec<_>>(), expected);
        prop_assert!(list.is_full());
        assert_well_formed(&list)?;
    }
}
