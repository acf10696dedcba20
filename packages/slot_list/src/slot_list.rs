use std::any::type_name;
use std::fmt;
use std::iter::FusedIterator;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{ChainIndices, Error, Result, SlotPool, WhenFull};

/// A singly linked list whose nodes live in a fixed array of `CAPACITY` slots instead of
/// individual heap allocations.
///
/// The list owns a [`SlotPool`] and threads the slots it has acquired into a chain by their
/// `next` links, starting from the slot of the first element. Element order is defined by
/// this chain alone, not by the slot indices.
///
/// Elements are addressed either by logical position (0-based rank in the chain) or by value
/// (the first element in chain order that compares equal).
///
/// # Running out of slots
///
/// Every insertion takes a [`WhenFull`] policy that decides what happens when all slots are
/// in use: [`WhenFull::Reject`] fails the insertion, [`WhenFull::EvictFirst`] evicts the
/// first element of the list and reuses its slot for the new element.
///
/// # Failures
///
/// Every fallible operation either succeeds or returns an [`Error`] without having modified
/// the list.
///
/// # Examples
///
/// ```
/// use slot_list::{SlotList, WhenFull};
///
/// let mut list = SlotList::<i32, 3>::new();
///
/// list.insert_at(3, 0, WhenFull::Reject).unwrap();
/// list.insert_at(1, 0, WhenFull::Reject).unwrap();
/// list.insert_after(2, &1, WhenFull::Reject).unwrap();
/// assert_eq!(list.to_string(), "1, 2, 3");
///
/// // The list is full. Forcing the insertion evicts the first element.
/// list.insert_at(9, 1, WhenFull::EvictFirst).unwrap();
/// assert_eq!(list.to_string(), "2, 9, 3");
///
/// list.sort();
/// assert_eq!(list.to_string(), "2, 3, 9");
/// assert_eq!(list.search(&9), Some(2));
/// ```
pub struct SlotList<T, const CAPACITY: usize> {
    pool: SlotPool<T, CAPACITY>,

    /// Slot of the first element, `None` if the list is empty.
    first: Option<usize>,
}

/// Where a value was found in the chain, together with the slots right before it.
#[derive(Clone, Copy, Debug)]
struct Located {
    before_previous: Option<usize>,
    previous: Option<usize>,
    slot: usize,
}

impl<T, const CAPACITY: usize> SlotList<T, CAPACITY> {
    /// Creates a new, empty [`SlotList`] with every slot free.
    ///
    /// # Panics
    ///
    /// Panics if `CAPACITY` is zero.
    ///
    /// # Example
    ///
    /// ```rust
    /// use slot_list::SlotList;
    ///
    /// let list = SlotList::<String, 10>::new();
    ///
    /// assert!(list.is_empty());
    /// assert_eq!(list.capacity(), 10);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            pool: SlotPool::new(),
            first: None,
        }
    }

    /// Whether the list holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// The number of elements in the list.
    ///
    /// This walks the whole chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slot_indices().count()
    }

    /// The fixed number of elements the list can hold.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        CAPACITY
    }

    /// Whether every slot is in use, so that inserting requires [`WhenFull::EvictFirst`].
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.pool.is_full()
    }

    /// The element at the logical `position`, if the list is long enough.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&T> {
        self.slot_at(position).map(|slot| self.pool.read(slot))
    }

    /// The logical position of the first element equal to `value`, in chain order.
    #[must_use]
    pub fn search(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|candidate| candidate == value)
    }

    /// Iterates over the elements in list order.
    pub fn iter(&self) -> Iter<'_, T, CAPACITY> {
        Iter {
            pool: &self.pool,
            slots: self.slot_indices(),
        }
    }

    /// Indices of the slots holding the elements, in list order.
    #[must_use]
    pub fn slot_indices(&self) -> ChainIndices<'_, T, CAPACITY> {
        self.pool.chain_from(self.first)
    }

    /// Indices of the unused slots, in the order they will be handed out.
    #[must_use]
    pub fn free_slot_indices(&self) -> ChainIndices<'_, T, CAPACITY> {
        self.pool.free_indices()
    }

    /// Read-only view of the slot pool backing the list.
    #[must_use]
    pub fn pool(&self) -> &SlotPool<T, CAPACITY> {
        &self.pool
    }

    /// Renders the free slot indices, in the order they will be handed out.
    ///
    /// # Example
    ///
    /// ```rust
    /// use slot_list::{SlotList, WhenFull};
    ///
    /// let mut list = SlotList::<u32, 3>::new();
    /// assert_eq!(list.free_slots().to_string(), "Free nodes: 0, 1, 2");
    ///
    /// for value in 0..3 {
    ///     list.insert_at(value, 0, WhenFull::Reject).unwrap();
    /// }
    /// assert_eq!(list.free_slots().to_string(), "List is full. No free nodes.");
    /// ```
    pub fn free_slots(&self) -> FreeSlots<'_, T, CAPACITY> {
        FreeSlots { pool: &self.pool }
    }

    /// Inserts `value` so that it ends up at the logical `position`.
    ///
    /// Position 0 makes `value` the new first element. Any other position links `value` right
    /// after the element currently at `position - 1`, which must exist: inserting past the end
    /// of the list is an error, not an append.
    ///
    /// If the list is full and `when_full` is [`WhenFull::EvictFirst`], the first element is
    /// evicted. The element that was at `position` before the eviction is where the new
    /// element goes, so with `[1, 2, 3]` inserting `9` at position 1 gives `[2, 9, 3]`. At
    /// position 0 the first element is simply replaced.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidPosition`] if `position` is not below the capacity or is beyond the
    ///   end of the list.
    /// * [`Error::CapacityExhausted`] if the list is full and `when_full` is
    ///   [`WhenFull::Reject`].
    pub fn insert_at(&mut self, value: T, position: usize, when_full: WhenFull) -> Result<()> {
        #[cfg(debug_assertions)]
        self.integrity_check();

        if position >= CAPACITY {
            return Err(Error::InvalidPosition { position });
        }

        let Some(anchor_position) = position.checked_sub(1) else {
            return self.insert_first(value, when_full);
        };

        let anchor = self
            .slot_at(anchor_position)
            .ok_or(Error::InvalidPosition { position })?;

        let (anchor, slot) = if let Some(slot) = self.pool.acquire_inner() {
            (anchor, slot)
        } else {
            Self::make_room(when_full)?;

            debug!(
                capacity = CAPACITY,
                position, "evicting first element to insert at position"
            );

            // The anchor was located before the eviction, so the new element goes after
            // the anchor's successor.
            let successor = self
                .pool
                .read_next(anchor)
                .expect("a full list has a successor for every position below capacity");

            (successor, self.evict_first())
        };

        self.link_after(anchor, slot, value);
        Ok(())
    }

    /// Inserts `value` right after the first element equal to `target`.
    ///
    /// If the list is full and `when_full` is [`WhenFull::EvictFirst`], the first element is
    /// evicted to make room. When `target` is the first element, it is the one evicted and
    /// `value` takes its place.
    ///
    /// # Errors
    ///
    /// * [`Error::TargetNotFound`] if no element equals `target`.
    /// * [`Error::CapacityExhausted`] if the list is full and `when_full` is
    ///   [`WhenFull::Reject`].
    pub fn insert_after(&mut self, value: T, target: &T, when_full: WhenFull) -> Result<()>
    where
        T: PartialEq,
    {
        #[cfg(debug_assertions)]
        self.integrity_check();

        let target_slot = self.locate(target).ok_or(Error::TargetNotFound)?.slot;

        let slot = if let Some(slot) = self.pool.acquire_inner() {
            slot
        } else {
            Self::make_room(when_full)?;

            debug!(
                capacity = CAPACITY,
                "evicting first element to insert after target"
            );

            if self.first == Some(target_slot) {
                drop(self.pool.write_payload(target_slot, value));
                return Ok(());
            }

            self.evict_first()
        };

        self.link_after(target_slot, slot, value);
        Ok(())
    }

    /// Inserts `value` right before the first element equal to `target`.
    ///
    /// If the list is full and `when_full` is [`WhenFull::EvictFirst`], the first element is
    /// evicted to make room. When `target` is the first element, the evicted element is
    /// replaced by `value`, which is exactly "evict, then insert in front".
    ///
    /// # Errors
    ///
    /// * [`Error::TargetNotFound`] if no element equals `target`.
    /// * [`Error::CapacityExhausted`] if the list is full and `when_full` is
    ///   [`WhenFull::Reject`].
    pub fn insert_before(&mut self, value: T, target: &T, when_full: WhenFull) -> Result<()>
    where
        T: PartialEq,
    {
        #[cfg(debug_assertions)]
        self.integrity_check();

        let Located {
            mut previous,
            slot: target_slot,
            ..
        } = self.locate(target).ok_or(Error::TargetNotFound)?;

        let slot = if let Some(slot) = self.pool.acquire_inner() {
            slot
        } else {
            Self::make_room(when_full)?;

            debug!(
                capacity = CAPACITY,
                "evicting first element to insert before target"
            );

            let Some(previous_slot) = previous else {
                let first = self.first.expect("target was found so the list is not empty");
                drop(self.pool.write_payload(first, value));
                return Ok(());
            };

            let evicted = self.evict_first();

            if evicted == previous_slot {
                // The target is now the first element.
                previous = None;
            }

            evicted
        };

        self.pool.write(slot, value, Some(target_slot));

        match previous {
            Some(previous) => self.pool.write_next(previous, Some(slot)),
            None => self.first = Some(slot),
        }

        Ok(())
    }

    /// Removes and returns the element at the logical `position`.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidPosition`] if `position` is not below the capacity.
    /// * [`Error::NoSuchNeighbor`] if the list has no element at `position`.
    pub fn remove_at(&mut self, position: usize) -> Result<T> {
        #[cfg(debug_assertions)]
        self.integrity_check();

        if position >= CAPACITY {
            return Err(Error::InvalidPosition { position });
        }

        let Some(anchor_position) = position.checked_sub(1) else {
            let first = self.first.ok_or(Error::NoSuchNeighbor)?;
            return Ok(self.unlink(None, first));
        };

        let anchor = self
            .slot_at(anchor_position)
            .ok_or(Error::NoSuchNeighbor)?;
        let removed = self.pool.read_next(anchor).ok_or(Error::NoSuchNeighbor)?;

        Ok(self.unlink(Some(anchor), removed))
    }

    /// Removes and returns the element right after the first element equal to `target`.
    ///
    /// # Errors
    ///
    /// * [`Error::TargetNotFound`] if no element equals `target`.
    /// * [`Error::NoSuchNeighbor`] if `target` is the last element.
    pub fn remove_after(&mut self, target: &T) -> Result<T>
    where
        T: PartialEq,
    {
        #[cfg(debug_assertions)]
        self.integrity_check();

        let target_slot = self.locate(target).ok_or(Error::TargetNotFound)?.slot;
        let removed = self
            .pool
            .read_next(target_slot)
            .ok_or(Error::NoSuchNeighbor)?;

        Ok(self.unlink(Some(target_slot), removed))
    }

    /// Removes and returns the element right before the first element equal to `target`.
    ///
    /// # Errors
    ///
    /// * [`Error::TargetNotFound`] if no element equals `target`.
    /// * [`Error::NoSuchNeighbor`] if `target` is the first element.
    pub fn remove_before(&mut self, target: &T) -> Result<T>
    where
        T: PartialEq,
    {
        #[cfg(debug_assertions)]
        self.integrity_check();

        let located = self.locate(target).ok_or(Error::TargetNotFound)?;
        let removed = located.previous.ok_or(Error::NoSuchNeighbor)?;

        Ok(self.unlink(located.before_previous, removed))
    }

    /// Removes and returns the first element equal to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TargetNotFound`] if no element equals `value`.
    pub fn remove(&mut self, value: &T) -> Result<T>
    where
        T: PartialEq,
    {
        #[cfg(debug_assertions)]
        self.integrity_check();

        let located = self.locate(value).ok_or(Error::TargetNotFound)?;

        Ok(self.unlink(located.previous, located.slot))
    }

    /// Removes every element, returning all slots to the pool.
    pub fn clear(&mut self) {
        #[cfg(debug_assertions)]
        self.integrity_check();

        while let Some(first) = self.first {
            drop(self.unlink(None, first));
        }
    }

    /// Sorts the list in ascending order.
    ///
    /// Bubble sort over the chain: adjacent elements are exchanged whenever the earlier one
    /// compares greater than the later one. Only payloads move, so the first slot and every
    /// link stay where they are. Equal elements keep their relative order.
    ///
    /// The element type must be totally ordered. Floating point values can be sorted by
    /// wrapping them in a type whose `Ord` uses [`f64::total_cmp()`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use slot_list::{SlotList, WhenFull};
    ///
    /// let mut list = SlotList::<u32, 4>::new();
    /// for value in [3, 1, 4, 1] {
    ///     list.insert_at(value, 0, WhenFull::Reject).unwrap();
    /// }
    ///
    /// list.sort();
    /// assert_eq!(list.to_string(), "1, 1, 3, 4");
    /// ```
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        #[cfg(debug_assertions)]
        self.integrity_check();

        let len = self.len();

        for _ in 1..len {
            let mut swapped = false;
            let mut current = self.first;

            while let Some(slot) = current {
                let Some(next) = self.pool.read_next(slot) else {
                    break;
                };

                if self.pool.read(slot) > self.pool.read(next) {
                    self.pool.swap_payloads(slot, next);
                    swapped = true;
                }

                current = Some(next);
            }

            if !swapped {
                break;
            }
        }
    }

    fn slot_at(&self, position: usize) -> Option<usize> {
        self.slot_indices().nth(position)
    }

    fn locate(&self, value: &T) -> Option<Located>
    where
        T: PartialEq,
    {
        let mut before_previous = None;
        let mut previous = None;

        for slot in self.slot_indices() {
            if self.pool.read(slot) == value {
                return Some(Located {
                    before_previous,
                    previous,
                    slot,
                });
            }

            before_previous = previous;
            previous = Some(slot);
        }

        None
    }

    fn insert_first(&mut self, value: T, when_full: WhenFull) -> Result<()> {
        if let Some(slot) = self.pool.acquire_inner() {
            self.pool.write(slot, value, self.first);
            self.first = Some(slot);
            return Ok(());
        }

        Self::make_room(when_full)?;

        debug!(capacity = CAPACITY, "replacing first element of full list");

        // Evicting the first element and then inserting in front of the rest is the same as
        // replacing the payload of the first slot.
        let first = self.first.expect("a full pool means the list holds every slot");
        drop(self.pool.write_payload(first, value));

        Ok(())
    }

    /// Decides whether an insertion into a full list may proceed by evicting.
    fn make_room(when_full: WhenFull) -> Result<()> {
        match when_full {
            WhenFull::Reject => {
                trace!(capacity = CAPACITY, "insertion rejected, all slots in use");
                Err(Error::CapacityExhausted { capacity: CAPACITY })
            }
            WhenFull::EvictFirst => Ok(()),
        }
    }

    /// Detaches the first slot from the chain so it can be reused, without returning it to
    /// the pool. Its payload is dropped when the slot is written again.
    fn evict_first(&mut self) -> usize {
        let first = self
            .first
            .expect("a full pool means the list holds every slot");

        self.first = self.pool.read_next(first);
        self.pool.write_next(first, None);

        first
    }

    fn link_after(&mut self, anchor: usize, slot: usize, value: T) {
        let next = self.pool.read_next(anchor);
        self.pool.write(slot, value, next);
        self.pool.write_next(anchor, Some(slot));
    }

    /// Unlinks `slot`, which must directly follow `previous` (or be the first slot if
    /// `previous` is `None`), and releases it to the pool.
    fn unlink(&mut self, previous: Option<usize>, slot: usize) -> T {
        let next = self.pool.read_next(slot);

        match previous {
            Some(previous) => self.pool.write_next(previous, next),
            None => self.first = next,
        }

        self.pool
            .release(slot)
            .expect("slots held by the list are always in bounds")
            .expect("slots held by the list always hold a payload")
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    pub(crate) fn integrity_check(&self) {
        self.pool.integrity_check();

        let mut observed_in_use = [false; CAPACITY];
        let mut observed_len: usize = 0;

        let mut current = self.first;

        while let Some(slot) = current {
            let seen = observed_in_use.get_mut(slot).unwrap_or_else(|| {
                panic!(
                    "chain points to out-of-bounds slot {slot} in list of {}",
                    type_name::<T>()
                )
            });

            assert!(
                !*seen,
                "chain visits slot {slot} twice in list of {}",
                type_name::<T>()
            );
            *seen = true;

            observed_len = observed_len
                .checked_add(1)
                .expect("bounded by capacity because every slot is visited at most once");

            current = self.pool.read_next(slot);
        }

        for free in self.pool.free_indices() {
            assert!(
                !observed_in_use
                    .get(free)
                    .expect("free list indices are checked by the pool"),
                "slot {free} is both free and in the chain of list of {}",
                type_name::<T>()
            );
        }

        assert!(
            observed_len.checked_add(self.pool.free_len()) == Some(CAPACITY),
            "chain length {} and free slot count {} do not add up to capacity {} in list of {}",
            observed_len,
            self.pool.free_len(),
            CAPACITY,
            type_name::<T>()
        );
    }
}

impl<T, const CAPACITY: usize> Default for SlotList<T, CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Display, const CAPACITY: usize> fmt::Display for SlotList<T, CAPACITY> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("List is empty")
        } else {
            write!(f, "{}", self.iter().format(", "))
        }
    }
}

impl<T: fmt::Debug, const CAPACITY: usize> fmt::Debug for SlotList<T, CAPACITY> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T, const CAPACITY: usize> IntoIterator for &'a SlotList<T, CAPACITY> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, CAPACITY>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the elements of a [`SlotList`] in list order, returned by
/// [`SlotList::iter()`].
pub struct Iter<'a, T, const CAPACITY: usize> {
    pool: &'a SlotPool<T, CAPACITY>,
    slots: ChainIndices<'a, T, CAPACITY>,
}

impl<'a, T, const CAPACITY: usize> Iterator for Iter<'a, T, CAPACITY> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let pool = self.pool;
        self.slots.next().map(|slot| pool.read(slot))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<T, const CAPACITY: usize> FusedIterator for Iter<'_, T, CAPACITY> {}

impl<T, const CAPACITY: usize> Clone for Iter<'_, T, CAPACITY> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool,
            slots: self.slots.clone(),
        }
    }
}

impl<T, const CAPACITY: usize> fmt::Debug for Iter<'_, T, CAPACITY> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

/// Renders the free slot indices of a [`SlotList`], returned by [`SlotList::free_slots()`].
pub struct FreeSlots<'a, T, const CAPACITY: usize> {
    pool: &'a SlotPool<T, CAPACITY>,
}

impl<T, const CAPACITY: usize> fmt::Display for FreeSlots<'_, T, CAPACITY> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pool.is_full() {
            f.write_str("List is full. No free nodes.")
        } else {
            write!(f, "Free nodes: {}", self.pool.free_indices().format(", "))
        }
    }
}

impl<T, const CAPACITY: usize> fmt::Debug for FreeSlots<'_, T, CAPACITY> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.pool.free_indices()).finish()
    }
}
