use std::any::type_name;
use std::fmt;
use std::iter::FusedIterator;
use std::{array, mem};

use crate::{Error, Result};

/// The backing storage of a [`SlotList`][crate::SlotList]: a fixed array of `CAPACITY` slots,
/// each holding an optional payload and the index of the next slot in whatever chain the
/// slot currently belongs to.
///
/// Unused slots are threaded into an intrusive free list. [`acquire()`][1] pops the most
/// recently released slot and [`release()`][2] pushes a slot back, both in constant time.
///
/// The pool has no notion of the order of slots that are in use. The client that acquired a
/// slot owns it, links it into its own chain via [`write_next()`][3] and is responsible for
/// only touching slots it currently owns. The accessors do not check ownership.
///
/// # Examples
///
/// ```
/// use slot_list::SlotPool;
///
/// let mut pool = SlotPool::<&str, 3>::new();
///
/// let a = pool.acquire().unwrap();
/// let b = pool.acquire().unwrap();
/// pool.write(a, "alpha", Some(b));
/// pool.write(b, "beta", None);
///
/// let values: Vec<_> = pool.chain_from(Some(a)).map(|index| *pool.read(index)).collect();
/// assert_eq!(values, ["alpha", "beta"]);
///
/// assert_eq!(pool.release(a), Ok(Some("alpha")));
/// assert_eq!(pool.free_indices().collect::<Vec<_>>(), [a, 2]);
/// ```
///
/// [1]: Self::acquire
/// [2]: Self::release
/// [3]: Self::write_next
#[derive(Debug)]
pub struct SlotPool<T, const CAPACITY: usize> {
    slots: [Slot<T>; CAPACITY],

    /// Index of the next free slot. Think of this as a stack of the most recently released
    /// slots, with the stack entries stored in the slots themselves. `None` if every slot
    /// is in use.
    free_head: Option<usize>,

    /// Number of slots on the free list.
    free_len: usize,
}

#[derive(Debug)]
struct Slot<T> {
    /// Only meaningful while the slot is in use. Released slots never hold a payload.
    payload: Option<T>,

    next: Option<usize>,
}

impl<T, const CAPACITY: usize> SlotPool<T, CAPACITY> {
    /// Creates a pool with every slot free, chained in index order `0, 1, ..., CAPACITY - 1`.
    ///
    /// # Panics
    ///
    /// Panics if `CAPACITY` is zero.
    #[must_use]
    pub fn new() -> Self {
        assert!(CAPACITY > 0, "SlotPool must have non-zero capacity");

        let slots = array::from_fn(|index: usize| Slot {
            payload: None,
            // The last slot terminates the free chain.
            next: index.checked_add(1).filter(|next| *next < CAPACITY),
        });

        Self {
            slots,
            free_head: Some(0),
            free_len: CAPACITY,
        }
    }

    /// The fixed number of slots in the pool.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        CAPACITY
    }

    /// Number of slots currently on the free list.
    #[must_use]
    pub fn free_len(&self) -> usize {
        self.free_len
    }

    /// Whether every slot is in use.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.free_head.is_none()
    }

    /// Takes the first slot off the free list and returns its index, or `None` if the pool
    /// is exhausted. The returned slot is disconnected: its `next` is `None` and it holds
    /// no payload until [`write()`][Self::write] is called.
    #[must_use]
    pub fn acquire(&mut self) -> Option<usize> {
        #[cfg(debug_assertions)]
        self.integrity_check();

        self.acquire_inner()
    }

    /// [`acquire()`][Self::acquire] without the debug integrity check, for callers that
    /// have just checked the pool themselves.
    pub(crate) fn acquire_inner(&mut self) -> Option<usize> {
        let index = self.free_head?;

        self.free_head = self.slot_mut(index).next.take();

        self.free_len = self
            .free_len
            .checked_sub(1)
            .expect("a slot was on the free list so the free count must be non-zero");

        Some(index)
    }

    /// Pushes the slot at `index` onto the front of the free list, returning the payload it
    /// held (if any).
    ///
    /// The caller must guarantee that the slot is currently in use. Releasing a slot twice
    /// corrupts the free list; this is not detected in release builds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIndex`] if `index` is out of bounds. The pool is not modified.
    pub fn release(&mut self, index: usize) -> Result<Option<T>> {
        if index >= CAPACITY {
            return Err(Error::InvalidIndex {
                index,
                capacity: CAPACITY,
            });
        }

        let free_head = self.free_head;

        let slot = self.slot_mut(index);
        let payload = slot.payload.take();
        slot.next = free_head;

        self.free_head = Some(index);

        self.free_len = self
            .free_len
            .checked_add(1)
            .expect("free count is bounded by capacity which is bounded by usize::MAX");

        Ok(payload)
    }

    /// Sets both the payload and the `next` link of the slot at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn write(&mut self, index: usize, payload: T, next: Option<usize>) {
        let slot = self.slot_mut(index);
        slot.payload = Some(payload);
        slot.next = next;
    }

    /// Replaces the payload of the slot at `index`, returning the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn write_payload(&mut self, index: usize, payload: T) -> Option<T> {
        self.slot_mut(index).payload.replace(payload)
    }

    /// Sets the `next` link of the slot at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn write_next(&mut self, index: usize, next: Option<usize>) {
        self.slot_mut(index).next = next;
    }

    /// The `next` link of the slot at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn read_next(&self, index: usize) -> Option<usize> {
        self.slot(index).next
    }

    /// The payload of the slot at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds or the slot holds no payload.
    #[must_use]
    pub fn read(&self, index: usize) -> &T {
        self.slot(index).payload.as_ref().unwrap_or_else(|| {
            panic!(
                "read({index}) slot holds no payload in pool of {}",
                type_name::<T>()
            )
        })
    }

    /// Exchanges the payloads of two slots, leaving their `next` links untouched.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn swap_payloads(&mut self, a: usize, b: usize) {
        if a == b {
            // Still validate the index.
            _ = self.slot(a);
            return;
        }

        let payload_a = self.slot_mut(a).payload.take();
        let payload_b = mem::replace(&mut self.slot_mut(b).payload, payload_a);
        self.slot_mut(a).payload = payload_b;
    }

    /// Indices of the free slots, in free list order (the next slot to be acquired first).
    #[must_use]
    pub fn free_indices(&self) -> ChainIndices<'_, T, CAPACITY> {
        self.chain_from(self.free_head)
    }

    /// Indices of the slots reached by following `next` links from `start`.
    ///
    /// The iterator visits at most `CAPACITY` slots, so it terminates even if the caller's
    /// chain is malformed.
    #[must_use]
    pub fn chain_from(&self, start: Option<usize>) -> ChainIndices<'_, T, CAPACITY> {
        ChainIndices {
            pool: self,
            next: start,
            remaining: CAPACITY,
        }
    }

    fn slot(&self, index: usize) -> &Slot<T> {
        self.slots.get(index).unwrap_or_else(|| {
            panic!(
                "slot {index} index out of bounds in pool of {CAPACITY} {}",
                type_name::<T>()
            )
        })
    }

    fn slot_mut(&mut self, index: usize) -> &mut Slot<T> {
        self.slots.get_mut(index).unwrap_or_else(|| {
            panic!(
                "slot {index} index out of bounds in pool of {CAPACITY} {}",
                type_name::<T>()
            )
        })
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    pub(crate) fn integrity_check(&self) {
        #[cfg(test)]
        INTEGRITY_CHECKS.with(|count| count.set(count.get().wrapping_add(1)));

        let mut observed_free = [false; CAPACITY];
        let mut observed_free_len: usize = 0;

        let mut current = self.free_head;

        while let Some(index) = current {
            let seen = observed_free.get_mut(index).unwrap_or_else(|| {
                panic!(
                    "free list points to out-of-bounds slot {index} in pool of {}",
                    type_name::<T>()
                )
            });

            assert!(
                !*seen,
                "free list visits slot {index} twice in pool of {}",
                type_name::<T>()
            );
            *seen = true;

            assert!(
                self.slot(index).payload.is_none(),
                "free slot {index} still holds a payload in pool of {}",
                type_name::<T>()
            );

            observed_free_len = observed_free_len
                .checked_add(1)
                .expect("bounded by capacity because every slot is visited at most once");

            current = self.slot(index).next;
        }

        assert!(
            self.free_len == observed_free_len,
            "self.free_len {} does not match the observed free list length {} in pool of {}",
            self.free_len,
            observed_free_len,
            type_name::<T>()
        );
    }
}

#[cfg(all(test, debug_assertions))]
thread_local! {
    /// Number of pool integrity checks run on the current thread.
    pub(crate) static INTEGRITY_CHECKS: std::cell::Cell<usize> =
        const { std::cell::Cell::new(0) };
}

impl<T, const CAPACITY: usize> Default for SlotPool<T, CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over slot indices in chain order, returned by [`SlotPool::free_indices()`] and
/// [`SlotPool::chain_from()`].
///
/// The iterator is cheap to clone, so a chain can be enumerated again from the same start.
pub struct ChainIndices<'a, T, const CAPACITY: usize> {
    pool: &'a SlotPool<T, CAPACITY>,
    next: Option<usize>,

    /// Steps left before we give up on a chain that does not terminate.
    remaining: usize,
}

impl<T, const CAPACITY: usize> Iterator for ChainIndices<'_, T, CAPACITY> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;

        let Some(remaining) = self.remaining.checked_sub(1) else {
            self.next = None;
            return None;
        };
        self.remaining = remaining;

        self.next = self.pool.read_next(index);
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            Some(_) => (usize::from(self.remaining > 0), Some(self.remaining)),
            None => (0, Some(0)),
        }
    }
}

impl<T, const CAPACITY: usize> FusedIterator for ChainIndices<'_, T, CAPACITY> {}

impl<T, const CAPACITY: usize> Clone for ChainIndices<'_, T, CAPACITY> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool,
            next: self.next,
            remaining: self.remaining,
        }
    }
}

impl<T, const CAPACITY: usize> fmt::Debug for ChainIndices<'_, T, CAPACITY> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainIndices")
            .field("next", &self.next)
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}
