use thiserror::Error;

/// Errors that can occur when operating on a [`SlotList`][crate::SlotList] or its
/// [`SlotPool`][crate::SlotPool].
///
/// A failed operation never leaves the list partially modified.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Every slot of the pool is in use and the caller did not allow the first element
    /// to be evicted to make room.
    #[error("all {capacity} slots are in use")]
    CapacityExhausted {
        /// The fixed capacity of the pool that ran out of slots.
        capacity: usize,
    },

    /// The position is outside the pool capacity or beyond the end of the list.
    #[error("position {position} is out of range")]
    InvalidPosition {
        /// The logical position the caller asked for.
        position: usize,
    },

    /// The value used to locate the insertion or removal point is not in the list.
    #[error("target value is not in the list")]
    TargetNotFound,

    /// The element to remove does not exist: there is nothing before the first element,
    /// nothing after the last element and nothing at or past the tail.
    #[error("no element exists at the requested place in the list")]
    NoSuchNeighbor,

    /// A raw slot index outside the pool bounds was passed to the pool.
    #[error("slot index {index} is out of bounds for a pool of {capacity} slots")]
    InvalidIndex {
        /// The offending raw index.
        index: usize,

        /// The fixed capacity of the pool.
        capacity: usize,
    },
}

/// A specialized `Result` type for slot list operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
