#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A singly linked list stored in a fixed-capacity array of slots instead of individually
//! heap-allocated nodes.
//!
//! This package provides [`SlotList`], a list whose nodes are the slots of a [`SlotPool`]: a
//! fixed array of `CAPACITY` slots with an intrusive free list. Links between nodes are slot
//! indices, not pointers, and the memory footprint is fixed for the lifetime of the list.
//! Nothing is allocated after construction.
//!
//! # Features
//!
//! - **Fixed footprint**: capacity is a const generic parameter; the slots live inline.
//! - **Constant-time slot management**: acquiring and releasing a slot is O(1), with released
//!   slots reused most-recent-first.
//! - **Positional and value-keyed editing**: insert or remove by logical position, or relative
//!   to the first element equal to a target value.
//! - **Explicit exhaustion policy**: an insertion into a full list either fails or evicts the
//!   first element, as chosen per call via [`WhenFull`].
//! - **In-place sort**: ascending bubble sort that moves payloads, never links.
//!
//! # Example
//!
//! ```rust
//! use slot_list::{Error, SlotList, WhenFull};
//!
//! let mut list = SlotList::<i32, 3>::new();
//!
//! list.insert_at(5, 0, WhenFull::Reject)?;
//! assert_eq!(list.len(), 1);
//!
//! // Positions past the end of the list are not an append.
//! assert_eq!(
//!     list.insert_at(6, 5, WhenFull::Reject),
//!     Err(Error::InvalidPosition { position: 5 })
//! );
//!
//! list.insert_at(7, 1, WhenFull::Reject)?;
//! list.insert_before(6, &7, WhenFull::Reject)?;
//! assert_eq!(list.to_string(), "5, 6, 7");
//! assert_eq!(list.free_slots().to_string(), "List is full. No free nodes.");
//!
//! assert_eq!(list.remove_after(&5)?, 6);
//! assert_eq!(list.to_string(), "5, 7");
//! # Ok::<(), Error>(())
//! ```
//!
//! # Logging
//!
//! The package emits `tracing` events when an insertion is rejected or evicts an element.
//! It never installs a subscriber; that is up to the application.

mod error;
mod slot_list;
mod slot_pool;
mod when_full;

pub use error::*;
pub use slot_list::{FreeSlots, Iter, SlotList};
pub use slot_pool::{ChainIndices, SlotPool};
pub use when_full::*;
