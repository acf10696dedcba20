/// What an insertion does when every slot of the list is already in use.
///
/// # Examples
///
/// ```
/// use slot_list::{SlotList, WhenFull};
///
/// let mut list = SlotList::<u32, 2>::new();
/// list.insert_at(1, 0, WhenFull::Reject).unwrap();
/// list.insert_at(2, 1, WhenFull::Reject).unwrap();
///
/// // The list is full, so a plain insertion fails and changes nothing.
/// assert!(list.insert_at(3, 1, WhenFull::Reject).is_err());
/// assert_eq!(list.to_string(), "1, 2");
///
/// // Evicting the first element makes room for the new one.
/// list.insert_at(3, 1, WhenFull::EvictFirst).unwrap();
/// assert_eq!(list.to_string(), "2, 3");
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum WhenFull {
    /// The insertion fails with [`Error::CapacityExhausted`][crate::Error::CapacityExhausted]
    /// and the list is left unchanged. This is the default.
    #[default]
    Reject,

    /// The first element of the list is evicted and its slot is reused for the new element.
    ///
    /// An insertion that uses this policy always succeeds once its position or target
    /// has been validated.
    EvictFirst,
}
