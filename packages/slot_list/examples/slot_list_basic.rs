//! Basic usage of `SlotList`: positional and value-keyed editing, forced insertion into a
//! full list and sorting, with `tracing` output showing evictions.

use slot_list::{Error, SlotList, WhenFull};
use tracing::Level;

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    let mut list = SlotList::<i32, 5>::new();

    for (position, value) in [8, 3, 5].into_iter().enumerate() {
        list.insert_at(value, position, WhenFull::Reject)?;
    }
    println!("List contents: {list}");
    println!("{}", list.free_slots());

    list.insert_before(1, &8, WhenFull::Reject)?;
    list.insert_after(9, &5, WhenFull::Reject)?;
    println!("List contents: {list}");
    println!("{}", list.free_slots());

    // The list is full now.
    match list.insert_at(7, 2, WhenFull::Reject) {
        Ok(()) => println!("Inserted 7."),
        Err(error) => println!("Insertion failed: {error}"),
    }

    // Forcing the insertion evicts the first element to make room.
    list.insert_at(7, 2, WhenFull::EvictFirst)?;
    println!("After forced insert: {list}");

    list.sort();
    println!("Sorted: {list}");

    match list.search(&7) {
        Some(position) => println!("Found 7 at position {position}"),
        None => println!("7 not found"),
    }

    let removed = list.remove_at(0)?;
    println!("Removed {removed}, list size is now {}", list.len());
    println!("{}", list.free_slots());

    Ok(())
}
