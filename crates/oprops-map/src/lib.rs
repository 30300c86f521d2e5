//! Ordered map backing an ordered properties store.
//!
//! An [`OrderedMap`] maps string keys to optional string values and iterates
//! in one of two well-defined orders:
//!
//! - **Insertion order** (default): the order in which keys were first added.
//!   Re-inserting an existing key keeps its position.
//! - **Comparator order**: the total order induced by a [`KeyComparator`].
//!   Keys that the comparator reports as equal are the same key.
//!
//! A value of `None` is a null-like value: the key is present but reads as
//! unset.
//!
//! # Modules
//!
//! - [`comparator`]: [`KeyComparator`], a shareable key ordering
//! - [`map`]: [`OrderedMap`] and its iterators

pub mod comparator;
pub mod map;

pub use comparator::KeyComparator;
pub use map::{Iter, Keys, OrderedMap};
