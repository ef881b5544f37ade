//! `emitkit-list`: the ordered collection behind the emitkit registry.
//!
//! [`OrderedList`] is a most-recent-first singly-linked list kept in an
//! index arena. [`SharedList`] wraps it in a lock and adds a walk that stays
//! well defined while its own callbacks mutate the list.

pub mod ordered;
pub mod shared;

pub use ordered::{Iter, NodeId, OrderedList};
pub use shared::SharedList;
