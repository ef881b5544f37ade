/// Singly-linked ordered collection stored in an index arena.
///
/// New values become the logical head. Removal unlinks the first matching
/// node and keeps the relative order of everything else.
///
/// Nodes are addressed by stable [`NodeId`]s. While a walk is registered
/// (see [`crate::SharedList::for_each`]) an unlinked node stays behind as a
/// tombstone that still knows its successor, so a cursor parked on it can
/// move on to the next node that is still linked. Tombstone slots are only
/// recycled once every walk has finished.
///
/// Unlinked values are handed back to the caller rather than dropped here,
/// so a caller holding a lock can release it before running destructors.
use std::fmt;
use std::mem;

/// Stable address of a node inside an [`OrderedList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

enum Slot<T> {
    Linked { value: T, next: Option<NodeId> },
    Unlinked { next: Option<NodeId> },
    Vacant,
}

pub struct OrderedList<T> {
    slots: Vec<Slot<T>>,
    head: Option<NodeId>,
    len: usize,
    vacant: Vec<NodeId>,
    retired: Vec<NodeId>,
    walks: usize,
}

impl<T> OrderedList<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            head: None,
            len: 0,
            vacant: Vec::new(),
            retired: Vec::new(),
            walks: 0,
        }
    }

    /// Insert `value` as the new head. Duplicates are accepted.
    pub fn prepend(&mut self, value: T) -> NodeId {
        let slot = Slot::Linked { value, next: self.head };
        let id = match self.vacant.pop() {
            Some(id) => {
                self.slots[id.0] = slot;
                id
            }
            None => {
                self.slots.push(slot);
                NodeId(self.slots.len() - 1)
            }
        };
        self.head = Some(id);
        self.len += 1;
        id
    }

    /// Unlink the first node (from the head) whose value equals `item` and
    /// return its value.
    ///
    /// Returns `None` and leaves the list untouched when nothing matches.
    pub fn remove(&mut self, item: &T) -> Option<T>
    where
        T: PartialEq,
    {
        let mut prev: Option<NodeId> = None;
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let (matches, next) = match &self.slots[id.0] {
                Slot::Linked { value, next } => (value == item, *next),
                _ => break,
            };
            if matches {
                match prev {
                    Some(prev) => self.relink(prev, next),
                    None => self.head = next,
                }
                return self.unlink(id);
            }
            prev = Some(id);
            cursor = next;
        }
        None
    }

    /// Unlink every node and return the values, head to tail. Walks in
    /// progress end after their current node.
    pub fn clear(&mut self) -> Vec<T> {
        let mut values = Vec::with_capacity(self.len);
        let mut cursor = self.head.take();
        while let Some(id) = cursor {
            cursor = self.link_of(id);
            values.extend(self.unlink(id));
        }
        if self.walks == 0 {
            self.slots.clear();
            self.vacant.clear();
        }
        values
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    /// Call `callback` once per value, head to tail.
    pub fn for_each(&self, mut callback: impl FnMut(&T)) {
        for value in self.iter() {
            callback(value);
        }
    }

    /// Snapshot of the current contents in list order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    // -----------------------------------------------------------------------
    // Cursor primitives
    // -----------------------------------------------------------------------

    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    /// Value stored at `id`, or `None` if that node is no longer linked.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        match self.slots.get(id.0) {
            Some(Slot::Linked { value, .. }) => Some(value),
            _ => None,
        }
    }

    /// First still-linked node after `id`, passing over tombstones.
    ///
    /// `id` may itself be a tombstone: a node unlinked while a walk was
    /// parked on it.
    pub fn next_linked(&self, id: NodeId) -> Option<NodeId> {
        let mut cursor = self.link_of(id);
        while let Some(next) = cursor {
            match &self.slots[next.0] {
                Slot::Linked { .. } => return Some(next),
                Slot::Unlinked { next } => cursor = *next,
                Slot::Vacant => return None,
            }
        }
        None
    }

    /// Register a walk. Unlinked nodes are kept as tombstones until the
    /// matching `end_walk`.
    pub(crate) fn begin_walk(&mut self) {
        self.walks += 1;
    }

    pub fn is_walking(&self) -> bool {
        self.walks > 0
    }

    pub(crate) fn end_walk(&mut self) {
        debug_assert!(self.walks > 0, "end_walk without begin_walk");
        self.walks -= 1;
        if self.walks == 0 {
            for id in self.retired.drain(..) {
                self.slots[id.0] = Slot::Vacant;
                self.vacant.push(id);
            }
        }
    }

    fn link_of(&self, id: NodeId) -> Option<NodeId> {
        match self.slots.get(id.0) {
            Some(Slot::Linked { next, .. }) | Some(Slot::Unlinked { next }) => *next,
            _ => None,
        }
    }

    fn relink(&mut self, id: NodeId, to: Option<NodeId>) {
        if let Some(Slot::Linked { next, .. }) = self.slots.get_mut(id.0) {
            *next = to;
        }
    }

    fn unlink(&mut self, id: NodeId) -> Option<T> {
        let tombstone = if self.walks == 0 {
            Slot::Vacant
        } else {
            Slot::Unlinked {
                next: self.link_of(id),
            }
        };
        match mem::replace(&mut self.slots[id.0], tombstone) {
            Slot::Linked { value, .. } => {
                self.len -= 1;
                if self.walks == 0 {
                    self.vacant.push(id);
                } else {
                    self.retired.push(id);
                }
                Some(value)
            }
            other => {
                self.slots[id.0] = other;
                None
            }
        }
    }
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a OrderedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over an [`OrderedList`], head to tail.
pub struct Iter<'a, T> {
    list: &'a OrderedList<T>,
    cursor: Option<NodeId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        match &self.list.slots[id.0] {
            Slot::Linked { value, next } => {
                self.cursor = *next;
                Some(value)
            }
            _ => {
                self.cursor = None;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(values: &[u32]) -> OrderedList<u32> {
        let mut list = OrderedList::new();
        for v in values {
            list.prepend(*v);
        }
        list
    }

    #[test]
    fn test_prepend_puts_newest_first() {
        let list = list_of(&[1, 2, 3]);
        assert_eq!(list.to_vec(), vec![3, 2, 1]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_remove_head_middle_tail() {
        let mut list = list_of(&[1, 2, 3, 4]);
        assert_eq!(list.remove(&4), Some(4));
        assert_eq!(list.to_vec(), vec![3, 2, 1]);
        assert_eq!(list.remove(&2), Some(2));
        assert_eq!(list.to_vec(), vec![3, 1]);
        assert_eq!(list.remove(&1), Some(1));
        assert_eq!(list.to_vec(), vec![3]);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_remove_only_first_match() {
        let mut list = list_of(&[7, 1, 7]);
        assert_eq!(list.remove(&7), Some(7));
        assert_eq!(list.to_vec(), vec![1, 7]);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut list = list_of(&[1, 2]);
        assert_eq!(list.remove(&9), None);
        assert_eq!(list.to_vec(), vec![2, 1]);
        assert_eq!(list.len(), 2);

        let mut empty: OrderedList<u32> = OrderedList::new();
        assert_eq!(empty.remove(&1), None);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_len_matches_reachable_nodes() {
        let mut list = list_of(&[1, 2, 3, 4, 5]);
        list.remove(&3);
        list.remove(&5);
        list.prepend(6);
        assert_eq!(list.len(), list.iter().count());
    }

    #[test]
    fn test_slots_are_reused_without_walks() {
        let mut list = list_of(&[1, 2]);
        list.remove(&1);
        list.prepend(3);
        assert_eq!(list.slots.len(), 2);
        assert_eq!(list.to_vec(), vec![3, 2]);
    }

    #[test]
    fn test_clear() {
        let mut list = list_of(&[1, 2, 3]);
        assert_eq!(list.clear(), vec![3, 2, 1]);
        assert!(list.is_empty());
        assert_eq!(list.head(), None);
        list.prepend(4);
        assert_eq!(list.to_vec(), vec![4]);
    }

    #[test]
    fn test_for_each_visits_in_order() {
        let list = list_of(&[1, 2, 3]);
        let mut seen = Vec::new();
        list.for_each(|v| seen.push(*v));
        assert_eq!(seen, vec![3, 2, 1]);
    }

    #[test]
    fn test_cursor_skips_tombstones_during_walk() {
        let mut list = list_of(&[1, 2, 3, 4]);
        list.begin_walk();
        let first = list.head().unwrap();
        assert_eq!(list.get(first), Some(&4));

        // Park on 4, then unlink 4 and 3: the cursor must land on 2.
        list.remove(&4);
        list.remove(&3);
        assert_eq!(list.get(first), None);
        let next = list.next_linked(first).unwrap();
        assert_eq!(list.get(next), Some(&2));

        // Tombstones are not recycled while the walk is open.
        list.prepend(5);
        assert_eq!(list.slots.len(), 5);

        list.end_walk();
        list.prepend(6);
        list.prepend(7);
        assert_eq!(list.slots.len(), 5);
        assert_eq!(list.to_vec(), vec![7, 6, 5, 2, 1]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "end_walk without begin_walk")]
    fn test_unbalanced_end_walk_panics() {
        let mut list = list_of(&[1]);
        list.end_walk();
    }

    #[test]
    fn test_clear_during_walk_ends_cursor() {
        let mut list = list_of(&[1, 2, 3]);
        list.begin_walk();
        let first = list.head().unwrap();
        assert_eq!(list.clear(), vec![3, 2, 1]);
        assert_eq!(list.next_linked(first), None);
        assert_eq!(list.len(), 0);
        list.end_walk();
        assert!(list.retired.is_empty());
    }
}
