/// Lock-protected [`OrderedList`] that can be mutated from inside its own walk.
///
/// [`SharedList::for_each`] never holds the lock while the callback runs.
/// It follows live links one node at a time, so a callback may prepend to,
/// remove from, or clear the very list it is walking:
///
/// - removing the current node is safe and the walk carries on after it;
/// - a node unlinked before the walk reaches it is not visited;
/// - a node prepended during the walk is not visited by that walk.
use parking_lot::Mutex;

use crate::ordered::OrderedList;

pub struct SharedList<T> {
    inner: Mutex<OrderedList<T>>,
}

impl<T> SharedList<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(OrderedList::new()),
        }
    }

    pub fn prepend(&self, value: T) {
        self.inner.lock().prepend(value);
    }

    /// Unlink the first match and hand its value back. The value is dropped
    /// by the caller, after the list lock has been released.
    pub fn remove(&self, item: &T) -> Option<T>
    where
        T: PartialEq,
    {
        self.inner.lock().remove(item)
    }

    /// Unlink everything and hand the values back, head to tail.
    pub fn clear(&self) -> Vec<T> {
        self.inner.lock().clear()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.inner.lock().to_vec()
    }

    /// Walk the list head to tail, handing each value to `callback`.
    ///
    /// Stops at the first `Err` and returns it; the rest of the list is not
    /// visited.
    pub fn for_each<E>(&self, mut callback: impl FnMut(T) -> Result<(), E>) -> Result<(), E>
    where
        T: Clone,
    {
        let _walk = Walk::begin(&self.inner);

        let mut current = {
            let list = self.inner.lock();
            list.head()
                .and_then(|id| list.get(id).cloned().map(|value| (id, value)))
        };
        while let Some((id, value)) = current {
            callback(value)?;

            let list = self.inner.lock();
            current = list
                .next_linked(id)
                .and_then(|next| list.get(next).cloned().map(|value| (next, value)));
        }
        Ok(())
    }
}

impl<T> Default for SharedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for SharedList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&*self.inner.lock(), f)
    }
}

/// Keeps the walk registered until dropped, including on unwind.
struct Walk<'a, T> {
    list: &'a Mutex<OrderedList<T>>,
}

impl<'a, T> Walk<'a, T> {
    fn begin(list: &'a Mutex<OrderedList<T>>) -> Self {
        list.lock().begin_walk();
        Self { list }
    }
}

impl<T> Drop for Walk<'_, T> {
    fn drop(&mut self) {
        self.list.lock().end_walk();
    }
}
