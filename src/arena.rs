use crate::handle::Handle;

/// Slot storage for tree nodes.
///
/// Freed slots are recycled by later allocations, so a stale [`Handle`] may alias a newer node.
/// The tree never keeps a handle to a node after taking it.
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    vacant: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Arena {
            slots: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Number of occupied slots.
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }

    pub(crate) fn insert(&mut self, item: T) -> Handle {
        match self.vacant.pop() {
            Some(handle) => {
                let slot = &mut self.slots[handle.to_index()];
                debug_assert!(slot.is_none(), "vacant slot is occupied");
                *slot = Some(item);
                handle
            }

            None => {
                assert!(
                    self.slots.len() <= Handle::MAX,
                    "`Arena::insert()` - arena is full ({} slots)",
                    Handle::MAX + 1
                );
                let handle = Handle::from_index(self.slots.len());
                self.slots.push(Some(item));
                handle
            }
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()]
            .as_ref()
            .expect("`Arena::get()` - slot is vacant")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()]
            .as_mut()
            .expect("`Arena::get_mut()` - slot is vacant")
    }

    /// Moves the item out of its slot and marks the slot for reuse.
    pub(crate) fn remove(&mut self, handle: Handle) -> T {
        let item = self.slots[handle.to_index()]
            .take()
            .expect("`Arena::remove()` - slot is vacant");
        self.vacant.push(handle);
        item
    }

    /// Forgets every slot. Items still present are dropped in slot order.
    pub(crate) fn reset(&mut self) {
        self.slots.clear();
        self.vacant.clear();
    }
}
