//! Handle-keyed sparse storage
//!
//! `HandleMap<T>` is a sparse array indexed by a handle's slot. Each entry
//! remembers the generation it was inserted under, so a stale handle whose
//! slot has been reused never reads the new occupant's data.

use super::handle::ActorHandle;

/// Sparse storage for one kind of per-actor data.
#[derive(Debug, Clone)]
pub struct HandleMap<T> {
    /// Sparse array indexed by handle.index()
    data: Vec<Option<(u32, T)>>,
}

impl<T> HandleMap<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    fn ensure_capacity(&mut self, index: usize) {
        if index >= self.data.len() {
            self.data.resize_with(index + 1, || None);
        }
    }

    /// Insert a value for a handle.
    /// Replaces whatever occupied the slot, stale or not.
    pub fn insert(&mut self, handle: ActorHandle, value: T) {
        let idx = handle.index() as usize;
        self.ensure_capacity(idx);
        self.data[idx] = Some((handle.generation(), value));
    }

    /// Remove the value of a handle, if the handle is current.
    pub fn remove(&mut self, handle: ActorHandle) -> Option<T> {
        let slot = self.data.get_mut(handle.index() as usize)?;
        match slot {
            Some((generation, _)) if *generation == handle.generation() => {
                slot.take().map(|(_, value)| value)
            }
            _ => None,
        }
    }

    pub fn get(&self, handle: ActorHandle) -> Option<&T> {
        match self.data.get(handle.index() as usize) {
            Some(Some((generation, value))) if *generation == handle.generation() => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: ActorHandle) -> Option<&mut T> {
        match self.data.get_mut(handle.index() as usize) {
            Some(Some((generation, value))) if *generation == handle.generation() => Some(value),
            _ => None,
        }
    }

    pub fn contains(&self, handle: ActorHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Iterate over all (handle, value) pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ActorHandle, &T)> {
        self.data.iter().enumerate().filter_map(|(idx, slot)| {
            slot.as_ref()
                .map(|(generation, value)| (ActorHandle::new(idx as u32, *generation), value))
        })
    }

    pub fn clear(&mut self) {
        for slot in &mut self.data {
            *slot = None;
        }
    }

    /// Number of occupied slots.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|slot| slot.is_some()).count()
    }
}

impl<T> Default for HandleMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut map: HandleMap<i32> = HandleMap::new();
        let handle = ActorHandle::new(5, 0);

        map.insert(handle, 42);
        assert_eq!(map.get(handle), Some(&42));
        assert!(map.contains(handle));
        assert_eq!(map.count(), 1);
    }

    #[test]
    fn test_stale_generation_misses() {
        let mut map: HandleMap<&str> = HandleMap::new();
        let old = ActorHandle::new(2, 0);
        let new = ActorHandle::new(2, 1);

        map.insert(new, "door");
        assert_eq!(map.get(old), None);
        assert_eq!(map.remove(old), None);
        assert_eq!(map.get(new), Some(&"door"));
    }

    #[test]
    fn test_remove_and_iter() {
        let mut map: HandleMap<u8> = HandleMap::new();
        map.insert(ActorHandle::new(0, 0), 1);
        map.insert(ActorHandle::new(3, 2), 2);

        let seen: Vec<_> = map.iter().map(|(h, v)| (h.index(), h.generation(), *v)).collect();
        assert_eq!(seen, vec![(0, 0, 1), (3, 2, 2)]);

        assert_eq!(map.remove(ActorHandle::new(3, 2)), Some(2));
        assert_eq!(map.count(), 1);
        map.clear();
        assert_eq!(map.count(), 0);
    }
}
