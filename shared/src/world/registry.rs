use std::collections::{hash_map, HashMap};

use log::{debug, trace};

use crate::address::NetAddress;

/// Live instances of one entity kind, keyed by address.
///
/// Registration is the only way an instance becomes reachable by inbound
/// updates. Both `register` on a taken address and `unregister` on a free
/// one leave the registry untouched.
pub struct EntityRegistry<A: NetAddress, T> {
    inner: HashMap<A, T>,
}

impl<A: NetAddress, T> Default for EntityRegistry<A, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: NetAddress, T> EntityRegistry<A, T> {
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    /// Returns false, keeping the existing instance, if `address` is taken
    pub fn register(&mut self, address: A, instance: T) -> bool {
        match self.inner.entry(address) {
            hash_map::Entry::Occupied(_) => {
                debug!("address {:?} already registered, keeping first instance", address);
                false
            }
            hash_map::Entry::Vacant(entry) => {
                entry.insert(instance);
                true
            }
        }
    }

    pub fn unregister(&mut self, address: &A) -> Option<T> {
        let removed = self.inner.remove(address);
        if removed.is_none() {
            trace!("unregister of unknown address {:?}", address);
        }
        removed
    }

    pub fn get(&self, address: &A) -> Option<&T> {
        self.inner.get(address)
    }

    pub fn get_mut(&mut self, address: &A) -> Option<&mut T> {
        self.inner.get_mut(address)
    }

    pub fn contains(&self, address: &A) -> bool {
        self.inner.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, A, T> {
        self.inner.iter()
    }

    pub fn iter_mut(&mut self) -> hash_map::IterMut<'_, A, T> {
        self.inner.iter_mut()
    }

    pub fn addresses(&self) -> Vec<A> {
        self.inner.keys().copied().collect()
    }

    /// Drops every instance, returning how many there were
    pub fn clear_all(&mut self) -> usize {
        self.clear_all_with(|_, _| {})
    }

    /// Hands every instance to `destroy`, then leaves the registry empty
    pub fn clear_all_with<F: FnMut(A, T)>(&mut self, mut destroy: F) -> usize {
        let count = self.inner.len();
        for (address, instance) in self.inner.drain() {
            destroy(address, instance);
        }
        count
    }
}
