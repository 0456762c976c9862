use std::collections::HashMap;
use std::hash::Hash;

/// An entity with a stable lookup key
pub trait Keyed {
    type Key: Clone + Eq + Hash + std::fmt::Debug;

    fn key(&self) -> Self::Key;
}

/// Ordered registry of every live entity of one kind
///
/// Insertion order is preserved and is the order entities are persisted in.
/// Lookup by key is O(1) average. Callers outside the crate only ever see
/// shared references.
#[derive(Debug, Clone)]
pub struct Extent<T: Keyed> {
    items: HashMap<T::Key, T>,
    order: Vec<T::Key>,
}

impl<T: Keyed> Default for Extent<T> {
    fn default() -> Self {
        Self {
            items: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: Keyed> Extent<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` unless its key is already registered
    ///
    /// Returns `false` when the key was present; the stored entity is kept.
    pub(crate) fn register(&mut self, item: T) -> bool {
        let key = item.key();
        if self.items.contains_key(&key) {
            return false;
        }
        self.order.push(key.clone());
        self.items.insert(key, item);
        true
    }

    pub(crate) fn remove(&mut self, key: &T::Key) -> Option<T> {
        let removed = self.items.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    /// Replace the contents wholesale; `None` empties the extent
    ///
    /// Later duplicates of a key are dropped, matching `register`.
    pub(crate) fn replace_all(&mut self, items: Option<Vec<T>>) {
        self.clear();
        for item in items.into_iter().flatten() {
            self.register(item);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
    }

    pub(crate) fn get_mut(&mut self, key: &T::Key) -> Option<&mut T> {
        self.items.get_mut(key)
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.values_mut()
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.items.get(key)
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.items.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys in insertion order
    pub fn keys(&self) -> &[T::Key] {
        &self.order
    }

    /// Read-only iteration in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(move |k| self.items.get(k))
    }

    /// Read-only view in insertion order
    pub fn all(&self) -> Vec<&T> {
        self.iter().collect()
    }

    /// Owned copies in insertion order, used when snapshotting
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}
