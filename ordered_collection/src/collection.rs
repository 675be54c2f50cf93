use crate::collection::cursor::Cursor;
use crate::error::CollectionError;
use crate::key::Key;
use collection_traits::{Appendable, Countable, Indexable, Iterable};
use itertools::Itertools;
use std::cell::Cell;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Index;
use tracing::trace;
use utils::map::{order_map_with_capacity, OrderMap};

pub mod cursor;
mod sort;
mod transform;

pub type Iter<'a, V> = ordermap::map::Iter<'a, Key, V>;
pub type IntoIter<V> = ordermap::map::IntoIter<Key, V>;

/// Insertion-ordered key/value collection
///
/// Keys are unique; overwriting a key keeps its position. Appending picks
/// the integer key after the highest integer key present.
pub struct Collection<V> {
    entries: OrderMap<Key, V>,
    /// Highest integer key present, drives [Collection::push]
    max_int_key: Option<i64>,
    size: Cell<Option<usize>>,
    cursor: Cursor,
}

impl<V> Collection<V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: order_map_with_capacity(capacity),
            max_int_key: None,
            size: Cell::new(None),
            cursor: Cursor::default(),
        }
    }

    /// Imports a plain list, keyed `0..n`
    pub fn from_values(values: impl IntoIterator<Item = V>) -> Self {
        let mut collection = Self::new();
        for value in values {
            collection.push(value);
        }
        collection
    }

    /// Imports ordered key/value pairs. Repeated keys keep the position of
    /// their first occurrence and the value of their last.
    pub fn from_pairs<K: Into<Key>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        let mut collection = Self::new();
        for (key, value) in pairs {
            collection.set(key, value);
        }
        collection
    }

    pub fn type_name() -> &'static str {
        "collection"
    }

    /// Number of entries. Memoized until the next insertion or removal.
    pub fn count(&self) -> usize {
        if let Some(size) = self.size.get() {
            return size;
        }
        let size = self.entries.len();
        self.size.set(Some(size));
        size
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts or overwrites the value at `key`
    pub fn set(&mut self, key: impl Into<Key>, value: V) -> &mut Self {
        self.insert_entry(key.into(), value);
        self
    }

    /// Array-style assignment: `None` appends, `Some` behaves like [Collection::set]
    pub fn offset_set(&mut self, key: Option<Key>, value: V) -> &mut Self {
        match key {
            None => {
                self.push(value);
            }
            Some(key) => {
                self.insert_entry(key, value);
            }
        }
        self
    }

    /// Appends `value` under the next free integer key and returns that key
    ///
    /// # Panics
    /// If the collection already holds the key `i64::MAX`
    pub fn push(&mut self, value: V) -> Key {
        let key = Key::Int(
            self.next_int_key()
                .expect("next integer key is already occupied"),
        );
        self.insert_entry(key, value);
        key
    }

    /// Integer key [Collection::push] would use, `None` if it would overflow
    pub fn next_int_key(&self) -> Option<i64> {
        match self.max_int_key {
            None => Some(0),
            Some(max) => max.checked_add(1),
        }
    }

    pub fn get(&self, key: impl Into<Key>) -> Option<&V> {
        self.entries.get(&key.into())
    }

    /// Value at `key`, or `default` if there is none
    pub fn get_or<'a>(&'a self, key: impl Into<Key>, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    pub fn try_get(&self, key: impl Into<Key>) -> Result<&V, CollectionError> {
        let key = key.into();
        self.entries
            .get(&key)
            .ok_or(CollectionError::KeyNotFound(key))
    }

    /// Mutable access to a single value. Resets the cursor like every other
    /// mutation, even if the value is left unchanged.
    pub fn get_mut(&mut self, key: impl Into<Key>) -> Option<&mut V> {
        self.cursor.reset();
        self.entries.get_mut(&key.into())
    }

    pub fn exists(&self, key: impl Into<Key>) -> bool {
        self.entries.contains_key(&key.into())
    }

    /// Whether every one of `keys` is present. Vacuously true for no keys.
    pub fn exists_all<K: Into<Key>>(&self, keys: impl IntoIterator<Item = K>) -> bool {
        keys.into_iter().all(|key| self.exists(key))
    }

    /// Removes `key`, returning its value
    pub fn remove(&mut self, key: impl Into<Key>) -> Option<V> {
        let key = key.into();
        let removed = self.entries.remove(&key)?;
        self.after_removal(key);
        Some(removed)
    }

    /// Removes `key` if present. Missing keys are not an error.
    pub fn delete(&mut self, key: impl Into<Key>) -> &mut Self {
        self.remove(key);
        self
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.max_int_key = None;
        self.invalidate(true);
    }

    pub fn iter(&self) -> Iter<'_, V> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &Key> + ExactSizeIterator {
        self.entries.keys()
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.entries.values()
    }

    /// Exports the entries as ordered key/value pairs
    pub fn to_array(&self) -> Vec<(Key, V)>
    where
        V: Clone,
    {
        self.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    pub fn into_array(self) -> Vec<(Key, V)> {
        self.entries.into_iter().collect()
    }

    pub(crate) fn insert_entry(&mut self, key: Key, value: V) -> Option<V> {
        if let Key::Int(i) = key {
            self.max_int_key = Some(self.max_int_key.map_or(i, |max| max.max(i)));
        }
        let previous = self.entries.insert(key, value);
        self.invalidate(previous.is_none());
        previous
    }

    pub(crate) fn after_removal(&mut self, key: Key) {
        if key.as_int().is_some() && key.as_int() == self.max_int_key {
            self.max_int_key = self.entries.keys().filter_map(Key::as_int).max();
        }
        self.invalidate(true);
    }

    /// Drops state derived from the entry layout. `resized` also drops the
    /// memoized size.
    pub(crate) fn invalidate(&mut self, resized: bool) {
        if resized && self.size.take().is_some() {
            trace!("collection size cache invalidated");
        }
        self.cursor.reset();
    }

    /// Rebuilds the entries in place, renumbering integer keys from zero.
    /// String keys are kept.
    pub(crate) fn renumber(&mut self) {
        let entries = std::mem::take(&mut self.entries);
        self.max_int_key = None;
        for (key, value) in entries {
            match key {
                Key::Int(_) => {
                    self.push(value);
                }
                Key::Str(_) => {
                    self.insert_entry(key, value);
                }
            }
        }
        self.invalidate(true);
    }
}

impl<V> Default for Collection<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Clones share no cursor state: the clone starts before its first entry
impl<V: Clone> Clone for Collection<V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            max_int_key: self.max_int_key,
            size: self.size.clone(),
            cursor: Cursor::default(),
        }
    }
}

/// Order-sensitive equality of the entries. Cursor position is ignored.
impl<V: PartialEq> PartialEq for Collection<V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<V: Eq> Eq for Collection<V> {}

impl<V: Debug> Debug for Collection<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<V: Display> Display for Collection<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}]",
            self.iter().map(|(k, v)| format!("{k}: {v}")).join(", ")
        )
    }
}

impl<K: Into<Key>, V> FromIterator<(K, V)> for Collection<V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

impl<K: Into<Key>, V> Extend<(K, V)> for Collection<V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<V> IntoIterator for Collection<V> {
    type Item = (Key, V);
    type IntoIter = IntoIter<V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a Collection<V> {
    type Item = (&'a Key, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// # Panics
/// If the key is missing. Use [Collection::get] for a non-panicking lookup.
impl<K: Into<Key>, V> Index<K> for Collection<V> {
    type Output = V;

    fn index(&self, key: K) -> &V {
        let key = key.into();
        self.entries
            .get(&key)
            .unwrap_or_else(|| panic!("key `{key}` does not exist"))
    }
}

impl<V> Countable for Collection<V> {
    fn count(&self) -> usize {
        Collection::count(self)
    }

    fn is_empty(&self) -> bool {
        Collection::is_empty(self)
    }
}

impl<V> Iterable for Collection<V> {
    type Item<'a> = (&'a Key, &'a V) where Self: 'a;

    fn iter<'a>(&'a self) -> impl Iterator<Item = Self::Item<'a>> {
        Collection::iter(self)
    }
}

impl<V> Indexable<Key> for Collection<V> {
    type Output = V;

    fn offset_exists(&self, index: &Key) -> bool {
        self.exists(*index)
    }

    fn offset_get(&self, index: &Key) -> Option<&V> {
        self.get(*index)
    }

    fn offset_set(&mut self, index: Key, value: V) {
        self.set(index, value);
    }

    fn offset_unset(&mut self, index: &Key) -> Option<V> {
        self.remove(*index)
    }
}

impl<V> Appendable for Collection<V> {
    type Item = V;
    type Index = Key;

    fn append(&mut self, item: V) -> Key {
        self.push(item)
    }
}
