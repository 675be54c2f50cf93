use crate::{Countable, Indexable, Iterable};
use std::hash::{BuildHasher, Hash};

#[allow(clippy::disallowed_types)]
impl<K, V, H> Iterable for ordermap::OrderMap<K, V, H> {
    type Item<'a> = (&'a K, &'a V) where Self: 'a;

    fn iter<'a>(&'a self) -> impl Iterator<Item = Self::Item<'a>> {
        ordermap::OrderMap::iter(self)
    }
}

#[allow(clippy::disallowed_types)]
impl<K, V, H> Countable for ordermap::OrderMap<K, V, H> {
    fn count(&self) -> usize {
        self.len()
    }

    fn is_empty(&self) -> bool {
        ordermap::OrderMap::is_empty(self)
    }
}

#[allow(clippy::disallowed_types)]
impl<K: Hash + Eq, V, H: BuildHasher> Indexable<K> for ordermap::OrderMap<K, V, H> {
    type Output = V;

    fn offset_exists(&self, index: &K) -> bool {
        self.contains_key(index)
    }

    fn offset_get(&self, index: &K) -> Option<&V> {
        self.get(index)
    }

    fn offset_set(&mut self, index: K, value: V) {
        self.insert(index, value);
    }

    fn offset_unset(&mut self, index: &K) -> Option<V> {
        self.remove(index)
    }
}
