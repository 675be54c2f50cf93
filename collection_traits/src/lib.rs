#![forbid(clippy::unconditional_recursion)]

#[cfg(feature = "ordermap")]
pub mod order_map;
pub mod slice;
pub mod vec;

/// Containers that know how many elements they hold
pub trait Countable {
    fn count(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

pub trait Iterable {
    type Item<'a>
    where
        Self: 'a;

    fn iter<'a>(&'a self) -> impl Iterator<Item = Self::Item<'a>>;
}

/// Array-style offset access
///
/// Missing offsets are never an error: reads yield `None` and unsetting a
/// missing offset does nothing.
pub trait Indexable<Idx> {
    type Output;

    fn offset_exists(&self, index: &Idx) -> bool;
    fn offset_get(&self, index: &Idx) -> Option<&Self::Output>;
    fn offset_set(&mut self, index: Idx, value: Self::Output);
    fn offset_unset(&mut self, index: &Idx) -> Option<Self::Output>;
}

/// Containers that pick the offset of a new element themselves
pub trait Appendable {
    type Item;
    type Index;

    fn append(&mut self, item: Self::Item) -> Self::Index;
}
