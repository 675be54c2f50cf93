use crate::{Countable, Iterable};

impl<T> Countable for [T] {
    fn count(&self) -> usize {
        self.len()
    }

    fn is_empty(&self) -> bool {
        <[T]>::is_empty(self)
    }
}

impl<T> Iterable for [T] {
    type Item<'a> = &'a T where Self: 'a;

    #[expect(clippy::needless_lifetimes)]
    fn iter<'a>(&'a self) -> impl Iterator<Item = Self::Item<'a>> {
        <[T]>::iter(self)
    }
}
