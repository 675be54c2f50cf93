use crate::{Appendable, Countable, Iterable};

impl<T> Countable for Vec<T> {
    fn count(&self) -> usize {
        self.len()
    }

    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl<T> Iterable for Vec<T> {
    type Item<'a> = &'a T where Self: 'a;

    fn iter<'a>(&'a self) -> impl Iterator<Item = Self::Item<'a>> {
        self.as_slice().iter()
    }
}

impl<T> Appendable for Vec<T> {
    type Item = T;
    type Index = usize;

    fn append(&mut self, item: Self::Item) -> Self::Index {
        self.push(item);
        self.len() - 1
    }
}
