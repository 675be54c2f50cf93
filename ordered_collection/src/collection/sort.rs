use crate::collection::Collection;
use crate::error::CollectionError;
use crate::key::Key;
use crate::sort::{Comparable, SortOptions, SortOrder};
use std::cmp::Ordering;
use tracing::debug;

impl<V> Collection<V> {
    /// Stable in-place sort by value. Keys stay attached to their values.
    ///
    /// Options are validated before anything is reordered.
    pub fn sort(&mut self, options: SortOptions) -> Result<&mut Self, CollectionError>
    where
        V: Comparable,
    {
        options.validate()?;
        debug!(
            entries = self.count(),
            order = %options.order,
            comparison = %options.comparison,
            "sorting collection"
        );
        let SortOptions {
            order,
            comparison,
            case_insensitive,
        } = options;
        Ok(self.sort_by(|a, b| order.apply(a.compare(b, comparison, case_insensitive))))
    }

    /// Stable in-place sort with a caller supplied comparator
    pub fn sort_by(&mut self, mut cmp: impl FnMut(&V, &V) -> Ordering) -> &mut Self {
        self.entries.sort_by(|_, a, _, b| cmp(a, b));
        self.invalidate(false);
        self
    }

    /// Stable in-place sort by key. Integer keys order before string keys.
    pub fn sort_keys(&mut self, order: SortOrder) -> &mut Self {
        self.entries.sort_by(|a, _, b, _| order.apply(Key::cmp(a, b)));
        self.invalidate(false);
        self
    }
}
