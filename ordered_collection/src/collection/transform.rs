use crate::collection::Collection;
use crate::error::{CollectionError, TypeConversionWarning};
use crate::key::{Key, KeyLike};
use crate::value::{Numeric, SharedCollection, Value};
use diagnostic::context::DiagnosticContextMut;
use std::iter;
use tracing::{debug, warn};

impl<V> Collection<V> {
    /// Replaces every value with `func(value)`, in place. Keys are untouched.
    pub fn apply(&mut self, mut func: impl FnMut(&V) -> V) -> &mut Self {
        for value in self.entries.values_mut() {
            *value = func(&*value);
        }
        self.invalidate(false);
        self
    }

    /// [Collection::apply] with an extra argument handed to every call
    pub fn apply_with<A: ?Sized>(
        &mut self,
        args: &A,
        mut func: impl FnMut(&V, &A) -> V,
    ) -> &mut Self {
        self.apply(|value| func(value, args))
    }

    /// New collection with the values `func` accepts, under their original keys
    pub fn filter(&self, mut func: impl FnMut(&V) -> bool) -> Self
    where
        V: Clone,
    {
        let mut filtered = Collection::new();
        for (key, value) in self.iter() {
            if func(value) {
                filtered.insert_entry(*key, value.clone());
            }
        }
        debug!(
            kept = filtered.count(),
            dropped = self.count() - filtered.count(),
            "filtered collection"
        );
        filtered
    }

    /// [Collection::filter] with an extra argument handed to every call
    pub fn filter_with<A: ?Sized>(&self, args: &A, mut func: impl FnMut(&V, &A) -> bool) -> Self
    where
        V: Clone,
    {
        self.filter(|value| func(value, args))
    }

    /// New collection holding `func(key, value)` under each original key
    pub fn map<U>(&self, mut func: impl FnMut(&Key, &V) -> U) -> Collection<U> {
        let mut mapped = Collection::with_capacity(self.count());
        for (key, value) in self.iter() {
            mapped.insert_entry(*key, func(key, value));
        }
        mapped
    }

    pub fn first(&self) -> Option<&V> {
        self.entries.first().map(|(_, v)| v)
    }

    pub fn last(&self) -> Option<&V> {
        self.entries.last().map(|(_, v)| v)
    }

    /// First value in insertion order that `filter` accepts
    pub fn first_where(&self, mut filter: impl FnMut(&V) -> bool) -> Option<&V> {
        self.values().find(|v| filter(*v))
    }

    /// Last value in insertion order that `filter` accepts
    pub fn last_where(&self, mut filter: impl FnMut(&V) -> bool) -> Option<&V> {
        self.values().rev().find(|v| filter(*v))
    }

    /// New collection in reverse order. Keys travel with their values.
    pub fn reverse(&self) -> Self
    where
        V: Clone,
    {
        let mut reversed = self.clone();
        reversed.entries.reverse();
        reversed.invalidate(false);
        reversed
    }

    /// New collection with keys and values swapped
    ///
    /// When several entries hold the same value, the resulting key keeps the
    /// position of the first of them and the key of the last. Values that
    /// can't serve as keys are left out, with a [TypeConversionWarning]
    /// emitted into `diagnostics` at their key.
    pub fn flip(&self, diagnostics: &mut DiagnosticContextMut) -> Self
    where
        V: KeyLike + From<Key>,
    {
        let mut flipped = Collection::with_capacity(self.count());
        for (key, value) in self.iter() {
            match value.to_key() {
                Some(new_key) => {
                    flipped.insert_entry(new_key, V::from(*key));
                }
                None => {
                    let warning = TypeConversionWarning {
                        key: *key,
                        found: value.kind_name(),
                    };
                    warn!(%key, found = warning.found, "dropping value that can't be flipped");
                    diagnostics.enter(*key).emit_diagnostic(warning);
                }
            }
        }
        flipped
    }

    /// Removes and returns the last value
    pub fn pop(&mut self) -> Option<V> {
        let (key, value) = self.entries.pop()?;
        self.after_removal(key);
        Some(value)
    }

    /// Removes and returns the first value. Remaining integer keys are
    /// renumbered from zero.
    pub fn shift(&mut self) -> Option<V> {
        let first = *self.entries.first()?.0;
        let value = self.entries.remove(&first)?;
        self.after_removal(first);
        self.renumber();
        Some(value)
    }

    /// New collection with `value` appended under the next integer key
    pub fn append(&self, value: V) -> Self
    where
        V: Clone,
    {
        let mut appended = self.clone();
        appended.push(value);
        appended
    }

    /// New collection with `value` in front. Integer keys are renumbered
    /// from zero, string keys are kept.
    pub fn prepend(&self, value: V) -> Self
    where
        V: Clone,
    {
        let mut prepended = Collection::with_capacity(self.count() + 1);
        prepended.push(value);
        prepended.extend_renumbered(self);
        prepended
    }

    /// Concatenates this collection with `others`
    ///
    /// String keys from later collections overwrite earlier ones; integer
    /// keyed entries are all appended with fresh keys.
    pub fn merge<'a>(&'a self, others: impl IntoIterator<Item = &'a Collection<V>>) -> Self
    where
        V: Clone + 'a,
    {
        let mut merged = Collection::new();
        for collection in iter::once(self).chain(others) {
            merged.extend_renumbered(collection);
        }
        merged
    }

    /// Largest entry count [Collection::pad] will grow a collection to
    pub const MAX_PAD_SIZE: usize = 1 << 24;

    /// New collection padded with copies of `value` up to `size.abs()`
    /// entries
    ///
    /// A positive size pads at the end and keeps every existing key,
    /// integer keys included. A negative size pads in front and renumbers
    /// integer keys from zero. Sizes past [Collection::MAX_PAD_SIZE] are
    /// rejected.
    pub fn pad(&self, size: i64, value: V) -> Result<Self, CollectionError>
    where
        V: Clone,
    {
        let target = usize::try_from(size.unsigned_abs())
            .ok()
            .filter(|target| *target <= Self::MAX_PAD_SIZE)
            .ok_or_else(|| {
                CollectionError::invalid_argument(format!(
                    "pad size {size} exceeds the maximum of {}",
                    Self::MAX_PAD_SIZE
                ))
            })?;
        let missing = target.saturating_sub(self.count());
        if missing == 0 {
            return Ok(self.clone());
        }

        let padded = if size > 0 {
            let last_key = i64::try_from(missing - 1)
                .ok()
                .and_then(|offset| self.next_int_key()?.checked_add(offset));
            if last_key.is_none() {
                return Err(CollectionError::invalid_argument(format!(
                    "padding {missing} entries would overflow the integer keys"
                )));
            }
            let mut padded = self.clone();
            for _ in 0..missing {
                padded.push(value.clone());
            }
            padded
        } else {
            let mut padded = Collection::with_capacity(target);
            for _ in 0..missing {
                padded.push(value.clone());
            }
            padded.extend_renumbered(self);
            padded
        };
        Ok(padded)
    }

    fn extend_renumbered(&mut self, other: &Collection<V>)
    where
        V: Clone,
    {
        for (key, value) in other.iter() {
            match key {
                Key::Int(_) => {
                    self.push(value.clone());
                }
                Key::Str(_) => {
                    self.insert_entry(*key, value.clone());
                }
            }
        }
    }
}

impl Collection<Value> {
    /// Collects the leaf values of this collection and every nested
    /// collection, depth-first, into a fresh list keyed `0..n`
    ///
    /// Fails if a nested collection contains one of its ancestors.
    pub fn flatten(&self) -> Result<Collection<Value>, CollectionError> {
        let mut flat = Collection::new();
        let mut ancestors = vec![self as *const Self];
        self.flatten_into(&mut flat, &mut ancestors)?;
        debug!(leaves = flat.count(), "flattened collection");
        Ok(flat)
    }

    fn flatten_into(
        &self,
        flat: &mut Collection<Value>,
        ancestors: &mut Vec<*const Self>,
    ) -> Result<(), CollectionError> {
        for (key, value) in self.iter() {
            match value {
                Value::Collection(nested) => {
                    let inner = enter_nested(*key, nested, ancestors)?;
                    inner.flatten_into(flat, ancestors)?;
                    ancestors.pop();
                }
                leaf => {
                    flat.push(leaf.clone());
                }
            }
        }
        Ok(())
    }

    /// New collection with values renumbered `0..n`, string keys included.
    /// With `recursive`, nested collections are replaced by stripped copies.
    pub fn strip_keys(&self, recursive: bool) -> Result<Collection<Value>, CollectionError> {
        if !recursive {
            return Ok(Collection::from_values(self.values().cloned()));
        }
        let mut ancestors = vec![self as *const Self];
        self.strip_keys_recursive(&mut ancestors)
    }

    fn strip_keys_recursive(
        &self,
        ancestors: &mut Vec<*const Self>,
    ) -> Result<Collection<Value>, CollectionError> {
        let mut stripped = Collection::with_capacity(self.count());
        for (key, value) in self.iter() {
            let value = match value {
                Value::Collection(nested) => {
                    let inner = enter_nested(*key, nested, ancestors)?;
                    let copy = inner.strip_keys_recursive(ancestors)?;
                    ancestors.pop();
                    Value::collection(copy)
                }
                other => other.clone(),
            };
            stripped.push(value);
        }
        Ok(stripped)
    }

    /// Sum of all values, coerced to numbers. Nested collections are
    /// skipped. Stays an integer unless a float is involved or it overflows.
    pub fn sum(&self) -> Value {
        self.fold_numeric(0, i64::checked_add, |a, b| a + b)
    }

    /// Product of all values, see [Collection::sum] for the coercion rules
    pub fn product(&self) -> Value {
        self.fold_numeric(1, i64::checked_mul, |a, b| a * b)
    }

    fn fold_numeric(
        &self,
        init: i64,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> Value {
        let acc = self
            .values()
            .filter_map(Value::to_numeric)
            .fold(Numeric::Int(init), |acc, n| match (acc, n) {
                (Numeric::Int(a), Numeric::Int(b)) => int_op(a, b)
                    .map(Numeric::Int)
                    .unwrap_or_else(|| Numeric::Float(float_op(a as f64, b as f64))),
                (a, b) => Numeric::Float(float_op(a.as_f64(), b.as_f64())),
            });
        acc.into()
    }
}

/// Borrows a nested collection for a recursive walk, pushing it onto
/// `ancestors`. The caller pops it once done.
fn enter_nested<'a>(
    key: Key,
    nested: &'a SharedCollection,
    ancestors: &mut Vec<*const Collection<Value>>,
) -> Result<std::cell::Ref<'a, Collection<Value>>, CollectionError> {
    let ptr = nested.as_ptr();
    if ancestors.contains(&ptr) {
        return Err(CollectionError::CyclicStructure { key });
    }
    let inner = nested
        .try_borrow()
        .map_err(|_| CollectionError::NestedBorrowed { key })?;
    ancestors.push(ptr);
    Ok(inner)
}

#[cfg(test)]
mod tests {
    use crate::collection::Collection;
    use crate::{CollectionError, Key, SharedCollection, Value};
    use diagnostic::prelude::*;
    use rstest::rstest;

    fn numbers() -> Collection<i64> {
        Collection::from_values([1, 2, 3, 4, 5])
    }

    fn values<V: Clone>(c: &Collection<V>) -> Vec<V> {
        c.values().cloned().collect()
    }

    fn keys<V>(c: &Collection<V>) -> Vec<Key> {
        c.keys().copied().collect()
    }

    #[test]
    fn map_keeps_keys_and_source() {
        let c = numbers();
        let doubled = c.map(|_, x| x * 2);
        assert_eq!(values(&doubled), vec![2, 4, 6, 8, 10]);
        assert_eq!(keys(&doubled), keys(&c));
        assert_eq!(values(&c), vec![1, 2, 3, 4, 5]);

        let labels = c.map(|k, x| format!("{k}={x}"));
        assert_eq!(labels.get(4), Some(&"4=5".to_string()));
    }

    #[test]
    fn map_identity_is_equal() {
        let c = Collection::from_pairs([("a", 1), ("b", 2)]);
        assert_eq!(c.map(|_, v| *v), c);
    }

    #[test]
    fn filter_preserves_keys() {
        let c = numbers();
        let odd = c.filter(|x| x % 2 == 1);
        assert_eq!(values(&odd), vec![1, 3, 5]);
        assert_eq!(keys(&odd), vec![Key::Int(0), Key::Int(2), Key::Int(4)]);
        assert_eq!(c.count(), 5);
    }

    #[rstest]
    #[case(true, 5)]
    #[case(false, 0)]
    fn filter_constant_predicates(#[case] keep: bool, #[case] expected: usize) {
        let c = numbers();
        let filtered = c.filter(|_| keep);
        assert_eq!(filtered.count(), expected);
        if keep {
            assert_eq!(filtered, c);
        }
    }

    #[test]
    fn filter_with_arguments() {
        let c = numbers();
        let above = c.filter_with(&3, |x, min| x > min);
        assert_eq!(values(&above), vec![4, 5]);
    }

    #[test]
    fn apply_rewrites_in_place() {
        let mut c = Collection::from_pairs([("a", 1), ("b", 2)]);
        c.rewind();
        c.apply(|x| x * 10).apply_with(&1, |x, add| x + add);

        assert_eq!(values(&c), vec![11, 21]);
        assert_eq!(keys(&c), vec![Key::from("a"), Key::from("b")]);
        assert!(!c.valid());
    }

    #[test]
    fn first_and_last() {
        let c = Collection::from_values(["1", "2", "3", "foo", "bar", "4", "baz"]);
        assert_eq!(c.first(), Some(&"1"));
        assert_eq!(c.last(), Some(&"baz"));
        assert_eq!(c.first_where(|v| v.parse::<i32>().is_err()), Some(&"foo"));
        assert_eq!(c.last_where(|v| v.parse::<i32>().is_ok()), Some(&"4"));
        assert_eq!(
            *c.first_where(|v| *v == "invalid").unwrap_or(&"No Matches!"),
            "No Matches!"
        );

        let empty = Collection::<&str>::new();
        assert_eq!(*empty.first().unwrap_or(&"default"), "default");
        assert_eq!(empty.last(), None);
    }

    #[test]
    fn first_where_short_circuits() {
        let c = numbers();
        let mut calls = 0;
        assert_eq!(
            c.first_where(|x| {
                calls += 1;
                *x > 3
            }),
            Some(&4)
        );
        assert_eq!(calls, 4);
    }

    #[test]
    fn reverse_is_an_involution() {
        let c = Collection::from_pairs([
            (Key::Int(3), 'a'),
            (Key::from("x"), 'b'),
            (Key::Int(0), 'c'),
        ]);
        let reversed = c.reverse();
        assert_eq!(keys(&reversed), vec![Key::Int(0), Key::from("x"), Key::Int(3)]);
        assert_eq!(values(&reversed), vec!['c', 'b', 'a']);
        assert_eq!(reversed.reverse(), c);
    }

    #[test]
    fn flip_round_trips_unique_scalars() {
        let c = Collection::from_pairs([
            (Key::from("a"), Value::from(1)),
            (Key::from("b"), Value::from("x")),
            (Key::Int(7), Value::from("y")),
        ]);
        let mut ctx = DiagnosticContext::default();
        let mut diagnostics = ctx.enter("flip");

        let flipped = c.flip(&mut diagnostics);
        assert_eq!(flipped.get(1), Some(&Value::from("a")));
        assert_eq!(flipped.get("x"), Some(&Value::from("b")));
        assert_eq!(flipped.get("y"), Some(&Value::from(7)));

        assert_eq!(flipped.flip(&mut diagnostics), c);
        drop(diagnostics);
        assert!(!ctx.has_diagnostics(DiagnosticLevel::Warning));
    }

    #[test]
    fn flip_collisions_keep_last_key() {
        let c = Collection::from_values([10, 20, 10].map(Value::from));
        let mut ctx = DiagnosticContext::default();
        let flipped = c.flip(&mut ctx.enter("flip"));
        assert_eq!(
            flipped.to_array(),
            vec![(Key::Int(10), Value::from(2)), (Key::Int(20), Value::from(1))]
        );
    }

    #[test]
    fn flip_drops_non_scalars_with_warnings() {
        let c = Collection::from_values([
            Value::from("a"),
            Value::from(1.5),
            Value::Null,
            Value::from(vec![1]),
            Value::from(2),
        ]);
        let mut ctx = DiagnosticContext::default();
        let flipped = c.flip(&mut ctx.enter("flip"));

        assert_eq!(flipped.count(), 2);
        assert_eq!(flipped.get("a"), Some(&Value::from(0)));
        assert_eq!(flipped.get(2), Some(&Value::from(4)));

        assert_eq!(ctx.count("flip"), 3);
        assert!(ctx.has_diagnostics(DiagnosticLevel::Warning));
        assert!(!ctx.has_diagnostics(DiagnosticLevel::Error));

        let reports = &ctx.diagnostics["flip"];
        let mut at_one = DiagnosticPath::empty();
        at_one.push(1i64);
        assert_eq!(
            reports[&at_one][0].info.to_string(),
            "can only flip integer and string values, got Float at key `1`"
        );
    }

    #[test]
    fn flatten_renumbers_leaves_depth_first() {
        let inner = Collection::from_pairs([("x", Value::from(3)), ("y", Value::from(vec![4, 5]))]);
        let c = Collection::from_pairs([
            (Key::from("a"), Value::from(1)),
            (Key::from("b"), Value::from(vec![Value::from(2), Value::from(inner)])),
            (Key::from("c"), Value::from(Vec::<i32>::new())),
            (Key::from("d"), Value::from(6)),
        ]);

        let flat = c.flatten().expect("acyclic");
        assert_eq!(
            flat,
            Collection::from_values([1, 2, 3, 4, 5, 6].map(Value::from))
        );
        assert_eq!(c.count(), 4);
    }

    #[test]
    fn flatten_allows_shared_siblings() {
        let shared = SharedCollection::new(Collection::from_values([Value::from("s")]));
        let c = Collection::from_values([
            Value::Collection(shared.clone()),
            Value::Collection(shared),
        ]);
        assert_eq!(c.flatten().expect("shared but acyclic").count(), 2);
    }

    #[test]
    fn flatten_rejects_cycles() {
        let shared = SharedCollection::new(Collection::from_values([Value::from(1)]));
        let outer =
            SharedCollection::new(Collection::from_values([Value::Collection(shared.clone())]));
        shared
            .borrow_mut()
            .set("back", Value::Collection(outer.clone()));

        let err = outer.borrow().flatten().unwrap_err();
        assert!(
            matches!(err, CollectionError::CyclicStructure { key } if key == Key::from("back"))
        );

        let err = shared.borrow().strip_keys(true).unwrap_err();
        assert!(matches!(err, CollectionError::CyclicStructure { .. }));
    }

    #[test]
    fn flatten_reports_busy_nested_collections() {
        let shared = SharedCollection::default();
        let c = Collection::from_values([Value::Collection(shared.clone())]);
        let _guard = shared.borrow_mut();
        assert!(matches!(
            c.flatten(),
            Err(CollectionError::NestedBorrowed { key: Key::Int(0) })
        ));
    }

    #[test]
    fn strip_keys_recurses_on_request() {
        let nested = Collection::from_pairs([("k", Value::from(1))]);
        let c = Collection::from_pairs([
            ("a", Value::from("x")),
            ("b", Value::from(nested)),
        ]);

        let shallow = c.strip_keys(false).unwrap();
        assert_eq!(keys(&shallow), vec![Key::Int(0), Key::Int(1)]);
        let shallow_nested = shallow[1].as_collection().unwrap().borrow();
        assert!(shallow_nested.exists("k"));
        drop(shallow_nested);

        let deep = c.strip_keys(true).unwrap();
        let deep_nested = deep[1].as_collection().unwrap().borrow();
        assert_eq!(keys(&*deep_nested), vec![Key::Int(0)]);
    }

    #[test]
    fn pop_and_shift() {
        let mut c = Collection::from_pairs([
            (Key::Int(5), 'a'),
            (Key::from("s"), 'b'),
            (Key::Int(9), 'c'),
        ]);
        assert_eq!(c.pop(), Some('c'));
        assert_eq!(c.next_int_key(), Some(6));

        assert_eq!(c.shift(), Some('a'));
        assert_eq!(keys(&c), vec![Key::from("s")]);
        c.push('d');
        assert_eq!(keys(&c), vec![Key::from("s"), Key::Int(0)]);

        let mut empty = Collection::<u8>::new();
        assert_eq!(empty.pop(), None);
        assert_eq!(empty.shift(), None);
    }

    #[test]
    fn shift_renumbers_integer_keys() {
        let mut c = Collection::from_pairs([
            (Key::Int(4), 1),
            (Key::Int(8), 2),
            (Key::from("z"), 3),
            (Key::Int(9), 4),
        ]);
        assert_eq!(c.shift(), Some(1));
        assert_eq!(keys(&c), vec![Key::Int(0), Key::from("z"), Key::Int(1)]);
    }

    #[test]
    fn append_and_prepend_leave_source_alone() {
        let c = Collection::from_pairs([(Key::Int(3), 'a'), (Key::from("s"), 'b')]);

        let appended = c.append('z');
        assert_eq!(keys(&appended), vec![Key::Int(3), Key::from("s"), Key::Int(4)]);

        let prepended = c.prepend('z');
        assert_eq!(keys(&prepended), vec![Key::Int(0), Key::Int(1), Key::from("s")]);
        assert_eq!(values(&prepended), vec!['z', 'a', 'b']);

        assert_eq!(c.count(), 2);
    }

    #[test]
    fn merge_overwrites_strings_and_appends_integers() {
        let a = Collection::from_pairs([(Key::from("k"), 1), (Key::Int(5), 2)]);
        let b = Collection::from_pairs([(Key::Int(5), 3), (Key::from("k"), 4)]);

        let merged = a.merge([&b]);
        assert_eq!(
            merged.to_array(),
            vec![(Key::from("k"), 4), (Key::Int(0), 2), (Key::Int(1), 3)]
        );
    }

    #[rstest]
    #[case(5, vec![1, 2, 0, 0, 0])]
    #[case(-4, vec![0, 0, 1, 2])]
    #[case(2, vec![1, 2])]
    #[case(-1, vec![1, 2])]
    fn pad_to_size(#[case] size: i64, #[case] expected: Vec<i32>) {
        let c = Collection::from_values([1, 2]);
        let padded = c.pad(size, 0).unwrap();
        assert_eq!(values(&padded), expected);
        assert_eq!(
            keys(&padded),
            (0..expected.len() as i64).map(Key::Int).collect::<Vec<_>>()
        );
    }

    #[test]
    fn positive_pad_keeps_sparse_keys() {
        let c = Collection::from_pairs([(Key::Int(4), 'a'), (Key::from("s"), 'b')]);
        let padded = c.pad(3, 'z').unwrap();
        assert_eq!(keys(&padded), vec![Key::Int(4), Key::from("s"), Key::Int(5)]);
    }

    #[rstest]
    #[case(-(1 << 62))]
    #[case(1 << 62)]
    #[case(i64::MIN)]
    #[case(Collection::<i64>::MAX_PAD_SIZE as i64 + 1)]
    fn oversized_pad_is_rejected(#[case] size: i64) {
        let c = Collection::from_values([1i64]);
        let err = c.pad(size, 0).unwrap_err();
        assert!(matches!(err, CollectionError::InvalidArgument(_)));
        assert_eq!(c.count(), 1);
    }

    #[test]
    fn pad_rejects_integer_key_overflow() {
        let c = Collection::from_pairs([(i64::MAX - 1, 1i64)]);
        assert_eq!(c.pad(2, 0).unwrap().count(), 2);
        assert!(matches!(c.pad(3, 0), Err(CollectionError::InvalidArgument(_))));
    }

    #[rstest]
    #[case(vec![Value::from(1), Value::from(2), Value::from(3)], Value::from(6), Value::from(6))]
    #[case(vec![Value::from(1.5), Value::from("2")], Value::from(3.5), Value::from(3.0))]
    #[case(
        vec![Value::from(true), Value::from("abc"), Value::from(vec![9])],
        Value::from(1),
        Value::from(0)
    )]
    #[case(vec![], Value::from(0), Value::from(1))]
    #[case(
        vec![Value::from(i64::MAX), Value::from(1)],
        Value::from(i64::MAX as f64 + 1.0),
        Value::from(i64::MAX)
    )]
    fn numeric_folds(#[case] items: Vec<Value>, #[case] sum: Value, #[case] product: Value) {
        let c = Collection::from_values(items);
        assert_eq!(c.sum(), sum);
        assert_eq!(c.product(), product);
    }
}
