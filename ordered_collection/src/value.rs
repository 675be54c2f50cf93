use crate::collection::Collection;
use crate::key::{Key, KeyLike};
use ordered_float::OrderedFloat;
use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use strum::{EnumDiscriminants, EnumIs, IntoStaticStr};

mod shared;
pub(crate) mod visit;

pub use shared::SharedCollection;

pub type Number = OrderedFloat<f64>;

/// Dynamically typed collection value
///
/// Nested collections are held by [SharedCollection] handles, so cloning a
/// value never deep-copies nested data.
#[derive(Debug, Clone, Default, Eq, PartialEq, EnumDiscriminants, EnumIs)]
#[strum_discriminants(name(ValueKind), derive(Hash, Ord, PartialOrd, IntoStaticStr))]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(Number),
    String(String),
    Collection(SharedCollection),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        ValueKind::from(self)
    }

    /// Wraps `collection` into a fresh shared handle
    pub fn collection(collection: Collection<Value>) -> Self {
        Value::Collection(SharedCollection::new(collection))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&SharedCollection> {
        match self {
            Value::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// Numeric reading of numbers and numeric strings
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(f.0),
            Value::String(s) => parse_numeric(s),
            _ => None,
        }
    }

    /// Numeric coercion that never fails: null and non-numeric strings read
    /// as zero, booleans as 0/1, nested collections as their size
    pub fn to_f64_lossy(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Collection(c) => c.try_borrow().map(|c| c.count() as f64).unwrap_or(0.0),
            other => other.as_number().unwrap_or(0.0),
        }
    }

    /// String coercion used by string comparisons
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed(""),
            Value::Bool(true) => Cow::Borrowed("1"),
            Value::Bool(false) => Cow::Borrowed(""),
            Value::Int(i) => Cow::Owned(i.to_string()),
            Value::Float(f) => Cow::Owned(f.0.to_string()),
            Value::String(s) => Cow::Borrowed(s),
            Value::Collection(_) => Cow::Borrowed("Collection"),
        }
    }

    /// Arithmetic operand, `None` for nested collections
    pub(crate) fn to_numeric(&self) -> Option<Numeric> {
        let n = match self {
            Value::Null => Numeric::Int(0),
            Value::Bool(b) => Numeric::Int(i64::from(*b)),
            Value::Int(i) => Numeric::Int(*i),
            Value::Float(f) => Numeric::Float(f.0),
            Value::String(s) => match (s.trim().parse::<i64>(), parse_numeric(s)) {
                (Ok(i), _) => Numeric::Int(i),
                (Err(_), Some(f)) => Numeric::Float(f),
                (Err(_), None) => Numeric::Int(0),
            },
            Value::Collection(_) => return None,
        };
        Some(n)
    }
}

/// Parses a string that consists of a number and optional surrounding
/// whitespace. Words like `inf` or `NaN` are not numeric.
pub(crate) fn parse_numeric(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty()
        || !s
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    s.parse().ok()
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }
}

impl From<Numeric> for Value {
    fn from(value: Numeric) -> Self {
        match value {
            Numeric::Int(i) => Value::Int(i),
            Numeric::Float(f) => Value::Float(OrderedFloat(f)),
        }
    }
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

impl KeyLike for Value {
    fn to_key(&self) -> Option<Key> {
        match self {
            Value::Int(i) => Some(Key::Int(*i)),
            Value::String(s) => Some(Key::from(s.as_str())),
            _ => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        self.kind().name()
    }
}

impl From<Key> for Value {
    fn from(value: Key) -> Self {
        match value {
            Key::Int(i) => Value::Int(i),
            Key::Str(s) => Value::String(s.as_str().to_string()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! int_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

int_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(OrderedFloat(value))
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(OrderedFloat(f64::from(value)))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Collection<Value>> for Value {
    fn from(value: Collection<Value>) -> Self {
        Value::collection(value)
    }
}

impl From<SharedCollection> for Value {
    fn from(value: SharedCollection) -> Self {
        Value::Collection(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::collection(Collection::from_values(value.into_iter().map(Into::into)))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "\"{value}\""),
            Value::Collection(value) => write!(f, "{value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("12", Some(12.0))]
    #[case(" 1.5 ", Some(1.5))]
    #[case("-2e3", Some(-2000.0))]
    #[case("1e", None)]
    #[case("inf", None)]
    #[case("NaN", None)]
    #[case("12abc", None)]
    #[case("", None)]
    fn numeric_strings(#[case] raw: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_numeric(raw), expected);
    }

    #[rstest]
    #[case(Value::Null, 0.0)]
    #[case(Value::from(true), 1.0)]
    #[case(Value::from("3.5"), 3.5)]
    #[case(Value::from("abc"), 0.0)]
    #[case(Value::from(vec![1, 2, 3]), 3.0)]
    fn lossy_numbers(#[case] value: Value, #[case] expected: f64) {
        assert_eq!(value.to_f64_lossy(), expected);
    }

    #[test]
    fn only_ints_and_strings_are_keys() {
        assert_eq!(Value::from(3).to_key(), Some(Key::Int(3)));
        assert_eq!(Value::from("4").to_key(), Some(Key::Int(4)));
        assert_eq!(Value::from("a").to_key(), Some(Key::from("a")));
        assert_eq!(Value::from(1.5).to_key(), None);
        assert_eq!(Value::Null.to_key(), None);
        assert_eq!(Value::from(vec![1]).kind_name(), "Collection");
    }

    #[test]
    fn display_nests_collections() {
        let value = Value::from(vec![Value::from(1), Value::from("a"), Value::Null]);
        assert_eq!(value.to_string(), "[0: 1, 1: \"a\", 2: null]");
    }
}
