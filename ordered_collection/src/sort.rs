use crate::error::CollectionError;
use crate::value::{parse_numeric, Value};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Deserializer};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::str::FromStr;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Orients an ascending comparison result
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = CollectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(CollectionError::invalid_argument(format!(
                "unknown sort order `{s}`, expected `ascending` or `descending`"
            ))),
        }
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "ascending"),
            SortOrder::Descending => write!(f, "descending"),
        }
    }
}

/// How two values are compared while sorting
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Comparison {
    /// Compare by type first, then by value
    #[default]
    Regular,
    /// Compare numeric readings, non-numeric values count as zero
    Numeric,
    /// Compare string readings byte by byte
    String,
}

impl FromStr for Comparison {
    type Err = CollectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "regular" => Ok(Comparison::Regular),
            "numeric" => Ok(Comparison::Numeric),
            "string" => Ok(Comparison::String),
            _ => Err(CollectionError::invalid_argument(format!(
                "unknown comparison `{s}`, expected `regular`, `numeric` or `string`"
            ))),
        }
    }
}

impl Display for Comparison {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Comparison::Regular => write!(f, "regular"),
            Comparison::Numeric => write!(f, "numeric"),
            Comparison::String => write!(f, "string"),
        }
    }
}

struct FromStrVisitor<T>(PhantomData<T>);

impl<T> serde::de::Visitor<'_> for FromStrVisitor<T>
where
    T: FromStr<Err = CollectionError>,
{
    type Value = T;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("a string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        T::from_str(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(FromStrVisitor(PhantomData))
    }
}

impl<'de> Deserialize<'de> for Comparison {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(FromStrVisitor(PhantomData))
    }
}

/// Sort configuration accepted by [crate::Collection::sort]
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct SortOptions {
    pub order: SortOrder,
    pub comparison: Comparison,
    /// Only meaningful together with [Comparison::String]
    pub case_insensitive: bool,
}

impl SortOptions {
    pub fn new(order: SortOrder) -> Self {
        Self {
            order,
            ..Default::default()
        }
    }

    pub fn ascending() -> Self {
        Self::new(SortOrder::Ascending)
    }

    pub fn descending() -> Self {
        Self::new(SortOrder::Descending)
    }

    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    pub fn validate(&self) -> Result<(), CollectionError> {
        if self.case_insensitive && self.comparison != Comparison::String {
            return Err(CollectionError::invalid_argument(format!(
                "case-insensitive sorting requires string comparison, got {}",
                self.comparison
            )));
        }
        Ok(())
    }
}

/// Values that [crate::Collection::sort] can order
///
/// Implementations must be a total order for every [Comparison].
pub trait Comparable {
    fn compare(&self, other: &Self, comparison: Comparison, case_insensitive: bool) -> Ordering;
}

fn compare_strings(a: &str, b: &str, case_insensitive: bool) -> Ordering {
    if case_insensitive {
        a.to_lowercase().cmp(&b.to_lowercase())
    } else {
        a.cmp(b)
    }
}

impl Comparable for Value {
    fn compare(&self, other: &Self, comparison: Comparison, case_insensitive: bool) -> Ordering {
        match comparison {
            Comparison::Regular => regular_rank(self).cmp(&regular_rank(other)),
            Comparison::Numeric => {
                OrderedFloat(self.to_f64_lossy()).cmp(&OrderedFloat(other.to_f64_lossy()))
            }
            Comparison::String => compare_strings(
                &self.to_string_lossy(),
                &other.to_string_lossy(),
                case_insensitive,
            ),
        }
    }
}

/// Sort key of regular comparison: values group by type (null, bool,
/// number, text, collection), numeric strings group with numbers
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd)]
enum RegularRank<'a> {
    Null,
    Bool(bool),
    Number(Number),
    Text(&'a str),
    Collection(usize),
}

/// Number that keeps integers exact, compared by mathematical value
#[derive(Debug, Copy, Clone)]
enum Number {
    Int(i64),
    Float(OrderedFloat<f64>),
}

impl Number {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().parse::<i64>() {
            Ok(i) => Some(Number::Int(i)),
            Err(_) => parse_numeric(s).map(|f| Number::Float(OrderedFloat(f))),
        }
    }
}

/// Exact ordering of an integer against a float. NaN sorts above every
/// integer, matching [OrderedFloat].
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() || f >= TWO_POW_63 {
        return Ordering::Less;
    }
    if f < -TWO_POW_63 {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    i.cmp(&(whole as i64))
        .then_with(|| 0.0_f64.partial_cmp(&(f - whole)).unwrap_or(Ordering::Equal))
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a.cmp(b),
            (Number::Float(a), Number::Float(b)) => a.cmp(b),
            (Number::Int(a), Number::Float(b)) => cmp_int_float(*a, b.0),
            (Number::Float(a), Number::Int(b)) => cmp_int_float(*b, a.0).reverse(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Number {}

fn regular_rank(value: &Value) -> RegularRank<'_> {
    match value {
        Value::Null => RegularRank::Null,
        Value::Bool(b) => RegularRank::Bool(*b),
        Value::Int(i) => RegularRank::Number(Number::Int(*i)),
        Value::Float(f) => RegularRank::Number(Number::Float(*f)),
        Value::String(s) => match Number::parse(s) {
            Some(n) => RegularRank::Number(n),
            None => RegularRank::Text(s),
        },
        Value::Collection(c) => {
            RegularRank::Collection(c.try_borrow().map(|c| c.count()).unwrap_or(0))
        }
    }
}

impl Comparable for i64 {
    fn compare(&self, other: &Self, comparison: Comparison, _: bool) -> Ordering {
        match comparison {
            Comparison::Regular | Comparison::Numeric => self.cmp(other),
            Comparison::String => self.to_string().cmp(&other.to_string()),
        }
    }
}

impl Comparable for f64 {
    fn compare(&self, other: &Self, comparison: Comparison, _: bool) -> Ordering {
        match comparison {
            Comparison::Regular | Comparison::Numeric => {
                OrderedFloat(*self).cmp(&OrderedFloat(*other))
            }
            Comparison::String => self.to_string().cmp(&other.to_string()),
        }
    }
}

impl Comparable for bool {
    fn compare(&self, other: &Self, _: Comparison, _: bool) -> Ordering {
        self.cmp(other)
    }
}

impl Comparable for String {
    fn compare(&self, other: &Self, comparison: Comparison, case_insensitive: bool) -> Ordering {
        match comparison {
            Comparison::Regular => {
                match (Number::parse(self), Number::parse(other)) {
                    (Some(a), Some(b)) => a.cmp(&b),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => self.cmp(other),
                }
            }
            Comparison::Numeric => {
                let number = |s: &str| OrderedFloat(parse_numeric(s).unwrap_or(0.0));
                number(self.as_str()).cmp(&number(other.as_str()))
            }
            Comparison::String => compare_strings(self, other, case_insensitive),
        }
    }
}
