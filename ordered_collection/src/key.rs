use diagnostic::path::DiagnosticPathSegment;
use std::fmt::{Display, Formatter};
use std::num::TryFromIntError;
use strum::EnumIs;
use ustr::Ustr;

/// Key of a collection entry
///
/// Strings spelling a canonical decimal integer are stored as [Key::Int], so
/// `"7"` and `7` address the same entry while `"07"` stays a string key.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, EnumIs)]
pub enum Key {
    Int(i64),
    Str(Ustr),
}

impl Key {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(i) => Some(*i),
            Key::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Int(_) => None,
            Key::Str(s) => Some(s.as_str()),
        }
    }
}

/// Parses `s` as an integer key if it is written the way an integer would
/// print: no sign other than a leading `-`, no leading zeros, no `-0`
fn canonical_int(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let first = *digits.as_bytes().first()?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if first == b'0' && (digits.len() > 1 || digits.len() != s.len()) {
        return None;
    }
    s.parse().ok()
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        match canonical_int(value) {
            Some(i) => Key::Int(i),
            None => Key::Str(Ustr::from(value)),
        }
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::from(value.as_str())
    }
}

impl From<&String> for Key {
    fn from(value: &String) -> Self {
        Key::from(value.as_str())
    }
}

impl From<Ustr> for Key {
    fn from(value: Ustr) -> Self {
        match canonical_int(value.as_str()) {
            Some(i) => Key::Int(i),
            None => Key::Str(value),
        }
    }
}

impl From<&Key> for Key {
    fn from(value: &Key) -> Self {
        *value
    }
}

macro_rules! int_key {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Key {
                fn from(value: $ty) -> Self {
                    Key::Int(i64::from(value))
                }
            }
        )*
    };
}

int_key!(i8, i16, i32, i64, u8, u16, u32);

/// Fails for offsets past `i64::MAX` instead of aliasing an existing key
impl TryFrom<usize> for Key {
    type Error = TryFromIntError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        i64::try_from(value).map(Key::Int)
    }
}

impl From<bool> for Key {
    fn from(value: bool) -> Self {
        Key::Int(i64::from(value))
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{i}"),
            Key::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<Key> for DiagnosticPathSegment {
    fn from(value: Key) -> Self {
        match value {
            Key::Int(i) => DiagnosticPathSegment::Index(i),
            Key::Str(s) => DiagnosticPathSegment::MapKey(s.as_str().to_string().into()),
        }
    }
}

/// Values that can be used as keys, as required by [crate::Collection::flip]
pub trait KeyLike {
    /// Returns the key this value converts to, or `None` if it can't serve
    /// as a key
    fn to_key(&self) -> Option<Key>;

    /// Name of the value's type, used in conversion warnings
    fn kind_name(&self) -> &'static str;
}

impl KeyLike for Key {
    fn to_key(&self) -> Option<Key> {
        Some(*self)
    }

    fn kind_name(&self) -> &'static str {
        "Key"
    }
}

impl KeyLike for i64 {
    fn to_key(&self) -> Option<Key> {
        Some(Key::Int(*self))
    }

    fn kind_name(&self) -> &'static str {
        "Int"
    }
}

impl KeyLike for String {
    fn to_key(&self) -> Option<Key> {
        Some(Key::from(self.as_str()))
    }

    fn kind_name(&self) -> &'static str {
        "String"
    }
}
