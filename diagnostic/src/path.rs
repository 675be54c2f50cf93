use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// Location of a diagnostic inside a (possibly nested) collection
#[derive(Debug, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DiagnosticPath(SmallVec<[DiagnosticPathSegment; 4]>);

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum DiagnosticPathSegment {
    Index(i64),
    MapKey(Cow<'static, str>),
}

impl DiagnosticPath {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: impl Into<DiagnosticPathSegment>) {
        self.0.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<DiagnosticPathSegment> {
        self.0.pop()
    }

    pub fn segments(&self) -> &[DiagnosticPathSegment] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &DiagnosticPath) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl From<i64> for DiagnosticPathSegment {
    fn from(value: i64) -> Self {
        Self::Index(value)
    }
}

impl From<&'static str> for DiagnosticPathSegment {
    fn from(value: &'static str) -> Self {
        Self::MapKey(Cow::Borrowed(value))
    }
}

impl From<String> for DiagnosticPathSegment {
    fn from(value: String) -> Self {
        Self::MapKey(Cow::Owned(value))
    }
}

impl Display for DiagnosticPathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticPathSegment::Index(idx) => write!(f, "[{idx}]"),
            DiagnosticPathSegment::MapKey(key) => write!(f, "[\"{key}\"]"),
        }
    }
}

impl Display for DiagnosticPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "$");
        }
        for segment in &self.0 {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}
