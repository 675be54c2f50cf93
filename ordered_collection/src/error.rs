use crate::key::Key;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CollectionError {
    #[error("key `{0}` does not exist")]
    #[diagnostic(code(collection::key_not_found))]
    KeyNotFound(Key),
    #[error("invalid argument: {0}")]
    #[diagnostic(code(collection::invalid_argument))]
    InvalidArgument(String),
    #[error("nested collection at key `{key}` contains one of its ancestors")]
    #[diagnostic(
        code(collection::cyclic_structure),
        help("a collection can't be flattened or stripped while it contains itself")
    )]
    CyclicStructure { key: Key },
    #[error("nested collection at key `{key}` is mutably borrowed")]
    #[diagnostic(code(collection::nested_borrowed))]
    NestedBorrowed { key: Key },
    #[error(transparent)]
    #[diagnostic(code(collection::serialization))]
    Serialization(#[from] serde_json::Error),
}

impl CollectionError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Emitted by [crate::Collection::flip] for each value that can't become a
/// key. The offending entry is left out of the result.
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("can only flip integer and string values, got {found} at key `{key}`")]
#[diagnostic(code(collection::type_conversion), severity(Warning))]
pub struct TypeConversionWarning {
    pub key: Key,
    pub found: &'static str,
}
