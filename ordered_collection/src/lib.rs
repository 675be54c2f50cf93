//! An insertion-ordered collection with stable keys, a stateful cursor and
//! functional-style transforms.
//!
//! Storage operations ([Collection::set], [Collection::delete],
//! [Collection::apply], [Collection::sort]) mutate in place. Every other
//! transform ([Collection::map], [Collection::filter], [Collection::reverse],
//! [Collection::flip], [Collection::flatten], ...) leaves the receiver
//! untouched and returns a new collection.

pub mod collection;
pub mod error;
pub mod key;
pub mod serialization;
pub mod sort;
pub mod value;

pub use collection::cursor::CursorState;
pub use collection::Collection;
pub use diagnostic;
pub use error::{CollectionError, TypeConversionWarning};
pub use key::{Key, KeyLike};
pub use sort::{Comparable, Comparison, SortOptions, SortOrder};
pub use value::{SharedCollection, Value};
