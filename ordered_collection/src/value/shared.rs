use crate::collection::Collection;
use crate::value::visit::VisitGuard;
use crate::value::Value;
use std::cell::{BorrowError, Ref, RefCell, RefMut};
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

/// Reference-counted handle to a nested collection
///
/// Cloning the handle shares the collection. A collection may end up
/// containing its own handle; traversals that can't handle that report it
/// instead of recursing forever.
#[derive(Clone, Default)]
pub struct SharedCollection(Rc<RefCell<Collection<Value>>>);

impl SharedCollection {
    pub fn new(collection: Collection<Value>) -> Self {
        Self(Rc::new(RefCell::new(collection)))
    }

    /// # Panics
    /// If the collection is currently mutably borrowed
    pub fn borrow(&self) -> Ref<'_, Collection<Value>> {
        self.0.borrow()
    }

    /// # Panics
    /// If the collection is currently borrowed
    pub fn borrow_mut(&self) -> RefMut<'_, Collection<Value>> {
        self.0.borrow_mut()
    }

    pub fn try_borrow(&self) -> Result<Ref<'_, Collection<Value>>, BorrowError> {
        self.0.try_borrow()
    }

    /// Whether both handles point at the same collection
    pub fn ptr_eq(&self, other: &SharedCollection) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn as_ptr(&self) -> *const Collection<Value> {
        self.0.as_ptr().cast_const()
    }

    /// Copies the current contents into an unshared collection
    ///
    /// # Panics
    /// If the collection is currently mutably borrowed
    pub fn snapshot(&self) -> Collection<Value> {
        self.0.borrow().clone()
    }
}

impl From<Collection<Value>> for SharedCollection {
    fn from(value: Collection<Value>) -> Self {
        Self::new(value)
    }
}

impl Debug for SharedCollection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let Some(_guard) = VisitGuard::enter(self.as_ptr()) else {
            return write!(f, "<cycle>");
        };
        match self.0.try_borrow() {
            Ok(collection) => Debug::fmt(&*collection, f),
            Err(_) => write!(f, "<borrowed>"),
        }
    }
}

impl Display for SharedCollection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let Some(_guard) = VisitGuard::enter(self.as_ptr()) else {
            return write!(f, "[*recursion*]");
        };
        match self.0.try_borrow() {
            Ok(collection) => Display::fmt(&*collection, f),
            Err(_) => write!(f, "[*borrowed*]"),
        }
    }
}

/// Handles are equal if they share a collection or hold equal contents.
/// Two distinct cyclic structures never compare equal.
impl PartialEq for SharedCollection {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let Some(_guard) = VisitGuard::enter(self.as_ptr()) else {
            return false;
        };
        match (self.0.try_borrow(), other.0.try_borrow()) {
            (Ok(a), Ok(b)) => *a == *b,
            _ => false,
        }
    }
}

impl Eq for SharedCollection {}

#[cfg(test)]
mod tests {
    use crate::collection::Collection;
    use crate::value::{SharedCollection, Value};

    fn self_referencing() -> SharedCollection {
        let shared = SharedCollection::new(Collection::from_values([Value::from(1)]));
        shared.borrow_mut().push(Value::Collection(shared.clone()));
        shared
    }

    #[test]
    fn cyclic_debug_and_display_terminate() {
        let shared = self_referencing();

        assert_eq!(format!("{shared}"), "[0: 1, 1: [*recursion*]]");
        assert!(format!("{shared:?}").contains("<cycle>"));
    }

    #[test]
    fn cyclic_equality_terminates() {
        let a = self_referencing();
        let b = self_referencing();

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn distinct_handles_compare_by_contents() {
        let a = SharedCollection::new(Collection::from_values([Value::from("x")]));
        let b = SharedCollection::new(Collection::from_values([Value::from("x")]));

        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);

        b.borrow_mut().push(Value::Null);
        assert_ne!(a, b);
    }

    #[test]
    fn mutably_borrowed_handle_is_reported() {
        let a = SharedCollection::default();
        let _guard = a.borrow_mut();
        assert_eq!(format!("{a:?}"), "<borrowed>");
        assert!(a.try_borrow().is_err());
    }
}
