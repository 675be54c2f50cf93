use std::cell::RefCell;

thread_local! {
    static VISITING: RefCell<Vec<*const ()>> = const { RefCell::new(Vec::new()) };
}

/// Marks a nested collection as being traversed by the current thread.
///
/// Used by the recursive trait impls (`Debug`, `Display`, `PartialEq`,
/// `Serialize`), which have no way to thread a visited set through their
/// signatures.
#[derive(Debug)]
pub(crate) struct VisitGuard {
    ptr: *const (),
}

impl VisitGuard {
    /// Returns `None` if `ptr` is already being visited further up the stack
    pub(crate) fn enter<T>(ptr: *const T) -> Option<Self> {
        let ptr = ptr.cast::<()>();
        VISITING.with_borrow_mut(|visiting| {
            if visiting.contains(&ptr) {
                None
            } else {
                visiting.push(ptr);
                Some(VisitGuard { ptr })
            }
        })
    }
}

impl Drop for VisitGuard {
    fn drop(&mut self) {
        VISITING.with_borrow_mut(|visiting| {
            if let Some(pos) = visiting.iter().rposition(|p| *p == self.ptr) {
                visiting.remove(pos);
            }
        });
    }
}
