use crate::collection::Collection;
use crate::key::Key;
use tracing::trace;

/// Observable state of a collection's internal cursor
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum CursorState {
    /// Not yet rewound, or reset by a mutation
    #[default]
    BeforeStart,
    /// On the entry at this insertion-order index
    Positioned(usize),
    /// Stepped past the last entry
    Exhausted,
}

/// Index-based cursor with a one-step look-ahead.
///
/// Indices are only meaningful for the entry layout they were computed on,
/// so the owning collection resets the cursor on every mutation.
#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct Cursor {
    state: CursorState,
    ahead: Option<usize>,
}

impl Cursor {
    pub(crate) fn state(&self) -> CursorState {
        self.state
    }

    pub(crate) fn position(&self) -> Option<usize> {
        match self.state {
            CursorState::Positioned(idx) => Some(idx),
            _ => None,
        }
    }

    pub(crate) fn ahead(&self) -> Option<usize> {
        self.ahead
    }

    pub(crate) fn rewind(&mut self, len: usize) {
        self.settle(0, len);
    }

    pub(crate) fn advance(&mut self, len: usize) {
        match self.state {
            CursorState::BeforeStart => self.rewind(len),
            CursorState::Positioned(idx) => self.settle(idx + 1, len),
            CursorState::Exhausted => {}
        }
    }

    pub(crate) fn reset(&mut self) {
        if self.state != CursorState::BeforeStart {
            trace!(state=?self.state, "cursor reset by mutation");
        }
        *self = Self::default();
    }

    fn settle(&mut self, idx: usize, len: usize) {
        if idx < len {
            self.state = CursorState::Positioned(idx);
            self.ahead = (idx + 1 < len).then_some(idx + 1);
        } else {
            self.state = CursorState::Exhausted;
            self.ahead = None;
        }
    }
}

/// Stateful traversal, independent of [Collection::iter]
impl<V> Collection<V> {
    /// Moves the cursor onto the first entry, or marks it exhausted if the
    /// collection is empty
    pub fn rewind(&mut self) {
        self.cursor.rewind(self.entries.len());
    }

    /// Whether the cursor is positioned on an entry
    pub fn valid(&self) -> bool {
        self.cursor.position().is_some()
    }

    pub fn current(&self) -> Option<&V> {
        self.cursor_entry().map(|(_, v)| v)
    }

    pub fn key(&self) -> Option<&Key> {
        self.cursor_entry().map(|(k, _)| k)
    }

    /// Steps to the next entry in insertion order.
    ///
    /// A cursor that was never rewound steps onto the first entry; an
    /// exhausted cursor stays exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        self.cursor.advance(self.entries.len());
    }

    /// Value one step ahead of [Collection::current], without moving
    pub fn peek(&self) -> Option<&V> {
        self.cursor
            .ahead()
            .and_then(|idx| self.entries.get_index(idx))
            .map(|(_, v)| v)
    }

    pub fn cursor_state(&self) -> CursorState {
        self.cursor.state()
    }

    fn cursor_entry(&self) -> Option<(&Key, &V)> {
        self.cursor
            .position()
            .and_then(|idx| self.entries.get_index(idx))
    }
}
