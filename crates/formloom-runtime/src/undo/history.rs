#![forbid(unsafe_code)]

//! Snapshot undo/redo history.
//!
//! [`History`] keeps whole-state snapshots behind [`Arc`]. Form states share
//! untouched pages and subtrees, so a snapshot costs one `Arc` clone plus
//! whatever the edit itself copied.
//!
//! ```text
//! commit(s3)
//!   past:    [s0, s1, s2]
//!   present: s3
//!   future:  []
//!
//! undo() x2
//!   past:    [s0]
//!   present: s1
//!   future:  [s3, s2]      (most recently undone at the back)
//!
//! commit(s4)               new branch, future dropped
//!   past:    [s0, s1]
//!   present: s4
//!   future:  []
//! ```
//!
//! # Invariants
//!
//! 1. `past.len() <= max_depth` after every operation.
//! 2. `future` is cleared by every successful commit.
//! 3. A commit equal to `present` is ignored.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Default number of undo steps retained.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Linear undo/redo history over immutable snapshots.
pub struct History<T> {
    past: VecDeque<Arc<T>>,
    present: Arc<T>,
    future: Vec<Arc<T>>,
    max_depth: usize,
}

impl<T: fmt::Debug> fmt::Debug for History<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("past_len", &self.past.len())
            .field("present", &self.present)
            .field("future_len", &self.future.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl<T: PartialEq> History<T> {
    /// Start a history at `initial` with the default depth.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self::with_max_depth(initial, DEFAULT_MAX_DEPTH)
    }

    /// Start a history at `initial` keeping at most `max_depth` undo steps.
    /// A depth of zero is treated as one.
    #[must_use]
    pub fn with_max_depth(initial: T, max_depth: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: Arc::new(initial),
            future: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// The current snapshot.
    #[inline]
    #[must_use]
    pub fn present(&self) -> &Arc<T> {
        &self.present
    }

    /// Record `state` as the new present.
    ///
    /// Returns `false` (and changes nothing) when `state` equals the present.
    pub fn commit(&mut self, state: T) -> bool {
        self.commit_arc(Arc::new(state))
    }

    /// [`commit`](Self::commit) for an already shared snapshot.
    pub fn commit_arc(&mut self, state: Arc<T>) -> bool {
        if Arc::ptr_eq(&state, &self.present) || *state == *self.present {
            return false;
        }
        let previous = std::mem::replace(&mut self.present, state);
        self.past.push_back(previous);
        self.future.clear();
        self.enforce_depth();
        true
    }

    /// Step back one snapshot. Returns the new present, or `None` when there
    /// is nothing to undo.
    pub fn undo(&mut self) -> Option<Arc<T>> {
        let previous = self.past.pop_back()?;
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push(current);
        Some(Arc::clone(&self.present))
    }

    /// Step forward one snapshot. Returns the new present, or `None` when
    /// there is nothing to redo.
    pub fn redo(&mut self) -> Option<Arc<T>> {
        let next = self.future.pop()?;
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        self.enforce_depth();
        Some(Arc::clone(&self.present))
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Overwrite the present without recording a step. Past and future are
    /// kept; use this for view-only changes such as the selection.
    pub fn replace_present(&mut self, state: T) {
        self.present = Arc::new(state);
    }

    /// Drop all past and future snapshots and start over at `state`.
    pub fn reset(&mut self, state: T) {
        self.past.clear();
        self.future.clear();
        self.present = Arc::new(state);
    }

    #[must_use]
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    #[must_use]
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Change the depth limit, evicting the oldest steps if needed.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
        self.enforce_depth();
    }

    fn enforce_depth(&mut self) {
        while self.past.len() > self.max_depth {
            self.past.pop_front();
        }
    }
}
