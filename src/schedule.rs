//! Ordered, index-addressable collections with one active entry.

use tracing::debug;

use crate::error::{ControlError, Result};

/// A non-empty list of entries (plant models or controllers) with one of them
/// selected as active.
///
/// The active index is always valid. Requests outside `[0, len - 1]` are
/// clamped to the nearest end instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule<T> {
    entries: Vec<T>,
    active: usize,
}

impl<T> Schedule<T> {
    /// Creates a schedule holding a single entry.
    pub fn new(first: T) -> Self {
        Self {
            entries: vec![first],
            active: 0,
        }
    }

    /// Creates a schedule from a list of entries, with the first one active.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::EmptySchedule`] if `entries` is empty.
    pub fn from_vec(entries: Vec<T>) -> Result<Self> {
        if entries.is_empty() {
            return Err(ControlError::EmptySchedule);
        }
        Ok(Self { entries, active: 0 })
    }

    /// Appends an entry to the end of the schedule.
    pub fn push(&mut self, entry: T) {
        self.entries.push(entry);
    }

    /// Number of scheduled entries (never zero).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The currently active entry.
    pub fn active(&self) -> &T {
        &self.entries[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Selects the active entry, clamping `index` into `[0, len - 1]`.
    ///
    /// Returns the index that was actually selected.
    pub fn set_active_index(&mut self, index: usize) -> usize {
        let last = self.entries.len() - 1;
        if index > last {
            debug!(requested = index, clamped = last, "schedule index clamped");
        }
        self.active = index.min(last);
        self.active
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }
}

impl<T> TryFrom<Vec<T>> for Schedule<T> {
    type Error = ControlError;

    fn try_from(entries: Vec<T>) -> Result<Self> {
        Self::from_vec(entries)
    }
}

impl<'a, T> IntoIterator for &'a Schedule<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
