//! Ordered transcript of turn entries.
//!
//! Only the last entry is ever mutated, and only while it is still being
//! written. Readers can either borrow the entries directly or register an
//! observer that runs after every mutation.

use crate::core::message::TurnEntry;

/// What changed in the transcript, by entry index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptChange {
    Appended(usize),
    Replaced(usize),
    Updated(usize),
}

type Observer = Box<dyn FnMut(TranscriptChange, &[TurnEntry]) + Send>;

#[derive(Default)]
pub struct Transcript {
    entries: Vec<TurnEntry>,
    observers: Vec<Observer>,
}

impl std::fmt::Debug for Transcript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcript")
            .field("entries", &self.entries)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TurnEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TurnEntry> {
        self.entries.last()
    }

    /// Register a callback invoked after every mutation.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(TranscriptChange, &[TurnEntry]) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn append(&mut self, entry: TurnEntry) -> usize {
        self.entries.push(entry);
        let index = self.entries.len() - 1;
        self.notify(TranscriptChange::Appended(index));
        index
    }

    /// Swap the last entry for `entry` when it matches `predicate`, otherwise
    /// append. Returns the position `entry` ends up at.
    pub fn replace_last<P>(&mut self, predicate: P, entry: TurnEntry) -> usize
    where
        P: FnOnce(&TurnEntry) -> bool,
    {
        if !self.entries.last().is_some_and(predicate) {
            return self.append(entry);
        }
        let index = self.entries.len() - 1;
        self.entries[index] = entry;
        self.notify(TranscriptChange::Replaced(index));
        index
    }

    /// Apply `mutator` to the last entry in place.
    ///
    /// Final entries are frozen, so this is a no-op (returning `false`) when
    /// the transcript is empty or its last entry is already final.
    pub fn update_last<F>(&mut self, mutator: F) -> bool
    where
        F: FnOnce(&mut TurnEntry),
    {
        let Some(last) = self.entries.last_mut() else {
            return false;
        };
        if last.is_final() {
            return false;
        }
        mutator(last);
        let index = self.entries.len() - 1;
        self.notify(TranscriptChange::Updated(index));
        true
    }

    /// Number of entries that are still being written.
    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.is_final()).count()
    }

    fn notify(&mut self, change: TranscriptChange) {
        for observer in &mut self.observers {
            observer(change, &self.entries);
        }
    }
}
