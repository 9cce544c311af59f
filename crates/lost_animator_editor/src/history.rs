// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history system using Copy-on-Write snapshots.
//!
//! The history stores whole document values behind [`Arc`]. A change is
//! detected by pointer identity only: callers register an edit by handing
//! in a new `Arc`, and handing back the current one is a no-op. Document
//! values are never mutated in place, so every stored snapshot stays valid.
//!
//! Continuous gestures (drags, resizes) are wrapped in
//! [`History::start_batch`] / [`History::end_batch`]. Inside a batch every
//! [`History::set`] only replaces the present value; ending the batch
//! records a single entry, or nothing when the present is still the value
//! the batch started from.

use std::collections::VecDeque;
use std::sync::Arc;

/// Maximum undo history depth
pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Batch state machine
#[derive(Debug)]
enum BatchState<T> {
    /// Every set records an entry
    Idle,
    /// Sets replace the present; `start` is recorded on end
    Batching {
        /// Present value when the batch started
        start: Arc<T>,
    },
}

/// History statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryStats {
    /// Entries in the undo stack
    pub undo_count: usize,
    /// Entries in the redo stack
    pub redo_count: usize,
    /// Maximum undo depth
    pub max_depth: usize,
    /// Whether a batch is open
    pub batching: bool,
}

/// The `{past, present, future}` triple, oldest first
#[derive(Debug)]
pub struct HistorySnapshot<T> {
    /// Undo stack, oldest first
    pub past: Vec<Arc<T>>,
    /// Current value
    pub present: Arc<T>,
    /// Redo stack, next redo first
    pub future: Vec<Arc<T>>,
}

impl<T> Clone for HistorySnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            past: self.past.clone(),
            present: Arc::clone(&self.present),
            future: self.future.clone(),
        }
    }
}

/// Undo/redo history manager
#[derive(Debug)]
pub struct History<T> {
    /// Undo stack, oldest first
    past: VecDeque<Arc<T>>,
    /// Current value
    present: Arc<T>,
    /// Redo stack, next redo first
    future: VecDeque<Arc<T>>,
    /// Batch state
    batch: BatchState<T>,
    /// Maximum history depth
    max_depth: usize,
}

impl<T> History<T> {
    /// Create a new history manager
    pub fn new(initial: Arc<T>) -> Self {
        Self::with_max_depth(initial, DEFAULT_MAX_DEPTH)
    }

    /// Create with custom maximum depth
    pub fn with_max_depth(initial: Arc<T>, max_depth: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial,
            future: VecDeque::new(),
            batch: BatchState::Idle,
            max_depth: max_depth.max(1),
        }
    }

    /// Restore a previously captured history
    pub fn from_snapshot(snapshot: HistorySnapshot<T>, max_depth: usize) -> Self {
        let mut history = Self::with_max_depth(snapshot.present, max_depth);
        history.past = snapshot.past.into();
        history.future = snapshot.future.into();
        history.trim();
        history
    }

    /// Get the current value
    pub fn present(&self) -> &Arc<T> {
        &self.present
    }

    fn trim(&mut self) {
        while self.past.len() > self.max_depth {
            self.past.pop_front();
        }
    }

    fn record(&mut self, previous: Arc<T>) {
        self.past.push_back(previous);
        self.trim();
        self.future.clear();
    }

    /// Replace the present value.
    ///
    /// Returns `false` when `next` is the current value (same allocation).
    pub fn set(&mut self, next: Arc<T>) -> bool {
        if Arc::ptr_eq(&self.present, &next) {
            return false;
        }

        let previous = std::mem::replace(&mut self.present, next);
        if matches!(self.batch, BatchState::Idle) {
            self.record(previous);
        }
        true
    }

    /// Replace the present value with one computed from it
    pub fn update(&mut self, f: impl FnOnce(&Arc<T>) -> Arc<T>) -> bool {
        let next = f(&self.present);
        self.set(next)
    }

    /// Undo the last change
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };

        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        self.batch = BatchState::Idle;
        tracing::debug!(undo = self.past.len(), redo = self.future.len(), "Undo");
        true
    }

    /// Redo the last undone change
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };

        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        self.trim();
        self.batch = BatchState::Idle;
        tracing::debug!(undo = self.past.len(), redo = self.future.len(), "Redo");
        true
    }

    /// Begin coalescing sets into one entry, starting from the present.
    ///
    /// A batch that is already open is committed first, so its changes
    /// stay one undo step behind the new batch.
    pub fn start_batch(&mut self) {
        if self.is_batching() {
            tracing::debug!("Batch already open, committing it");
            self.end_batch();
        }
        self.batch = BatchState::Batching {
            start: Arc::clone(&self.present),
        };
    }

    /// Close the open batch.
    ///
    /// Returns `true` when the batch recorded an entry.
    pub fn end_batch(&mut self) -> bool {
        let BatchState::Batching { start } = std::mem::replace(&mut self.batch, BatchState::Idle)
        else {
            return false;
        };

        if Arc::ptr_eq(&start, &self.present) {
            return false;
        }

        self.record(start);
        tracing::debug!(undo = self.past.len(), "Committed batch");
        true
    }

    /// Close the open batch, treating a present that `same` matches against
    /// the batch start as unchanged.
    ///
    /// A matching present is swapped back for the start value, so a gesture
    /// that returns to where it began leaves no entry and no new value.
    pub fn end_batch_by(&mut self, same: impl FnOnce(&T, &T) -> bool) -> bool {
        if let BatchState::Batching { start } = &self.batch {
            if !Arc::ptr_eq(start, &self.present) && same(start, &self.present) {
                self.present = Arc::clone(start);
            }
        }
        self.end_batch()
    }

    /// Replace the whole history with a single value.
    ///
    /// An open batch stays open and restarts from `value`, so a gesture
    /// spanning the reset ends without recording anything from before it.
    pub fn reset(&mut self, value: Arc<T>) {
        self.present = value;
        self.past.clear();
        self.future.clear();
        if self.is_batching() {
            self.batch = BatchState::Batching {
                start: Arc::clone(&self.present),
            };
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Get undo stack depth
    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    /// Get redo stack depth
    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    /// Whether a batch is open
    pub fn is_batching(&self) -> bool {
        matches!(self.batch, BatchState::Batching { .. })
    }

    /// Maximum undo depth
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Get history statistics
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            undo_count: self.past.len(),
            redo_count: self.future.len(),
            max_depth: self.max_depth,
            batching: self.is_batching(),
        }
    }

    /// Capture the `{past, present, future}` triple
    pub fn snapshot(&self) -> HistorySnapshot<T> {
        HistorySnapshot {
            past: self.past.iter().cloned().collect(),
            present: Arc::clone(&self.present),
            future: self.future.iter().cloned().collect(),
        }
    }
}
