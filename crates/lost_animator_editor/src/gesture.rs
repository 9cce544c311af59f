// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer gestures on timeline keys.
//!
//! A drag is one undo step no matter how many intermediate positions it
//! writes. Every update is computed from the value captured at `begin`, so
//! rounding never accumulates.

use crate::document::DocumentController;
use lost_animator_timeline::{KeyId, KeyPatch, TrackId};

/// Shortest duration a resize drag produces
pub const MIN_RESIZE_DURATION: f64 = 0.05;

/// What a drag changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    /// Shift the key's start time
    Move,
    /// Change a tween key's duration
    Resize,
}

/// An in-progress drag on one key
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDrag {
    kind: DragKind,
    track_id: TrackId,
    key_id: KeyId,
    start_time: f64,
    start_duration: f64,
}

impl KeyDrag {
    /// Grab a key and open a batch.
    ///
    /// Returns `None` when the key does not exist in the selected animation,
    /// or when resizing a key that has no duration.
    pub fn begin(
        doc: &mut DocumentController,
        kind: DragKind,
        track_id: &TrackId,
        key_id: &KeyId,
    ) -> Option<Self> {
        let key = doc.key(track_id, key_id)?;
        let start_duration = match (kind, key.as_tween()) {
            (DragKind::Resize, None) => return None,
            (_, Some(tween)) => tween.duration,
            (DragKind::Move, None) => 0.0,
        };
        let start_time = key.time();

        doc.start_batch();
        Some(Self {
            kind,
            track_id: track_id.clone(),
            key_id: key_id.clone(),
            start_time,
            start_duration,
        })
    }

    /// Gesture kind
    pub fn kind(&self) -> DragKind {
        self.kind
    }

    /// Dragged key
    pub fn key_id(&self) -> &KeyId {
        &self.key_id
    }

    /// Track of the dragged key
    pub fn track_id(&self) -> &TrackId {
        &self.track_id
    }

    /// Move the pointer to `delta` seconds from where the drag began
    pub fn update(&self, doc: &mut DocumentController, delta: f64) -> bool {
        let view = doc.timeline();
        let patch = match self.kind {
            DragKind::Move => KeyPatch::time(view.snap((self.start_time + delta).max(0.0))),
            DragKind::Resize => {
                let mut duration = (self.start_duration + delta).max(MIN_RESIZE_DURATION);
                if view.snap_to_grid {
                    duration = view.snap(duration).max(view.grid_size);
                }
                KeyPatch::duration(duration)
            }
        };
        doc.update_key(&self.track_id, &self.key_id, &patch)
    }

    /// Release the key. Returns `true` if the drag recorded an undo step.
    pub fn finish(self, doc: &mut DocumentController) -> bool {
        doc.end_batch()
    }

    /// Put the key back where it started and close the batch
    pub fn cancel(self, doc: &mut DocumentController) {
        let patch = match self.kind {
            DragKind::Move => KeyPatch::time(self.start_time),
            DragKind::Resize => KeyPatch::duration(self.start_duration),
        };
        doc.update_key(&self.track_id, &self.key_id, &patch);
        doc.end_batch();
    }
}
