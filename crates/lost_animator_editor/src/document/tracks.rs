// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track operations. All of them act on the selected animation.

use super::{move_item, DocumentController};
use crate::state::Selection;
use lost_animator_timeline::{Track, TrackId, TrackType};

impl DocumentController {
    /// Append a track to the selected animation.
    ///
    /// Returns `None` when no animation is selected.
    pub fn add_track(&mut self, track_type: TrackType) -> Option<TrackId> {
        self.selected_animation()?;

        let id = TrackId::from(self.next_id());
        let track = Track::new(id.clone(), track_type, track_type.name());
        let added = self.update_selected_animation(|animation| {
            let mut next = animation.clone();
            next.tracks.push(track);
            Some(next)
        });
        added.then_some(id)
    }

    /// Remove a track. A selection inside it moves up to the animation.
    pub fn remove_track(&mut self, track_id: &TrackId) -> bool {
        let removed = self.update_selected_animation(|animation| {
            let index = animation.track_index(track_id)?;
            let mut next = animation.clone();
            next.tracks.remove(index);
            Some(next)
        });

        if removed && self.selection.track_id() == Some(track_id) {
            if let Some(animation_id) = self.selection.animation_id().cloned() {
                self.selection = Selection::Animation { animation_id };
            }
        }
        removed
    }

    /// Rename a track
    pub fn rename_track(&mut self, track_id: &TrackId, name: impl Into<String>) -> bool {
        let name = name.into();
        self.update_track(track_id, |track| {
            Some(Track {
                name,
                ..track.clone()
            })
        })
    }

    /// Move a track to another position
    pub fn reorder_tracks(&mut self, from: usize, to: usize) -> bool {
        self.update_selected_animation(|animation| {
            let mut next = animation.clone();
            move_item(&mut next.tracks, from, to).then_some(next)
        })
    }
}
