// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation operations.

use super::{move_item, DocumentController};
use crate::state::Selection;
use lost_animator_timeline::{Animation, AnimationId, AnimationPatch, KeyId, Track, TrackId};
use std::sync::Arc;

impl DocumentController {
    /// Select an animation, or clear the selection with `None`.
    ///
    /// The timeline view takes the animation's snap settings. Unknown IDs
    /// are ignored.
    pub fn select_animation(&mut self, id: Option<AnimationId>) -> bool {
        match id {
            Some(id) => {
                if self.file().animation(&id).is_none() {
                    tracing::debug!("Ignoring selection of unknown animation {id}");
                    return false;
                }
                self.selected_animation_id = Some(id.clone());
                self.selection = Selection::Animation { animation_id: id };
                self.sync_view_from_animation();
            }
            None => {
                self.selected_animation_id = None;
                self.selection = Selection::None;
            }
        }
        self.sync_clock();
        true
    }

    /// Copy the selected animation's snap settings into the timeline view
    pub(super) fn sync_view_from_animation(&mut self) {
        if let Some(animation) = self.selected_animation() {
            let (snap_to_grid, grid_size) = (animation.snap_to_grid, animation.grid_size);
            self.timeline.snap_to_grid = snap_to_grid;
            self.timeline.grid_size = grid_size;
        }
    }

    /// Append a new animation and select it
    pub fn add_animation(&mut self) -> AnimationId {
        let id = AnimationId::from(self.next_id());
        let name = format!("Animation {}", self.file().animations.len() + 1);
        let animation = Animation::new(id.clone(), name);

        self.update_file(|file| {
            let mut next = file.clone();
            next.animations.push(Arc::new(animation));
            Some(next)
        });
        self.select_animation(Some(id.clone()));
        id
    }

    /// Remove an animation. Removing the selected one clears the selection.
    pub fn remove_animation(&mut self, id: &AnimationId) -> bool {
        let removed = self.update_file(|file| {
            let index = file.animation_index(id)?;
            let mut next = file.clone();
            next.animations.remove(index);
            Some(next)
        });

        if self.selected_animation_id.as_ref() == Some(id)
            || self.selection.animation_id() == Some(id)
        {
            self.selected_animation_id = None;
            self.selection = Selection::None;
            self.sync_clock();
        }
        removed
    }

    /// Apply a partial update to an animation
    pub fn update_animation(&mut self, id: &AnimationId, patch: &AnimationPatch) -> bool {
        let changed = self.update_animation_with(id, |animation| Some(animation.apply(patch)));
        if changed && self.selected_animation_id.as_ref() == Some(id) {
            self.sync_view_from_animation();
        }
        changed
    }

    /// Append a deep copy of an animation.
    ///
    /// The copy and every track and key in it get fresh IDs.
    pub fn duplicate_animation(&mut self, id: &AnimationId) -> Option<AnimationId> {
        let original = self.file().animation(id)?.clone();

        let copy_id = AnimationId::from(self.next_id());
        let tracks = original
            .tracks
            .iter()
            .map(|track| self.copy_track(track))
            .collect();
        let copy = Animation {
            id: copy_id.clone(),
            name: format!("{} (copy)", original.name),
            tracks,
            ..original
        };

        self.update_file(|file| {
            let mut next = file.clone();
            next.animations.push(Arc::new(copy));
            Some(next)
        });
        tracing::debug!("Duplicated animation {id} as {copy_id}");
        Some(copy_id)
    }

    fn copy_track(&mut self, track: &Track) -> Track {
        let keys = track
            .keys
            .iter()
            .map(|key| key.with_id(KeyId::from(self.next_id())))
            .collect();
        Track {
            id: TrackId::from(self.next_id()),
            keys,
            ..track.clone()
        }
    }

    /// Move an animation to another position
    pub fn reorder_animations(&mut self, from: usize, to: usize) -> bool {
        self.update_file(|file| {
            let mut next = file.clone();
            move_item(&mut next.animations, from, to).then_some(next)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::document::tests::controller;
    use crate::state::Selection;
    use lost_animator_timeline::{
        AnimationPatch, EventKey, Key, SpriteKey, TrackType, TweenKey,
    };
    use std::collections::HashSet;

    #[test]
    fn test_add_animation_names_and_selects() {
        let mut doc = controller();
        let first = doc.add_animation();
        let second = doc.add_animation();

        let file = doc.file();
        assert_eq!(file.animations[0].name, "Animation 1");
        assert_eq!(file.animations[1].name, "Animation 2");
        assert!(file.animations[0].looping);
        assert_eq!(file.animations[0].duration, 1.0);
        assert!(file.animations[0].tracks.is_empty());
        assert_ne!(first, second);

        assert_eq!(doc.selected_animation_id(), Some(&second));
        assert_eq!(
            doc.selection(),
            &Selection::Animation {
                animation_id: second
            }
        );
    }

    #[test]
    fn test_remove_selected_animation_clears_selection() {
        let mut doc = controller();
        let id = doc.add_animation();
        assert!(doc.remove_animation(&id));
        assert!(doc.selection().is_none());
        assert!(doc.selected_animation_id().is_none());
        assert!(doc.file().animations.is_empty());
    }

    #[test]
    fn test_remove_other_animation_keeps_selection() {
        let mut doc = controller();
        let first = doc.add_animation();
        let second = doc.add_animation();
        assert!(doc.remove_animation(&first));
        assert_eq!(doc.selected_animation_id(), Some(&second));
    }

    #[test]
    fn test_update_animation_clamps() {
        let mut doc = controller();
        let id = doc.add_animation();
        assert!(doc.update_animation(&id, &AnimationPatch::duration(0.0)));
        assert_eq!(doc.file().animation(&id).unwrap().duration, 0.1);

        let patch = AnimationPatch {
            looping: Some(false),
            ..AnimationPatch::name("Jump")
        };
        assert!(doc.update_animation(&id, &patch));
        let animation = doc.file().animation(&id).unwrap();
        assert_eq!(animation.name, "Jump");
        assert!(!animation.looping);
    }

    #[test]
    fn test_duplicate_uses_fresh_ids() {
        let mut doc = controller();
        let id = doc.add_animation();
        let sprites = doc.add_track(TrackType::Sprite).unwrap();
        let events = doc.add_track(TrackType::Event).unwrap();
        for time in [0.0, 0.5] {
            let key_id = doc.new_key_id();
            doc.add_key(&sprites, Key::Sprite(SpriteKey::new(key_id, time, [0, 0])));
        }
        let key_id = doc.new_key_id();
        doc.add_key(&events, Key::Event(EventKey::new(key_id, 0.2, "hit")));

        let copy_id = doc.duplicate_animation(&id).unwrap();
        let file = doc.file();
        let original = file.animation(&id).unwrap();
        let copy = file.animation(&copy_id).unwrap();

        assert_eq!(copy.name, "Animation 1 (copy)");
        assert_eq!(copy.tracks.len(), 2);
        assert_ne!(copy.id, original.id);

        let ids = |a: &lost_animator_timeline::Animation| -> HashSet<String> {
            a.tracks
                .iter()
                .flat_map(|t| {
                    std::iter::once(t.id.to_string())
                        .chain(t.keys.iter().map(|k| k.id().to_string()))
                })
                .collect()
        };
        let original_ids = ids(original);
        let copy_ids = ids(copy);
        assert_eq!(original_ids.len(), 5);
        assert_eq!(copy_ids.len(), 5);
        assert!(original_ids.is_disjoint(&copy_ids));

        // Content is preserved
        assert_eq!(copy.tracks[0].track_type, TrackType::Sprite);
        assert_eq!(copy.tracks[0].keys.len(), 2);
        assert_eq!(copy.tracks[1].keys[0].as_event().unwrap().name, "hit");
    }

    #[test]
    fn test_duplicate_preserves_tween_fields() {
        let mut doc = controller();
        let id = doc.add_animation();
        let tweens = doc.add_track(TrackType::Tween).unwrap();
        let key_id = doc.new_key_id();
        doc.add_key(&tweens, Key::Tween(TweenKey::new(key_id, 0.25, 0.5, "fade")));

        let copy_id = doc.duplicate_animation(&id).unwrap();
        let copy = doc.file().animation(&copy_id).unwrap();
        let tween = copy.tracks[0].keys[0].as_tween().unwrap();
        assert_eq!((tween.time, tween.duration), (0.25, 0.5));
        assert_eq!(tween.name, "fade");
    }

    #[test]
    fn test_reorder_animations() {
        let mut doc = controller();
        let first = doc.add_animation();
        let second = doc.add_animation();
        assert!(!doc.reorder_animations(1, 1));
        assert!(doc.reorder_animations(0, 1));
        assert_eq!(doc.file().animations[0].id, second);
        assert_eq!(doc.file().animations[1].id, first);
    }

    #[test]
    fn test_select_syncs_timeline_view() {
        let mut doc = controller();
        let id = doc.add_animation();
        let patch = AnimationPatch {
            snap_to_grid: Some(false),
            grid_size: Some(0.25),
            ..Default::default()
        };
        doc.update_animation(&id, &patch);
        doc.select_animation(None);
        assert!(doc.selection().is_none());

        assert!(doc.select_animation(Some(id)));
        assert!(!doc.timeline().snap_to_grid);
        assert_eq!(doc.timeline().grid_size, 0.25);
    }

    #[test]
    fn test_select_unknown_animation_is_ignored() {
        let mut doc = controller();
        let id = doc.add_animation();
        assert!(!doc.select_animation(Some("nope".into())));
        assert_eq!(doc.selected_animation_id(), Some(&id));
    }
}
