// SPDX-License-Identifier: MIT OR Apache-2.0
//! Key and anchor operations. All of them act on the selected animation.

use super::DocumentController;
use crate::state::Selection;
use lost_animator_timeline::{Anchors, Key, KeyId, KeyPatch, Point, SpriteKey, TrackId, TrackType};

/// Prefix of generated anchor names
const ANCHOR_PREFIX: &str = "anchor_";

impl DocumentController {
    /// A fresh key ID
    pub fn new_key_id(&mut self) -> KeyId {
        KeyId::from(self.next_id())
    }

    /// Look up a key in the selected animation
    pub fn key(&self, track_id: &TrackId, key_id: &KeyId) -> Option<&Key> {
        self.selected_animation()?.track(track_id)?.key(key_id)
    }

    /// Add a key to a track.
    ///
    /// Keys of the wrong type for the track, and keys whose ID is already
    /// on the track, are rejected.
    pub fn add_key(&mut self, track_id: &TrackId, key: Key) -> bool {
        self.update_track(track_id, |track| {
            if !track.accepts(&key) {
                tracing::warn!(
                    "Rejected {:?} key on {:?} track {}",
                    key.track_type(),
                    track.track_type,
                    track.id
                );
                return None;
            }
            if track.key(key.id()).is_some() {
                tracing::warn!("Key {} already exists on track {}", key.id(), track.id);
                return None;
            }
            let mut next = track.clone();
            next.keys.push(key);
            Some(next)
        })
    }

    /// Remove a key. A selection on it moves up to its track.
    pub fn remove_key(&mut self, track_id: &TrackId, key_id: &KeyId) -> bool {
        let removed = self.update_track(track_id, |track| {
            let index = track.keys.iter().position(|k| k.id() == key_id)?;
            let mut next = track.clone();
            next.keys.remove(index);
            Some(next)
        });

        if removed {
            if let Selection::Key {
                animation_id,
                track_id: selected_track,
                key_id: selected_key,
            } = &self.selection
            {
                if selected_track == track_id && selected_key == key_id {
                    self.selection = Selection::Track {
                        animation_id: animation_id.clone(),
                        track_id: track_id.clone(),
                    };
                }
            }
        }
        removed
    }

    /// Apply a partial update to a key. The key keeps its type.
    pub fn update_key(&mut self, track_id: &TrackId, key_id: &KeyId, patch: &KeyPatch) -> bool {
        self.update_track(track_id, |track| {
            let index = track.keys.iter().position(|k| k.id() == key_id)?;
            let mut next = track.clone();
            next.keys[index] = track.keys[index].apply(patch);
            Some(next)
        })
    }

    /// Key shown on the first sprite track at the playhead
    pub fn active_sprite_key(&self) -> Option<&SpriteKey> {
        let animation = self.selected_animation()?;
        let track = animation.first_track_of(TrackType::Sprite)?;
        track
            .active_key_at(self.playback.current_time, animation.duration)?
            .as_sprite()
    }

    /// Key active on a track at the playhead
    pub fn active_key(&self, track_id: &TrackId) -> Option<&Key> {
        let animation = self.selected_animation()?;
        animation
            .track(track_id)?
            .active_key_at(self.playback.current_time, animation.duration)
    }

    // ---- anchors ----

    fn edit_anchors(
        &mut self,
        track_id: &TrackId,
        key_id: &KeyId,
        f: impl FnOnce(&mut Anchors) -> bool,
    ) -> bool {
        let Some(key) = self.key(track_id, key_id) else {
            return false;
        };
        let mut anchors = key.anchors().cloned().unwrap_or_default();
        if !f(&mut anchors) {
            return false;
        }
        self.update_key(track_id, key_id, &KeyPatch::default().with_anchors(Some(anchors)))
    }

    /// Add an anchor at the origin, named `anchor_N` with the first free N
    pub fn add_anchor(&mut self, track_id: &TrackId, key_id: &KeyId) -> Option<String> {
        let mut added = None;
        self.edit_anchors(track_id, key_id, |anchors| {
            let name = (1..)
                .map(|i| format!("{ANCHOR_PREFIX}{i}"))
                .find(|name| !anchors.contains_key(name))
                .unwrap_or_default();
            anchors.insert(name.clone(), Point::default());
            added = Some(name);
            true
        });
        added
    }

    /// Rename an anchor in place.
    ///
    /// The new name is trimmed; empty or taken names are rejected.
    pub fn rename_anchor(
        &mut self,
        track_id: &TrackId,
        key_id: &KeyId,
        from: &str,
        to: &str,
    ) -> bool {
        let to = to.trim();
        if to.is_empty() || to == from {
            return false;
        }
        self.edit_anchors(track_id, key_id, |anchors| {
            if anchors.contains_key(to) {
                return false;
            }
            let Some(index) = anchors.get_index_of(from) else {
                return false;
            };
            let renamed: Anchors = anchors
                .drain(..)
                .enumerate()
                .map(|(i, (name, point))| {
                    if i == index {
                        (to.to_string(), point)
                    } else {
                        (name, point)
                    }
                })
                .collect();
            *anchors = renamed;
            true
        })
    }

    /// Move an anchor to a new position in pixels
    pub fn set_anchor_position(
        &mut self,
        track_id: &TrackId,
        key_id: &KeyId,
        name: &str,
        position: Point,
    ) -> bool {
        self.edit_anchors(track_id, key_id, |anchors| match anchors.get_mut(name) {
            Some(point) => {
                *point = position;
                true
            }
            None => false,
        })
    }

    /// Delete an anchor
    pub fn remove_anchor(&mut self, track_id: &TrackId, key_id: &KeyId, name: &str) -> bool {
        self.edit_anchors(track_id, key_id, |anchors| {
            anchors.shift_remove(name).is_some()
        })
    }

    /// Move an anchor to another place in the list
    pub fn reorder_anchors(
        &mut self,
        track_id: &TrackId,
        key_id: &KeyId,
        from: usize,
        to: usize,
    ) -> bool {
        self.edit_anchors(track_id, key_id, |anchors| {
            if from == to || from >= anchors.len() || to >= anchors.len() {
                return false;
            }
            anchors.move_index(from, to);
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::document::tests::controller;
    use crate::document::DocumentController;
    use crate::state::Selection;
    use lost_animator_timeline::{
        EventKey, Flip, Key, KeyId, KeyPatch, Point, SpriteKey, TrackId, TrackType, TweenKey,
    };

    fn with_track(track_type: TrackType) -> (DocumentController, TrackId) {
        let mut doc = controller();
        doc.add_animation();
        let track_id = doc.add_track(track_type).unwrap();
        (doc, track_id)
    }

    fn sprite(
        doc: &mut DocumentController,
        track_id: &TrackId,
        time: f64,
        frame: [u32; 2],
    ) -> KeyId {
        let id = doc.new_key_id();
        assert!(doc.add_key(track_id, Key::Sprite(SpriteKey::new(id.clone(), time, frame))));
        id
    }

    fn anchor_names(doc: &DocumentController, track_id: &TrackId, key_id: &KeyId) -> Vec<String> {
        doc.key(track_id, key_id)
            .and_then(Key::anchors)
            .map(|a| a.keys().cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_add_key_rejects_wrong_type() {
        let (mut doc, track_id) = with_track(TrackType::Sprite);
        let id = doc.new_key_id();
        assert!(!doc.add_key(&track_id, Key::Event(EventKey::new(id, 0.0, "hit"))));
        assert!(doc.selected_animation().unwrap().tracks[0].keys.is_empty());
    }

    #[test]
    fn test_add_key_rejects_duplicate_id() {
        let (mut doc, track_id) = with_track(TrackType::Sprite);
        let id = sprite(&mut doc, &track_id, 0.0, [0, 0]);
        assert!(!doc.add_key(&track_id, Key::Sprite(SpriteKey::new(id, 1.0, [1, 0]))));
    }

    #[test]
    fn test_add_key_to_missing_track() {
        let (mut doc, _) = with_track(TrackType::Sprite);
        let id = doc.new_key_id();
        let key = Key::Sprite(SpriteKey::new(id, 0.0, [0, 0]));
        assert!(!doc.add_key(&TrackId::from("nope"), key));
    }

    #[test]
    fn test_update_key_keeps_type() {
        let (mut doc, track_id) = with_track(TrackType::Tween);
        let id = doc.new_key_id();
        doc.add_key(&track_id, Key::Tween(TweenKey::new(id.clone(), 0.0, 0.5, "fade")));

        let patch = KeyPatch::time(-1.0).with_frame([3, 3]).with_name("scale");
        assert!(doc.update_key(&track_id, &id, &patch));
        let tween = doc.key(&track_id, &id).unwrap().as_tween().unwrap();
        assert_eq!(tween.time, 0.0);
        assert_eq!(tween.name, "scale");

        assert!(doc.update_key(&track_id, &id, &KeyPatch::duration(0.0)));
        assert_eq!(doc.key(&track_id, &id).unwrap().as_tween().unwrap().duration, 0.01);
    }

    #[test]
    fn test_update_sprite_flip() {
        let (mut doc, track_id) = with_track(TrackType::Sprite);
        let id = sprite(&mut doc, &track_id, 0.0, [0, 0]);
        assert!(doc.update_key(&track_id, &id, &KeyPatch::default().with_flip(Some(Flip::Both))));
        let key = doc.key(&track_id, &id).unwrap().as_sprite().unwrap();
        assert_eq!(key.flip, Some(Flip::Both));
        assert!(!doc.update_key(&track_id, &id, &KeyPatch::default().with_flip(Some(Flip::Both))));
    }

    #[test]
    fn test_remove_selected_key_selects_track() {
        let (mut doc, track_id) = with_track(TrackType::Sprite);
        let key_id = sprite(&mut doc, &track_id, 0.0, [0, 0]);
        let animation_id = doc.selected_animation_id().unwrap().clone();
        doc.set_selection(Selection::Key {
            animation_id: animation_id.clone(),
            track_id: track_id.clone(),
            key_id: key_id.clone(),
        });

        assert!(doc.remove_key(&track_id, &key_id));
        assert_eq!(
            doc.selection(),
            &Selection::Track {
                animation_id,
                track_id: track_id.clone()
            }
        );
        assert!(!doc.remove_key(&track_id, &key_id));
    }

    #[test]
    fn test_key_undo_redo_round_trip() {
        let (mut doc, track_id) = with_track(TrackType::Sprite);
        let key_id = sprite(&mut doc, &track_id, 0.3, [2, 1]);

        doc.undo();
        assert!(doc.key(&track_id, &key_id).is_none());
        doc.redo();
        let key = doc.key(&track_id, &key_id).unwrap().as_sprite().unwrap();
        assert_eq!(key.time, 0.3);
        assert_eq!(key.frame, [2, 1]);
    }

    #[test]
    fn test_active_sprite_key_follows_playhead() {
        let (mut doc, track_id) = with_track(TrackType::Sprite);
        sprite(&mut doc, &track_id, 0.0, [0, 0]);
        sprite(&mut doc, &track_id, 0.5, [1, 0]);

        doc.set_current_time(0.25);
        assert_eq!(doc.active_sprite_key().unwrap().frame, [0, 0]);
        doc.set_current_time(0.75);
        assert_eq!(doc.active_sprite_key().unwrap().frame, [1, 0]);
        doc.set_current_time(5.0);
        assert_eq!(doc.active_sprite_key().unwrap().frame, [1, 0]);
        assert_eq!(doc.active_key(&track_id).unwrap().time(), 0.5);
    }

    #[test]
    fn test_anchor_names_are_unique() {
        let (mut doc, track_id) = with_track(TrackType::Sprite);
        let key_id = sprite(&mut doc, &track_id, 0.0, [0, 0]);

        assert_eq!(doc.add_anchor(&track_id, &key_id).as_deref(), Some("anchor_1"));
        assert_eq!(doc.add_anchor(&track_id, &key_id).as_deref(), Some("anchor_2"));
        assert!(doc.remove_anchor(&track_id, &key_id, "anchor_1"));
        assert_eq!(doc.add_anchor(&track_id, &key_id).as_deref(), Some("anchor_1"));
        assert_eq!(anchor_names(&doc, &track_id, &key_id), ["anchor_2", "anchor_1"]);

        let anchors = doc.key(&track_id, &key_id).unwrap().anchors().unwrap();
        assert_eq!(anchors["anchor_1"], Point::new(0.0, 0.0));
    }

    #[test]
    fn test_rename_anchor_rules() {
        let (mut doc, track_id) = with_track(TrackType::Sprite);
        let key_id = sprite(&mut doc, &track_id, 0.0, [0, 0]);
        doc.add_anchor(&track_id, &key_id);
        doc.add_anchor(&track_id, &key_id);

        assert!(!doc.rename_anchor(&track_id, &key_id, "anchor_1", "   "));
        assert!(!doc.rename_anchor(&track_id, &key_id, "anchor_1", "anchor_2"));
        assert!(!doc.rename_anchor(&track_id, &key_id, "missing", "hand"));
        assert!(doc.rename_anchor(&track_id, &key_id, "anchor_1", "  hand "));
        assert_eq!(anchor_names(&doc, &track_id, &key_id), ["hand", "anchor_2"]);
    }

    #[test]
    fn test_anchor_position_and_order() {
        let (mut doc, track_id) = with_track(TrackType::Event);
        let key_id = doc.new_key_id();
        doc.add_key(&track_id, Key::Event(EventKey::new(key_id.clone(), 0.0, "hit")));
        doc.add_anchor(&track_id, &key_id);
        doc.add_anchor(&track_id, &key_id);
        doc.add_anchor(&track_id, &key_id);

        assert!(doc.set_anchor_position(&track_id, &key_id, "anchor_2", Point::new(4.0, -2.0)));
        assert!(!doc.set_anchor_position(&track_id, &key_id, "nope", Point::new(1.0, 1.0)));
        assert!(doc.reorder_anchors(&track_id, &key_id, 2, 0));
        assert!(!doc.reorder_anchors(&track_id, &key_id, 0, 3));
        assert_eq!(
            anchor_names(&doc, &track_id, &key_id),
            ["anchor_3", "anchor_1", "anchor_2"]
        );

        let anchors = doc.key(&track_id, &key_id).unwrap().anchors().unwrap();
        assert_eq!(anchors["anchor_2"], Point::new(4.0, -2.0));
    }
}
