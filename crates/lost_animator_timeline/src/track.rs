// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track definitions for the timeline.
//!
//! A track's key array is kept in insertion order. Every query that cares
//! about chronology sorts by time itself.

use crate::id::{KeyId, TrackId};
use crate::key::{Key, SpriteKey};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How long an event key counts as active, in seconds
pub const EVENT_WINDOW: f64 = 0.1;

/// Type of track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    /// Sprite frames
    Sprite,
    /// Tween intervals
    Tween,
    /// Event triggers
    Event,
}

impl TrackType {
    /// Get the display name, also used as the default track name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sprite => "Sprite",
            Self::Tween => "Tween",
            Self::Event => "Event",
        }
    }
}

/// A lane of keys of one type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Track type; every key must match it
    #[serde(rename = "type")]
    pub track_type: TrackType,
    /// Unique track ID
    pub id: TrackId,
    /// Track name
    pub name: String,
    /// Keys in insertion order
    #[serde(default)]
    pub keys: Vec<Key>,
}

fn by_time(a: &&Key, b: &&Key) -> Ordering {
    a.time().total_cmp(&b.time())
}

impl Track {
    /// Create an empty track
    pub fn new(id: TrackId, track_type: TrackType, name: impl Into<String>) -> Self {
        Self {
            track_type,
            id,
            name: name.into(),
            keys: Vec::new(),
        }
    }

    /// Whether `key` may live on this track
    pub fn accepts(&self, key: &Key) -> bool {
        key.track_type() == self.track_type
    }

    /// Get key by ID
    pub fn key(&self, key_id: &KeyId) -> Option<&Key> {
        self.keys.iter().find(|k| k.id() == key_id)
    }

    /// Keys sorted by time (stable for equal times)
    pub fn sorted_keys(&self) -> Vec<&Key> {
        let mut keys: Vec<&Key> = self.keys.iter().collect();
        keys.sort_by(by_time);
        keys
    }

    /// Latest end time over all keys, `0` for an empty track
    pub fn duration(&self) -> f64 {
        self.keys.iter().map(Key::end_time).fold(0.0, f64::max)
    }

    /// Get keys in a time range (inclusive)
    pub fn keys_in_range(&self, start: f64, end: f64) -> Vec<&Key> {
        self.sorted_keys()
            .into_iter()
            .filter(|k| k.time() >= start && k.time() <= end)
            .collect()
    }

    /// How long a sprite key stays on screen.
    ///
    /// A sprite key holds until the next sprite key on this track, or until
    /// the animation ends. Returns `0` when the key is not on this track.
    pub fn sprite_key_duration(&self, key: &SpriteKey, animation_duration: f64) -> f64 {
        let sprites: Vec<&SpriteKey> = self
            .sorted_keys()
            .into_iter()
            .filter_map(Key::as_sprite)
            .collect();

        let Some(index) = sprites.iter().position(|k| k.id == key.id) else {
            return 0.0;
        };

        match sprites.get(index + 1) {
            Some(next) => next.time - key.time,
            None => (animation_duration - key.time).max(0.0),
        }
    }

    /// The key shown or firing at `time`.
    ///
    /// Tween keys cover `[time, time + duration)`, event keys
    /// `[time, time + EVENT_WINDOW)` and sprite keys their held duration.
    /// Past every window, the chronologically last key at or before `time`
    /// stays active.
    pub fn active_key_at(&self, time: f64, animation_duration: f64) -> Option<&Key> {
        let sorted = self.sorted_keys();

        let hit = sorted.iter().copied().find(|key| {
            let length = match key {
                Key::Sprite(k) => self.sprite_key_duration(k, animation_duration),
                Key::Tween(k) => k.duration,
                Key::Event(_) => EVENT_WINDOW,
            };
            time >= key.time() && time < key.time() + length
        });

        hit.or_else(|| sorted.into_iter().rev().find(|k| k.time() <= time))
    }
}
