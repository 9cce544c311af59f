// SPDX-License-Identifier: MIT OR Apache-2.0
//! Key definitions for the timeline.

use crate::id::{KeyId, SpritesheetId};
use crate::track::TrackType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Smallest duration a tween key may have, in seconds
pub const MIN_TWEEN_DURATION: f64 = 0.01;

/// 2D point in sprite pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal component
    pub x: f64,
    /// Vertical component
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Named attachment points, kept in user order
pub type Anchors = IndexMap<String, Point>;

/// Sprite flip mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flip {
    /// Mirror along the vertical axis
    Horizontal,
    /// Mirror along the horizontal axis
    Vertical,
    /// Mirror both ways
    Both,
}

impl Flip {
    /// Whether the sprite is mirrored horizontally
    pub fn flips_horizontal(self) -> bool {
        matches!(self, Self::Horizontal | Self::Both)
    }

    /// Whether the sprite is mirrored vertically
    pub fn flips_vertical(self) -> bool {
        matches!(self, Self::Vertical | Self::Both)
    }
}

/// Easing curve of a tween key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    /// Constant speed
    #[default]
    Linear,
    /// Accelerate
    EaseIn,
    /// Decelerate
    EaseOut,
    /// Accelerate then decelerate
    EaseInOut,
    /// Bounce at the start
    BounceIn,
    /// Bounce at the end
    BounceOut,
}

impl Easing {
    /// All easing curves, in menu order
    pub const ALL: [Easing; 6] = [
        Self::Linear,
        Self::EaseIn,
        Self::EaseOut,
        Self::EaseInOut,
        Self::BounceIn,
        Self::BounceOut,
    ];

    /// Get the display name
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::EaseIn => "EaseIn",
            Self::EaseOut => "EaseOut",
            Self::EaseInOut => "EaseInOut",
            Self::BounceIn => "BounceIn",
            Self::BounceOut => "BounceOut",
        }
    }
}

/// A sprite frame marker.
///
/// Sprite keys store no duration: a key holds until the next sprite key
/// on the same track, or until the animation ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteKey {
    /// Unique key ID
    pub id: KeyId,
    /// Time in seconds
    pub time: f64,
    /// `[column, row]` in the spritesheet grid
    pub frame: [u32; 2],
    /// Spritesheet to draw from (first spritesheet when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spritesheet_id: Option<SpritesheetId>,
    /// Flip mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flip: Option<Flip>,
    /// Draw offset in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Point>,
    /// Named anchors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchors: Option<Anchors>,
}

impl SpriteKey {
    /// Create a sprite key showing `frame` from `time`
    pub fn new(id: KeyId, time: f64, frame: [u32; 2]) -> Self {
        Self {
            id,
            time,
            frame,
            spritesheet_id: None,
            flip: None,
            offset: None,
            anchors: None,
        }
    }

    /// Set the spritesheet
    pub fn with_spritesheet(mut self, spritesheet_id: SpritesheetId) -> Self {
        self.spritesheet_id = Some(spritesheet_id);
        self
    }

    /// Set the flip mode
    pub fn with_flip(mut self, flip: Flip) -> Self {
        self.flip = Some(flip);
        self
    }
}

/// An interval key `[time, time + duration)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweenKey {
    /// Unique key ID
    pub id: KeyId,
    /// Start time in seconds
    pub time: f64,
    /// Length in seconds
    pub duration: f64,
    /// Tween name
    pub name: String,
    /// Easing curve
    #[serde(default)]
    pub easing: Easing,
    /// Named anchors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchors: Option<Anchors>,
}

impl TweenKey {
    /// Create a linear tween key
    pub fn new(id: KeyId, time: f64, duration: f64, name: impl Into<String>) -> Self {
        Self {
            id,
            time,
            duration,
            name: name.into(),
            easing: Easing::Linear,
            anchors: None,
        }
    }

    /// Set the easing curve
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

/// An instant trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventKey {
    /// Unique key ID
    pub id: KeyId,
    /// Time in seconds
    pub time: f64,
    /// Event name
    pub name: String,
    /// Named anchors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchors: Option<Anchors>,
}

impl EventKey {
    /// Create an event key
    pub fn new(id: KeyId, time: f64, name: impl Into<String>) -> Self {
        Self {
            id,
            time,
            name: name.into(),
            anchors: None,
        }
    }
}

/// A timestamped entry on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Key {
    /// Sprite frame marker
    Sprite(SpriteKey),
    /// Tween interval
    Tween(TweenKey),
    /// Event trigger
    Event(EventKey),
}

impl Key {
    /// Get the key ID
    pub fn id(&self) -> &KeyId {
        match self {
            Self::Sprite(k) => &k.id,
            Self::Tween(k) => &k.id,
            Self::Event(k) => &k.id,
        }
    }

    /// Get the start time
    pub fn time(&self) -> f64 {
        match self {
            Self::Sprite(k) => k.time,
            Self::Tween(k) => k.time,
            Self::Event(k) => k.time,
        }
    }

    /// The time this key stops contributing to its track's length.
    ///
    /// Sprite and event keys are markers, so this is their start time.
    pub fn end_time(&self) -> f64 {
        match self {
            Self::Sprite(k) => k.time,
            Self::Event(k) => k.time,
            Self::Tween(k) => k.time + k.duration,
        }
    }

    /// The track type this key belongs on
    pub fn track_type(&self) -> TrackType {
        match self {
            Self::Sprite(_) => TrackType::Sprite,
            Self::Tween(_) => TrackType::Tween,
            Self::Event(_) => TrackType::Event,
        }
    }

    /// Get the anchors, if any
    pub fn anchors(&self) -> Option<&Anchors> {
        match self {
            Self::Sprite(k) => k.anchors.as_ref(),
            Self::Tween(k) => k.anchors.as_ref(),
            Self::Event(k) => k.anchors.as_ref(),
        }
    }

    /// Get as sprite key if possible
    pub fn as_sprite(&self) -> Option<&SpriteKey> {
        match self {
            Self::Sprite(k) => Some(k),
            _ => None,
        }
    }

    /// Get as tween key if possible
    pub fn as_tween(&self) -> Option<&TweenKey> {
        match self {
            Self::Tween(k) => Some(k),
            _ => None,
        }
    }

    /// Get as event key if possible
    pub fn as_event(&self) -> Option<&EventKey> {
        match self {
            Self::Event(k) => Some(k),
            _ => None,
        }
    }

    /// Copy of this key under a different ID
    pub fn with_id(&self, id: KeyId) -> Key {
        let mut key = self.clone();
        match &mut key {
            Self::Sprite(k) => k.id = id,
            Self::Tween(k) => k.id = id,
            Self::Event(k) => k.id = id,
        }
        key
    }

    /// Apply a partial update.
    ///
    /// Fields the variant does not own are ignored, and the variant itself
    /// never changes. Non-finite times and durations are ignored too.
    pub fn apply(&self, patch: &KeyPatch) -> Key {
        let time = patch.time.filter(|t| t.is_finite()).map(|t| t.max(0.0));
        let mut key = self.clone();
        match &mut key {
            Self::Sprite(k) => {
                if let Some(time) = time {
                    k.time = time;
                }
                if let Some(frame) = patch.frame {
                    k.frame = frame;
                }
                if let Some(spritesheet_id) = &patch.spritesheet_id {
                    k.spritesheet_id = spritesheet_id.clone();
                }
                if let Some(flip) = patch.flip {
                    k.flip = flip;
                }
                if let Some(offset) = patch.offset {
                    k.offset = offset;
                }
                if let Some(anchors) = &patch.anchors {
                    k.anchors = anchors.clone();
                }
            }
            Self::Tween(k) => {
                if let Some(time) = time {
                    k.time = time;
                }
                if let Some(duration) = patch.duration.filter(|d| d.is_finite()) {
                    k.duration = duration.max(MIN_TWEEN_DURATION);
                }
                if let Some(name) = &patch.name {
                    k.name = name.clone();
                }
                if let Some(easing) = patch.easing {
                    k.easing = easing;
                }
                if let Some(anchors) = &patch.anchors {
                    k.anchors = anchors.clone();
                }
            }
            Self::Event(k) => {
                if let Some(time) = time {
                    k.time = time;
                }
                if let Some(name) = &patch.name {
                    k.name = name.clone();
                }
                if let Some(anchors) = &patch.anchors {
                    k.anchors = anchors.clone();
                }
            }
        }
        key
    }
}

impl From<SpriteKey> for Key {
    fn from(key: SpriteKey) -> Self {
        Self::Sprite(key)
    }
}

impl From<TweenKey> for Key {
    fn from(key: TweenKey) -> Self {
        Self::Tween(key)
    }
}

impl From<EventKey> for Key {
    fn from(key: EventKey) -> Self {
        Self::Event(key)
    }
}

/// Partial update of a key.
///
/// `Some(None)` on an optional field clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyPatch {
    /// New start time (clamped to `>= 0`)
    pub time: Option<f64>,
    /// New sprite frame
    pub frame: Option<[u32; 2]>,
    /// New sprite spritesheet
    pub spritesheet_id: Option<Option<SpritesheetId>>,
    /// New sprite flip mode
    pub flip: Option<Option<Flip>>,
    /// New sprite offset
    pub offset: Option<Option<Point>>,
    /// New tween duration (clamped to [`MIN_TWEEN_DURATION`])
    pub duration: Option<f64>,
    /// New tween/event name
    pub name: Option<String>,
    /// New tween easing
    pub easing: Option<Easing>,
    /// New anchors
    pub anchors: Option<Option<Anchors>>,
}

impl KeyPatch {
    /// Patch that moves a key
    pub fn time(time: f64) -> Self {
        Self {
            time: Some(time),
            ..Default::default()
        }
    }

    /// Patch that resizes a tween key
    pub fn duration(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            ..Default::default()
        }
    }

    /// Set the frame
    pub fn with_frame(mut self, frame: [u32; 2]) -> Self {
        self.frame = Some(frame);
        self
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the easing
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Set or clear the flip mode
    pub fn with_flip(mut self, flip: Option<Flip>) -> Self {
        self.flip = Some(flip);
        self
    }

    /// Set or clear the anchors
    pub fn with_anchors(mut self, anchors: Option<Anchors>) -> Self {
        self.anchors = Some(anchors);
        self
    }
}
