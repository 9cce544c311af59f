// SPDX-License-Identifier: MIT OR Apache-2.0
//! The animation document: spritesheets and animations.

use crate::id::{AnimationId, KeyId, SpritesheetId, TrackId};
use crate::key::{Key, SpriteKey};
use crate::track::{Track, TrackType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Current document format version
pub const FILE_VERSION: &str = "1.0";

/// Smallest allowed animation duration, in seconds
pub const MIN_ANIMATION_DURATION: f64 = 0.1;

/// Smallest allowed snap grid, in seconds
pub const MIN_GRID_SIZE: f64 = 0.01;

/// Default snap grid, in seconds
pub const DEFAULT_GRID_SIZE: f64 = 0.05;

/// Document validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Version this build cannot read
    #[error("Unsupported file version {0:?} (expected \"1.0\")")]
    UnsupportedVersion(String),

    /// Animation with a non-positive duration
    #[error("Animation {animation} has invalid duration {duration}")]
    InvalidAnimationDuration {
        /// Offending animation
        animation: AnimationId,
        /// Stored duration
        duration: f64,
    },

    /// Key with a negative or non-finite time
    #[error("Key {key} has invalid time {time}")]
    InvalidTime {
        /// Offending key
        key: KeyId,
        /// Stored time
        time: f64,
    },

    /// Tween key with a non-positive duration
    #[error("Tween key {key} has invalid duration {duration}")]
    InvalidTweenDuration {
        /// Offending key
        key: KeyId,
        /// Stored duration
        duration: f64,
    },

    /// Spritesheet with a zero tile dimension
    #[error("Spritesheet {0} has a zero tile size")]
    InvalidTileSize(SpritesheetId),

    /// Key stored on a track of another type
    #[error("Key {key} does not belong on {track_type:?} track {track}")]
    KeyTypeMismatch {
        /// Track holding the key
        track: TrackId,
        /// Track type
        track_type: TrackType,
        /// Offending key
        key: KeyId,
    },

    /// Two siblings share an ID
    #[error("Duplicate {kind} id {id}")]
    DuplicateId {
        /// Entity kind
        kind: &'static str,
        /// Repeated ID
        id: String,
    },
}

/// Result type for model validation
pub type Result<T> = std::result::Result<T, ModelError>;

/// A spritesheet image cut into a grid of tiles.
///
/// Decoded pixels are not part of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spritesheet {
    /// Unique spritesheet ID
    pub id: SpritesheetId,
    /// Display name (file name by default)
    pub name: String,
    /// Image location; absolute in memory, relative to the document on disk
    pub image_path: PathBuf,
    /// Tile width in pixels
    pub tile_width: u32,
    /// Tile height in pixels
    pub tile_height: u32,
}

impl Spritesheet {
    /// Create a spritesheet
    pub fn new(
        id: SpritesheetId,
        name: impl Into<String>,
        image_path: impl Into<PathBuf>,
        tile_width: u32,
        tile_height: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            image_path: image_path.into(),
            tile_width,
            tile_height,
        }
    }

    /// Grid `(columns, rows)` for an image of the given size
    pub fn grid_dimensions(&self, image_width: u32, image_height: u32) -> (u32, u32) {
        (
            image_width / self.tile_width.max(1),
            image_height / self.tile_height.max(1),
        )
    }

    /// Pixel rectangle `(x, y, w, h)` of a frame
    pub fn frame_rect(&self, frame: [u32; 2]) -> (u32, u32, u32, u32) {
        (
            frame[0].saturating_mul(self.tile_width),
            frame[1].saturating_mul(self.tile_height),
            self.tile_width,
            self.tile_height,
        )
    }

    /// Apply a partial update
    pub fn apply(&self, patch: &SpritesheetPatch) -> Spritesheet {
        let mut sheet = self.clone();
        if let Some(name) = &patch.name {
            sheet.name = name.clone();
        }
        if let Some(image_path) = &patch.image_path {
            sheet.image_path = image_path.clone();
        }
        if let Some(tile_width) = patch.tile_width {
            sheet.tile_width = tile_width.max(1);
        }
        if let Some(tile_height) = patch.tile_height {
            sheet.tile_height = tile_height.max(1);
        }
        sheet
    }
}

/// Partial update of a spritesheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpritesheetPatch {
    /// New name
    pub name: Option<String>,
    /// New image path
    pub image_path: Option<PathBuf>,
    /// New tile width (at least 1)
    pub tile_width: Option<u32>,
    /// New tile height (at least 1)
    pub tile_height: Option<u32>,
}

impl SpritesheetPatch {
    /// Patch that changes the tile size
    pub fn tile_size(width: u32, height: u32) -> Self {
        Self {
            tile_width: Some(width),
            tile_height: Some(height),
            ..Default::default()
        }
    }
}

fn default_snap_to_grid() -> bool {
    true
}

fn default_grid_size() -> f64 {
    DEFAULT_GRID_SIZE
}

/// A named animation built from parallel tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    /// Unique animation ID
    pub id: AnimationId,
    /// Animation name
    pub name: String,
    /// Whether playback wraps around
    #[serde(rename = "loop")]
    pub looping: bool,
    /// Length in seconds, independent of key positions
    pub duration: f64,
    /// Tracks, in display order
    #[serde(default)]
    pub tracks: Vec<Track>,
    /// Snap edits to the grid
    #[serde(default = "default_snap_to_grid")]
    pub snap_to_grid: bool,
    /// Snap grid in seconds
    #[serde(default = "default_grid_size")]
    pub grid_size: f64,
}

impl Animation {
    /// Create an empty looping one-second animation
    pub fn new(id: AnimationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            looping: true,
            duration: 1.0,
            tracks: Vec::new(),
            snap_to_grid: default_snap_to_grid(),
            grid_size: DEFAULT_GRID_SIZE,
        }
    }

    /// Get a track
    pub fn track(&self, track_id: &TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.id == track_id)
    }

    /// Get a track's position
    pub fn track_index(&self, track_id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == track_id)
    }

    /// First track of the given type
    pub fn first_track_of(&self, track_type: TrackType) -> Option<&Track> {
        self.tracks.iter().find(|t| t.track_type == track_type)
    }

    /// Get the duration based on track content
    pub fn content_duration(&self) -> f64 {
        self.tracks.iter().map(Track::duration).fold(0.0, f64::max)
    }

    /// Apply a partial update. Non-finite numbers are ignored.
    pub fn apply(&self, patch: &AnimationPatch) -> Animation {
        let mut animation = self.clone();
        if let Some(name) = &patch.name {
            animation.name = name.clone();
        }
        if let Some(looping) = patch.looping {
            animation.looping = looping;
        }
        if let Some(duration) = patch.duration.filter(|d| d.is_finite()) {
            animation.duration = duration.max(MIN_ANIMATION_DURATION);
        }
        if let Some(snap_to_grid) = patch.snap_to_grid {
            animation.snap_to_grid = snap_to_grid;
        }
        if let Some(grid_size) = patch.grid_size.filter(|g| g.is_finite()) {
            animation.grid_size = grid_size.max(MIN_GRID_SIZE);
        }
        animation
    }
}

/// Partial update of an animation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationPatch {
    /// New name
    pub name: Option<String>,
    /// New loop flag
    pub looping: Option<bool>,
    /// New duration (clamped to [`MIN_ANIMATION_DURATION`])
    pub duration: Option<f64>,
    /// New snap flag
    pub snap_to_grid: Option<bool>,
    /// New grid size (clamped to [`MIN_GRID_SIZE`])
    pub grid_size: Option<f64>,
}

impl AnimationPatch {
    /// Patch that changes the duration
    pub fn duration(duration: f64) -> Self {
        Self {
            duration: Some(duration),
            ..Default::default()
        }
    }

    /// Patch that renames
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// The versioned document.
///
/// Animations sit behind [`Arc`] so that a new document value shares every
/// animation an edit did not touch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationFile {
    /// Format version
    pub version: String,
    /// Spritesheets, in display order
    #[serde(default)]
    pub spritesheets: Vec<Spritesheet>,
    /// Animations, in display order
    #[serde(default)]
    pub animations: Vec<Arc<Animation>>,
}

impl PartialEq for AnimationFile {
    /// Shared animations compare by pointer before falling back to contents
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.spritesheets == other.spritesheets
            && self.animations.len() == other.animations.len()
            && self
                .animations
                .iter()
                .zip(&other.animations)
                .all(|(a, b)| Arc::ptr_eq(a, b) || a == b)
    }
}

impl Default for AnimationFile {
    fn default() -> Self {
        Self::new()
    }
}

fn check_unique<'a, I, T>(kind: &'static str, ids: I) -> Result<()>
where
    I: IntoIterator<Item = &'a T>,
    T: Eq + Hash + ToString + 'a,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ModelError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

fn check_time(key: &Key) -> Result<()> {
    let time = key.time();
    if !time.is_finite() || time < 0.0 {
        return Err(ModelError::InvalidTime {
            key: key.id().clone(),
            time,
        });
    }
    Ok(())
}

impl AnimationFile {
    /// Create an empty document
    pub fn new() -> Self {
        Self {
            version: FILE_VERSION.to_string(),
            spritesheets: Vec::new(),
            animations: Vec::new(),
        }
    }

    /// Get an animation
    pub fn animation(&self, id: &AnimationId) -> Option<&Animation> {
        self.animations.iter().find(|a| &a.id == id).map(Arc::as_ref)
    }

    /// Get an animation's position
    pub fn animation_index(&self, id: &AnimationId) -> Option<usize> {
        self.animations.iter().position(|a| &a.id == id)
    }

    /// Get a spritesheet
    pub fn spritesheet(&self, id: &SpritesheetId) -> Option<&Spritesheet> {
        self.spritesheets.iter().find(|s| &s.id == id)
    }

    /// Get a spritesheet's position
    pub fn spritesheet_index(&self, id: &SpritesheetId) -> Option<usize> {
        self.spritesheets.iter().position(|s| &s.id == id)
    }

    /// The spritesheet a sprite key draws from (first spritesheet by default)
    pub fn spritesheet_for_key(&self, key: &SpriteKey) -> Option<&Spritesheet> {
        match &key.spritesheet_id {
            Some(id) => self.spritesheet(id),
            None => self.spritesheets.first(),
        }
    }

    /// Check the document against the file schema
    pub fn validate(&self) -> Result<()> {
        if self.version != FILE_VERSION {
            return Err(ModelError::UnsupportedVersion(self.version.clone()));
        }

        check_unique("spritesheet", self.spritesheets.iter().map(|s| &s.id))?;
        for sheet in &self.spritesheets {
            if sheet.tile_width == 0 || sheet.tile_height == 0 {
                return Err(ModelError::InvalidTileSize(sheet.id.clone()));
            }
        }

        check_unique("animation", self.animations.iter().map(|a| &a.id))?;
        for animation in &self.animations {
            if !animation.duration.is_finite() || animation.duration <= 0.0 {
                return Err(ModelError::InvalidAnimationDuration {
                    animation: animation.id.clone(),
                    duration: animation.duration,
                });
            }

            check_unique("track", animation.tracks.iter().map(|t| &t.id))?;
            for track in &animation.tracks {
                check_unique("key", track.keys.iter().map(Key::id))?;
                for key in &track.keys {
                    if !track.accepts(key) {
                        return Err(ModelError::KeyTypeMismatch {
                            track: track.id.clone(),
                            track_type: track.track_type,
                            key: key.id().clone(),
                        });
                    }
                    check_time(key)?;
                    if let Key::Tween(tween) = key {
                        if !tween.duration.is_finite() || tween.duration <= 0.0 {
                            return Err(ModelError::InvalidTweenDuration {
                                key: tween.id.clone(),
                                duration: tween.duration,
                            });
                        }
                    }
                }
            }
        }

        Ok(())
    }
}
