// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation timeline model for Lost Animator.
//!
//! This crate provides the versioned document and its time rules:
//! - Spritesheets and animations
//! - Sprite, tween and event tracks
//! - Typed keys with anchors
//! - Duration and active-key derivation
//! - Ruler ticks and time/pixel mapping
//! - Playback advance (loop/clamp)
//!
//! ## Architecture
//!
//! Everything here is a plain value or a pure function. Mutation and
//! undo history live in the editor crate, which produces new
//! [`AnimationFile`] values from the ones defined here.

pub mod animation;
pub mod id;
pub mod key;
pub mod playback;
pub mod ruler;
pub mod track;

pub use animation::{
    Animation, AnimationFile, AnimationPatch, ModelError, Spritesheet, SpritesheetPatch,
    FILE_VERSION, MIN_ANIMATION_DURATION, MIN_GRID_SIZE,
};
pub use id::{AnimationId, KeyId, SpritesheetId, TrackId};
pub use key::{
    Anchors, Easing, EventKey, Flip, Key, KeyPatch, Point, SpriteKey, TweenKey,
    MIN_TWEEN_DURATION,
};
pub use playback::{advance, Advance, PlaybackState};
pub use ruler::{
    format_time, generate_ruler_ticks, pixel_to_time, snap_to_grid, time_to_pixel, RulerTick,
};
pub use track::{Track, TrackType, EVENT_WINDOW};
