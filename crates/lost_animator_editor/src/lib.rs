// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lost Animator editor core.
//!
//! Everything the sprite animation editor does short of drawing it:
//! - Undo/redo history with gesture batching
//! - The document controller and its editing operations
//! - Frame-paced playback with event firing
//! - Document loading and saving with relative image paths
//! - Decoded spritesheet image cache
//! - Editor settings
//!
//! ## Architecture
//!
//! The document is an immutable [`AnimationFile`](lost_animator_timeline::AnimationFile)
//! value. [`DocumentController`] produces a new value per edit and stores
//! it in a [`History`], so every undo step is a shared snapshot. Hosts plug
//! in dialogs, frame scheduling and a clock through the traits in
//! [`file_service`] and [`playback`].

pub mod config;
pub mod document;
pub mod file_service;
pub mod gesture;
pub mod history;
pub mod ids;
pub mod image_cache;
pub mod input;
pub mod playback;
pub mod state;

pub use config::{ConfigError, EditorConfig};
pub use document::{BrokenReference, DocumentController};
pub use file_service::{Dialogs, FileError, NoDialogs};
pub use gesture::{DragKind, KeyDrag};
pub use history::{History, HistoryStats};
pub use ids::{IdGenerator, SequentialIds, UuidGenerator};
pub use image_cache::{ImageCache, ImageError, SpriteImage};
pub use input::NumericInput;
pub use playback::{
    Clock, FiredEvent, FrameQueue, FrameScheduler, FrameToken, ManualClock, MonotonicClock,
    PlaybackDriver,
};
pub use state::{Selection, TimelineView};
