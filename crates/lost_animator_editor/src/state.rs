// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor view state.
//!
//! Selection and timeline view settings are runtime state: they are not
//! part of the document and never enter the undo history.

use lost_animator_timeline::animation::DEFAULT_GRID_SIZE;
use lost_animator_timeline::{AnimationId, KeyId, TrackId, MIN_GRID_SIZE};

/// Smallest timeline zoom in pixels per second
pub const MIN_ZOOM: f64 = 50.0;

/// Largest timeline zoom in pixels per second
pub const MAX_ZOOM: f64 = 500.0;

/// Default timeline zoom in pixels per second
pub const DEFAULT_ZOOM: f64 = 200.0;

/// What the user has selected
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Nothing selected
    #[default]
    None,
    /// A whole animation
    Animation {
        /// Selected animation
        animation_id: AnimationId,
    },
    /// A track of an animation
    Track {
        /// Owning animation
        animation_id: AnimationId,
        /// Selected track
        track_id: TrackId,
    },
    /// A key on a track
    Key {
        /// Owning animation
        animation_id: AnimationId,
        /// Owning track
        track_id: TrackId,
        /// Selected key
        key_id: KeyId,
    },
}

impl Selection {
    /// Check if nothing is selected
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The animation the selection lives in
    pub fn animation_id(&self) -> Option<&AnimationId> {
        match self {
            Self::None => None,
            Self::Animation { animation_id }
            | Self::Track { animation_id, .. }
            | Self::Key { animation_id, .. } => Some(animation_id),
        }
    }

    /// The selected track, or the track holding the selected key
    pub fn track_id(&self) -> Option<&TrackId> {
        match self {
            Self::Track { track_id, .. } | Self::Key { track_id, .. } => Some(track_id),
            Self::None | Self::Animation { .. } => None,
        }
    }

    /// The selected key
    pub fn key_id(&self) -> Option<&KeyId> {
        match self {
            Self::Key { key_id, .. } => Some(key_id),
            _ => None,
        }
    }
}

/// Timeline view settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineView {
    /// Pixels per second
    pub zoom: f64,
    /// Horizontal scroll in pixels
    pub scroll_x: f64,
    /// Snap edits to the grid
    pub snap_to_grid: bool,
    /// Snap grid in seconds
    pub grid_size: f64,
}

impl TimelineView {
    /// Clamp a zoom value to the supported range
    pub fn clamp_zoom(zoom: f64) -> f64 {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    }

    /// Clamp a grid size to the smallest supported step
    pub fn clamp_grid_size(grid_size: f64) -> f64 {
        grid_size.max(MIN_GRID_SIZE)
    }

    /// Snap a time if snapping is on
    pub fn snap(&self, time: f64) -> f64 {
        if self.snap_to_grid {
            lost_animator_timeline::snap_to_grid(time, self.grid_size)
        } else {
            time
        }
    }
}

impl Default for TimelineView {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            scroll_x: 0.0,
            snap_to_grid: true,
            grid_size: DEFAULT_GRID_SIZE,
        }
    }
}
