// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback and timeline view operations.
//!
//! None of these touch the undo history, except the snap settings, which
//! are also stored on the selected animation.

use super::DocumentController;
use crate::playback::{events_crossed, FiredEvent, FrameToken};
use crate::state::TimelineView;
use lost_animator_timeline::{advance, AnimationPatch};

/// Slowest playback speed multiplier
pub const MIN_PLAYBACK_SPEED: f64 = 0.1;

/// Fastest playback speed multiplier
pub const MAX_PLAYBACK_SPEED: f64 = 10.0;

pub(super) fn clamp_speed(speed: f64) -> f64 {
    if speed.is_finite() {
        speed.clamp(MIN_PLAYBACK_SPEED, MAX_PLAYBACK_SPEED)
    } else {
        1.0
    }
}

impl DocumentController {
    /// Start playing
    pub fn play(&mut self) {
        self.playback.is_playing = true;
        self.sync_clock();
    }

    /// Pause at the current time
    pub fn pause(&mut self) {
        self.playback.is_playing = false;
        self.sync_clock();
    }

    /// Toggle between playing and paused
    pub fn toggle_playback(&mut self) {
        if self.playback.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Stop and rewind to the start
    pub fn stop(&mut self) {
        self.playback.is_playing = false;
        self.playback.current_time = 0.0;
        self.sync_clock();
    }

    /// Move the playhead. Negative times clamp to zero.
    pub fn set_current_time(&mut self, time: f64) {
        self.playback.current_time = time.max(0.0);
    }

    /// Set the playback speed multiplier
    pub fn set_playback_speed(&mut self, speed: f64) {
        self.playback.playback_speed = clamp_speed(speed);
    }

    /// Keep exactly one frame request outstanding while playing an
    /// animation, and none otherwise
    pub(super) fn sync_clock(&mut self) {
        let should_run = self.playback.is_playing && self.selected_animation().is_some();
        if should_run && !self.driver.is_scheduled() {
            self.driver.start();
        } else if !should_run && self.driver.is_scheduled() {
            self.driver.cancel();
        }
    }

    /// Outstanding frame request, for hosts that poll
    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.driver.pending()
    }

    /// Current time of the playback clock
    pub fn clock_now(&self) -> f64 {
        self.driver.now()
    }

    /// Handle a display frame.
    ///
    /// Advances the playhead by the time since the previous frame and
    /// returns the event keys passed on the way. Stale tokens, and frames
    /// arriving after playback stopped, do nothing.
    pub fn on_frame(&mut self, token: FrameToken, timestamp: f64) -> Vec<FiredEvent> {
        let Some(delta) = self.driver.begin_frame(token, timestamp) else {
            return Vec::new();
        };
        if !self.playback.is_playing {
            self.driver.cancel();
            return Vec::new();
        }
        let Some(animation) = self.selected_animation().cloned() else {
            self.driver.cancel();
            return Vec::new();
        };

        let from = self.playback.current_time;
        let speed = self.playback.playback_speed;
        let step = advance(from, delta, speed, animation.duration, animation.looping);
        let wrapped = animation.looping && from + delta * speed >= animation.duration;
        let fired = events_crossed(&animation, from, step.time, wrapped, step.finished);

        self.playback.current_time = step.time;
        if step.finished {
            self.playback.is_playing = false;
            self.driver.cancel();
            tracing::debug!("Playback reached the end of {}", animation.name);
        } else {
            self.driver.reschedule();
        }

        for event in &fired {
            tracing::debug!("Event {} at {:.3}s", event.name, event.time);
        }
        fired
    }

    /// Set the timeline zoom in pixels per second
    pub fn set_timeline_zoom(&mut self, zoom: f64) {
        self.timeline.zoom = TimelineView::clamp_zoom(zoom);
    }

    /// Set the horizontal scroll. Negative values clamp to zero.
    pub fn set_timeline_scroll(&mut self, scroll_x: f64) {
        self.timeline.scroll_x = scroll_x.max(0.0);
    }

    /// Turn grid snapping on or off, here and on the selected animation
    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.timeline.snap_to_grid = enabled;
        let patch = AnimationPatch {
            snap_to_grid: Some(enabled),
            ..Default::default()
        };
        self.update_selected_animation(|animation| Some(animation.apply(&patch)));
    }

    /// Set the snap grid, here and on the selected animation
    pub fn set_grid_size(&mut self, grid_size: f64) {
        let grid_size = TimelineView::clamp_grid_size(grid_size);
        self.timeline.grid_size = grid_size;
        let patch = AnimationPatch {
            grid_size: Some(grid_size),
            ..Default::default()
        };
        self.update_selected_animation(|animation| Some(animation.apply(&patch)));
    }
}
