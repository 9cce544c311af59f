// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame-paced playback driver.
//!
//! While playing, exactly one frame request is outstanding. Each frame
//! measures the wall-clock delta since the previous one, advances the
//! playhead and requests the next frame only if still playing. Pausing
//! cancels the outstanding request, and a frame arriving with a stale token
//! is ignored, so no tick ever lands after playback stopped.

use lost_animator_timeline::{Animation, Key, KeyId, TrackId, TrackType};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Handle for one requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

impl FrameToken {
    /// Raw token number
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Schedules "next display frame" callbacks
pub trait FrameScheduler: Send {
    /// Ask for one frame callback
    fn request_frame(&mut self) -> FrameToken;

    /// Withdraw a request that has not fired yet
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Monotonic time source in seconds
pub trait Clock: Send {
    /// Current time
    fn now(&self) -> f64;
}

/// [`Clock`] over [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock starting at zero
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Hand-driven clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time: Arc<Mutex<f64>>,
}

impl ManualClock {
    /// Create a clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to a time
    pub fn set(&self, time: f64) {
        *self.time.lock() = time;
    }

    /// Move forward by `seconds`
    pub fn advance(&self, seconds: f64) {
        *self.time.lock() += seconds;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.time.lock()
    }
}

#[derive(Debug, Default)]
struct QueueState {
    next: u64,
    pending: Option<FrameToken>,
}

/// Scheduler the host polls once per display frame.
///
/// Clones share the same queue, so the host keeps one handle while the
/// editor owns another.
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    state: Arc<Mutex<QueueState>>,
}

impl FrameQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// The request waiting to fire, if any
    pub fn pending(&self) -> Option<FrameToken> {
        self.state.lock().pending
    }

    /// Take the request waiting to fire
    pub fn take(&self) -> Option<FrameToken> {
        self.state.lock().pending.take()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameToken {
        let mut state = self.state.lock();
        state.next += 1;
        let token = FrameToken(state.next);
        state.pending = Some(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        let mut state = self.state.lock();
        if state.pending == Some(token) {
            state.pending = None;
        }
    }
}

/// An event key the playhead passed during a frame
#[derive(Debug, Clone, PartialEq)]
pub struct FiredEvent {
    /// Event track
    pub track_id: TrackId,
    /// Event key
    pub key_id: KeyId,
    /// Event name
    pub name: String,
    /// Key time
    pub time: f64,
}

/// Event keys the playhead crossed moving from `from` to `to`.
///
/// Keys at `from` count and keys at `to` wait for the next frame, unless
/// playback ended there. A wrapped frame covers the tail of the animation
/// and then its start.
pub fn events_crossed(
    animation: &Animation,
    from: f64,
    to: f64,
    wrapped: bool,
    finished: bool,
) -> Vec<FiredEvent> {
    let mut fired = Vec::new();

    for track in animation
        .tracks
        .iter()
        .filter(|t| t.track_type == TrackType::Event)
    {
        let mut collect = |start: f64, end: f64, include_end: bool| {
            for key in track.keys_in_range(start, end) {
                if let Key::Event(event) = key {
                    if include_end || event.time < end {
                        fired.push(FiredEvent {
                            track_id: track.id.clone(),
                            key_id: event.id.clone(),
                            name: event.name.clone(),
                            time: event.time,
                        });
                    }
                }
            }
        };

        if wrapped {
            collect(from, animation.duration, false);
            collect(0.0, to, false);
        } else {
            collect(from, to, finished);
        }
    }

    fired
}

/// Owns the outstanding frame request and the previous frame time
pub struct PlaybackDriver {
    scheduler: Box<dyn FrameScheduler>,
    clock: Box<dyn Clock>,
    pending: Option<FrameToken>,
    last_frame: Option<f64>,
}

impl PlaybackDriver {
    /// Create a driver over a scheduler and clock
    pub fn new(scheduler: Box<dyn FrameScheduler>, clock: Box<dyn Clock>) -> Self {
        Self {
            scheduler,
            clock,
            pending: None,
            last_frame: None,
        }
    }

    /// Start a run: remember the current time and request the first frame
    pub fn start(&mut self) {
        self.cancel();
        self.last_frame = Some(self.clock.now());
        self.pending = Some(self.scheduler.request_frame());
    }

    /// Stop the run and withdraw the outstanding request
    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel_frame(token);
        }
        self.last_frame = None;
    }

    /// Accept a frame.
    ///
    /// Returns the seconds elapsed since the previous frame, or `None` when
    /// `token` is not the outstanding request.
    pub fn begin_frame(&mut self, token: FrameToken, timestamp: f64) -> Option<f64> {
        if self.pending != Some(token) {
            tracing::trace!("Ignoring stale frame {}", token.get());
            return None;
        }
        self.pending = None;

        let previous = self.last_frame.unwrap_or(timestamp);
        self.last_frame = Some(timestamp);
        Some((timestamp - previous).max(0.0))
    }

    /// Request the next frame of the current run
    pub fn reschedule(&mut self) {
        self.pending = Some(self.scheduler.request_frame());
    }

    /// Whether a frame request is outstanding
    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }

    /// The outstanding frame request
    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Current clock time
    pub fn now(&self) -> f64 {
        self.clock.now()
    }
}

impl Default for PlaybackDriver {
    fn default() -> Self {
        Self::new(Box::new(FrameQueue::new()), Box::new(MonotonicClock::new()))
    }
}

impl std::fmt::Debug for PlaybackDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackDriver")
            .field("pending", &self.pending)
            .field("last_frame", &self.last_frame)
            .finish_non_exhaustive()
    }
}
