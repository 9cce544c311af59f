// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback state and time advance.

use serde::{Deserialize, Serialize};

/// Playback state of the editor preview
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    /// Whether the clock is running
    pub is_playing: bool,
    /// Playhead position in seconds
    pub current_time: f64,
    /// Speed multiplier
    pub playback_speed: f64,
}

impl PlaybackState {
    /// Create a stopped state at time zero
    pub fn new() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            playback_speed: 1.0,
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of advancing the playhead
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advance {
    /// New playhead position
    pub time: f64,
    /// Whether a non-looping animation reached its end
    pub finished: bool,
}

/// Advance the playhead by `delta` wall-clock seconds.
///
/// On reaching `duration` a looping animation wraps around; otherwise the
/// playhead clamps to `duration` and playback finishes.
pub fn advance(time: f64, delta: f64, speed: f64, duration: f64, looping: bool) -> Advance {
    let next = time + delta * speed;

    if duration <= 0.0 {
        return Advance {
            time: 0.0,
            finished: !looping,
        };
    }

    if next < duration {
        return Advance {
            time: next.max(0.0),
            finished: false,
        };
    }

    if looping {
        Advance {
            time: next % duration,
            finished: false,
        }
    } else {
        Advance {
            time: duration,
            finished: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_default_state() {
        let state = PlaybackState::default();
        assert!(!state.is_playing);
        assert_eq!(state.current_time, 0.0);
        assert_eq!(state.playback_speed, 1.0);
    }

    #[test]
    fn test_advance_within_duration() {
        let step = advance(0.25, 0.5, 1.0, 1.0, false);
        assert_eq!(step, Advance { time: 0.75, finished: false });
    }

    #[test]
    fn test_advance_applies_speed() {
        let step = advance(0.0, 0.1, 2.0, 1.0, true);
        assert_relative_eq!(step.time, 0.2);
    }

    #[test]
    fn test_advance_wraps_when_looping() {
        let step = advance(0.9, 0.3, 1.0, 1.0, true);
        assert_relative_eq!(step.time, 0.2, epsilon = 1e-12);
        assert!(!step.finished);
    }

    #[test]
    fn test_advance_clamps_without_loop() {
        let step = advance(0.9, 0.3, 1.0, 1.0, false);
        assert_eq!(step, Advance { time: 1.0, finished: true });
    }

    proptest! {
        #[test]
        fn advance_stays_in_bounds(
            time in 0.0f64..10.0,
            delta in 0.0f64..1.0,
            speed in 0.1f64..4.0,
            duration in 0.1f64..10.0,
            looping in any::<bool>(),
        ) {
            let time = time.min(duration);
            let step = advance(time, delta, speed, duration, looping);
            prop_assert!(step.time >= 0.0);
            prop_assert!(step.time <= duration);
            if looping {
                prop_assert!(!step.finished);
                prop_assert!(step.time < duration);
            }
        }
    }
}
