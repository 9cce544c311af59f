// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time/pixel mapping and ruler ticks.

/// Default spacing between minor ruler ticks, in seconds
pub const MINOR_TICK_INTERVAL: f64 = 0.1;

/// Default spacing between major ruler ticks, in seconds
pub const MAJOR_TICK_INTERVAL: f64 = 0.5;

/// Extra ruler length past the animation end, in seconds
const RULER_PADDING: f64 = 0.5;

/// Convert time in seconds to a pixel offset
pub fn time_to_pixel(time: f64, pixels_per_second: f64) -> f64 {
    time * pixels_per_second
}

/// Convert a pixel offset to time in seconds
pub fn pixel_to_time(pixel: f64, pixels_per_second: f64) -> f64 {
    pixel / pixels_per_second
}

/// Snap a time to the nearest grid line.
///
/// A non-positive grid leaves the time unchanged.
pub fn snap_to_grid(time: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 {
        return time;
    }
    (time / grid_size).round() * grid_size
}

/// Format a time for display, e.g. `1.50s`
pub fn format_time(time: f64) -> String {
    format!("{time:.2}s")
}

fn round_millis(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// A tick on the timeline ruler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulerTick {
    /// Pixel offset from the timeline origin
    pub position: f64,
    /// Time in seconds, rounded to milliseconds
    pub time: f64,
    /// Whether this is a labelled major tick
    pub is_major: bool,
}

/// Generate ruler ticks covering `duration` plus a little padding.
///
/// Times are rounded to milliseconds so accumulated float drift never
/// drops a major tick.
pub fn generate_ruler_ticks(
    duration: f64,
    pixels_per_second: f64,
    minor_interval: f64,
    major_interval: f64,
) -> Vec<RulerTick> {
    if minor_interval <= 0.0 || !duration.is_finite() {
        return Vec::new();
    }

    let max_time = (duration.max(0.0) / minor_interval).ceil() * minor_interval + RULER_PADDING;
    let mut ticks = Vec::new();
    let mut step = 0u32;

    loop {
        let time = round_millis(f64::from(step) * minor_interval);
        if time > max_time + 1e-9 {
            break;
        }
        let is_major = major_interval > 0.0 && {
            let remainder = round_millis(time % major_interval);
            remainder < 0.001 || major_interval - remainder < 0.001
        };
        ticks.push(RulerTick {
            position: time_to_pixel(time, pixels_per_second),
            time,
            is_major,
        });
        step += 1;
    }

    ticks
}
