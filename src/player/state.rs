//! Playback state for the StemSplit player
//!
//! Seek targets, source updates and durations are stored exactly as given.
//! Frame steps are accumulated in whole microseconds on top of the last
//! explicit position so that repeated fixed steps land on the duration.

use serde::{Deserialize, Serialize};

const MICROS_PER_SEC: f64 = 1_000_000.0;

/// Convert seconds to whole microseconds, saturating at zero
pub(crate) fn secs_to_us(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * MICROS_PER_SEC).round() as u64
    } else {
        0
    }
}

/// Convert microseconds back to seconds
pub(crate) fn us_to_secs(us: u64) -> f64 {
    us as f64 / MICROS_PER_SEC
}

/// Play/pause state of a single player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// Not advancing; the initial state
    Stopped,

    /// Logically playing
    Playing,
}

/// Where time and duration come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceMode {
    /// A real media element reports time, duration and end of media
    Bound,

    /// No media element; the player advances its own clock per frame
    Simulated,
}

/// Volume indicator shown next to the volume slider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeLevel {
    Muted,
    Low,
    High,
}

impl VolumeLevel {
    pub fn from_volume(volume: u8) -> Self {
        match volume {
            0 => VolumeLevel::Muted,
            1..=49 => VolumeLevel::Low,
            _ => VolumeLevel::High,
        }
    }
}

/// Point-in-time copy of a player's state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub status: PlaybackStatus,

    /// Elapsed time in seconds
    pub current_time: f64,

    /// Track length in seconds
    pub duration: f64,

    /// Volume level (0 to 100)
    pub volume: u8,

    pub mode: SourceMode,
}

impl PlaybackSnapshot {
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Fraction of the track played, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn volume_level(&self) -> VolumeLevel {
        VolumeLevel::from_volume(self.volume)
    }
}

/// Clamp `seconds` into `[0, upper]`; NaN maps to the start of the track
fn clamp_seconds(seconds: f64, upper: f64) -> f64 {
    if seconds.is_nan() {
        0.0
    } else {
        seconds.clamp(0.0, upper)
    }
}

/// Position and length of the loaded track
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Timeline {
    /// Position set by the last seek, source update or rewind
    anchor: f64,

    /// Frame time accumulated since `anchor` was set
    advanced_us: u64,

    duration: f64,
}

impl Timeline {
    pub fn new(duration: f64) -> Self {
        Self {
            anchor: 0.0,
            advanced_us: 0,
            duration: if duration.is_finite() && duration > 0.0 {
                duration
            } else {
                0.0
            },
        }
    }

    /// Set the position, keeping it inside `[0, duration]`
    pub fn set_position(&mut self, seconds: f64) {
        self.anchor = clamp_seconds(seconds, self.duration);
        self.advanced_us = 0;
    }

    /// Caller guarantees a finite, positive duration
    pub fn set_duration(&mut self, seconds: f64) {
        let position = self.position();
        self.duration = seconds;
        self.set_position(position);
    }

    /// Advance by `delta_us`. Returns true once the end has been reached.
    pub fn advance(&mut self, delta_us: u64) -> bool {
        let advanced_us = self.advanced_us.saturating_add(delta_us);
        if self.anchor + us_to_secs(advanced_us) >= self.duration {
            self.set_position(self.duration);
            true
        } else {
            self.advanced_us = advanced_us;
            false
        }
    }

    pub fn rewind(&mut self) {
        self.set_position(0.0);
    }

    pub fn position(&self) -> f64 {
        if self.advanced_us == 0 {
            self.anchor
        } else {
            (self.anchor + us_to_secs(self.advanced_us)).min(self.duration)
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_conversion() {
        assert_eq!(secs_to_us(0.1), 100_000);
        assert_eq!(secs_to_us(204.0), 204_000_000);
        assert_eq!(secs_to_us(-1.0), 0);
        assert_eq!(secs_to_us(f64::INFINITY), 0);
        assert_eq!(us_to_secs(2_500_000), 2.5);
    }

    #[test]
    fn test_timeline_clamps_position() {
        let mut timeline = Timeline::new(10.0);
        timeline.set_position(12.0);
        assert_eq!(timeline.position(), 10.0);

        timeline.set_position(-4.0);
        assert_eq!(timeline.position(), 0.0);

        timeline.set_position(7.0);
        timeline.set_duration(5.0);
        assert_eq!(timeline.position(), 5.0);
    }

    #[test]
    fn test_timeline_advance_reaches_end_exactly() {
        let mut timeline = Timeline::new(2.0);
        for _ in 0..19 {
            assert!(!timeline.advance(100_000));
        }
        assert!(timeline.advance(100_000));
        assert_eq!(timeline.position(), timeline.duration());
    }

    #[test]
    fn test_timeline_keeps_exact_positions() {
        let mut timeline = Timeline::new(204.0);
        timeline.set_position(1.23456789);
        assert_eq!(timeline.position(), 1.23456789);

        timeline.set_position(4e-7);
        assert_eq!(timeline.position(), 4e-7);

        timeline.set_position(f64::NAN);
        assert_eq!(timeline.position(), 0.0);

        timeline.set_position(f64::INFINITY);
        assert_eq!(timeline.position(), 204.0);

        timeline.set_duration(123.456789012);
        assert_eq!(timeline.duration(), 123.456789012);
        assert_eq!(timeline.position(), 123.456789012);
    }

    #[test]
    fn test_timeline_steps_from_exact_seek() {
        let mut timeline = Timeline::new(0.5);
        timeline.set_position(0.25);
        assert!(!timeline.advance(100_000));
        assert!(timeline.position() > 0.25 && timeline.position() < 0.5);
        assert!(timeline.advance(200_000));
        assert_eq!(timeline.position(), 0.5);
    }

    #[test]
    fn test_volume_level() {
        assert_eq!(VolumeLevel::from_volume(0), VolumeLevel::Muted);
        assert_eq!(VolumeLevel::from_volume(1), VolumeLevel::Low);
        assert_eq!(VolumeLevel::from_volume(49), VolumeLevel::Low);
        assert_eq!(VolumeLevel::from_volume(50), VolumeLevel::High);
        assert_eq!(VolumeLevel::from_volume(100), VolumeLevel::High);
    }

    #[test]
    fn test_snapshot_progress() {
        let snapshot = PlaybackSnapshot {
            status: PlaybackStatus::Stopped,
            current_time: 51.0,
            duration: 204.0,
            volume: 75,
            mode: SourceMode::Simulated,
        };
        assert_eq!(snapshot.progress(), 0.25);
        assert!(!snapshot.is_playing());
        assert_eq!(snapshot.volume_level(), VolumeLevel::High);
    }
}
