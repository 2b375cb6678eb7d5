//! Playback controller for the StemSplit player
//!
//! The controller owns play/pause state, elapsed time, duration and volume
//! for one track. It depends only on a [`TimeSource`]: bound players forward
//! commands to their media element and receive `on_source_*` notifications,
//! simulated players are advanced by [`PlaybackController::tick`].

use crate::player::source::TimeSource;
use crate::player::state::{PlaybackSnapshot, PlaybackStatus, SourceMode, Timeline, VolumeLevel};
use crate::player::{PlayerEvent, PlayerEventHandler};
use crate::utils::config::PlayerConfig;
use log::{debug, info, warn};

/// State machine behind a single player widget
pub struct PlaybackController<S: TimeSource> {
    source: S,
    status: PlaybackStatus,
    timeline: Timeline,
    volume: u8,
    disposed: bool,
    event_handlers: Vec<Box<dyn PlayerEventHandler>>,
}

impl<S: TimeSource> PlaybackController<S> {
    /// Create a stopped controller at position zero
    pub fn new(source: S, config: &PlayerConfig) -> Self {
        Self {
            source,
            status: PlaybackStatus::Stopped,
            timeline: Timeline::new(config.default_duration),
            volume: config.default_volume.min(100),
            disposed: false,
            event_handlers: Vec::new(),
        }
    }

    /// Flip between playing and stopped, returning the new status
    pub fn toggle_play(&mut self) -> PlaybackStatus {
        if self.is_released("toggle play") {
            return self.status;
        }

        match self.status {
            PlaybackStatus::Playing => {
                self.status = PlaybackStatus::Stopped;
                self.source.stop();
                self.send_event(PlayerEvent::PlaybackPaused);
            }
            PlaybackStatus::Stopped => {
                self.status = PlaybackStatus::Playing;
                self.source.start();
                self.send_event(PlayerEvent::PlaybackStarted);
            }
        }

        debug!("Playback status: {:?}", self.status);
        self.status
    }

    /// Move the playhead, clamped to `[0, duration]`
    pub fn seek(&mut self, time: f64) {
        if self.is_released("seek") {
            return;
        }

        self.timeline.set_position(time);
        let position = self.timeline.position();
        if position != time {
            debug!("Seek to {} clamped to {}", time, position);
        }

        self.source.seek(position);
        self.send_event(PlayerEvent::PositionChanged { position });
    }

    /// Set volume, clamped to `[0, 100]`
    pub fn set_volume(&mut self, level: i32) {
        if self.is_released("set volume") {
            return;
        }

        let volume = level.clamp(0, 100) as u8;
        if i32::from(volume) != level {
            debug!("Volume {} clamped to {}", level, volume);
        }

        self.volume = volume;
        self.source.set_gain(f32::from(volume) / 100.0);
        self.send_event(PlayerEvent::VolumeChanged { volume });
    }

    /// Media element reported a new playhead position
    pub fn on_source_time_update(&mut self, time: f64) {
        if !self.is_bound("time update") {
            return;
        }

        self.timeline.set_position(time);
        let position = self.timeline.position();
        self.send_event(PlayerEvent::PositionChanged { position });
    }

    /// Media element finished loading metadata
    pub fn on_source_metadata_loaded(&mut self, duration: f64) {
        if !self.is_bound("metadata") {
            return;
        }

        if !(duration.is_finite() && duration > 0.0) {
            warn!("Ignoring unusable media duration {}", duration);
            return;
        }

        self.timeline.set_duration(duration);
        info!("Track duration: {:.1}s", duration);
        self.send_event(PlayerEvent::DurationChanged {
            duration: self.timeline.duration(),
        });
    }

    /// Media element reached the end of the track
    pub fn on_source_ended(&mut self) {
        if !self.is_bound("ended") {
            return;
        }

        self.status = PlaybackStatus::Stopped;
        self.send_event(PlayerEvent::PlaybackEnded);
    }

    /// Advance a simulated player by one frame
    ///
    /// Returns whether the player is still playing afterwards. Bound
    /// players and stopped players are left untouched.
    pub fn tick(&mut self) -> bool {
        if self.disposed || self.status != PlaybackStatus::Playing {
            return false;
        }

        let Some(delta_us) = self.source.advance() else {
            return true;
        };

        if self.timeline.advance(delta_us) {
            self.status = PlaybackStatus::Stopped;
            self.timeline.rewind();
            self.source.stop();
            debug!("Simulated playback reached the end");
            self.send_event(PlayerEvent::PlaybackEnded);
            return false;
        }

        self.send_event(PlayerEvent::PositionChanged {
            position: self.timeline.position(),
        });
        true
    }

    /// Stop for good; later commands, notifications and ticks have no effect
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }

        if self.status == PlaybackStatus::Playing {
            self.status = PlaybackStatus::Stopped;
            self.source.stop();
        }
        self.disposed = true;
        self.event_handlers.clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Elapsed time in seconds
    pub fn current_time(&self) -> f64 {
        self.timeline.position()
    }

    /// Track length in seconds
    pub fn duration(&self) -> f64 {
        self.timeline.duration()
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn volume_level(&self) -> VolumeLevel {
        VolumeLevel::from_volume(self.volume)
    }

    pub fn mode(&self) -> SourceMode {
        self.source.mode()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            status: self.status,
            current_time: self.current_time(),
            duration: self.duration(),
            volume: self.volume,
            mode: self.mode(),
        }
    }

    /// Add event handler
    pub fn add_event_handler(&mut self, handler: Box<dyn PlayerEventHandler>) {
        self.event_handlers.push(handler);
    }

    fn is_released(&self, operation: &str) -> bool {
        if self.disposed {
            debug!("Ignoring {} on a disposed player", operation);
        }
        self.disposed
    }

    fn is_bound(&self, notification: &str) -> bool {
        if self.is_released(notification) {
            return false;
        }

        let bound = self.mode() == SourceMode::Bound;
        if !bound {
            debug!("Ignoring {} notification on a simulated player", notification);
        }
        bound
    }

    /// Send event to handlers
    fn send_event(&mut self, event: PlayerEvent) {
        for handler in self.event_handlers.iter_mut() {
            handler.handle_event(&event);
        }
    }
}
