//! High-level audio player widget for StemSplit
//!
//! Wraps a [`PlaybackController`] with the frame loop that advances
//! simulated playback. The loop is running exactly while a simulated
//! player is playing and is cancelled on pause, end of track, disposal
//! and drop.

use crate::player::{
    ExternalSource, FrameTicker, InternalClock, MediaElement, PlaybackController,
    PlaybackSnapshot, PlaybackStatus, PlayerEventHandler, SourceMode, TimeSource, TrackInfo,
};
use crate::utils::config::PlayerConfig;
use crate::waveform::Waveform;
use log::{debug, info};
use parking_lot::Mutex;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

type SharedController = Arc<Mutex<PlaybackController<Box<dyn TimeSource>>>>;

/// Audio player builder for customized configuration
pub struct AudioPlayerBuilder {
    track: TrackInfo,
    config: PlayerConfig,
    element: Option<Box<dyn MediaElement>>,
    event_handlers: Vec<Box<dyn PlayerEventHandler>>,
}

impl AudioPlayerBuilder {
    /// Create a new builder with default settings
    pub fn new(track: TrackInfo) -> Self {
        Self {
            track,
            config: PlayerConfig::default(),
            element: None,
            event_handlers: Vec::new(),
        }
    }

    /// Set player configuration
    pub fn with_config(mut self, config: PlayerConfig) -> Self {
        self.config = config;
        self
    }

    /// Bind to a real media element
    pub fn with_media_element(mut self, element: Box<dyn MediaElement>) -> Self {
        self.element = Some(element);
        self
    }

    /// Add an event handler
    pub fn with_event_handler(mut self, handler: Box<dyn PlayerEventHandler>) -> Self {
        self.event_handlers.push(handler);
        self
    }

    /// Mount the player
    pub fn build(self) -> AudioPlayer {
        let source: Box<dyn TimeSource> = match self.element {
            Some(element) => Box::new(ExternalSource::new(element)),
            None => {
                if let Some(url) = &self.track.url {
                    debug!("No media element for {}, simulating playback", url);
                }
                Box::new(InternalClock::new(
                    self.config.tick_step,
                    self.config.advance_mode,
                ))
            }
        };

        let mut controller = PlaybackController::new(source, &self.config);
        for handler in self.event_handlers {
            controller.add_event_handler(handler);
        }

        info!("Mounted player for {} ({:?})", self.track.name, controller.mode());

        AudioPlayer {
            track: self.track,
            controller: Arc::new(Mutex::new(controller)),
            ticker: None,
            frame_interval: Duration::from_millis(self.config.frame_interval_ms),
            frame_epoch: Arc::new(AtomicU64::new(0)),
            frames_delivered: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Audio player widget
pub struct AudioPlayer {
    track: TrackInfo,
    controller: SharedController,
    ticker: Option<FrameTicker>,
    frame_interval: Duration,

    /// Bumped under the controller lock on every play state transition.
    /// A frame callback only ticks while its epoch is current.
    frame_epoch: Arc<AtomicU64>,

    /// Frame callbacks run by any loop this player has spawned
    frames_delivered: Arc<AtomicU64>,
}

impl AudioPlayer {
    /// Mount a simulated player with default configuration
    pub fn simulated(track: TrackInfo) -> Self {
        AudioPlayerBuilder::new(track).build()
    }

    pub fn track(&self) -> &TrackInfo {
        &self.track
    }

    /// Play/pause button
    pub fn toggle_play(&mut self) -> PlaybackStatus {
        let status = {
            let mut controller = self.controller.lock();
            let status = controller.toggle_play();
            self.frame_epoch.fetch_add(1, Ordering::SeqCst);
            status
        };
        self.sync_ticker();
        status
    }

    /// Seek slider
    pub fn seek(&self, time: f64) {
        self.controller.lock().seek(time);
    }

    /// Volume slider
    pub fn set_volume(&self, level: i32) {
        self.controller.lock().set_volume(level);
    }

    pub fn on_source_time_update(&self, time: f64) {
        self.controller.lock().on_source_time_update(time);
    }

    pub fn on_source_metadata_loaded(&self, duration: f64) {
        self.controller.lock().on_source_metadata_loaded(duration);
    }

    pub fn on_source_ended(&mut self) {
        {
            let mut controller = self.controller.lock();
            controller.on_source_ended();
            self.frame_epoch.fetch_add(1, Ordering::SeqCst);
        }
        self.sync_ticker();
    }

    /// Advance one frame by hand, for hosts that drive their own frame loop
    pub fn tick(&mut self) -> bool {
        let playing = self.controller.lock().tick();
        if !playing {
            self.sync_ticker();
        }
        playing
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.controller.lock().snapshot()
    }

    pub fn mode(&self) -> SourceMode {
        self.controller.lock().mode()
    }

    /// Whether a frame loop is currently scheduled
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(FrameTicker::is_active)
    }

    /// Shared count of frame callbacks run so far, including ones that
    /// found their loop already superseded. Stays readable after the
    /// player is gone.
    pub fn frame_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.frames_delivered)
    }

    /// Subscribe to player events
    pub fn subscribe(&self, handler: Box<dyn PlayerEventHandler>) {
        self.controller.lock().add_event_handler(handler);
    }

    /// Waveform for the current position
    pub fn waveform<R: Rng + ?Sized>(&self, rng: &mut R) -> Waveform {
        let snapshot = self.snapshot();
        Waveform::render(snapshot.current_time, snapshot.duration, self.track.color, rng)
    }

    /// Unmount the player, waiting until no frame is scheduled
    pub async fn dispose(mut self) -> PlaybackSnapshot {
        let snapshot = {
            let mut controller = self.controller.lock();
            controller.dispose();
            self.frame_epoch.fetch_add(1, Ordering::SeqCst);
            controller.snapshot()
        };

        if let Some(ticker) = self.ticker.take() {
            ticker.shutdown().await;
        }

        info!("Unmounted player for {}", self.track.name);
        snapshot
    }

    /// Cancel the current frame loop and start a fresh one if the
    /// controller is now playing a simulated track
    fn sync_ticker(&mut self) {
        let (playing, mode) = {
            let controller = self.controller.lock();
            (controller.is_playing(), controller.mode())
        };

        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
        }

        if !(playing && mode == SourceMode::Simulated) {
            return;
        }

        self.ticker = FrameTicker::spawn(self.frame_interval, self.frame_callback());
        if self.ticker.is_none() {
            debug!("No async runtime; {} advances only on manual ticks", self.track.name);
        }
    }

    /// Frame callback bound to the current play epoch
    ///
    /// An aborted loop can still be parked on the controller lock; once
    /// it gets the lock after a transition it sees a newer epoch and ends
    /// without ticking.
    fn frame_callback(&self) -> impl FnMut() -> bool + Send + 'static {
        let controller = Arc::clone(&self.controller);
        let frame_epoch = Arc::clone(&self.frame_epoch);
        let frames_delivered = Arc::clone(&self.frames_delivered);
        let epoch = frame_epoch.load(Ordering::SeqCst);

        move || {
            frames_delivered.fetch_add(1, Ordering::Relaxed);
            let mut controller = controller.lock();
            if frame_epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            controller.tick()
        }
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        {
            let mut controller = self.controller.lock();
            controller.dispose();
            self.frame_epoch.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_selects_mode() {
        let player = AudioPlayer::simulated(TrackInfo::new("drums.wav"));
        assert_eq!(player.mode(), SourceMode::Simulated);
        assert_eq!(player.snapshot().duration, 204.0);
        assert_eq!(player.snapshot().volume, 75);
    }

    #[test]
    fn test_manual_ticks_without_runtime() {
        let config = PlayerConfig {
            default_duration: 0.3,
            ..PlayerConfig::default()
        };
        let mut player = AudioPlayerBuilder::new(TrackInfo::new("bass.wav"))
            .with_config(config)
            .build();

        assert_eq!(player.toggle_play(), PlaybackStatus::Playing);
        assert!(!player.is_ticking());

        assert!(player.tick());
        assert!(player.tick());
        assert!(!player.tick());

        let snapshot = player.snapshot();
        assert!(!snapshot.is_playing());
        assert_eq!(snapshot.current_time, 0.0);
    }

    #[test]
    fn test_superseded_frame_callback_does_not_tick() {
        let mut player = AudioPlayer::simulated(TrackInfo::new("guitar.wav"));
        player.toggle_play();

        let mut superseded = player.frame_callback();
        player.toggle_play();
        player.toggle_play();
        assert!(player.snapshot().is_playing());

        assert!(!superseded());
        assert_eq!(player.snapshot().current_time, 0.0);

        let mut current = player.frame_callback();
        assert!(current());
        assert_eq!(player.snapshot().current_time, 0.1);
        assert_eq!(player.frame_counter().load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_frame_callback_inert_after_drop() {
        let mut player = AudioPlayer::simulated(TrackInfo::new("piano.wav"));
        player.toggle_play();
        let mut callback = player.frame_callback();
        let controller = Arc::clone(&player.controller);
        drop(player);

        assert!(!callback());
        assert_eq!(controller.lock().current_time(), 0.0);
        assert!(controller.lock().is_disposed());
    }
}
