//! Player module for StemSplit
//!
//! This module implements the audio player widget: a play/pause state
//! machine over either a bound media element or a simulated clock, plus
//! the frame loop that drives simulated playback.

mod audio_player;
mod controller;
mod source;
mod state;
mod ticker;

pub use audio_player::{AudioPlayer, AudioPlayerBuilder};
pub use controller::PlaybackController;
pub use source::{AdvanceMode, ExternalSource, InternalClock, MediaElement, TimeSource};
pub use state::{PlaybackSnapshot, PlaybackStatus, SourceMode, VolumeLevel};
pub use ticker::FrameTicker;

use crate::waveform::StemColor;

/// Track shown in a player widget
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackInfo {
    /// Display name
    pub name: String,

    /// Location of the audio, if any
    pub url: Option<String>,

    /// Palette slot for the button and waveform
    pub color: StemColor,
}

impl TrackInfo {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            url: None,
            color: StemColor::default(),
        }
    }

    pub fn with_url<S: Into<String>>(mut self, url: S) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_color(mut self, color: StemColor) -> Self {
        self.color = color;
        self
    }
}

/// Player event for external event handling
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Playback started
    PlaybackStarted,

    /// Playback paused by the user
    PlaybackPaused,

    /// End of track reached
    PlaybackEnded,

    /// Position changed, in seconds
    PositionChanged { position: f64 },

    /// Duration became known, in seconds
    DurationChanged { duration: f64 },

    /// Volume changed (0 to 100)
    VolumeChanged { volume: u8 },
}

/// Player event handler trait
pub trait PlayerEventHandler: Send {
    /// Handle player event
    fn handle_event(&mut self, event: &PlayerEvent);
}

impl<F> PlayerEventHandler for F
where
    F: FnMut(&PlayerEvent) + Send,
{
    fn handle_event(&mut self, event: &PlayerEvent) {
        self(event)
    }
}
