//! StemSplit - playback core of the StemSplit demo
//!
//! The player widget is a small play/pause state machine that either
//! follows a bound media element or advances a simulated clock once per
//! frame. The separation module produces the (demo) stems it plays.

pub mod player;
pub mod separation;
pub mod utils;
pub mod waveform;

pub use player::{AudioPlayer, AudioPlayerBuilder, PlaybackController, PlaybackSnapshot, TrackInfo};
pub use utils::{Config, Result, StemSplitError};
