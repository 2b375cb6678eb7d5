//! Time sources for the playback controller
//!
//! A player is either bound to a real media element, which owns the
//! playback clock and reports back through notifications, or runs an
//! internal clock that is advanced once per rendered frame.

use crate::player::state::{secs_to_us, SourceMode};
use crate::utils::error::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Media playback primitive a player can be bound to
///
/// Implementations report time updates, loaded metadata and end of media
/// back to the owning player through its `on_source_*` methods.
pub trait MediaElement: Send {
    /// Start or resume playback
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self) -> Result<()>;

    /// Move the playhead, in seconds
    fn set_position(&mut self, seconds: f64) -> Result<()>;

    /// Set linear output gain (0.0 to 1.0)
    fn set_gain(&mut self, gain: f32) -> Result<()>;
}

impl<M: MediaElement + ?Sized> MediaElement for Box<M> {
    fn play(&mut self) -> Result<()> {
        (**self).play()
    }

    fn pause(&mut self) -> Result<()> {
        (**self).pause()
    }

    fn set_position(&mut self, seconds: f64) -> Result<()> {
        (**self).set_position(seconds)
    }

    fn set_gain(&mut self, gain: f32) -> Result<()> {
        (**self).set_gain(gain)
    }
}

/// How the internal clock advances per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceMode {
    /// Fixed step per frame regardless of elapsed wall time
    FixedStep,

    /// Real time elapsed since the previous frame
    WallClock,
}

/// Capability shared by both data sources
pub trait TimeSource: Send {
    fn mode(&self) -> SourceMode;

    /// Playback is starting
    fn start(&mut self);

    /// Playback is stopping
    fn stop(&mut self);

    /// The playhead moved to `seconds`
    fn seek(&mut self, seconds: f64);

    /// Output gain changed (0.0 to 1.0)
    fn set_gain(&mut self, gain: f32);

    /// Microseconds to advance for one frame, or `None` when the source
    /// keeps its own clock.
    fn advance(&mut self) -> Option<u64>;
}

impl<T: TimeSource + ?Sized> TimeSource for Box<T> {
    fn mode(&self) -> SourceMode {
        (**self).mode()
    }

    fn start(&mut self) {
        (**self).start()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn seek(&mut self, seconds: f64) {
        (**self).seek(seconds)
    }

    fn set_gain(&mut self, gain: f32) {
        (**self).set_gain(gain)
    }

    fn advance(&mut self) -> Option<u64> {
        (**self).advance()
    }
}

/// Source backed by a real media element
pub struct ExternalSource<M: MediaElement> {
    element: M,
}

impl<M: MediaElement> ExternalSource<M> {
    pub fn new(element: M) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &M {
        &self.element
    }

    fn report(result: Result<()>, command: &str) {
        // The widget never fails; a rejected command is only logged
        if let Err(e) = result {
            warn!("Media element rejected {}: {}", command, e);
        }
    }
}

impl<M: MediaElement> TimeSource for ExternalSource<M> {
    fn mode(&self) -> SourceMode {
        SourceMode::Bound
    }

    fn start(&mut self) {
        Self::report(self.element.play(), "play");
    }

    fn stop(&mut self) {
        Self::report(self.element.pause(), "pause");
    }

    fn seek(&mut self, seconds: f64) {
        Self::report(self.element.set_position(seconds), "seek");
    }

    fn set_gain(&mut self, gain: f32) {
        Self::report(self.element.set_gain(gain), "set gain");
    }

    fn advance(&mut self) -> Option<u64> {
        None
    }
}

/// Self-advancing clock used when no media element exists
#[derive(Debug)]
pub struct InternalClock {
    step_us: u64,
    mode: AdvanceMode,
    last_frame: Option<Instant>,
}

impl InternalClock {
    /// Create a clock advancing by `step` seconds per frame in fixed-step mode
    pub fn new(step: f64, mode: AdvanceMode) -> Self {
        Self {
            step_us: secs_to_us(step),
            mode,
            last_frame: None,
        }
    }

    pub fn advance_mode(&self) -> AdvanceMode {
        self.mode
    }
}

impl TimeSource for InternalClock {
    fn mode(&self) -> SourceMode {
        SourceMode::Simulated
    }

    fn start(&mut self) {
        self.last_frame = Some(Instant::now());
    }

    fn stop(&mut self) {
        self.last_frame = None;
    }

    fn seek(&mut self, _seconds: f64) {}

    fn set_gain(&mut self, gain: f32) {
        debug!("Simulated gain {:.2} has no output", gain);
    }

    fn advance(&mut self) -> Option<u64> {
        match self.mode {
            AdvanceMode::FixedStep => Some(self.step_us),
            AdvanceMode::WallClock => {
                let now = Instant::now();
                let elapsed = self
                    .last_frame
                    .replace(now)
                    .map(|last| now.duration_since(last).as_micros() as u64)
                    .unwrap_or(0);
                Some(elapsed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::StemSplitError;
    use std::time::Duration;

    struct FailingElement;

    impl MediaElement for FailingElement {
        fn play(&mut self) -> Result<()> {
            Err(StemSplitError::media_error("autoplay blocked"))
        }

        fn pause(&mut self) -> Result<()> {
            Ok(())
        }

        fn set_position(&mut self, _seconds: f64) -> Result<()> {
            Ok(())
        }

        fn set_gain(&mut self, _gain: f32) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_fixed_step_clock() {
        let mut clock = InternalClock::new(0.1, AdvanceMode::FixedStep);
        assert_eq!(clock.mode(), SourceMode::Simulated);
        clock.start();
        assert_eq!(clock.advance(), Some(100_000));
        assert_eq!(clock.advance(), Some(100_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wall_clock_uses_elapsed_time() {
        let mut clock = InternalClock::new(0.1, AdvanceMode::WallClock);
        clock.start();
        tokio::time::advance(Duration::from_millis(250)).await;
        assert_eq!(clock.advance(), Some(250_000));
        assert_eq!(clock.advance(), Some(0));
    }

    #[test]
    fn test_external_source_swallows_errors() {
        let mut source = ExternalSource::new(FailingElement);
        assert_eq!(source.mode(), SourceMode::Bound);
        source.start();
        assert_eq!(source.advance(), None);
    }
}
