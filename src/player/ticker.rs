//! Cancellable per-frame task driving simulated playback

use log::debug;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Repeating frame callback running on the tokio runtime
///
/// The callback runs once per `frame_interval` until it returns `false`,
/// [`FrameTicker::stop`] is called, or the ticker is dropped.
pub struct FrameTicker {
    handle: Option<JoinHandle<()>>,
}

impl FrameTicker {
    /// Spawn the frame loop on the current runtime
    ///
    /// Returns `None` when called outside a tokio runtime.
    pub fn spawn<F>(frame_interval: Duration, mut on_frame: F) -> Option<Self>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().ok()?;

        let handle = runtime.spawn(async move {
            let mut frames = interval(frame_interval);
            frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

            // First tick completes immediately; the first frame is one interval out
            frames.tick().await;

            loop {
                frames.tick().await;
                if !on_frame() {
                    break;
                }
            }
            debug!("Frame loop finished");
        });

        Some(Self {
            handle: Some(handle),
        })
    }

    /// Whether a frame is still scheduled
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel the pending frame without waiting
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Cancel and wait until the loop is gone
    pub async fn shutdown(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for FrameTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_ticker(limit: usize) -> (FrameTicker, Arc<AtomicUsize>) {
        let frames = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&frames);
        let ticker = FrameTicker::spawn(Duration::from_millis(16), move || {
            counter.fetch_add(1, Ordering::SeqCst) + 1 < limit
        })
        .expect("inside runtime");
        (ticker, frames)
    }

    #[test]
    fn test_spawn_outside_runtime() {
        assert!(FrameTicker::spawn(Duration::from_millis(16), || true).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_can_end_loop() {
        let (ticker, frames) = counting_ticker(3);
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(frames.load(Ordering::SeqCst), 3);
        assert!(!ticker.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_pending_frames() {
        let (ticker, frames) = counting_ticker(usize::MAX);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(ticker.is_active());

        ticker.shutdown().await;
        let seen = frames.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(frames.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_frames() {
        let (ticker, frames) = counting_ticker(usize::MAX);
        tokio::time::sleep(Duration::from_millis(50)).await;
        drop(ticker);

        tokio::task::yield_now().await;
        let seen = frames.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(frames.load(Ordering::SeqCst), seen);
    }
}
