//! Clock-driven audio resource
//!
//! Stands in for a real output stream: position is wall-clock time since
//! play, and a timer fires end-of-stream when the clock reaches the song's
//! duration.

use icai_playback::{AudioResource, EndSignal, PlaybackError, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

/// Audio resource that only keeps time
pub struct ClockResource {
    duration: Duration,
    /// Position reached before the current play stretch
    offset: Duration,
    /// Set while playing
    started_at: Option<Instant>,
    gain: f32,
    end: Arc<Mutex<Option<EndSignal>>>,
    timer: Option<JoinHandle<()>>,
}

impl ClockResource {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            offset: Duration::ZERO,
            started_at: None,
            gain: 1.0,
            end: Arc::new(Mutex::new(None)),
            timer: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.started_at.is_some()
    }

    /// Gain the resource would apply to its output
    pub fn gain(&self) -> f32 {
        self.gain
    }

    fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.current_time())
    }

    /// Schedule end-of-stream for when the clock runs out
    fn arm(&mut self) -> Result<()> {
        self.disarm();

        let runtime = Handle::try_current()
            .map_err(|e| PlaybackError::resource(format!("No tokio runtime for clock: {}", e)))?;
        let remaining = self.remaining();
        let end = Arc::clone(&self.end);

        trace!("Clock armed, {:?} remaining", remaining);
        self.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(remaining).await;
            let signal = end.lock().ok().and_then(|mut end| end.take());
            if let Some(signal) = signal {
                signal.fire();
            }
        }));
        Ok(())
    }

    fn disarm(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl AudioResource for ClockResource {
    fn play(&mut self) -> Result<()> {
        if self.is_playing() {
            return Ok(());
        }
        self.started_at = Some(Instant::now());
        if let Err(e) = self.arm() {
            self.started_at = None;
            return Err(e);
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.offset = self.current_time();
        self.started_at = None;
        self.disarm();
        Ok(())
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.offset = position.min(self.duration);
        if self.is_playing() {
            self.started_at = Some(Instant::now());
            return self.arm();
        }
        Ok(())
    }

    fn current_time(&self) -> Duration {
        let running = self
            .started_at
            .map_or(Duration::ZERO, |started| started.elapsed());
        (self.offset + running).min(self.duration)
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn set_gain(&mut self, gain: f32) {
        self.gain = gain.clamp(0.0, 1.0);
    }

    fn on_ended(&mut self, signal: EndSignal) {
        if let Ok(mut end) = self.end.lock() {
            *end = Some(signal);
        }
    }

    fn release(&mut self) {
        self.offset = self.current_time();
        self.started_at = None;
        self.disarm();
        if let Ok(mut end) = self.end.lock() {
            end.take();
        }
    }
}

impl Drop for ClockResource {
    fn drop(&mut self) {
        self.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn counting_signal() -> (EndSignal, mpsc::UnboundedReceiver<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let signal = EndSignal::new(move || {
            tx.send(()).ok();
        });
        (signal, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn position_follows_the_clock() {
        let mut clock = ClockResource::new(Duration::from_secs(60));
        assert_eq!(clock.current_time(), Duration::ZERO);

        clock.play().unwrap();
        tokio::time::advance(Duration::from_secs(12)).await;
        assert_eq!(clock.current_time(), Duration::from_secs(12));

        clock.pause().unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(clock.current_time(), Duration::from_secs(12));

        clock.play().unwrap();
        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(clock.current_time(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn fires_end_once_at_duration() {
        let mut clock = ClockResource::new(Duration::from_secs(3));
        let (signal, mut ended) = counting_signal();
        clock.on_ended(signal);

        clock.play().unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(ended.try_recv().is_ok());
        assert!(ended.try_recv().is_err());
        assert_eq!(clock.current_time(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_holds_back_the_end() {
        let mut clock = ClockResource::new(Duration::from_secs(3));
        let (signal, mut ended) = counting_signal();
        clock.on_ended(signal);

        clock.play().unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        clock.pause().unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(ended.try_recv().is_err());

        clock.play().unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(ended.try_recv().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn seek_reschedules_the_end() {
        let mut clock = ClockResource::new(Duration::from_secs(100));
        let (signal, mut ended) = counting_signal();
        clock.on_ended(signal);

        clock.play().unwrap();
        clock.seek(Duration::from_secs(99)).unwrap();
        assert_eq!(clock.current_time(), Duration::from_secs(99));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(ended.try_recv().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn seek_past_end_clamps() {
        let mut clock = ClockResource::new(Duration::from_secs(30));
        clock.seek(Duration::from_secs(45)).unwrap();
        assert_eq!(clock.current_time(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn release_drops_the_end_signal() {
        let mut clock = ClockResource::new(Duration::from_secs(3));
        let (signal, mut ended) = counting_signal();
        clock.on_ended(signal);

        clock.play().unwrap();
        clock.release();
        assert!(!clock.is_playing());

        tokio::time::sleep(Duration::from_secs(10)).await;
        // Sender went away with the signal, nothing was ever sent
        assert!(matches!(
            ended.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn play_outside_runtime_is_an_error() {
        let mut clock = ClockResource::new(Duration::from_secs(3));
        assert!(matches!(clock.play(), Err(PlaybackError::Resource(_))));
    }
}
