//! Playback session
//!
//! Binds one song to one loading-or-loaded audio resource and gives it a
//! uniform transport interface regardless of load latency.

use crate::{
    error::{PlaybackError, Result},
    resource::{AudioResource, EndSignal},
    types::PlayerState,
};
use icai_core::Song;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tracing::debug;

/// Resolves once a session started by `add_song` becomes ready
///
/// - `Ok(())` - the resource loaded and playback started
/// - `Err(PlaybackError::Load(_))` - the song could not be loaded
/// - `Err(PlaybackError::Superseded)` - the session was replaced first
#[derive(Debug)]
pub struct LoadTicket {
    rx: oneshot::Receiver<Result<()>>,
}

impl LoadTicket {
    pub(crate) fn new(rx: oneshot::Receiver<Result<()>>) -> Self {
        Self { rx }
    }

    /// Wait for the session to become ready or fail
    pub async fn ready(self) -> Result<()> {
        self.rx.await.unwrap_or(Err(PlaybackError::Superseded))
    }
}

/// The live binding between one song and its audio resource
///
/// Created pending; `attach` makes it ready. Dropping a session cancels a
/// pending load and releases an attached resource.
pub struct PlaybackSession {
    song: Arc<Song>,
    generation: u64,
    resource: Option<Box<dyn AudioResource>>,
    paused: bool,
    ended: bool,
    load_task: Option<AbortHandle>,
    ready: Option<oneshot::Sender<Result<()>>>,
}

impl PlaybackSession {
    /// Create a session whose resource is still loading
    pub(crate) fn pending(song: Arc<Song>, generation: u64) -> Self {
        Self {
            song,
            generation,
            resource: None,
            // Nothing is audible until the first play()
            paused: true,
            ended: false,
            load_task: None,
            ready: None,
        }
    }

    /// Track the task loading this session's resource
    pub(crate) fn set_load_task(&mut self, task: AbortHandle) {
        self.load_task = Some(task);
    }

    /// Report readiness to whoever is holding the matching `LoadTicket`
    pub(crate) fn set_ready_notifier(&mut self, ready: oneshot::Sender<Result<()>>) {
        self.ready = Some(ready);
    }

    /// Attach the loaded resource
    ///
    /// Applies `gain` and registers `end` before the resource can play.
    pub(crate) fn attach(&mut self, mut resource: Box<dyn AudioResource>, end: EndSignal, gain: f32) {
        resource.set_gain(gain);
        resource.on_ended(end);
        self.load_task = None;
        self.resource = Some(resource);
        debug!(
            "Session {} ready: '{}' ({}s)",
            self.generation,
            self.song.title(),
            self.length()
        );
    }

    pub(crate) fn resolve_ready(&mut self, result: Result<()>) {
        if let Some(ready) = self.ready.take() {
            // The ticket holder may have stopped listening
            ready.send(result).ok();
        }
    }

    /// Latch end-of-stream
    ///
    /// Returns `true` the first time only; a session that never became ready
    /// cannot end.
    pub(crate) fn mark_ended(&mut self) -> bool {
        if self.ended || self.resource.is_none() {
            return false;
        }
        self.ended = true;
        true
    }

    pub fn song(&self) -> &Arc<Song> {
        &self.song
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_ready(&self) -> bool {
        self.resource.is_some()
    }

    pub fn state(&self) -> PlayerState {
        match (&self.resource, self.paused) {
            (None, _) => PlayerState::Loading,
            (Some(_), true) => PlayerState::Paused,
            (Some(_), false) => PlayerState::Playing,
        }
    }

    /// Start or resume playback
    ///
    /// Fails with `NotReady` while loading; does nothing if already playing.
    pub fn play(&mut self) -> Result<()> {
        let resource = self.resource.as_mut().ok_or(PlaybackError::NotReady)?;
        if !self.paused {
            return Ok(());
        }
        resource.play()?;
        self.paused = false;
        Ok(())
    }

    /// Pause playback
    ///
    /// Does nothing unless currently playing.
    pub fn pause(&mut self) -> Result<()> {
        let Some(resource) = self.resource.as_mut() else {
            return Ok(());
        };
        if self.paused {
            return Ok(());
        }
        resource.pause()?;
        self.paused = true;
        Ok(())
    }

    /// Seek to `seconds`, clamped to `[0, length]`
    ///
    /// NaN seeks to the start.
    pub fn seek(&mut self, seconds: f64) -> Result<()> {
        let resource = self.resource.as_mut().ok_or(PlaybackError::NotReady)?;
        let duration = resource.duration();
        let seconds = if seconds.is_nan() { 0.0 } else { seconds };
        let target = Duration::from_secs_f64(seconds.clamp(0.0, duration.as_secs_f64()));
        resource.seek(target)
    }

    /// Position in whole seconds, 0 while loading
    pub fn position(&self) -> u64 {
        self.resource
            .as_ref()
            .map_or(0, |resource| whole_seconds(resource.current_time()))
    }

    /// Length in whole seconds, 0 while loading
    pub fn length(&self) -> u64 {
        self.resource
            .as_ref()
            .map_or(0, |resource| whole_seconds(resource.duration()))
    }

    /// Apply output gain (0.0-1.0) if the resource is loaded
    pub fn set_gain(&mut self, gain: f32) {
        if let Some(resource) = self.resource.as_mut() {
            resource.set_gain(gain.clamp(0.0, 1.0));
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        if let Some(task) = self.load_task.take() {
            debug!("Cancelling pending load for session {}", self.generation);
            task.abort();
        }
        if let Some(mut resource) = self.resource.take() {
            debug!("Releasing resource for session {}", self.generation);
            resource.release();
        }
        if self.ready.is_some() {
            debug!(
                "Session {} for '{}' superseded before it became ready",
                self.generation,
                self.song.title()
            );
        }
    }
}

fn whole_seconds(duration: Duration) -> u64 {
    duration.as_secs_f64().round() as u64
}
