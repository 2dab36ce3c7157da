//! Player controller - the playback state machine
//!
//! Composes the [`Queue`] and the single [`PlaybackSession`] and owns every
//! transition between them:
//!
//! | Event                   | From      | To                     |
//! |-------------------------|-----------|------------------------|
//! | add song                | Empty     | Loading, then Playing  |
//! | add song                | non-Empty | unchanged (queued)     |
//! | play                    | Paused    | Playing                |
//! | pause                   | Playing   | Paused                 |
//! | end of stream / skip    | any       | Loading or Empty       |
//! | stop                    | any       | Empty                  |
//!
//! The controller is a plain single-writer struct. Asynchronous work (loads,
//! end-of-stream) comes back as [`Signal`]s tagged with the session
//! generation that produced them; signals from a superseded session are
//! discarded, so a slow load can never resurrect a song the user moved past.

use crate::{
    error::{LoadError, Result},
    events::PlayerEvent,
    queue::Queue,
    resource::{AudioResource, EndSignal, ResourceLoader},
    session::{LoadTicket, PlaybackSession},
    types::{PlayerConfig, PlayerState, PlayerStatus},
    volume::Volume,
};
use icai_core::Song;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

/// Asynchronous completions delivered back to the controller
pub(crate) enum Signal {
    /// A resource load finished, successfully or not
    Loaded {
        generation: u64,
        result: std::result::Result<Box<dyn AudioResource>, LoadError>,
    },

    /// A resource reached end of stream
    Ended { generation: u64 },
}

/// Outcome of [`PlayerController::add_song`]
#[derive(Debug)]
pub enum Enqueued {
    /// The player was empty; the song is loading as the new session
    Started(LoadTicket),

    /// Something is already playing; the song waits in the queue
    Queued { position: usize },
}

/// Playback state machine
pub struct PlayerController {
    loader: Arc<dyn ResourceLoader>,
    queue: Queue,
    session: Option<PlaybackSession>,
    volume: Volume,
    /// Bumped for every new session
    generation: u64,
    signals: mpsc::UnboundedSender<Signal>,
    events: broadcast::Sender<PlayerEvent>,
}

impl PlayerController {
    pub(crate) fn new(
        config: &PlayerConfig,
        loader: Arc<dyn ResourceLoader>,
        signals: mpsc::UnboundedSender<Signal>,
        events: broadcast::Sender<PlayerEvent>,
    ) -> Self {
        Self {
            loader,
            queue: Queue::new(),
            session: None,
            volume: Volume::new(config.volume),
            generation: 0,
            signals,
            events,
        }
    }

    // ===== Commands =====

    /// Add a song
    ///
    /// Starts a session straight away if nothing is loaded, otherwise inserts
    /// into the queue at `index` (`None` appends, out of range clamps).
    pub fn add_song(&mut self, song: Arc<Song>, index: Option<usize>) -> Enqueued {
        if self.session.is_none() {
            return Enqueued::Started(self.start_session(song));
        }

        let position = self.queue.insert(song, index);
        self.emit(PlayerEvent::QueueChanged {
            length: self.queue.len(),
        });
        Enqueued::Queued { position }
    }

    /// Remove the queued song at `index`
    ///
    /// Never touches the current session. Out of range does nothing.
    pub fn remove_song(&mut self, index: usize) -> Option<Arc<Song>> {
        let removed = self.queue.remove(index)?;
        debug!("Removed '{}' from queue position {}", removed.title(), index);
        self.emit(PlayerEvent::QueueChanged {
            length: self.queue.len(),
        });
        Some(removed)
    }

    /// Resume playback
    ///
    /// No-op when empty or already playing; `NotReady` while loading.
    pub fn play(&mut self) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        let before = session.state();
        session.play()?;
        self.notify_state(before);
        Ok(())
    }

    /// Pause playback
    ///
    /// No-op unless playing.
    pub fn pause(&mut self) -> Result<()> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        let before = session.state();
        session.pause()?;
        self.notify_state(before);
        Ok(())
    }

    /// Seek the current session
    ///
    /// No-op when empty; `NotReady` while loading.
    pub fn seek(&mut self, seconds: f64) -> Result<()> {
        match self.session.as_mut() {
            Some(session) => session.seek(seconds),
            None => Ok(()),
        }
    }

    /// Set volume (0-100), applied to the current and all future sessions
    pub fn set_volume(&mut self, level: u8) {
        self.volume.set_level(level);
        if let Some(session) = self.session.as_mut() {
            session.set_gain(self.volume.gain());
        }
        self.emit(PlayerEvent::VolumeChanged {
            level: self.volume.level(),
        });
    }

    /// Abandon the current song and advance as if it had ended
    pub fn skip(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        info!("Skipping '{}'", session.song().title());
        self.advance();
    }

    /// Clear the queue and tear down the session
    pub fn stop(&mut self) {
        if !self.queue.is_empty() {
            self.queue.clear();
            self.emit(PlayerEvent::QueueChanged { length: 0 });
        }
        self.teardown();
    }

    // ===== Queries =====

    pub fn now_playing(&self) -> Option<Arc<Song>> {
        self.session
            .as_ref()
            .map(|session| Arc::clone(session.song()))
    }

    /// Position in whole seconds, 0 when nothing is ready
    pub fn position(&self) -> u64 {
        self.session.as_ref().map_or(0, PlaybackSession::position)
    }

    /// Length in whole seconds, 0 when nothing is ready
    pub fn length(&self) -> u64 {
        self.session.as_ref().map_or(0, PlaybackSession::length)
    }

    pub fn state(&self) -> PlayerState {
        self.session
            .as_ref()
            .map_or(PlayerState::Empty, PlaybackSession::state)
    }

    /// Queued songs in playback order
    pub fn queue(&self) -> Vec<Arc<Song>> {
        self.queue.to_vec()
    }

    pub fn volume(&self) -> u8 {
        self.volume.level()
    }

    pub fn status(&self) -> PlayerStatus {
        PlayerStatus {
            state: self.state(),
            now_playing: self.now_playing(),
            position: self.position(),
            length: self.length(),
            volume: self.volume.level(),
            queue_length: self.queue.len(),
        }
    }

    // ===== Asynchronous completions =====

    pub(crate) fn handle_signal(&mut self, signal: Signal) {
        match signal {
            Signal::Loaded { generation, result } => self.on_loaded(generation, result),
            Signal::Ended { generation } => self.on_ended(generation),
        }
    }

    fn on_loaded(
        &mut self,
        generation: u64,
        result: std::result::Result<Box<dyn AudioResource>, LoadError>,
    ) {
        let pending = self
            .session
            .as_ref()
            .is_some_and(|session| session.generation() == generation && !session.is_ready());
        if !pending {
            debug!("Discarding load result for superseded session {}", generation);
            if let Ok(mut resource) = result {
                resource.release();
            }
            return;
        }

        let end = self.end_signal(generation);
        let gain = self.volume.gain();
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let started = result.map_err(Into::into).and_then(|resource| {
            session.attach(resource, end, gain);
            session.play()
        });

        match started {
            Ok(()) => {
                info!("Playing '{}'", session.song().title());
                session.resolve_ready(Ok(()));
                self.emit(PlayerEvent::StateChanged {
                    state: PlayerState::Playing,
                });
            }
            Err(e) => {
                warn!("Skipping '{}': {}", session.song().title(), e);
                let song_id = session.song().id().clone();
                let message = e.to_string();
                session.resolve_ready(Err(e));
                self.emit(PlayerEvent::LoadFailed { song_id, message });
                self.advance();
            }
        }
    }

    fn on_ended(&mut self, generation: u64) {
        let Some(session) = self
            .session
            .as_mut()
            .filter(|session| session.generation() == generation)
        else {
            debug!("Ignoring end of superseded session {}", generation);
            return;
        };

        if !session.mark_ended() {
            debug!("Ignoring repeated end of session {}", generation);
            return;
        }

        info!("Finished '{}'", session.song().title());
        let song_id = session.song().id().clone();
        self.emit(PlayerEvent::SongFinished { song_id });
        self.advance();
    }

    // ===== Transitions =====

    /// Move to the next queued song, or to Empty if there is none
    fn advance(&mut self) {
        match self.queue.pop_front() {
            Some(next) => {
                self.emit(PlayerEvent::QueueChanged {
                    length: self.queue.len(),
                });
                // Nobody waits on an auto-advance ticket
                let _ = self.start_session(next);
            }
            None => self.teardown(),
        }
    }

    /// Replace the current session with a pending one for `song`
    fn start_session(&mut self, song: Arc<Song>) -> LoadTicket {
        let before = self.state();
        // Release the outgoing resource before anything new can attach
        let previous_song_id = self
            .session
            .take()
            .map(|session| session.song().id().clone());

        self.generation += 1;
        let generation = self.generation;

        let (ready_tx, ready_rx) = oneshot::channel();
        let mut session = PlaybackSession::pending(Arc::clone(&song), generation);
        session.set_ready_notifier(ready_tx);

        let loader = Arc::clone(&self.loader);
        let signals = self.signals.clone();
        let locator = song.locator().to_path_buf();
        let task = tokio::spawn(async move {
            let result = loader.load(&locator).await;
            // The controller may already be gone
            signals.send(Signal::Loaded { generation, result }).ok();
        });
        session.set_load_task(task.abort_handle());

        info!("Loading '{}' (session {})", song.title(), generation);
        self.session = Some(session);

        self.emit(PlayerEvent::SongChanged {
            song_id: Some(song.id().clone()),
            previous_song_id,
        });
        self.notify_state(before);

        LoadTicket::new(ready_rx)
    }

    fn teardown(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        let previous_song_id = session.song().id().clone();
        drop(session);

        info!("Playback finished, nothing left to play");
        self.emit(PlayerEvent::SongChanged {
            song_id: None,
            previous_song_id: Some(previous_song_id),
        });
        self.emit(PlayerEvent::StateChanged {
            state: PlayerState::Empty,
        });
    }

    fn end_signal(&self, generation: u64) -> EndSignal {
        let signals = self.signals.clone();
        EndSignal::new(move || {
            signals.send(Signal::Ended { generation }).ok();
        })
    }

    fn notify_state(&self, before: PlayerState) {
        let state = self.state();
        if state != before {
            self.emit(PlayerEvent::StateChanged { state });
        }
    }

    fn emit(&self, event: PlayerEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
