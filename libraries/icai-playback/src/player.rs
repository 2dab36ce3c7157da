//! Player actor
//!
//! Runs a [`PlayerController`] on its own task and serializes every user
//! command and asynchronous completion through it. [`PlayerHandle`] is the
//! cloneable front door handed to UIs.

use crate::{
    controller::{Enqueued, PlayerController, Signal},
    error::{PlaybackError, Result},
    events::PlayerEvent,
    resource::ResourceLoader,
    types::{PlayerConfig, PlayerState, PlayerStatus},
};
use icai_core::Song;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

type Reply<T> = oneshot::Sender<T>;

/// Requests accepted by the player task
enum Command {
    AddSong {
        song: Arc<Song>,
        index: Option<usize>,
        reply: Reply<Enqueued>,
    },
    RemoveSong {
        index: usize,
        reply: Reply<Option<Arc<Song>>>,
    },
    Play {
        reply: Reply<Result<()>>,
    },
    Pause {
        reply: Reply<Result<()>>,
    },
    Seek {
        seconds: f64,
        reply: Reply<Result<()>>,
    },
    SetVolume {
        level: u8,
        reply: Reply<()>,
    },
    Skip {
        reply: Reply<()>,
    },
    Stop {
        reply: Reply<()>,
    },
    Status {
        reply: Reply<PlayerStatus>,
    },
    Queue {
        reply: Reply<Vec<Arc<Song>>>,
    },
    Shutdown,
}

/// Spawns the player task
pub struct Player;

impl Player {
    /// Start a player on the current tokio runtime
    ///
    /// The task runs until [`PlayerHandle::shutdown`] is called or every
    /// handle is dropped.
    pub fn spawn(
        config: PlayerConfig,
        loader: Arc<dyn ResourceLoader>,
    ) -> (PlayerHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer.max(1));
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (event_tx, _) = broadcast::channel(config.event_buffer.max(1));

        let controller = PlayerController::new(&config, loader, signal_tx, event_tx.clone());
        let task = tokio::spawn(run(controller, command_rx, signal_rx));

        info!("Player started (volume {})", config.volume.min(100));
        (
            PlayerHandle {
                commands: command_tx,
                events: event_tx,
            },
            task,
        )
    }
}

async fn run(
    mut controller: PlayerController,
    mut commands: mpsc::Receiver<Command>,
    mut signals: mpsc::UnboundedReceiver<Signal>,
) {
    loop {
        tokio::select! {
            // Completions first, so a command always sees their effects
            biased;

            Some(signal) = signals.recv() => controller.handle_signal(signal),

            command = commands.recv() => match command {
                Some(Command::Shutdown) | None => break,
                Some(command) => dispatch(&mut controller, command),
            },
        }
    }

    controller.stop();
    info!("Player stopped");
}

fn dispatch(controller: &mut PlayerController, command: Command) {
    // A dropped reply receiver means the caller stopped waiting
    match command {
        Command::AddSong { song, index, reply } => {
            reply.send(controller.add_song(song, index)).ok();
        }
        Command::RemoveSong { index, reply } => {
            reply.send(controller.remove_song(index)).ok();
        }
        Command::Play { reply } => {
            reply.send(controller.play()).ok();
        }
        Command::Pause { reply } => {
            reply.send(controller.pause()).ok();
        }
        Command::Seek { seconds, reply } => {
            reply.send(controller.seek(seconds)).ok();
        }
        Command::SetVolume { level, reply } => {
            controller.set_volume(level);
            reply.send(()).ok();
        }
        Command::Skip { reply } => {
            controller.skip();
            reply.send(()).ok();
        }
        Command::Stop { reply } => {
            controller.stop();
            reply.send(()).ok();
        }
        Command::Status { reply } => {
            reply.send(controller.status()).ok();
        }
        Command::Queue { reply } => {
            reply.send(controller.queue()).ok();
        }
        Command::Shutdown => debug!("Shutdown handled by the player loop"),
    }
}

/// Cloneable handle to a running player
///
/// Every method fails with [`PlaybackError::ControllerClosed`] once the player
/// task has stopped.
#[derive(Clone)]
pub struct PlayerHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<PlayerEvent>,
}

impl PlayerHandle {
    /// Add a song, starting playback if the player is empty
    ///
    /// `None` appends to the queue; an index past the end clamps.
    pub async fn add_song(
        &self,
        song: impl Into<Arc<Song>>,
        index: Option<usize>,
    ) -> Result<Enqueued> {
        let song = song.into();
        self.request(|reply| Command::AddSong { song, index, reply })
            .await
    }

    /// Remove the queued song at `index`, returning it if it existed
    pub async fn remove_song(&self, index: usize) -> Result<Option<Arc<Song>>> {
        self.request(|reply| Command::RemoveSong { index, reply })
            .await
    }

    pub async fn play(&self) -> Result<()> {
        self.request(|reply| Command::Play { reply }).await?
    }

    pub async fn pause(&self) -> Result<()> {
        self.request(|reply| Command::Pause { reply }).await?
    }

    /// Seek to `seconds`, clamped to the song's length
    pub async fn seek(&self, seconds: f64) -> Result<()> {
        self.request(|reply| Command::Seek { seconds, reply })
            .await?
    }

    /// Set volume (0-100); out-of-range levels clamp
    pub async fn set_volume(&self, level: u8) -> Result<()> {
        self.request(|reply| Command::SetVolume { level, reply })
            .await
    }

    /// Abandon the current song and move on to the next one
    pub async fn skip(&self) -> Result<()> {
        self.request(|reply| Command::Skip { reply }).await
    }

    /// Clear the queue and stop playback
    pub async fn stop(&self) -> Result<()> {
        self.request(|reply| Command::Stop { reply }).await
    }

    pub async fn status(&self) -> Result<PlayerStatus> {
        self.request(|reply| Command::Status { reply }).await
    }

    pub async fn now_playing(&self) -> Result<Option<Arc<Song>>> {
        Ok(self.status().await?.now_playing)
    }

    /// Position in whole seconds
    pub async fn position(&self) -> Result<u64> {
        Ok(self.status().await?.position)
    }

    /// Length in whole seconds
    pub async fn length(&self) -> Result<u64> {
        Ok(self.status().await?.length)
    }

    pub async fn state(&self) -> Result<PlayerState> {
        Ok(self.status().await?.state)
    }

    /// Queued songs in playback order, excluding the current one
    pub async fn queue(&self) -> Result<Vec<Arc<Song>>> {
        self.request(|reply| Command::Queue { reply }).await
    }

    /// Subscribe to player events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    /// Stop the player task
    ///
    /// Commands already queued ahead of the shutdown are still applied.
    pub async fn shutdown(&self) -> Result<()> {
        self.commands
            .send(Command::Shutdown)
            .await
            .map_err(|_| PlaybackError::ControllerClosed)
    }

    async fn request<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| PlaybackError::ControllerClosed)?;
        response.await.map_err(|_| PlaybackError::ControllerClosed)
    }
}
