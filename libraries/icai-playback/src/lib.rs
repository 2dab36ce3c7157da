//! Icai Playback
//!
//! Backend-agnostic queue and playback session management.
//!
//! This crate provides:
//! - A pending song queue with lenient insert/remove
//! - A single playback session per player, loading or loaded
//! - The player state machine with auto-advance on end of stream
//! - Linear volume (0-100%) carried across sessions
//! - An actor that serializes commands and completions, plus a cloneable handle
//! - Broadcast events for UI synchronization
//!
//! # Architecture
//!
//! `icai-playback` never decodes audio or touches the file system. Backends
//! plug in through two traits:
//! - [`ResourceLoader`] turns a song locator into an [`AudioResource`]
//! - [`AudioResource`] plays, pauses, seeks and reports end of stream
//!
//! # Example
//!
//! ```rust,no_run
//! use icai_core::{Song, SongId};
//! use icai_playback::{Enqueued, Player, PlayerConfig, ResourceLoader};
//! use std::sync::Arc;
//!
//! # async fn example(loader: Arc<dyn ResourceLoader>) -> icai_playback::Result<()> {
//! let (player, _task) = Player::spawn(PlayerConfig::default(), loader);
//!
//! let song = Song::from_path(SongId::new("1"), "/music/intro.mp3");
//! if let Enqueued::Started(ticket) = player.add_song(song, None).await? {
//!     ticket.ready().await?;
//! }
//!
//! player.pause().await?;
//! player.seek(30.0).await?;
//! player.play().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod controller;
pub mod error;
pub mod events;
pub mod player;
pub mod queue;
pub mod resource;
pub mod session;
pub mod types;
pub mod volume;

pub use controller::{Enqueued, PlayerController};
pub use error::{LoadError, PlaybackError, Result};
pub use events::PlayerEvent;
pub use player::{Player, PlayerHandle};
pub use queue::Queue;
pub use resource::{AudioResource, EndSignal, ResourceLoader};
pub use session::{LoadTicket, PlaybackSession};
pub use types::{PlayerConfig, PlayerState, PlayerStatus};
pub use volume::Volume;
