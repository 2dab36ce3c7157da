//! Core types for playback management

use icai_core::Song;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Player state
///
/// Derived from the current session, never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// No session: nothing has played yet, or the queue drained
    Empty,

    /// Session exists but its resource is still loading
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,
}

/// Configuration for the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Initial volume (0-100, default: 100)
    pub volume: u8,

    /// Pending user commands before senders wait (default: 32)
    pub command_buffer: usize,

    /// Events retained for slow subscribers (default: 64)
    pub event_buffer: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: 100,
            command_buffer: 32,
            event_buffer: 64,
        }
    }
}

/// Snapshot of the player, taken in a single controller turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStatus {
    pub state: PlayerState,
    pub now_playing: Option<Arc<Song>>,
    /// Whole seconds, 0 when nothing is ready
    pub position: u64,
    /// Whole seconds, 0 when nothing is ready
    pub length: u64,
    pub volume: u8,
    pub queue_length: usize,
}
