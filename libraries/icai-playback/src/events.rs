//! Player events
//!
//! Broadcast by the controller so UIs can follow the state machine without
//! polling. Events are emitted at key points:
//! - State changes (loading, playing, paused, empty)
//! - Song changes (new session or teardown)
//! - Natural end of a song
//! - Queue and volume changes
//! - Songs skipped because they failed to load

use crate::types::PlayerState;
use icai_core::SongId;
use serde::{Deserialize, Serialize};

/// Events emitted by the player controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// Derived player state changed
    StateChanged {
        /// The new state
        state: PlayerState,
    },

    /// The session was replaced or torn down
    SongChanged {
        /// Song now owning the session, `None` after teardown
        song_id: Option<SongId>,
        previous_song_id: Option<SongId>,
    },

    /// Song reached its natural end
    SongFinished { song_id: SongId },

    /// Songs were added to, removed from, or popped off the queue
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume level (0-100)
        level: u8,
    },

    /// A song could not be loaded and was skipped
    LoadFailed { song_id: SongId, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let event = PlayerEvent::StateChanged {
            state: PlayerState::Playing,
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "state_changed");
        assert_eq!(json["state"], "Playing");
    }

    #[test]
    fn song_changed_round_trips() {
        let event = PlayerEvent::SongChanged {
            song_id: Some(SongId::new("2")),
            previous_song_id: Some(SongId::new("1")),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: PlayerEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(back, event);
    }
}
