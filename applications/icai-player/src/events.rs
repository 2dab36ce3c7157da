//! Following player events from the terminal

use icai_playback::{PlayerEvent, PlayerHandle, PlayerState, Result as PlaybackResult};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// What the front-end should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFlow {
    Continue,
    /// Nothing is playing and nothing is queued
    QueueFinished,
    /// The player is gone
    Closed,
}

/// Log one received event and decide whether to keep going
///
/// A lagged receiver may have missed the transition to `Empty`, so the
/// player is asked directly.
pub async fn follow_event(
    player: &PlayerHandle,
    received: Result<PlayerEvent, RecvError>,
) -> PlaybackResult<EventFlow> {
    match received {
        Ok(event) => {
            log_event(&event);
            if event == (PlayerEvent::StateChanged { state: PlayerState::Empty }) {
                return queue_finished(player).await;
            }
            Ok(EventFlow::Continue)
        }
        Err(RecvError::Lagged(missed)) => {
            warn!("Missed {} player events", missed);
            queue_finished(player).await
        }
        Err(RecvError::Closed) => Ok(EventFlow::Closed),
    }
}

async fn queue_finished(player: &PlayerHandle) -> PlaybackResult<EventFlow> {
    if player.state().await? == PlayerState::Empty {
        info!("Queue finished");
        Ok(EventFlow::QueueFinished)
    } else {
        Ok(EventFlow::Continue)
    }
}

fn log_event(event: &PlayerEvent) {
    match event {
        PlayerEvent::SongChanged {
            song_id: Some(song_id),
            ..
        } => info!("Now playing song {}", song_id),
        PlayerEvent::SongFinished { song_id } => info!("Finished song {}", song_id),
        PlayerEvent::LoadFailed { song_id, message } => {
            warn!("Could not play song {}: {}", song_id, message);
        }
        PlayerEvent::VolumeChanged { level } => debug!("Volume {}", level),
        PlayerEvent::QueueChanged { length } => debug!("{} songs queued", length),
        PlayerEvent::StateChanged { state } => debug!("State {:?}", state),
        PlayerEvent::SongChanged { song_id: None, .. } => debug!("Session ended"),
    }
}
