//! Error types for playback management

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a locator into a playable resource
#[derive(Debug, Error)]
pub enum LoadError {
    /// Nothing exists at the locator
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The locator does not name a format the backend can play
    #[error("Unsupported audio format: {}", .0.display())]
    Unsupported(PathBuf),

    /// The bytes were read but could not be decoded
    #[error("Failed to decode {}: {reason}", .path.display())]
    Undecodable { path: PathBuf, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Transport control requested before the resource finished loading
    #[error("Playback session is still loading")]
    NotReady,

    /// The song's resource could not be loaded
    #[error("Failed to load audio: {0}")]
    Load(#[from] LoadError),

    /// The session was replaced before its resource became ready
    #[error("Session was superseded before it became ready")]
    Superseded,

    /// The audio resource rejected a transport request
    #[error("Audio resource error: {0}")]
    Resource(String),

    /// The controller task has shut down
    #[error("Player controller is no longer running")]
    ControllerClosed,
}

impl PlaybackError {
    /// Create a resource error
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
