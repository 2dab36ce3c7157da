//! Backend-agnostic audio resource traits
//!
//! Abstracts the thing that actually makes sound (a buffer graph, a media
//! element, a device stream) so the controller never depends on one backend.

use crate::error::{LoadError, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// A loaded, seekable, time-queryable audio handle
///
/// Only ever driven by the session that owns it. Dropping the handle must
/// stop output; [`AudioResource::release`] is called first so backends can
/// report problems while tearing down.
pub trait AudioResource: Send {
    /// Start or resume output
    fn play(&mut self) -> Result<()>;

    /// Suspend output, keeping the position
    fn pause(&mut self) -> Result<()>;

    /// Reposition the transport
    ///
    /// The session clamps `position` to `[0, duration]` before calling.
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Get current playback position
    fn current_time(&self) -> Duration;

    /// Get total duration
    fn duration(&self) -> Duration;

    /// Set output gain (0.0-1.0)
    fn set_gain(&mut self, gain: f32);

    /// Register the end-of-stream notification
    ///
    /// The resource fires `signal` when playback reaches the end of the
    /// stream. It can only fire once.
    fn on_ended(&mut self, signal: EndSignal);

    /// Stop output and free buffers before the handle is dropped
    fn release(&mut self) {
        if let Err(e) = self.pause() {
            warn!("Failed to stop audio resource during release: {}", e);
        }
    }
}

/// Builds audio resources from song locators
///
/// Loading may take arbitrary time; the controller never waits on it.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    /// Load a playable resource for `locator`
    async fn load(&self, locator: &Path) -> std::result::Result<Box<dyn AudioResource>, LoadError>;
}

/// Single-fire end-of-stream notification
///
/// Consumed by [`EndSignal::fire`], so a resource cannot deliver it twice.
pub struct EndSignal {
    notify: Box<dyn FnOnce() + Send>,
}

impl EndSignal {
    /// Wrap the action to run when the stream ends
    pub fn new(notify: impl FnOnce() + Send + 'static) -> Self {
        Self {
            notify: Box::new(notify),
        }
    }

    /// Deliver the notification
    pub fn fire(self) {
        (self.notify)();
    }
}

impl fmt::Debug for EndSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndSignal").finish_non_exhaustive()
    }
}
