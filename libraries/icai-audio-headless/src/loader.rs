//! Clock resource loader
//!
//! Validates a locator, probes its duration off the async runtime and hands
//! back a [`ClockResource`].

use crate::clock::ClockResource;
use crate::probe::{DurationProbe, LoftyProbe};
use async_trait::async_trait;
use icai_core::is_supported_audio;
use icai_playback::{AudioResource, LoadError, ResourceLoader};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Loads songs as clock-driven resources
#[derive(Debug, Clone)]
pub struct ClockLoader<P = LoftyProbe> {
    probe: Arc<P>,
    /// Artificial latency before each load completes
    load_delay: Duration,
}

impl ClockLoader {
    /// Loader probing real files with lofty
    pub fn new() -> Self {
        Self::with_probe(LoftyProbe)
    }
}

impl Default for ClockLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: DurationProbe> ClockLoader<P> {
    pub fn with_probe(probe: P) -> Self {
        Self {
            probe: Arc::new(probe),
            load_delay: Duration::ZERO,
        }
    }

    /// Delay every load, simulating a slow decoder
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }
}

#[async_trait]
impl<P: DurationProbe> ResourceLoader for ClockLoader<P> {
    async fn load(&self, locator: &Path) -> Result<Box<dyn AudioResource>, LoadError> {
        if !is_supported_audio(locator) {
            return Err(LoadError::Unsupported(locator.to_path_buf()));
        }

        let metadata = match tokio::fs::metadata(locator).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(LoadError::NotFound(locator.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_file() {
            return Err(LoadError::NotFound(locator.to_path_buf()));
        }

        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }

        let probe = Arc::clone(&self.probe);
        let path = locator.to_path_buf();
        let duration = tokio::task::spawn_blocking(move || probe.probe(&path))
            .await
            .map_err(std::io::Error::other)??;

        debug!("Loaded {} ({:?})", locator.display(), duration);
        Ok(Box::new(ClockResource::new(duration)))
    }
}
