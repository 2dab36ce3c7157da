//! Shared test backend for icai-playback integration tests
//!
//! `FakeBackend` is a `ResourceLoader` whose resources never make sound. Tests
//! move their clocks by hand, fire end-of-stream on demand, make loads fail,
//! and hold loads open behind a gate to exercise superseded sessions.

#![allow(dead_code)]

use async_trait::async_trait;
use icai_core::{Song, SongId};
use icai_playback::{
    AudioResource, EndSignal, LoadError, PlayerHandle, PlayerState, ResourceLoader,
    Result as PlaybackResult,
};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

const DEFAULT_DURATION: Duration = Duration::from_secs(180);

#[derive(Debug, Default)]
pub struct FakeState {
    pub playing: bool,
    pub position: Duration,
    pub duration: Duration,
    pub gain: f32,
    pub released: bool,
    pub end: Option<EndSignal>,
}

struct FakeResource {
    state: Arc<Mutex<FakeState>>,
}

impl AudioResource for FakeResource {
    fn play(&mut self) -> PlaybackResult<()> {
        self.state.lock().unwrap().playing = true;
        Ok(())
    }

    fn pause(&mut self) -> PlaybackResult<()> {
        self.state.lock().unwrap().playing = false;
        Ok(())
    }

    fn seek(&mut self, position: Duration) -> PlaybackResult<()> {
        self.state.lock().unwrap().position = position;
        Ok(())
    }

    fn current_time(&self) -> Duration {
        self.state.lock().unwrap().position
    }

    fn duration(&self) -> Duration {
        self.state.lock().unwrap().duration
    }

    fn set_gain(&mut self, gain: f32) {
        self.state.lock().unwrap().gain = gain;
    }

    fn on_ended(&mut self, signal: EndSignal) {
        self.state.lock().unwrap().end = Some(signal);
    }

    fn release(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.playing = false;
        state.released = true;
    }
}

#[derive(Default)]
struct BackendState {
    durations: HashMap<PathBuf, Duration>,
    failing: HashSet<PathBuf>,
    gates: HashMap<PathBuf, Arc<Notify>>,
    resources: HashMap<PathBuf, Vec<Arc<Mutex<FakeState>>>>,
    loads: Vec<PathBuf>,
}

/// Scriptable in-memory backend
#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loader(&self) -> Arc<dyn ResourceLoader> {
        Arc::new(self.clone())
    }

    pub fn set_duration(&self, locator: &str, seconds: u64) {
        self.inner
            .lock()
            .unwrap()
            .durations
            .insert(PathBuf::from(locator), Duration::from_secs(seconds));
    }

    /// Make every load of `locator` fail as undecodable
    pub fn fail(&self, locator: &str) {
        self.inner
            .lock()
            .unwrap()
            .failing
            .insert(PathBuf::from(locator));
    }

    /// Hold loads of `locator` until [`FakeBackend::open_gate`]
    pub fn gate(&self, locator: &str) {
        self.inner
            .lock()
            .unwrap()
            .gates
            .insert(PathBuf::from(locator), Arc::new(Notify::new()));
    }

    pub fn open_gate(&self, locator: &str) {
        if let Some(gate) = self.inner.lock().unwrap().gates.remove(Path::new(locator)) {
            gate.notify_one();
        }
    }

    /// Latest resource built for `locator`
    pub fn resource(&self, locator: &str) -> Option<Arc<Mutex<FakeState>>> {
        self.inner
            .lock()
            .unwrap()
            .resources
            .get(Path::new(locator))
            .and_then(|built| built.last().cloned())
    }

    /// Every resource that is still playing
    pub fn playing(&self) -> Vec<PathBuf> {
        let inner = self.inner.lock().unwrap();
        inner
            .resources
            .iter()
            .filter(|(_, built)| built.iter().any(|state| state.lock().unwrap().playing))
            .map(|(locator, _)| locator.clone())
            .collect()
    }

    /// Locators in the order loads started
    pub fn loads(&self) -> Vec<PathBuf> {
        self.inner.lock().unwrap().loads.clone()
    }

    /// Let `seconds` of audio play on `locator`'s resource, if it is playing
    pub fn advance(&self, locator: &str, seconds: u64) {
        let state = self.resource(locator).expect("no resource for locator");
        let mut state = state.lock().unwrap();
        if state.playing {
            state.position = (state.position + Duration::from_secs(seconds)).min(state.duration);
        }
    }

    /// Play `locator` to its end and fire the end-of-stream signal
    pub fn finish(&self, locator: &str) {
        let state = self.resource(locator).expect("no resource for locator");
        let end = {
            let mut state = state.lock().unwrap();
            state.position = state.duration;
            state.end.take()
        };
        if let Some(end) = end {
            end.fire();
        }
    }
}

#[async_trait]
impl ResourceLoader for FakeBackend {
    async fn load(&self, locator: &Path) -> Result<Box<dyn AudioResource>, LoadError> {
        let gate = {
            let mut inner = self.inner.lock().unwrap();
            inner.loads.push(locator.to_path_buf());
            inner.gates.get(locator).cloned()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut inner = self.inner.lock().unwrap();
        if inner.failing.contains(locator) {
            return Err(LoadError::Undecodable {
                path: locator.to_path_buf(),
                reason: "corrupt frame header".to_string(),
            });
        }

        let duration = inner
            .durations
            .get(locator)
            .copied()
            .unwrap_or(DEFAULT_DURATION);
        let state = Arc::new(Mutex::new(FakeState {
            duration,
            ..Default::default()
        }));
        inner
            .resources
            .entry(locator.to_path_buf())
            .or_default()
            .push(Arc::clone(&state));

        Ok(Box::new(FakeResource { state }))
    }
}

pub fn song(id: &str) -> Song {
    Song::new(
        SongId::new(id),
        format!("Song {}", id.to_uppercase()),
        locator(id),
        0,
    )
}

pub fn locator(id: &str) -> String {
    format!("/music/{}.mp3", id)
}

/// Poll the player until `state` is reached, failing after a few seconds
pub async fn wait_for_state(player: &PlayerHandle, state: PlayerState) {
    let reached = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if player.state().await.unwrap() == state {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(reached.is_ok(), "player never reached {:?}", state);
}

/// Poll until the current song is `id`
pub async fn wait_for_song(player: &PlayerHandle, id: &str) {
    let reached = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let status = player.status().await.unwrap();
            if status.state == PlayerState::Playing
                && status.now_playing.as_ref().map(|song| song.id().as_str()) == Some(id)
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(reached.is_ok(), "player never started playing {}", id);
}
