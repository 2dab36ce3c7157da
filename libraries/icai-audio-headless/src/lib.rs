//! Icai Headless Audio
//!
//! An audio backend that keeps time without producing sound. Songs "play"
//! for exactly their probed duration, which makes the whole playback engine
//! runnable on machines without an output device and in CI.
//!
//! # Example
//!
//! ```rust,no_run
//! use icai_audio_headless::ClockLoader;
//! use icai_playback::{Player, PlayerConfig};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() {
//! let loader = ClockLoader::new().with_load_delay(Duration::from_millis(50));
//! let (player, _task) = Player::spawn(PlayerConfig::default(), Arc::new(loader));
//! # let _ = player;
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod clock;
pub mod loader;
pub mod probe;

pub use clock::ClockResource;
pub use loader::ClockLoader;
pub use probe::{DurationProbe, FixedProbe, LoftyProbe};
