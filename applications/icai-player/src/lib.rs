//! Icai Player
//!
//! Terminal front-end for the Icai playback engine: loads configuration,
//! builds a song library, keeps it in step with the library directories and
//! drives a player from stdin commands.

pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod library;
pub mod watcher;

pub use error::{AppError, Result};
