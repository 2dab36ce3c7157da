//! Line-oriented control commands
//!
//! Parses what the user types on stdin and runs it against a player handle.

use crate::error::Result as AppResult;
use icai_core::{SongCatalog, SongId};
use icai_playback::{Enqueued, PlayerHandle, PlayerState, PlayerStatus};
use std::str::FromStr;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  play             resume playback
  pause            pause playback
  skip             move to the next queued song
  stop             clear the queue and stop
  seek <seconds>   jump within the current song
  volume <0-100>   set output volume
  remove <index>   drop a queued song
  queue            list queued songs
  library          list known songs with their ids
  add <id>         queue a song from the library
  status           show what is playing
  help             show this list
  quit             exit";

#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    Play,
    Pause,
    Skip,
    Stop,
    Seek(f64),
    Volume(u8),
    Remove(usize),
    Queue,
    Library,
    Enqueue(SongId),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{command}' needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("Invalid argument for '{command}': {value}")]
    InvalidArgument { command: &'static str, value: String },
}

impl FromStr for ControlCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(ParseCommandError::Empty)?;
        let argument = words.next();

        let command = match name.to_ascii_lowercase().as_str() {
            "play" => Self::Play,
            "pause" => Self::Pause,
            "skip" | "next" => Self::Skip,
            "stop" => Self::Stop,
            "seek" => {
                let seconds: f64 = parse_argument("seek", "a position in seconds", argument)?;
                if !seconds.is_finite() {
                    return Err(invalid("seek", argument));
                }
                Self::Seek(seconds)
            }
            "volume" | "vol" => {
                // Anything above 100 clamps
                let level: u16 = parse_argument("volume", "a level from 0 to 100", argument)?;
                Self::Volume(level.min(100) as u8)
            }
            "remove" | "rm" => Self::Remove(parse_argument("remove", "a queue index", argument)?),
            "queue" | "ls" => Self::Queue,
            "library" | "lib" => Self::Library,
            "add" | "enqueue" => {
                let id = argument.ok_or(ParseCommandError::MissingArgument {
                    command: "add",
                    expected: "a song id",
                })?;
                Self::Enqueue(SongId::new(id))
            }
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => return Err(ParseCommandError::Unknown(name.to_string())),
        };

        Ok(command)
    }
}

fn parse_argument<T: FromStr>(
    command: &'static str,
    expected: &'static str,
    argument: Option<&str>,
) -> Result<T, ParseCommandError> {
    let argument = argument.ok_or(ParseCommandError::MissingArgument { command, expected })?;
    argument.parse().map_err(|_| invalid(command, Some(argument)))
}

fn invalid(command: &'static str, argument: Option<&str>) -> ParseCommandError {
    ParseCommandError::InvalidArgument {
        command,
        value: argument.unwrap_or_default().to_string(),
    }
}

impl ControlCommand {
    /// Run the command, returning text to show the user
    ///
    /// `Quit` is left to the caller and does nothing here.
    pub async fn execute(
        self,
        player: &PlayerHandle,
        catalog: &dyn SongCatalog,
    ) -> AppResult<Option<String>> {
        let reply = match self {
            Self::Play => {
                player.play().await?;
                None
            }
            Self::Pause => {
                player.pause().await?;
                None
            }
            Self::Skip => {
                player.skip().await?;
                None
            }
            Self::Stop => {
                player.stop().await?;
                None
            }
            Self::Seek(seconds) => {
                player.seek(seconds).await?;
                Some(format!("at {}", format_time(player.position().await?)))
            }
            Self::Volume(level) => {
                player.set_volume(level).await?;
                Some(format!("volume {}", level))
            }
            Self::Remove(index) => Some(match player.remove_song(index).await? {
                Some(song) => format!("removed '{}'", song.title()),
                None => format!("nothing queued at {}", index),
            }),
            Self::Queue => {
                let queue = player.queue().await?;
                if queue.is_empty() {
                    Some("queue is empty".to_string())
                } else {
                    let lines: Vec<String> = queue
                        .iter()
                        .enumerate()
                        .map(|(index, song)| format!("{:>3}  {}", index, song.title()))
                        .collect();
                    Some(lines.join("\n"))
                }
            }
            Self::Library => {
                let songs = catalog.all_songs().await?;
                if songs.is_empty() {
                    Some("library is empty".to_string())
                } else {
                    let lines: Vec<String> = songs
                        .iter()
                        .map(|song| format!("{:>3}  {}", song.id(), song.title()))
                        .collect();
                    Some(lines.join("\n"))
                }
            }
            Self::Enqueue(id) => Some(match catalog.song(&id).await? {
                Some(song) => {
                    let title = song.title().to_string();
                    match player.add_song(song, None).await? {
                        Enqueued::Started(_) => format!("starting '{}'", title),
                        Enqueued::Queued { position } => {
                            format!("queued '{}' at {}", title, position)
                        }
                    }
                }
                None => format!("no song with id {}", id),
            }),
            Self::Status => Some(format_status(&player.status().await?)),
            Self::Help => Some(HELP.to_string()),
            Self::Quit => None,
        };

        Ok(reply)
    }
}

/// One-line summary of a status snapshot
pub fn format_status(status: &PlayerStatus) -> String {
    let Some(song) = &status.now_playing else {
        return "nothing playing".to_string();
    };

    let state = match status.state {
        PlayerState::Loading => "loading",
        PlayerState::Playing => "playing",
        PlayerState::Paused => "paused",
        PlayerState::Empty => "stopped",
    };

    format!(
        "{} '{}' {}/{} (volume {}, {} queued)",
        state,
        song.title(),
        format_time(status.position),
        format_time(status.length),
        status.volume,
        status.queue_length
    )
}

/// Render whole seconds as `m:ss`
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
