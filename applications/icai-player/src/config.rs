/// Player application configuration
use crate::error::{AppError, Result};
use icai_core::SUPPORTED_EXTENSIONS;
use icai_playback::PlayerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "icai.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub player: PlayerConfig,

    #[serde(default)]
    pub library: LibrarySettings,

    #[serde(default)]
    pub backend: BackendSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibrarySettings {
    /// Directories scanned for songs at startup
    #[serde(default)]
    pub directories: Vec<PathBuf>,

    /// Extensions to pick up while scanning, a subset of the supported ones
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default = "default_recursive")]
    pub recursive: bool,

    /// Keep the library in step with the directories while running
    #[serde(default = "default_watch")]
    pub watch: bool,

    /// How long file system events settle before the library is updated
    #[serde(default = "default_watch_debounce_ms")]
    pub watch_debounce_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BackendSettings {
    /// Simulated decode latency per song
    #[serde(default)]
    pub load_delay_ms: u64,

    /// Play every song for this long instead of probing the file
    #[serde(default)]
    pub fixed_duration_secs: Option<u64>,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `icai.toml` is read if present.
    /// `ICAI_`-prefixed variables override the file, with `__` between
    /// section and key (`ICAI_PLAYER__VOLUME=40`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(AppError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("ICAI")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("library.directories")
                .with_list_parse_key("library.extensions")
                .try_parsing(true),
        );

        Ok(settings.build()?.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.player.volume > 100 {
            return Err(AppError::Config(format!(
                "Volume must be between 0 and 100, got {}",
                self.player.volume
            )));
        }

        if self.player.command_buffer == 0 || self.player.event_buffer == 0 {
            return Err(AppError::Config(
                "Player buffers must hold at least one entry".to_string(),
            ));
        }

        if let Some(unsupported) = self.library.extensions.iter().find(|ext| {
            !SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        }) {
            return Err(AppError::Config(format!(
                "Unsupported extension '{}' (supported: {})",
                unsupported,
                SUPPORTED_EXTENSIONS.join(", ")
            )));
        }

        if self.backend.fixed_duration_secs == Some(0) {
            return Err(AppError::Config(
                "fixed_duration_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl LibrarySettings {
    /// Whether a scanned file should be registered
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(ext))
            })
            && icai_core::is_supported_audio(path)
    }

    /// Make configured directories absolute
    ///
    /// Watcher events carry absolute paths, so scanned locators must too.
    /// Directories that cannot be resolved are left as they are.
    pub fn resolve_directories(&mut self) {
        for dir in &mut self.directories {
            match dir.canonicalize() {
                Ok(resolved) => *dir = resolved,
                Err(e) => warn!("Cannot resolve library directory {}: {}", dir.display(), e),
            }
        }
    }

    pub fn watch_debounce(&self) -> Duration {
        Duration::from_millis(self.watch_debounce_ms)
    }
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            extensions: default_extensions(),
            recursive: default_recursive(),
            watch: default_watch(),
            watch_debounce_ms: default_watch_debounce_ms(),
        }
    }
}

impl BackendSettings {
    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }
}

// Default values
fn default_extensions() -> Vec<String> {
    SUPPORTED_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

fn default_recursive() -> bool {
    true
}

fn default_watch() -> bool {
    true
}

fn default_watch_debounce_ms() -> u64 {
    500
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.player.volume, 100);
        assert_eq!(config.library.extensions, vec!["mp3", "wav", "ogg"]);
        assert!(config.library.recursive);
        assert!(config.library.watch);
        assert_eq!(config.library.watch_debounce(), Duration::from_millis(500));
        assert_eq!(config.backend.load_delay(), Duration::ZERO);
    }

    #[test]
    fn loads_sections_from_file() {
        let file = write_config(
            r#"
            [player]
            volume = 40

            [library]
            directories = ["/music"]
            extensions = ["mp3"]
            recursive = false
            watch = false

            [backend]
            load_delay_ms = 250
            "#,
        );

        let config = AppConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.player.volume, 40);
        assert_eq!(config.player.command_buffer, 32);
        assert_eq!(config.library.directories, vec![PathBuf::from("/music")]);
        assert_eq!(config.library.extensions, vec!["mp3"]);
        assert!(!config.library.recursive);
        assert!(!config.library.watch);
        assert_eq!(config.backend.load_delay(), Duration::from_millis(250));
        assert!(config.backend.fixed_duration_secs.is_none());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = AppConfig::load(Some(Path::new("/nonexistent/icai.toml")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn rejects_unknown_extension() {
        let mut config = AppConfig::default();
        config.library.extensions = vec!["flac".to_string()];
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn rejects_out_of_range_volume() {
        let mut config = AppConfig::default();
        config.player.volume = 120;
        assert!(config.validate().is_err());
    }

    #[test]
    fn library_filter_respects_configured_extensions() {
        let settings = LibrarySettings {
            extensions: vec!["ogg".to_string()],
            ..LibrarySettings::default()
        };

        assert!(settings.accepts(Path::new("/music/a.OGG")));
        assert!(!settings.accepts(Path::new("/music/a.mp3")));
        assert!(!settings.accepts(Path::new("/music/notes")));
    }

    #[test]
    fn resolves_relative_directories() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut settings = LibrarySettings {
            directories: vec![temp.path().join("."), PathBuf::from("/nonexistent/music")],
            ..LibrarySettings::default()
        };

        settings.resolve_directories();

        assert_eq!(settings.directories[0], temp.path().canonicalize().unwrap());
        assert_eq!(settings.directories[1], PathBuf::from("/nonexistent/music"));
    }
}
