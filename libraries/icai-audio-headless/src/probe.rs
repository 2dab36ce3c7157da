//! Duration probing
//!
//! The clock backend only needs to know how long a song is. Probing runs on
//! a blocking thread, so implementations are free to do file IO.

use icai_playback::LoadError;
use lofty::AudioFile;
use std::path::Path;
use std::time::Duration;

/// Reads the playing time of an audio file
pub trait DurationProbe: Send + Sync + 'static {
    fn probe(&self, path: &Path) -> Result<Duration, LoadError>;
}

/// Probe using lofty's audio properties
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyProbe;

impl DurationProbe for LoftyProbe {
    fn probe(&self, path: &Path) -> Result<Duration, LoadError> {
        let tagged_file = lofty::read_from_path(path).map_err(|e| LoadError::Undecodable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(tagged_file.properties().duration())
    }
}

/// Probe that reports the same duration for every file
///
/// Useful for demos and tests with placeholder files.
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe(pub Duration);

impl DurationProbe for FixedProbe {
    fn probe(&self, _path: &Path) -> Result<Duration, LoadError> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_probe_ignores_path() {
        let probe = FixedProbe(Duration::from_secs(42));
        assert_eq!(
            probe.probe(Path::new("/nowhere.mp3")).unwrap(),
            Duration::from_secs(42)
        );
    }

    #[test]
    fn lofty_probe_reports_missing_file() {
        let result = LoftyProbe.probe(Path::new("/nonexistent/file.mp3"));
        assert!(matches!(result, Err(LoadError::Undecodable { .. })));
    }
}
