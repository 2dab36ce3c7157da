//! Library population
//!
//! Turns command-line paths and configured directories into catalog entries.

use crate::config::LibrarySettings;
use crate::error::Result;
use icai_core::{CoreError, MemoryCatalog};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Find audio files under `dir`, sorted by path
pub fn scan_directory(dir: &Path, settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir).sort_by_file_name();
    if !settings.recursive {
        walker = walker.max_depth(1);
    }

    walker
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && settings.accepts(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Register configured directories, then `paths`, in order
///
/// Directories among `paths` are scanned like configured ones. Files that
/// are missing, unsupported, or already registered are skipped with a log
/// line. Returns the number of songs registered.
pub async fn populate(
    catalog: &MemoryCatalog,
    paths: &[PathBuf],
    settings: &LibrarySettings,
) -> Result<usize> {
    let mut candidates = Vec::new();

    for path in settings.directories.iter().chain(paths) {
        if path.is_dir() {
            let found = scan_directory_async(path, settings).await?;
            debug!("Found {} songs in {}", found.len(), path.display());
            candidates.extend(found);
        } else if path.is_file() {
            candidates.push(path.clone());
        } else {
            warn!("Skipping {}: no such file or directory", path.display());
        }
    }

    let registered = register_all(catalog, candidates).await?;
    info!("Library ready with {} songs", registered);
    Ok(registered)
}

/// Scan `dir` off the async runtime
pub(crate) async fn scan_directory_async(
    dir: &Path,
    settings: &LibrarySettings,
) -> Result<Vec<PathBuf>> {
    let dir = dir.to_path_buf();
    let settings = settings.clone();
    let found = tokio::task::spawn_blocking(move || scan_directory(&dir, &settings))
        .await
        .map_err(std::io::Error::other)?;
    Ok(found)
}

/// Register each candidate, skipping duplicates and unsupported files
///
/// Returns how many were newly registered.
pub(crate) async fn register_all(
    catalog: &MemoryCatalog,
    candidates: impl IntoIterator<Item = PathBuf>,
) -> Result<usize> {
    let mut registered = 0;
    for candidate in candidates {
        match catalog.register(candidate).await {
            Ok(_) => registered += 1,
            Err(CoreError::Duplicate(locator)) => debug!("Already registered: {}", locator),
            Err(CoreError::InvalidInput(reason)) => warn!("Skipping: {}", reason),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(registered)
}
