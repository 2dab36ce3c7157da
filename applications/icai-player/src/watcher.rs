//! Library directory watcher
//!
//! Keeps a `MemoryCatalog` in step with the library directories while the
//! player runs: songs are registered when files appear and dropped when
//! they go away. Events are debounced before they reach the catalog.

use crate::config::LibrarySettings;
use crate::error::Result;
use crate::library::{register_all, scan_directory_async};
use icai_core::{CoreError, MemoryCatalog, SongCatalog};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, RecommendedCache};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Changes buffered between the watcher thread and the catalog
const CHANGE_BUFFER: usize = 1000;

/// File system change relevant to the library
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryChange {
    /// A file or directory appeared or was moved in
    Added(PathBuf),
    /// A file or directory went away or was moved out
    Removed(PathBuf),
    /// Moved within the watched tree (old path, new path)
    Renamed(PathBuf, PathBuf),
}

/// Watches library directories and reports [`LibraryChange`]s
///
/// Dropping the watcher stops it and closes the change channel.
pub struct LibraryWatcher {
    // Owns the underlying watcher
    debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
    mode: RecursiveMode,
}

impl LibraryWatcher {
    /// Create a watcher and the receiving end of its changes
    ///
    /// Nothing is watched until [`watch`](Self::watch) is called.
    pub fn new(settings: &LibrarySettings) -> Result<(Self, mpsc::Receiver<LibraryChange>)> {
        let (change_tx, change_rx) = mpsc::channel(CHANGE_BUFFER);

        let debouncer = new_debouncer(
            settings.watch_debounce(),
            None,
            move |result: DebounceEventResult| match result {
                Ok(events) => {
                    for event in events {
                        if let Some(change) = convert_event(&event.event) {
                            // The sync task may already be gone
                            if change_tx.blocking_send(change).is_err() {
                                return;
                            }
                        }
                    }
                }
                Err(errors) => {
                    for error in errors {
                        error!("Watcher error: {:?}", error);
                    }
                }
            },
        )?;

        let mode = if settings.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };

        Ok((Self { debouncer, mode }, change_rx))
    }

    /// Start watching a directory
    pub fn watch(&mut self, dir: &Path) -> Result<()> {
        self.debouncer.watch(dir, self.mode)?;
        info!("Watching {}", dir.display());
        Ok(())
    }
}

/// Apply changes to `catalog` until the watcher is dropped
pub async fn sync_catalog(
    catalog: Arc<MemoryCatalog>,
    settings: LibrarySettings,
    mut changes: mpsc::Receiver<LibraryChange>,
) {
    while let Some(change) = changes.recv().await {
        debug!("Library change: {:?}", change);
        if let Err(e) = apply_change(&catalog, &settings, change).await {
            warn!("Failed to update library: {}", e);
        }
    }
    debug!("Library watcher closed");
}

/// Bring `catalog` in line with one change
pub async fn apply_change(
    catalog: &MemoryCatalog,
    settings: &LibrarySettings,
    change: LibraryChange,
) -> Result<()> {
    match change {
        LibraryChange::Added(path) => add_path(catalog, settings, &path).await,
        LibraryChange::Removed(path) => remove_path(catalog, &path).await,
        LibraryChange::Renamed(from, to) => {
            remove_path(catalog, &from).await?;
            add_path(catalog, settings, &to).await
        }
    }
}

async fn add_path(catalog: &MemoryCatalog, settings: &LibrarySettings, path: &Path) -> Result<()> {
    // Events are debounced, the path may be gone again
    let candidates = if path.is_dir() {
        scan_directory_async(path, settings).await?
    } else if path.is_file() && settings.accepts(path) {
        vec![path.to_path_buf()]
    } else {
        return Ok(());
    };

    let added = register_all(catalog, candidates).await?;
    if added > 0 {
        info!("Added {} songs from {}", added, path.display());
    }
    Ok(())
}

/// Drop every song at or below `path`
async fn remove_path(catalog: &MemoryCatalog, path: &Path) -> Result<()> {
    let gone: Vec<PathBuf> = catalog
        .all_songs()
        .await?
        .iter()
        .filter(|song| song.locator().starts_with(path))
        .map(|song| song.locator().to_path_buf())
        .collect();

    for locator in gone {
        match catalog.unregister(&locator).await {
            Ok(song) => info!("Removed '{}' from the library", song.title()),
            Err(CoreError::NotFound { .. }) => debug!("Already removed: {}", locator.display()),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Convert a notify event to a library change
fn convert_event(event: &Event) -> Option<LibraryChange> {
    let paths = &event.paths;

    match &event.kind {
        EventKind::Create(_) => paths.first().map(|p| LibraryChange::Added(p.clone())),
        EventKind::Remove(_) => paths.first().map(|p| LibraryChange::Removed(p.clone())),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            paths.first().map(|p| LibraryChange::Removed(p.clone()))
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            paths.first().map(|p| LibraryChange::Added(p.clone()))
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if paths.len() == 2 => Some(
            LibraryChange::Renamed(paths[0].clone(), paths[1].clone()),
        ),
        // Backends that cannot tell which side of a rename they saw
        EventKind::Modify(ModifyKind::Name(_)) => paths.first().map(|p| {
            if p.exists() {
                LibraryChange::Added(p.clone())
            } else {
                LibraryChange::Removed(p.clone())
            }
        }),
        _ => None,
    }
}
