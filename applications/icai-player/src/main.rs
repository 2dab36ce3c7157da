/// Icai Player - play local audio files from the terminal
use clap::Parser;
use icai_audio_headless::{ClockLoader, FixedProbe};
use icai_core::{MemoryCatalog, SongCatalog};
use icai_player::{
    commands::{ControlCommand, HELP},
    config::{AppConfig, BackendSettings, LibrarySettings},
    events::{follow_event, EventFlow},
    library,
    watcher::{sync_catalog, LibraryWatcher},
    AppError,
};
use icai_playback::{Enqueued, PlaybackError, Player, PlayerEvent, PlayerHandle, ResourceLoader};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "icai-player")]
#[command(about = "Play local audio files, one queue at a time", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./icai.toml if present)
    #[arg(short, long, env = "ICAI_CONFIG")]
    config: Option<PathBuf>,

    /// Initial volume, overriding the configuration
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
    volume: Option<u8>,

    /// Audio files or directories to queue, in order
    paths: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "icai_player=info,icai_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(volume) = cli.volume {
        config.player.volume = volume;
    }
    config.validate()?;
    config.library.resolve_directories();

    let catalog = Arc::new(MemoryCatalog::new());
    if library::populate(&catalog, &cli.paths, &config.library).await? == 0 {
        tracing::warn!("Nothing to play, pass audio files or configure library directories");
        return Ok(());
    }

    // Kept alive until the player exits
    let _watcher = start_watcher(&catalog, &config.library);

    let (player, task) = Player::spawn(config.player.clone(), build_loader(&config.backend));
    let mut events = player.subscribe();

    for song in catalog.all_songs().await?.into_songs() {
        if let Enqueued::Started(ticket) = player.add_song(song, None).await? {
            tokio::spawn(async move {
                if let Err(e) = ticket.ready().await {
                    tracing::warn!("First song did not start: {}", e);
                }
            });
        }
    }

    println!("{}", HELP);
    run(&player, catalog.as_ref(), &mut events).await?;

    // The task may already be gone if every handle dropped
    player.shutdown().await.ok();
    task.await?;
    Ok(())
}

fn build_loader(backend: &BackendSettings) -> Arc<dyn ResourceLoader> {
    match backend.fixed_duration_secs {
        Some(secs) => Arc::new(
            ClockLoader::with_probe(FixedProbe(Duration::from_secs(secs)))
                .with_load_delay(backend.load_delay()),
        ),
        None => Arc::new(ClockLoader::new().with_load_delay(backend.load_delay())),
    }
}

/// Watch the configured directories, if asked to
///
/// Failures are logged and the player runs without live updates.
fn start_watcher(
    catalog: &Arc<MemoryCatalog>,
    settings: &LibrarySettings,
) -> Option<LibraryWatcher> {
    if !settings.watch || settings.directories.is_empty() {
        return None;
    }

    let (mut watcher, changes) = match LibraryWatcher::new(settings) {
        Ok(created) => created,
        Err(e) => {
            tracing::warn!("Library watching disabled: {}", e);
            return None;
        }
    };

    for dir in &settings.directories {
        if let Err(e) = watcher.watch(dir) {
            tracing::warn!("Cannot watch {}: {}", dir.display(), e);
        }
    }

    tokio::spawn(sync_catalog(Arc::clone(catalog), settings.clone(), changes));
    Some(watcher)
}

/// Follow player events and stdin until the queue drains or the user quits
async fn run(
    player: &PlayerHandle,
    catalog: &dyn SongCatalog,
    events: &mut tokio::sync::broadcast::Receiver<PlayerEvent>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            received = events.recv() => match follow_event(player, received).await? {
                EventFlow::Continue => {}
                EventFlow::QueueFinished | EventFlow::Closed => return Ok(()),
            },

            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match line.parse::<ControlCommand>() {
                    Ok(ControlCommand::Quit) => return Ok(()),
                    Ok(command) => match command.execute(player, catalog).await {
                        Ok(Some(reply)) => println!("{}", reply),
                        Ok(None) => {}
                        Err(AppError::Playback(PlaybackError::ControllerClosed)) => return Ok(()),
                        Err(e) => println!("{}", e),
                    },
                    Err(e) => println!("{}", e),
                },
                Ok(None) => stdin_open = false,
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {}", e);
                    stdin_open = false;
                }
            },

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                return Ok(());
            }
        }
    }
}
