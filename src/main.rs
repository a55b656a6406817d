// reelmark - folder video player with watch memory and timestamped notes

use anyhow::Result;
use clap::{Parser, Subcommand};
use reelmark::{
    stats::SqliteBackend, AnnotationIndex, Config, FolderSelection, FolderSelector, FsDirectory,
    StatsStore,
};
use std::path::PathBuf;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "reelmark")]
#[command(about = "Plays a folder of videos, remembering what you watched and what you noted")]
struct Args {
    /// Enable developer logging (stderr + debug output)
    #[arg(long)]
    dev: bool,

    /// Use this config file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the terminal player, optionally starting on a folder
    Play { folder: Option<PathBuf> },
    /// Print a folder's playlist in play order with its watch state
    Queue {
        folder: PathBuf,
        /// Print full file paths instead of bare names
        #[arg(long)]
        paths: bool,
    },
    /// Print every stored annotation, grouped by file
    Annotations,
}

fn init_logging(dev: bool) -> Result<WorkerGuard> {
    let log_dir = PathBuf::from("logs");
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotating file appender
    let file_appender = tracing_appender::rolling::daily(&log_dir, "reelmark.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reelmark=debug"));

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false);
    let stderr_layer = dev.then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(args.dev)?;

    // Load config - falls back to defaults if missing
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    info!("reelmark starting, stats at {}", config.stats_path.display());

    let store = StatsStore::new(SqliteBackend::open(&config.stats_path)?);

    let store = match args.command.unwrap_or(Commands::Play { folder: None }) {
        Commands::Play { folder } => {
            let app = reelmark::ui::App::new(config, store)?;
            app.run(folder).await?
        }
        Commands::Queue { folder, paths } => {
            print_queue(&config, &store, folder, paths).await?;
            store
        }
        Commands::Annotations => {
            println!("{}", AnnotationIndex::render_all(&store));
            store
        }
    };

    store.close()?;
    Ok(())
}

// Read-only: listing a folder does not mark anything as opened.
async fn print_queue(config: &Config, store: &StatsStore, folder: PathBuf, paths: bool) -> Result<()> {
    let selector = FolderSelector::new(config.player.media_extension.clone(), config.player.ordering);

    let FolderSelection::Loaded { folder, playlist } =
        selector.select(&FsDirectory::chosen(folder), store).await?
    else {
        return Ok(());
    };

    println!("{} ({} files)", folder.display(), playlist.len());
    for (i, entry) in playlist.entries().iter().enumerate() {
        let record = store.get(entry.name());
        let state = if record.opened { "watched" } else { "new" };
        let resume = record
            .current_time
            .filter(|t| *t > 0.0)
            .map(|t| format!("  resume {}", reelmark::stats::annotations::format_seconds(t)))
            .unwrap_or_default();
        let shown = if paths {
            entry.handle().display().to_string()
        } else {
            entry.name().to_string()
        };
        println!("{:>4}. [{:<7}] {}{}", i + 1, state, shown, resume);
    }

    Ok(())
}
