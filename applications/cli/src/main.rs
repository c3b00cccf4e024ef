/// Cadence - local music catalog and playback session tool
use cadence_cli::{CadenceConfig, Library};
use cadence_core::{parse_synced_lyrics, Song, SongId};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Local music catalog sync and playback session tool", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "CADENCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the catalog against a music directory
    Scan {
        /// Directory to scan (defaults to library.music_dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// List catalog songs
    List {
        /// Case-insensitive filter over title, artist and album
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show the stored playback session merged with the catalog
    Session,
    /// Toggle a song's favorite flag
    Favorite {
        /// Song id
        id: String,
    },
    /// Print timed lyric lines from a file
    Lyrics {
        /// File with `[mm:ss.cc] text` lines
        file: PathBuf,
    },
    /// Delete a song's file and catalog row
    Delete {
        /// Song id
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Commands::Lyrics { file } = &cli.command {
        return print_lyrics(file).await;
    }

    let config = CadenceConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Scan { dir } => scan(&config, dir).await?,
        Commands::List { search } => list(&config, search.as_deref()).await?,
        Commands::Session => session(&config).await?,
        Commands::Favorite { id } => favorite(&config, &id).await?,
        Commands::Delete { id } => delete(&config, &id).await?,
        Commands::Lyrics { .. } => {}
    }

    Ok(())
}

async fn scan(config: &CadenceConfig, dir: Option<PathBuf>) -> anyhow::Result<()> {
    let dir = config.music_dir(dir)?;
    let library = Library::open(config).await?;

    tracing::info!("Scanning {}", dir.display());
    let outcome = library
        .reconciler
        .reconcile(&dir.to_string_lossy())
        .await?;

    let added = outcome.added.len();
    let removed = outcome.removed.len();
    let refreshed = outcome.refreshed.len();
    let report = outcome.extraction.wait().await?;

    println!("Added:     {added}");
    println!("Removed:   {removed}");
    println!("Refreshed: {refreshed}");
    println!("Extracted: {}", report.extracted);
    println!("Failed:    {}", report.failed);
    println!("Catalog:   {} songs", library.reconciler.snapshot().len());

    Ok(())
}

async fn list(config: &CadenceConfig, search: Option<&str>) -> anyhow::Result<()> {
    let library = Library::open(config).await?;
    library.reconciler.load_catalog().await?;

    let snapshot = library.reconciler.snapshot();
    let songs = match search {
        Some(query) => snapshot.search(query),
        None => snapshot.all(),
    };

    for song in &songs {
        println!("{}", format_song(song));
    }
    println!("{} songs", songs.len());

    Ok(())
}

async fn session(config: &CadenceConfig) -> anyhow::Result<()> {
    let library = Library::open(config).await?;
    let engine = library.engine().await?;

    println!("State:   {:?}", engine.state());
    match engine.current() {
        Some(song) => println!(
            "Current: {} at {}/{}",
            format_song(song),
            format_time(engine.position()),
            format_time(engine.duration())
        ),
        None => println!("Current: -"),
    }
    println!(
        "Queue:   {} songs ({})",
        engine.queue().len(),
        engine.queue().context().as_str()
    );
    println!("Repeat:  {}", engine.repeat());
    println!("Shuffle: {}", engine.shuffle());
    println!("Volume:  {:.0}%", engine.volume() * 100.0);
    println!("Favorites: {}", engine.favorites().len());

    Ok(())
}

async fn favorite(config: &CadenceConfig, id: &str) -> anyhow::Result<()> {
    let library = Library::open(config).await?;
    let mut engine = library.engine().await?;

    let id = SongId::new(id);
    if library.reconciler.snapshot().get(&id).is_none() {
        anyhow::bail!("Song not found: {id}");
    }

    let favorite = engine.toggle_favorite(&id).await;
    println!("{id}: {}", if favorite { "favorite" } else { "not favorite" });

    Ok(())
}

async fn delete(config: &CadenceConfig, id: &str) -> anyhow::Result<()> {
    let library = Library::open(config).await?;
    library.reconciler.load_catalog().await?;

    let song = library.reconciler.delete_song(&SongId::new(id)).await?;
    println!("Deleted {}", song.uri);

    Ok(())
}

async fn print_lyrics(file: &Path) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(file).await?;
    for line in parse_synced_lyrics(&text) {
        println!("[{}] {}", format_time(line.time), line.text);
    }
    Ok(())
}

fn format_song(song: &Song) -> String {
    format!(
        "{}  {} - {} ({})",
        song.id,
        song.title,
        song.display_artist(),
        format_time(song.duration_seconds)
    )
}

fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0);
    let minutes = (total / 60.0).floor() as u64;
    format!("{:02}:{:05.2}", minutes, total - minutes as f64 * 60.0)
}
