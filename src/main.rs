//! # Space Media Publisher - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Validazione degli input dell'utente
//! - Caricamento delle credenziali dall'ambiente quando servono
//! - Creazione della configurazione e avvio della pipeline scelta
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (directory, pipeline, quality, workers, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Valida che la directory media esista
//! 4. Crea un oggetto Config con tutti i parametri
//! 5. Avvia la pipeline richiesta (convert, gif, upload o tutte in sequenza)
//!
//! ## Esempio di utilizzo:
//! ```bash
//! media-publisher ./media --pipeline all --quality 90 --workers 8 --verbose
//! ```

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;

use space_media_publisher::{pipeline, Config, UploadCredentials};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PipelineKind {
    /// Convert jpg/jpeg/png sources to WebP
    Convert,
    /// Re-encode oversized gifs in place
    Gif,
    /// Upload media and write the path -> URL report
    Upload,
    /// Convert, re-encode gifs, then upload
    All,
}

#[derive(Parser)]
#[command(name = "media-publisher")]
#[command(about = "Convert, optimize and upload media in bounded concurrent batches")]
struct Args {
    /// Directory containing media files to publish
    media_directory: PathBuf,

    /// Which pipeline to run
    #[arg(short, long, value_enum, default_value = "all")]
    pipeline: PipelineKind,

    /// WebP quality (1-100)
    #[arg(short, long, default_value = "90")]
    quality: u8,

    /// Target width for gif re-encoding (pixels)
    #[arg(long, default_value = "512")]
    gif_width: u32,

    /// Maximum gif palette size (2-256)
    #[arg(long, default_value = "18")]
    gif_colors: u16,

    /// Keep every Nth gif frame (1 = keep all)
    #[arg(long, default_value = "2")]
    gif_frame_step: usize,

    /// Re-encode only gifs strictly larger than this many MiB
    #[arg(long, default_value = "10")]
    gif_min_mib: u64,

    /// Keep source images after a confirmed WebP conversion
    #[arg(long)]
    keep_originals: bool,

    /// Explicit number of parallel workers (overrides the heuristics)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Tool-bound pool width is cpus x this multiplier
    #[arg(long, default_value = "5")]
    worker_multiplier: usize,

    /// Upload pool width is cpus + this offset
    #[arg(long, default_value = "5")]
    upload_offset: usize,

    /// Upload endpoint of the remote asset host
    #[arg(long)]
    upload_endpoint: Option<String>,

    /// Remote folder root (the media kind is appended per file)
    #[arg(long, default_value = "media-content")]
    folder_prefix: String,

    /// Where to write the path -> URL report after an upload run
    #[arg(short, long, default_value = "assets.json")]
    report: PathBuf,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Validate arguments
    if !args.media_directory.exists() {
        return Err(anyhow::anyhow!(
            "Media directory does not exist: {}",
            args.media_directory.display()
        ));
    }

    let mut config = Config {
        webp_quality: args.quality,
        gif_width: args.gif_width,
        gif_colors: args.gif_colors,
        gif_frame_step: args.gif_frame_step,
        gif_min_bytes: args.gif_min_mib * 1024 * 1024,
        keep_originals: args.keep_originals,
        workers: args.workers,
        tool_worker_multiplier: args.worker_multiplier,
        upload_worker_offset: args.upload_offset,
        upload_folder_prefix: args.folder_prefix,
        report_path: args.report,
        ..Default::default()
    };
    if let Some(endpoint) = args.upload_endpoint {
        config.upload_endpoint = endpoint;
    }
    config.validate()?;

    let dir = args.media_directory.as_path();
    info!("Starting {:?} pipeline in: {}", args.pipeline, dir.display());

    match args.pipeline {
        PipelineKind::Convert => {
            pipeline::run_conversion(dir, &config).await?;
        }
        PipelineKind::Gif => {
            pipeline::run_gif_optimization(dir, &config).await?;
        }
        PipelineKind::Upload => {
            let credentials = UploadCredentials::from_env()?;
            pipeline::run_upload(dir, &config, credentials).await?;
        }
        PipelineKind::All => {
            let credentials = UploadCredentials::from_env()?;
            pipeline::run_all(dir, &config, credentials).await?;
        }
    }

    Ok(())
}
