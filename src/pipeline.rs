//! # Pipeline Orchestration Module
//!
//! Cablaggio delle tre pipeline sul motore batch condiviso:
//! discovery -> runner -> aggregatore, con il check fail-fast dei tool
//! esterni prima di sottomettere qualunque lavoro.
//!
//! ## Flusso:
//! 1. Verifica dipendenze esterne (solo pipeline basate su tool)
//! 2. Discovery della worklist (un errore qui è fatale per la run)
//! 3. Dispatch attraverso il `BatchRunner` con la larghezza di pool derivata
//! 4. Drain degli outcome e, per l'upload, persistenza del report
//!
//! I fallimenti per-item restano nei log e nei contatori; solo discovery
//! e dipendenze mancanti interrompono una pipeline.

use crate::{
    config::{Config, UploadCredentials},
    discovery::{self, WorkItem},
    executors::{GifEncoder, Uploader, WebpConverter},
    platform::PlatformCommands,
    progress::PipelineStats,
    report::{Aggregator, BatchReport},
    runner::{BatchRunner, TaskExecutor},
};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Convert every jpg/jpeg/png in `dir` (shallow) to WebP
pub async fn run_conversion(dir: &Path, config: &Config) -> Result<PipelineStats> {
    PlatformCommands::instance().ensure_tools(&["mogrify"]).await?;

    let items = discovery::scan(dir, discovery::image_sources)?;
    let executor = Arc::new(WebpConverter::new(config));
    let (_, stats) = run_batch("Image conversion", items, executor, config.tool_workers()).await;
    Ok(stats)
}

/// Re-encode every gif strictly larger than the threshold, recursively
pub async fn run_gif_optimization(dir: &Path, config: &Config) -> Result<PipelineStats> {
    PlatformCommands::instance().ensure_tools(&["gifsicle"]).await?;

    let items = discovery::scan_recursive(dir, discovery::large_gifs(config.gif_min_bytes))?;
    let executor = Arc::new(GifEncoder::new(config));
    let (_, stats) = run_batch("Gif optimization", items, executor, config.tool_workers()).await;
    Ok(stats)
}

/// Upload every media file in `dir` (shallow) and persist the path -> URL
/// report once the whole batch has drained
pub async fn run_upload(
    dir: &Path,
    config: &Config,
    credentials: UploadCredentials,
) -> Result<PipelineStats> {
    let items = discovery::scan(dir, discovery::uploadables)?;
    let executor = Arc::new(Uploader::new(config, credentials)?);
    let (report, stats) = run_batch("Upload", items, executor, config.upload_workers()).await;

    report.persist(&config.report_path)?;
    Ok(stats)
}

/// The full publishing sequence: convert, re-encode gifs, upload
pub async fn run_all(dir: &Path, config: &Config, credentials: UploadCredentials) -> Result<()> {
    run_conversion(dir, config).await?;
    run_gif_optimization(dir, config).await?;
    run_upload(dir, config, credentials).await?;
    Ok(())
}

/// Shared wiring: dispatch a worklist and drain its outcomes
async fn run_batch<E>(
    label: &str,
    items: Vec<WorkItem>,
    executor: Arc<E>,
    workers: usize,
) -> (BatchReport, PipelineStats)
where
    E: TaskExecutor + 'static,
{
    if items.is_empty() {
        info!("{}: no matching files found", label);
        return (BatchReport::new(), PipelineStats::new());
    }

    let total = items.len();
    info!(
        "{}: {} items via {} across {} workers",
        label,
        total,
        executor.describe(),
        workers
    );

    let rx = BatchRunner::new(workers).run(items, executor);
    let (report, stats) = Aggregator::new(total).drain(rx).await;

    info!("{} complete: {}", label, stats.format_summary());
    (report, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::MediaKind;
    use crate::error::PipelineError;
    use async_trait::async_trait;
    use std::path::PathBuf;

    /// Upload stand-in: returns a fake URL, fails for one marked item
    struct FakeUploader;

    #[async_trait]
    impl TaskExecutor for FakeUploader {
        fn describe(&self) -> &'static str {
            "fake upload"
        }

        async fn execute(&self, item: &WorkItem) -> Result<String, PipelineError> {
            if item.file_name().starts_with("refused") {
                return Err(PipelineError::Upload("connection reset".to_string()));
            }
            Ok(format!("https://cdn.example/{}", item.file_name()))
        }
    }

    fn item(name: &str) -> WorkItem {
        WorkItem::new(PathBuf::from(format!("/media/{}", name)), MediaKind::Image, 0)
    }

    #[tokio::test]
    async fn test_one_refused_upload_out_of_five() {
        let items = vec![
            item("a.webp"),
            item("b.webp"),
            item("refused.webp"),
            item("c.webp"),
            item("d.webp"),
        ];

        let (report, stats) = run_batch("Upload", items, Arc::new(FakeUploader), 3).await;

        assert_eq!(stats.processed, 5);
        assert_eq!(stats.failed, 1);
        assert_eq!(report.len(), 4);
        assert_eq!(report.get(Path::new("/media/refused.webp")), None);
        assert_eq!(
            report.get(Path::new("/media/a.webp")),
            Some("https://cdn.example/a.webp")
        );
    }

    #[tokio::test]
    async fn test_empty_worklist_short_circuits() {
        let (report, stats) = run_batch("Upload", Vec::new(), Arc::new(FakeUploader), 3).await;
        assert!(report.is_empty());
        assert_eq!(stats.processed, 0);
    }
}
