//! # Image Conversion Executor
//!
//! Converte una singola immagine raster (jpg/jpeg/png) in WebP invocando
//! `mogrify` come tool esterno, alla qualità configurata.
//!
//! ## Contratto con il tool:
//! `mogrify -format webp -quality Q <path>` scrive il file `.webp` accanto
//! al sorgente ed esce con status zero in caso di successo. Lo status viene
//! sempre controllato: un exit non-zero diventa `ExternalTool`, mai un
//! successo silenzioso.
//!
//! ## Rimozione dei sorgenti:
//! Il sorgente viene rimosso solo dopo che la conversione è confermata
//! (status zero e output presente), con una riga di log esplicita. Il flag
//! `keep_originals` disattiva la rimozione.

use crate::{
    config::Config,
    discovery::WorkItem,
    error::PipelineError,
    executors::stderr_tail,
    platform::PlatformCommands,
    runner::TaskExecutor,
};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

/// Converts raster images to WebP through mogrify
pub struct WebpConverter {
    quality: u8,
    keep_originals: bool,
}

impl WebpConverter {
    pub fn new(config: &Config) -> Self {
        Self {
            quality: config.webp_quality,
            keep_originals: config.keep_originals,
        }
    }
}

#[async_trait]
impl TaskExecutor for WebpConverter {
    fn describe(&self) -> &'static str {
        "webp conversion"
    }

    async fn execute(&self, item: &WorkItem) -> Result<String, PipelineError> {
        let platform = PlatformCommands::instance();
        let output_path = item.path.with_extension("webp");

        debug!("Converting {} (quality {})", item.path.display(), self.quality);

        let output = Command::new(platform.get_command("mogrify"))
            .arg("-format")
            .arg("webp")
            .arg("-quality")
            .arg(self.quality.to_string())
            .arg(&item.path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(PipelineError::ExternalTool(format!(
                "mogrify exited with {} for {}: {}",
                output.status,
                item.path.display(),
                stderr_tail(&output.stderr)
            )));
        }

        if !output_path.exists() {
            return Err(PipelineError::ExternalTool(format!(
                "mogrify reported success but {} was not created",
                output_path.display()
            )));
        }

        if !self.keep_originals {
            tokio::fs::remove_file(&item.path).await?;
            info!(
                "Removed original {} after confirmed conversion",
                item.path.display()
            );
        }

        Ok(output_path.display().to_string())
    }
}
