//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione della pipeline.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri delle tre pipeline
//! - Fornisce validazione robusta dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Deriva la larghezza dei worker pool dal parallelismo disponibile
//! - Carica le credenziali dell'asset host dall'ambiente (mai da sorgente)
//!
//! ## Parametri di configurazione:
//! - `webp_quality`: Qualità WebP per la conversione (1-100, default: 90)
//! - `gif_width`: Larghezza target per il re-encoding gif (default: 512)
//! - `gif_colors`: Palette massima per il re-encoding gif (default: 18)
//! - `gif_frame_step`: Tiene un frame ogni N (default: 2, 1 = tutti)
//! - `gif_min_bytes`: Soglia dimensione per le gif da riprocessare (default: 10 MiB)
//! - `keep_originals`: Non cancellare i sorgenti dopo la conversione (default: false)
//! - `workers`: Override esplicito della larghezza del pool (default: None)
//! - `tool_worker_multiplier`: CPU × N per pipeline basate su tool (default: 5)
//! - `upload_worker_offset`: CPU + N per la pipeline di upload (default: 5)
//!
//! ## Derivazione worker:
//! I default ×5 / +5 sono euristiche per lavoro I/O-bound, non requisiti di
//! correttezza: `workers` li scavalca entrambi.

use crate::error::PipelineError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const MIB: u64 = 1024 * 1024;

/// Configuration for the three publishing pipelines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// WebP quality for image conversion (1-100)
    pub webp_quality: u8,
    /// Target width for gif re-encoding (pixels)
    pub gif_width: u32,
    /// Maximum palette size for gif re-encoding (2-256)
    pub gif_colors: u16,
    /// Keep every Nth frame when re-encoding gifs (1 = keep all)
    pub gif_frame_step: usize,
    /// Only gifs strictly larger than this are re-encoded
    pub gif_min_bytes: u64,
    /// Keep source images after a confirmed WebP conversion
    pub keep_originals: bool,
    /// Explicit worker-pool width (None = derive from parallelism)
    pub workers: Option<usize>,
    /// Pool width for tool-bound pipelines is cpus × this multiplier
    pub tool_worker_multiplier: usize,
    /// Pool width for the upload pipeline is cpus + this offset
    pub upload_worker_offset: usize,
    /// Upload endpoint of the remote asset host (not a secret)
    pub upload_endpoint: String,
    /// Remote folder root; the media kind is appended per file
    pub upload_folder_prefix: String,
    /// Where the path -> URL report is written after an upload run
    pub report_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webp_quality: 90,
            gif_width: 512,
            gif_colors: 18,
            gif_frame_step: 2,
            gif_min_bytes: 10 * MIB,
            keep_originals: false,
            workers: None,
            tool_worker_multiplier: 5,
            upload_worker_offset: 5,
            upload_endpoint: "https://upload.imagekit.io/api/v1/files/upload".to_string(),
            upload_folder_prefix: "media-content".to_string(),
            report_path: PathBuf::from("assets.json"),
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.webp_quality == 0 || self.webp_quality > 100 {
            return Err(anyhow::anyhow!("WebP quality must be between 1 and 100"));
        }

        if self.gif_width == 0 {
            return Err(anyhow::anyhow!("Gif width must be greater than 0"));
        }

        if self.gif_colors < 2 || self.gif_colors > 256 {
            return Err(anyhow::anyhow!("Gif palette must be between 2 and 256 colors"));
        }

        if self.gif_frame_step == 0 {
            return Err(anyhow::anyhow!("Gif frame step must be greater than 0"));
        }

        if self.tool_worker_multiplier == 0 {
            return Err(anyhow::anyhow!("Tool worker multiplier must be greater than 0"));
        }

        if let Some(workers) = self.workers {
            if workers == 0 {
                return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
            }
        }

        if self.upload_endpoint.is_empty() {
            return Err(anyhow::anyhow!("Upload endpoint must not be empty"));
        }

        Ok(())
    }

    /// Worker-pool width for the tool-bound pipelines (conversion, gif)
    pub fn tool_workers(&self) -> usize {
        self.workers
            .unwrap_or_else(|| available_cpus() * self.tool_worker_multiplier)
            .max(1)
    }

    /// Worker-pool width for the upload pipeline
    pub fn upload_workers(&self) -> usize {
        self.workers
            .unwrap_or_else(|| available_cpus() + self.upload_worker_offset)
            .max(1)
    }

    /// Load configuration from file
    pub async fn from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

fn available_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Credentials for the remote asset host, loaded from the environment at
/// startup. Never serialized and never present in source.
#[derive(Clone)]
pub struct UploadCredentials {
    pub private_key: String,
}

impl UploadCredentials {
    pub const KEY_VAR: &'static str = "PUBLISHER_PRIVATE_KEY";

    /// Read credentials from the environment
    pub fn from_env() -> Result<Self, PipelineError> {
        let private_key = std::env::var(Self::KEY_VAR).map_err(|_| {
            PipelineError::Upload(format!("{} is not set in the environment", Self::KEY_VAR))
        })?;

        if private_key.is_empty() {
            return Err(PipelineError::Upload(format!("{} is empty", Self::KEY_VAR)));
        }

        Ok(Self { private_key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.webp_quality = 0;
        assert!(config.validate().is_err());

        config.webp_quality = 90;
        config.gif_colors = 1;
        assert!(config.validate().is_err());

        config.gif_colors = 18;
        config.gif_frame_step = 0;
        assert!(config.validate().is_err());

        config.gif_frame_step = 2;
        config.workers = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.webp_quality, 90);
        assert_eq!(config.gif_width, 512);
        assert_eq!(config.gif_colors, 18);
        assert_eq!(config.gif_min_bytes, 10 * 1024 * 1024);
        assert!(!config.keep_originals);
        assert_eq!(config.workers, None);
    }

    #[test]
    fn test_worker_override_wins() {
        let config = Config {
            workers: Some(3),
            ..Default::default()
        };
        assert_eq!(config.tool_workers(), 3);
        assert_eq!(config.upload_workers(), 3);
    }

    #[test]
    fn test_worker_heuristics_are_nonzero() {
        let config = Config::default();
        assert!(config.tool_workers() >= 1);
        assert!(config.upload_workers() >= 1);
    }

    #[tokio::test]
    async fn test_config_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original_config = Config {
            webp_quality: 85,
            gif_width: 480,
            gif_colors: 32,
            workers: Some(8),
            ..Default::default()
        };

        original_config.save_to_file(&config_path).await.unwrap();
        let loaded_config = Config::from_file(&config_path).await.unwrap();

        assert_eq!(loaded_config.webp_quality, 85);
        assert_eq!(loaded_config.gif_width, 480);
        assert_eq!(loaded_config.gif_colors, 32);
        assert_eq!(loaded_config.workers, Some(8));
    }
}
