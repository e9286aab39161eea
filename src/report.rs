//! # Result Aggregation Module
//!
//! Questo modulo è l'unico consumatore degli outcome prodotti dal runner.
//!
//! ## Responsabilità:
//! - Drena il canale degli outcome fino alla chiusura (fine batch)
//! - Logga ogni outcome (successo a `info`, failure a `error`)
//! - Accumula le sole Success in una mappa path -> valore (`BatchReport`)
//! - Persiste il report una volta sola, a batch conclusa
//!
//! I worker non toccano mai la mappa: il pattern è single-consumer su
//! canale, quindi non serve alcun lock attorno al report. Le failure
//! restano visibili solo nei log e nei contatori, mai nel report.
//!
//! ## Persistenza:
//! Il report viene scritto in un file temporaneo nella directory di
//! destinazione e poi rinominato in place: mai un report scritto a metà.

use crate::{
    progress::{PipelineStats, ProgressManager},
    runner::Outcome,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Mapping from a WorkItem's original absolute path to its success value,
/// persisted as a flat JSON object.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchReport {
    entries: BTreeMap<String, String>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a success, keyed by the item's original path
    pub fn insert(&mut self, path: &Path, value: String) {
        self.entries.insert(path.display().to_string(), value);
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.entries.get(&path.display().to_string()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the report once. The content lands in a temp file next to the
    /// destination and is renamed into place, so an interrupted write never
    /// leaves a truncated report behind.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.entries)?;

        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let mut tmp = match dir {
            Some(dir) => tempfile::NamedTempFile::new_in(dir)?,
            None => tempfile::NamedTempFile::new_in(".")?,
        };
        tmp.write_all(content.as_bytes())?;
        tmp.persist(path)?;

        info!("Report with {} entries written to {}", self.len(), path.display());
        Ok(())
    }
}

/// Single consumer of a batch's outcome stream
pub struct Aggregator {
    progress: ProgressManager,
}

impl Aggregator {
    pub fn new(total_items: usize) -> Self {
        Self {
            progress: ProgressManager::new(total_items as u64),
        }
    }

    /// Consume the outcome channel to exhaustion. Returns the report built
    /// from Success outcomes and the run counters. Blocks until the runner
    /// has accounted for every submitted item.
    pub async fn drain(&self, mut rx: mpsc::Receiver<Outcome>) -> (BatchReport, PipelineStats) {
        let mut report = BatchReport::new();
        let mut stats = PipelineStats::new();

        while let Some(outcome) = rx.recv().await {
            match outcome {
                Outcome::Success { item, value } => {
                    info!("[OK] {} -> {}", item.path.display(), value);
                    report.insert(&item.path, value);
                    stats.add_success();
                    self.progress.update(&format!("[OK] {}", item.file_name()));
                }
                Outcome::Failure { item, error } => {
                    error!("[FAIL] {}: {}", item.path.display(), error);
                    stats.add_failure();
                    self.progress.update(&format!("[ERROR] {}", item.file_name()));
                }
            }
        }

        self.progress.finish(&stats.format_summary());
        (report, stats)
    }
}
