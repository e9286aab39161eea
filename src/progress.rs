//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche di una run.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - Tracking dei contatori della batch (successi, failure)
//! - Report finale con riepilogo formattato
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:42] [====================>-------------------] 73/150 (48%) [OK] photo.webp
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for a batch run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_items: u64) -> Self {
        let bar = ProgressBar::new(total_items);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Counters accumulated while draining a batch
#[derive(Debug, Default, Clone)]
pub struct PipelineStats {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_success(&mut self) {
        self.processed += 1;
        self.succeeded += 1;
    }

    pub fn add_failure(&mut self) {
        self.processed += 1;
        self.failed += 1;
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} items | Succeeded: {} | Failed: {}",
            self.processed, self.succeeded, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counters() {
        let mut stats = PipelineStats::new();
        stats.add_success();
        stats.add_success();
        stats.add_failure();

        assert_eq!(stats.processed, 3);
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn test_summary_mentions_every_counter() {
        let mut stats = PipelineStats::new();
        stats.add_success();
        stats.add_failure();

        let summary = stats.format_summary();
        assert!(summary.contains("2 items"));
        assert!(summary.contains("Succeeded: 1"));
        assert!(summary.contains("Failed: 1"));
    }
}
