//! # Task Executors Module
//!
//! Le tre implementazioni concrete di `TaskExecutor`, una per pipeline:
//! - `convert`: conversione immagini raster in WebP via mogrify
//! - `gif`: re-encoding in place delle gif oversize via gifsicle
//! - `upload`: push dei byte verso l'asset host remoto via HTTP
//!
//! Ogni executor cattura i propri errori e li traduce nella tassonomia di
//! `PipelineError`; nessun errore per-item attraversa mai il runner.

pub mod convert;
pub mod gif;
pub mod upload;

pub use convert::WebpConverter;
pub use gif::GifEncoder;
pub use upload::Uploader;

/// Tail of a subprocess stderr, bounded for log/error messages
pub(crate) fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    const LIMIT: usize = 300;

    if trimmed.chars().count() > LIMIT {
        let tail: String = trimmed
            .chars()
            .skip(trimmed.chars().count() - LIMIT)
            .collect();
        format!("...{}", tail)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_tail_keeps_short_output() {
        assert_eq!(stderr_tail(b"  boom  \n"), "boom");
    }

    #[test]
    fn test_stderr_tail_truncates_long_output() {
        let long = "x".repeat(1000);
        let tail = stderr_tail(long.as_bytes());
        assert!(tail.starts_with("..."));
        assert_eq!(tail.chars().count(), 303);
    }
}
