//! # Gif Re-encoding Executor
//!
//! Ricomprime in place una gif oversize con una catena `gifsicle` a due
//! stadi: prima `--unoptimize` verso un file temporaneo nella stessa
//! directory, poi dither + palette limitata + resize alla larghezza target
//! (`-O2`) di nuovo sul path originale.
//!
//! ## Decimazione frame:
//! Con `gif_frame_step = N > 1` viene tenuto un frame ogni N. I selettori
//! (`#0 #2 #4 ...`) sono derivati dal numero reale di frame, letto
//! dall'output di `gifsicle --info`; se il conteggio non è leggibile la
//! gif viene ricompressa con tutti i frame.

use crate::{
    config::Config,
    discovery::WorkItem,
    error::PipelineError,
    executors::stderr_tail,
    platform::PlatformCommands,
    runner::TaskExecutor,
};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

/// Re-encodes oversized gifs in place through gifsicle
pub struct GifEncoder {
    width: u32,
    colors: u16,
    frame_step: usize,
}

impl GifEncoder {
    pub fn new(config: &Config) -> Self {
        Self {
            width: config.gif_width,
            colors: config.gif_colors,
            frame_step: config.gif_frame_step,
        }
    }

    /// Number of frames in a gif, parsed from `gifsicle --info`
    async fn frame_count(&self, path: &Path) -> Result<Option<usize>, PipelineError> {
        let platform = PlatformCommands::instance();
        let output = Command::new(platform.get_command("gifsicle"))
            .arg("--info")
            .arg(path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(PipelineError::ExternalTool(format!(
                "gifsicle --info exited with {} for {}: {}",
                output.status,
                path.display(),
                stderr_tail(&output.stderr)
            )));
        }

        Ok(parse_frame_count(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[async_trait]
impl TaskExecutor for GifEncoder {
    fn describe(&self) -> &'static str {
        "gif re-encoding"
    }

    async fn execute(&self, item: &WorkItem) -> Result<String, PipelineError> {
        let platform = PlatformCommands::instance();
        let parent = item.path.parent().unwrap_or(Path::new("."));

        // Stage 1: expand the gif so the re-encode starts from raw frames
        let unoptimized = tempfile::Builder::new()
            .prefix(".publisher-")
            .suffix(".gif")
            .tempfile_in(parent)?;

        debug!("Unoptimizing {} ({} bytes)", item.path.display(), item.size);

        let output = Command::new(platform.get_command("gifsicle"))
            .arg("--unoptimize")
            .arg(&item.path)
            .arg("-o")
            .arg(unoptimized.path())
            .output()
            .await?;

        if !output.status.success() {
            return Err(PipelineError::ExternalTool(format!(
                "gifsicle --unoptimize exited with {} for {}: {}",
                output.status,
                item.path.display(),
                stderr_tail(&output.stderr)
            )));
        }

        // Stage 2: dither, bounded palette, fit to the target width
        let mut command = Command::new(platform.get_command("gifsicle"));
        command
            .arg("--dither")
            .arg("--colors")
            .arg(self.colors.to_string())
            .arg("--resize-fit-width")
            .arg(self.width.to_string())
            .arg("-O2")
            .arg(unoptimized.path());

        if self.frame_step > 1 {
            match self.frame_count(unoptimized.path()).await? {
                Some(count) => {
                    for selector in frame_selectors(count, self.frame_step) {
                        command.arg(selector);
                    }
                }
                None => {
                    warn!(
                        "Could not read frame count for {}, keeping all frames",
                        item.path.display()
                    );
                }
            }
        }

        let output = command.arg("-o").arg(&item.path).output().await?;

        if !output.status.success() {
            return Err(PipelineError::ExternalTool(format!(
                "gifsicle re-encode exited with {} for {}: {}",
                output.status,
                item.path.display(),
                stderr_tail(&output.stderr)
            )));
        }

        Ok(item.path.display().to_string())
    }
}

/// Frame selectors `#0 #step #2*step ...` up to (excluding) `count`
fn frame_selectors(count: usize, step: usize) -> Vec<String> {
    (0..count).step_by(step.max(1)).map(|i| format!("#{}", i)).collect()
}

/// Extract the image count from `gifsicle --info` output, which starts with
/// a line like `* animation.gif 42 images`.
fn parse_frame_count(info: &str) -> Option<usize> {
    let tokens: Vec<&str> = info.split_whitespace().collect();
    tokens
        .windows(2)
        .find(|pair| pair[1] == "images" || pair[1] == "image")
        .and_then(|pair| pair[0].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_selectors_follow_the_step() {
        assert_eq!(frame_selectors(7, 2), vec!["#0", "#2", "#4", "#6"]);
        assert_eq!(frame_selectors(3, 1), vec!["#0", "#1", "#2"]);
        assert!(frame_selectors(0, 2).is_empty());
    }

    #[test]
    fn test_parse_frame_count_from_info_listing() {
        let info = "* animation.gif 42 images\n  logical screen 640x480\n";
        assert_eq!(parse_frame_count(info), Some(42));

        let single = "* still.gif 1 image\n  logical screen 32x32\n";
        assert_eq!(parse_frame_count(single), Some(1));
    }

    #[test]
    fn test_parse_frame_count_rejects_garbage() {
        assert_eq!(parse_frame_count("no counts here"), None);
        assert_eq!(parse_frame_count(""), None);
    }
}
