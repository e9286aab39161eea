//! # File Discovery Module
//!
//! Questo modulo gestisce la discovery dei file media e la loro
//! classificazione in work item tipizzati.
//!
//! ## Responsabilità:
//! - Listing non ricorsivo di una singola directory (pipeline conversione/upload)
//! - Walk ricorsivo con soglia di dimensione (pipeline gif)
//! - Classificazione per estensione in {Image, Gif, Video}
//! - Costruzione di `WorkItem` immutabili con path assoluto
//!
//! ## Classificatori:
//! - `image_sources`: jpg/jpeg/png (sorgenti da convertire in WebP)
//! - `large_gifs`: gif strettamente sopra la soglia configurata
//! - `uploadables`: jpg/jpeg/png/webp/gif/mp4 (tutto ciò che si carica)
//!
//! Il matching delle estensioni è case-sensitive: `photo.PNG` non viene
//! incluso. Una directory mancante o non leggibile è un errore fatale di
//! discovery, mai una lista vuota silenziosa.
//!
//! ## Side effects:
//! Nessuno oltre la lettura del filesystem.

use crate::error::PipelineError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Media classification used to route an item through the pipelines and to
/// pick its destination folder on the asset host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Gif,
    Video,
}

impl MediaKind {
    /// Destination folder segment on the remote asset host
    pub fn folder_name(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Gif => "gif",
            Self::Video => "video",
        }
    }
}

/// One discovered file queued for processing. Created here, consumed exactly
/// once by the batch runner, never mutated.
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// Absolute path of the source file
    pub path: PathBuf,
    /// Classification decided by the discovery predicate
    pub kind: MediaKind,
    /// Size in bytes at discovery time
    pub size: u64,
}

impl WorkItem {
    pub fn new(path: PathBuf, kind: MediaKind, size: u64) -> Self {
        Self { path, kind, size }
    }

    /// File name for log messages
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    }
}

/// Shallow listing of a single directory. Entries are classified by the
/// predicate; files it returns `None` for are excluded.
pub fn scan(
    dir: &Path,
    classify: impl Fn(&Path, u64) -> Option<MediaKind>,
) -> Result<Vec<WorkItem>, PipelineError> {
    let dir = canonical_dir(dir)?;
    let entries = std::fs::read_dir(&dir)
        .map_err(|e| PipelineError::Discovery(format!("cannot read {}: {}", dir.display(), e)))?;

    let mut items = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        if let Some(kind) = classify(&path, metadata.len()) {
            items.push(WorkItem::new(path, kind, metadata.len()));
        }
    }

    Ok(items)
}

/// Recursive walk of a directory tree, same classifier contract as `scan`
pub fn scan_recursive(
    dir: &Path,
    classify: impl Fn(&Path, u64) -> Option<MediaKind>,
) -> Result<Vec<WorkItem>, PipelineError> {
    let dir = canonical_dir(dir)?;

    let mut items = Vec::new();
    for entry in WalkDir::new(&dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if let Some(kind) = classify(entry.path(), metadata.len()) {
            items.push(WorkItem::new(entry.path().to_path_buf(), kind, metadata.len()));
        }
    }

    Ok(items)
}

fn canonical_dir(dir: &Path) -> Result<PathBuf, PipelineError> {
    let dir = dir
        .canonicalize()
        .map_err(|e| PipelineError::Discovery(format!("{}: {}", dir.display(), e)))?;
    if !dir.is_dir() {
        return Err(PipelineError::Discovery(format!(
            "{} is not a directory",
            dir.display()
        )));
    }
    Ok(dir)
}

/// Extension of a path, matched case-sensitively
fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

/// Raster sources for the WebP conversion pipeline
pub fn image_sources(path: &Path, _size: u64) -> Option<MediaKind> {
    match extension(path)? {
        "jpg" | "jpeg" | "png" => Some(MediaKind::Image),
        _ => None,
    }
}

/// Gifs strictly larger than `min_bytes`, for the re-encoding pipeline
pub fn large_gifs(min_bytes: u64) -> impl Fn(&Path, u64) -> Option<MediaKind> {
    move |path, size| match extension(path)? {
        "gif" if size > min_bytes => Some(MediaKind::Gif),
        _ => None,
    }
}

/// Everything the upload pipeline pushes to the asset host
pub fn uploadables(path: &Path, _size: u64) -> Option<MediaKind> {
    match extension(path)? {
        "jpg" | "jpeg" | "png" | "webp" => Some(MediaKind::Image),
        "gif" => Some(MediaKind::Gif),
        "mp4" => Some(MediaKind::Video),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, bytes: usize) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, vec![0u8; bytes]).unwrap();
        path
    }

    fn names(items: &[WorkItem]) -> HashSet<String> {
        items.iter().map(|i| i.file_name()).collect()
    }

    #[test]
    fn test_image_discovery_scenario() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "a.jpg", 2048);
        write_file(temp_dir.path(), "b.png", 3072);
        write_file(temp_dir.path(), "c.txt", 1024);
        write_file(temp_dir.path(), "d.gif", 4096);

        let items = scan(temp_dir.path(), image_sources).unwrap();
        assert_eq!(
            names(&items),
            HashSet::from(["a.jpg".to_string(), "b.png".to_string()])
        );
    }

    #[test]
    fn test_large_gif_discovery_is_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        write_file(temp_dir.path(), "small.gif", 100);
        write_file(&nested, "big.gif", 5000);
        write_file(&nested, "photo.jpg", 5000);

        let items = scan_recursive(temp_dir.path(), large_gifs(1000)).unwrap();
        assert_eq!(names(&items), HashSet::from(["big.gif".to_string()]));
        assert_eq!(items[0].kind, MediaKind::Gif);
    }

    #[test]
    fn test_size_threshold_is_strict() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "exact.gif", 1000);
        write_file(temp_dir.path(), "over.gif", 1001);

        let items = scan_recursive(temp_dir.path(), large_gifs(1000)).unwrap();
        assert_eq!(names(&items), HashSet::from(["over.gif".to_string()]));
    }

    #[test]
    fn test_extension_matching_is_case_sensitive() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "photo.PNG", 2048);
        write_file(temp_dir.path(), "photo.png", 2048);

        let items = scan(temp_dir.path(), image_sources).unwrap();
        assert_eq!(names(&items), HashSet::from(["photo.png".to_string()]));
    }

    #[test]
    fn test_uploadables_classification() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "a.webp", 10);
        write_file(temp_dir.path(), "b.gif", 10);
        write_file(temp_dir.path(), "c.mp4", 10);
        write_file(temp_dir.path(), "d.txt", 10);

        let items = scan(temp_dir.path(), uploadables).unwrap();
        let kinds: HashSet<_> = items.iter().map(|i| (i.file_name(), i.kind)).collect();
        assert_eq!(
            kinds,
            HashSet::from([
                ("a.webp".to_string(), MediaKind::Image),
                ("b.gif".to_string(), MediaKind::Gif),
                ("c.mp4".to_string(), MediaKind::Video),
            ])
        );
    }

    #[test]
    fn test_shallow_scan_ignores_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        write_file(&nested, "deep.jpg", 10);
        write_file(temp_dir.path(), "top.jpg", 10);

        let items = scan(temp_dir.path(), image_sources).unwrap();
        assert_eq!(names(&items), HashSet::from(["top.jpg".to_string()]));
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        let result = scan(&missing, image_sources);
        assert!(matches!(result, Err(PipelineError::Discovery(_))));
    }

    #[test]
    fn test_discovered_paths_are_absolute() {
        let temp_dir = TempDir::new().unwrap();
        write_file(temp_dir.path(), "a.jpg", 10);

        let items = scan(temp_dir.path(), image_sources).unwrap();
        assert!(items[0].path.is_absolute());
    }
}
