//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom della pipeline.
//!
//! ## Responsabilità:
//! - Definisce `PipelineError` enum per categorizzare tutti gli errori possibili
//! - Fornisce messaggi di errore descrittivi e strutturati
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `ExternalTool`: Tool esterno uscito con status non-zero (mogrify, gifsicle)
//! - `Upload`: Errori di rete/auth/API durante l'upload
//! - `Discovery`: Directory mancante o non leggibile (fatale per la pipeline)
//! - `MissingDependency`: Tool esterno non trovato sul PATH
//! - `InvalidResponse`: Risposta 2xx dall'asset host senza URL utilizzabile
//! - `Panic`: Un worker è andato in panic durante l'esecuzione di un item

/// Custom error types for the publishing pipeline
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("External tool error: {0}")]
    ExternalTool(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Invalid upload response: {0}")]
    InvalidResponse(String),

    #[error("Worker panic: {0}")]
    Panic(String),
}
