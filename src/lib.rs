//! # Space Media Publisher Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione, credenziali e derivazione worker
//! - `error`: Tipi di errore custom per le diverse operazioni
//! - `discovery`: Scansione directory e classificazione in work item
//! - `runner`: Motore batch a concorrenza limitata (il cuore della crate)
//! - `executors`: Le tre operazioni pluggable (convert, gif, upload)
//! - `report`: Aggregazione outcome e persistenza del report finale
//! - `progress`: Progress tracking e statistiche
//! - `platform`: Verifica cross-platform dei tool esterni
//! - `pipeline`: Cablaggio delle tre pipeline end-to-end
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use space_media_publisher::{pipeline, Config, UploadCredentials};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::default();
//! let credentials = UploadCredentials::from_env()?;
//! pipeline::run_all(std::path::Path::new("./media"), &config, credentials).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod executors;
pub mod pipeline;
pub mod platform;
pub mod progress;
pub mod report;
pub mod runner;

pub use config::{Config, UploadCredentials};
pub use discovery::{MediaKind, WorkItem};
pub use error::PipelineError;
pub use report::BatchReport;
pub use runner::{BatchRunner, Outcome, TaskExecutor};
