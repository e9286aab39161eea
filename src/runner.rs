//! # Batch Runner Module
//!
//! Il motore di esecuzione batch a concorrenza limitata, condiviso dalle
//! tre pipeline (conversione, gif, upload).
//!
//! ## Responsabilità:
//! - Dispatch di ogni `WorkItem` esattamente una volta verso un `TaskExecutor`
//! - Cap di concorrenza tramite `Semaphore` (larghezza del pool configurabile)
//! - Conversione di ogni errore (e panic) per-item in un `Outcome::Failure`
//! - Streaming degli outcome in ordine di completamento, non di submit
//!
//! ## Garanzie:
//! - N item in ingresso producono esattamente N outcome, con o senza failure
//! - Il fallimento di un item non cancella né altera gli item fratelli
//! - Il pool viene smontato solo quando tutto il lavoro sottomesso è stato
//!   contabilizzato, anche se il consumatore degli outcome sparisce prima
//!
//! ## Modello:
//! Ogni item è una singola chiamata bloccante (subprocess o round-trip di
//! rete): la concorrenza viene solo dalla larghezza del pool, nessun
//! work-stealing, nessuna priorità, nessuna cancellazione una volta partiti.

use crate::{discovery::WorkItem, error::PipelineError};
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error};

/// The pluggable operation applied to one WorkItem. Implementations must be
/// safe to invoke concurrently from multiple workers.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Short label used in logs
    fn describe(&self) -> &'static str;

    /// Perform the blocking operation for one item and return its success
    /// value (an output path, a public URL). Errors become Failure outcomes.
    async fn execute(&self, item: &WorkItem) -> Result<String, PipelineError>;
}

/// The result of executing exactly one WorkItem
#[derive(Debug)]
pub enum Outcome {
    Success { item: WorkItem, value: String },
    Failure { item: WorkItem, error: PipelineError },
}

impl Outcome {
    /// The originating work item
    pub fn item(&self) -> &WorkItem {
        match self {
            Self::Success { item, .. } => item,
            Self::Failure { item, .. } => item,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Bounded-concurrency dispatcher for one batch
pub struct BatchRunner {
    max_workers: usize,
}

impl BatchRunner {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    /// Submit every item once and return the outcome stream. Outcomes arrive
    /// in completion order; the channel closes after the Nth outcome.
    pub fn run<E>(&self, items: Vec<WorkItem>, executor: Arc<E>) -> mpsc::Receiver<Outcome>
    where
        E: TaskExecutor + 'static,
    {
        let (tx, rx) = mpsc::channel(self.max_workers);
        let semaphore = Arc::new(Semaphore::new(self.max_workers));

        debug!(
            "Dispatching {} items across {} workers",
            items.len(),
            self.max_workers
        );

        let mut tasks = JoinSet::new();
        for item in items {
            let tx = tx.clone();
            let executor = executor.clone();
            let semaphore = semaphore.clone();

            tasks.spawn(async move {
                let outcome = execute_one(executor, item, semaphore).await;
                // A dropped receiver must not abandon in-flight work
                if tx.send(outcome).await.is_err() {
                    debug!("Outcome receiver dropped, continuing batch drain");
                }
            });
        }
        drop(tx);

        // The pool is accounted for only when every spawned worker has been
        // joined, on every exit path.
        tokio::spawn(async move {
            while let Some(joined) = tasks.join_next().await {
                if let Err(e) = joined {
                    error!("Worker task failed to join: {}", e);
                }
            }
            debug!("Batch runner drained all workers");
        });

        rx
    }
}

async fn execute_one<E>(executor: Arc<E>, item: WorkItem, semaphore: Arc<Semaphore>) -> Outcome
where
    E: TaskExecutor,
{
    let _permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(e) => {
            return Outcome::Failure {
                item,
                error: PipelineError::Panic(format!("worker pool closed before dispatch: {}", e)),
            }
        }
    };

    match AssertUnwindSafe(executor.execute(&item)).catch_unwind().await {
        Ok(Ok(value)) => Outcome::Success { item, value },
        Ok(Err(error)) => Outcome::Failure { item, error },
        Err(payload) => Outcome::Failure {
            item,
            error: PipelineError::Panic(panic_message(payload)),
        },
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked with a non-string payload".to_string()
    }
}
