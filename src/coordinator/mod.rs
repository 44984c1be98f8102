//! Fan-out/fan-in download coordination.
//!
//! `Coordinator::fetch_all` spawns one task per URL. Every task owns a
//! `CompletionSlot` and reports through it exactly once, and the coordinator
//! returns after receiving exactly as many messages as it launched tasks.

mod naming;
mod outcome;
mod slot;

pub use naming::{ArtifactNamer, BatchNamer};
pub use outcome::{AggregateResult, BatchReport, BatchStatus, DownloadOutcome, OutcomeReport};

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::DownloadError;
use crate::fetcher::Fetcher;
use crate::store::Store;
use crate::utils::limited_spawner::LimitedSpawner;
use slot::CompletionSlot;

pub struct Coordinator<F, S> {
    fetcher: Arc<F>,
    store: Arc<S>,
    namer: ArtifactNamer,
    spawner: LimitedSpawner,
}

impl<F: Fetcher, S: Store> Coordinator<F, S> {
    pub fn new(fetcher: F, store: S, namer: ArtifactNamer) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            store: Arc::new(store),
            namer,
            spawner: LimitedSpawner::unbounded(),
        }
    }

    /// Cap the number of downloads in flight across all calls. `None` means no cap.
    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.spawner = LimitedSpawner::with_limit(limit);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Download every URL and persist each payload.
    ///
    /// Never fails as a whole: per-item errors become `Failure` outcomes and the
    /// result always holds one outcome per input entry, sorted by input index.
    pub async fn fetch_all(&self, urls: Vec<String>) -> AggregateResult {
        let total = urls.len();
        if total == 0 {
            debug!("empty batch, nothing to do");
            return AggregateResult::new(Vec::new());
        }

        let names = Arc::new(self.namer.batch());
        let batch = names.id();
        info!(batch, total, "batch started");

        let (tx, mut rx) = mpsc::unbounded_channel();
        for (index, url) in urls.into_iter().enumerate() {
            let slot = CompletionSlot::new(tx.clone(), index, url);
            let task = run_task(
                Arc::clone(&self.fetcher),
                Arc::clone(&self.store),
                Arc::clone(&names),
                slot,
            );
            // On failure the task future is dropped unspawned and its slot reports the abort.
            if let Err(err) = self.spawner.spawn(task).await {
                error!(batch, index, error = %err, "failed to spawn download task");
            }
        }
        drop(tx);

        let mut outcomes = Vec::with_capacity(total);
        while outcomes.len() < total {
            match rx.recv().await {
                Some(outcome) => outcomes.push(outcome),
                None => break,
            }
        }
        if outcomes.len() != total {
            error!(
                batch,
                expected = total,
                received = outcomes.len(),
                "completion channel closed early"
            );
        }

        let result = AggregateResult::new(outcomes);
        info!(
            batch,
            status = ?result.status(),
            succeeded = result.succeeded(),
            failed = result.failed(),
            "batch finished"
        );
        result
    }
}

async fn run_task<F: Fetcher, S: Store>(
    fetcher: Arc<F>,
    store: Arc<S>,
    names: Arc<BatchNamer>,
    slot: CompletionSlot,
) {
    let index = slot.index();
    let url = slot.url().to_string();

    let outcome = match download_one(fetcher.as_ref(), store.as_ref(), &names, &url).await {
        Ok((artifact, payload)) => {
            debug!(
                batch = names.id(),
                index,
                url = %url,
                artifact = %artifact,
                "download succeeded"
            );
            DownloadOutcome::Success {
                md5: format!("{:x}", md5::compute(&payload)),
                url,
                index,
                artifact,
                payload,
            }
        }
        Err(error) => {
            warn!(batch = names.id(), index, url = %url, error = %error, "download failed");
            DownloadOutcome::Failure { url, index, error }
        }
    };

    slot.complete(outcome);
}

async fn download_one<F: Fetcher, S: Store>(
    fetcher: &F,
    store: &S,
    names: &BatchNamer,
    url: &str,
) -> Result<(String, Bytes), DownloadError> {
    let payload = fetcher.fetch(url).await?;
    let artifact = names.next_name();
    store.persist(&artifact, &payload).await?;
    Ok((artifact, payload))
}
