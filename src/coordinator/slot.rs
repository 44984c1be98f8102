use tokio::sync::mpsc::UnboundedSender;

use super::outcome::DownloadOutcome;
use crate::error::DownloadError;

/// One task's claim on a completion message.
///
/// `complete` sends the outcome. If the slot is dropped unfilled (the task panicked,
/// or was never spawned) a `TaskAborted` failure is sent in its place, so the
/// receiving side always gets exactly one message per slot.
pub(crate) struct CompletionSlot {
    tx: Option<UnboundedSender<DownloadOutcome>>,
    index: usize,
    url: String,
}

impl CompletionSlot {
    pub(crate) fn new(tx: UnboundedSender<DownloadOutcome>, index: usize, url: String) -> Self {
        Self {
            tx: Some(tx),
            index,
            url,
        }
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn complete(mut self, outcome: DownloadOutcome) {
        if let Some(tx) = self.tx.take() {
            // The receiver only goes away once it has every message it waits for.
            let _ = tx.send(outcome);
        }
    }
}

impl Drop for CompletionSlot {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let reason = if std::thread::panicking() {
                "task panicked"
            } else {
                "task ended without reporting"
            };
            let _ = tx.send(DownloadOutcome::Failure {
                url: std::mem::take(&mut self.url),
                index: self.index,
                error: DownloadError::TaskAborted(reason.to_string()),
            });
        }
    }
}
