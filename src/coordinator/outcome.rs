use bytes::Bytes;
use serde::Serialize;

use crate::error::{DownloadError, FailureKind};

/// Result of one submitted URL. Exactly one is produced per input entry.
#[derive(Debug, Clone)]
pub enum DownloadOutcome {
    Success {
        url: String,
        /// Position of the URL in the submitted list
        index: usize,
        artifact: String,
        /// Hex MD5 of `payload`
        md5: String,
        payload: Bytes,
    },
    Failure {
        url: String,
        index: usize,
        error: DownloadError,
    },
}

impl DownloadOutcome {
    pub fn url(&self) -> &str {
        match self {
            DownloadOutcome::Success { url, .. } | DownloadOutcome::Failure { url, .. } => url,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            DownloadOutcome::Success { index, .. } | DownloadOutcome::Failure { index, .. } => {
                *index
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Success { .. })
    }

    pub fn artifact(&self) -> Option<&str> {
        match self {
            DownloadOutcome::Success { artifact, .. } => Some(artifact),
            DownloadOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&DownloadError> {
        match self {
            DownloadOutcome::Success { .. } => None,
            DownloadOutcome::Failure { error, .. } => Some(error),
        }
    }

    fn report(&self) -> OutcomeReport {
        match self {
            DownloadOutcome::Success {
                url,
                index,
                artifact,
                md5,
                payload,
            } => OutcomeReport::Success {
                url: url.clone(),
                index: *index,
                artifact: artifact.clone(),
                md5: md5.clone(),
                size: payload.len(),
            },
            DownloadOutcome::Failure { url, index, error } => OutcomeReport::Failure {
                url: url.clone(),
                index: *index,
                kind: error.kind(),
                detail: error.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchStatus {
    AllSucceeded,
    PartialFailure,
    AllFailed,
}

impl BatchStatus {
    fn classify(succeeded: usize, failed: usize) -> Self {
        match (succeeded, failed) {
            (_, 0) => BatchStatus::AllSucceeded,
            (0, _) => BatchStatus::AllFailed,
            _ => BatchStatus::PartialFailure,
        }
    }
}

/// Every outcome of one `fetch_all` call, sorted by input index.
#[derive(Debug, Clone)]
pub struct AggregateResult {
    outcomes: Vec<DownloadOutcome>,
    status: BatchStatus,
}

impl AggregateResult {
    pub(crate) fn new(mut outcomes: Vec<DownloadOutcome>) -> Self {
        outcomes.sort_by_key(DownloadOutcome::index);
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let status = BatchStatus::classify(succeeded, outcomes.len() - succeeded);
        Self { outcomes, status }
    }

    pub fn status(&self) -> BatchStatus {
        self.status
    }

    pub fn outcomes(&self) -> &[DownloadOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    pub fn artifacts(&self) -> Vec<&str> {
        self.outcomes.iter().filter_map(|o| o.artifact()).collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Serialisable summary without payload bytes.
    pub fn report(&self) -> BatchReport {
        BatchReport {
            status: self.status,
            total: self.len(),
            succeeded: self.succeeded(),
            failed: self.failed(),
            outcomes: self.outcomes.iter().map(DownloadOutcome::report).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub status: BatchStatus,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<OutcomeReport>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum OutcomeReport {
    Success {
        url: String,
        index: usize,
        artifact: String,
        md5: String,
        size: usize,
    },
    Failure {
        url: String,
        index: usize,
        kind: FailureKind,
        detail: String,
    },
}
