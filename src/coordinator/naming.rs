use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Hands out artifact names: `{prefix}-{session}-{batch}-{seq}.{extension}`.
///
/// `session` is fixed per namer, `batch` increments once per `fetch_all` call and
/// `seq` increments per successful fetch inside that call. All counters are atomic.
#[derive(Debug)]
pub struct ArtifactNamer {
    prefix: String,
    extension: String,
    session: String,
    batches: AtomicU64,
}

impl ArtifactNamer {
    pub fn new(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self::with_session(prefix, extension, format!("{:x}", millis))
    }

    pub fn with_session(
        prefix: impl Into<String>,
        extension: impl Into<String>,
        session: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into(),
            session: session.into(),
            batches: AtomicU64::new(0),
        }
    }

    /// Start naming a new call. Each returned `BatchNamer` owns its own sequence.
    pub fn batch(&self) -> BatchNamer {
        let batch = self.batches.fetch_add(1, Ordering::Relaxed) + 1;
        BatchNamer {
            stem: format!("{}-{}-{}", self.prefix, self.session, batch),
            extension: self.extension.clone(),
            batch,
            seq: AtomicUsize::new(0),
        }
    }
}

#[derive(Debug)]
pub struct BatchNamer {
    stem: String,
    extension: String,
    batch: u64,
    seq: AtomicUsize,
}

impl BatchNamer {
    pub fn id(&self) -> u64 {
        self.batch
    }

    pub fn next_name(&self) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}.{}", self.stem, seq, self.extension)
    }
}
