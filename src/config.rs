use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::coordinator::{ArtifactNamer, Coordinator};
use crate::error::{Error, Result};
use crate::fetcher::HttpFetcher;
use crate::store::FsStore;

/// The coordinator the service runs with in production.
pub type HttpCoordinator = Coordinator<HttpFetcher, FsStore>;

/// Download settings shared by the `serve` and `fetch` commands.
#[derive(Debug, Clone, Args)]
pub struct Config {
    #[arg(short, long, help = "Directory artifacts are written to", default_value = ".")]
    pub output_dir: PathBuf,

    #[arg(
        short,
        long,
        help = "Maximum downloads in flight (unbounded when omitted)"
    )]
    pub concurrency: Option<usize>,

    #[arg(long, help = "Per-request timeout in seconds", default_value_t = 30)]
    pub timeout_secs: u64,

    #[arg(long, help = "Connect timeout in seconds", default_value_t = 10)]
    pub connect_timeout_secs: u64,

    #[arg(long, help = "Artifact file name prefix", default_value = "imageDump")]
    pub prefix: String,

    #[arg(long, help = "Artifact file extension", default_value = "jpg")]
    pub extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            concurrency: None,
            timeout_secs: 30,
            connect_timeout_secs: 10,
            prefix: "imageDump".to_string(),
            extension: "jpg".to_string(),
        }
    }
}

impl Config {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == Some(0) {
            return Err(Error::Config(
                "concurrency must be at least 1 when set".to_string(),
            ));
        }
        if self.timeout_secs == 0 || self.connect_timeout_secs == 0 {
            return Err(Error::Config("timeouts must be at least 1 second".to_string()));
        }
        for (key, value) in [("prefix", &self.prefix), ("extension", &self.extension)] {
            if value.is_empty() {
                return Err(Error::Config(format!("{} must not be empty", key)));
            }
            if value.contains(['/', '\\']) {
                return Err(Error::Config(format!(
                    "{} must not contain path separators: {:?}",
                    key, value
                )));
            }
        }
        Ok(())
    }

    /// Wire fetcher, store and coordinator together.
    pub async fn build_coordinator(&self) -> Result<HttpCoordinator> {
        self.validate()?;

        let fetcher = HttpFetcher::new(self.fetch_timeout(), self.connect_timeout())?;
        let store = FsStore::open(&self.output_dir).await?;
        let namer = ArtifactNamer::new(self.prefix.as_str(), self.extension.as_str());

        tracing::info!(
            output_dir = %self.output_dir.display(),
            concurrency = ?self.concurrency,
            timeout_secs = self.timeout_secs,
            "coordinator ready"
        );

        Ok(Coordinator::new(fetcher, store, namer).with_max_concurrency(self.concurrency))
    }
}
