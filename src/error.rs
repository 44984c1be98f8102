//! Error types for imgdump.
//!
//! Per-item failures (`FetchError`, `PersistError`, `DownloadError`) are plain data:
//! the coordinator records them inside a failure outcome and keeps going. Only
//! `RequestError` (bad input) and `Error` (startup) ever reach a caller as an `Err`.

use std::io;

use serde::Serialize;
use thiserror::Error;

/// Result type alias for startup and composition operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or running the service itself.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value is unusable
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error (output directory, listener bind)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The HTTP server stopped with an error
    #[error("server error: {0}")]
    Serve(String),
}

/// Failure to retrieve one URL.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response: refused, unresolvable, malformed URL or timed out
    #[error("connection error: {0}")]
    Connection(String),

    /// The response body could not be read to the end
    #[error("read error: {0}")]
    Read(String),

    /// The server answered with a status outside 2xx
    #[error("unexpected status code {code}")]
    NonSuccessStatus { code: u16 },
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Connection(_) => FailureKind::Connection,
            FetchError::Read(_) => FailureKind::Read,
            FetchError::NonSuccessStatus { .. } => FailureKind::Status,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Connection(format!("timed out: {}", err))
        } else if err.is_body() || err.is_decode() {
            FetchError::Read(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::NonSuccessStatus {
                code: status.as_u16(),
            }
        } else {
            FetchError::Connection(err.to_string())
        }
    }
}

/// Failure to write one artifact.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistError {
    #[error("permission denied writing {name}")]
    PermissionDenied { name: String },

    #[error("storage full writing {name}")]
    StorageFull { name: String },

    /// An artifact with this name already exists; the store never overwrites
    #[error("artifact {name} already exists")]
    NameCollision { name: String },

    #[error("I/O error writing {name}: {detail}")]
    Io { name: String, detail: String },
}

impl PersistError {
    /// Classify an I/O error raised while writing `name`.
    pub fn from_io(name: &str, err: &io::Error) -> Self {
        let name = name.to_string();
        match err.kind() {
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                PersistError::PermissionDenied { name }
            }
            io::ErrorKind::StorageFull => PersistError::StorageFull { name },
            io::ErrorKind::AlreadyExists => PersistError::NameCollision { name },
            _ => PersistError::Io {
                name,
                detail: err.to_string(),
            },
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            PersistError::PermissionDenied { .. } => FailureKind::PermissionDenied,
            PersistError::StorageFull { .. } => FailureKind::StorageFull,
            PersistError::NameCollision { .. } => FailureKind::NameCollision,
            PersistError::Io { .. } => FailureKind::Storage,
        }
    }
}

/// Why a single URL in a batch did not produce an artifact.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DownloadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    /// The task ended without reporting a result (panicked or was never started)
    #[error("task aborted: {0}")]
    TaskAborted(String),
}

impl DownloadError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DownloadError::Fetch(err) => err.kind(),
            DownloadError::Persist(err) => err.kind(),
            DownloadError::TaskAborted(_) => FailureKind::Aborted,
        }
    }
}

/// Machine-readable failure tag used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Connection,
    Read,
    Status,
    PermissionDenied,
    StorageFull,
    NameCollision,
    Storage,
    Aborted,
}

/// The request body could not be turned into a batch. No work is started.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}
