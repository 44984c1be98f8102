//! Concurrent image downloader.
//!
//! A [`Coordinator`] takes a list of URLs, fetches them all in parallel through a
//! [`Fetcher`], writes every payload through a [`Store`] under a unique name and
//! returns an [`AggregateResult`] once every URL has settled. The [`server`] module
//! exposes it over HTTP.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod fetcher;
pub mod server;
pub mod store;
pub mod utils;

pub use config::{Config, HttpCoordinator};
pub use coordinator::{AggregateResult, BatchStatus, Coordinator, DownloadOutcome};
pub use error::{DownloadError, Error, FetchError, PersistError, RequestError, Result};
pub use fetcher::{Fetcher, HttpFetcher};
pub use store::{FsStore, Store};
