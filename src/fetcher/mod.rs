mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FetchError;

/// Retrieves the full body behind a URL.
///
/// Implementations are stateless from the caller's point of view and are invoked
/// concurrently from many tasks. A failure is returned as `FetchError`, never a panic.
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}
