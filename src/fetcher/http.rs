use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use super::Fetcher;
use crate::error::FetchError;

/// `Fetcher` backed by a shared reqwest client.
///
/// The timeout covers the whole exchange (connect, headers and body), so a slow
/// body read surfaces as a `Connection` timeout rather than hanging a task.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        // The response is dropped on every return path, which releases the connection.
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::NonSuccessStatus {
                code: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|err| {
            if err.is_timeout() {
                FetchError::Connection(format!("timed out: {}", err))
            } else {
                FetchError::Read(err.to_string())
            }
        })?;

        debug!(url, len = body.len(), "fetched");
        Ok(body)
    }
}
