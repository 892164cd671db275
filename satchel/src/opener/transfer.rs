use std::{env, io, path::Path, sync::Arc};

use futures_util::StreamExt;
use reqwest::Client;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use url::Url;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("concurrency limiter is closed")]
    ConcurrencyClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Completed,
    Cancelled,
}

#[derive(Clone)]
pub struct TransferClient {
    http: Client,
    fetch_limit: Arc<Semaphore>,
}

#[derive(Debug, Clone, Copy)]
pub struct TransferConfig {
    pub fetch_concurrency: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: read_limit("SATCHEL_DOWNLOAD_CONCURRENCY", 2),
        }
    }
}

impl TransferClient {
    pub fn new() -> Self {
        Self::with_config(TransferConfig::default())
    }

    pub fn with_config(config: TransferConfig) -> Self {
        Self {
            http: Client::new(),
            fetch_limit: Arc::new(Semaphore::new(config.fetch_concurrency.max(1))),
        }
    }

    /// Stream the file behind `href` into `target`, polling `cancel` between
    /// chunks. A cancelled fetch stops writing and reports
    /// [`FetchStatus::Cancelled`]; whatever already reached `target` stays on
    /// disk for the caller to clean up.
    pub async fn fetch(
        &self,
        href: &str,
        target: &Path,
        cancel: &CancellationToken,
    ) -> Result<FetchStatus, TransferError> {
        let _permit = self
            .fetch_limit
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| TransferError::ConcurrencyClosed)?;
        if cancel.is_cancelled() {
            return Ok(FetchStatus::Cancelled);
        }

        let url = Url::parse(href)?;
        let response = self.http.get(url).send().await?.error_for_status()?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(target).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            if cancel.is_cancelled() {
                return Ok(FetchStatus::Cancelled);
            }
            file.write_all(&chunk?).await?;
        }

        file.flush().await?;
        file.sync_all().await?;

        if cancel.is_cancelled() {
            return Ok(FetchStatus::Cancelled);
        }
        Ok(FetchStatus::Completed)
    }
}

impl Default for TransferClient {
    fn default() -> Self {
        Self::new()
    }
}

fn read_limit(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}
