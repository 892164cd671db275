use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use satchel_core::DriveError;

use crate::fs::entry::{Entry, EntryError, RemoteEntry};
use crate::ui::DialogSurface;

use super::transfer::{FetchStatus, TransferClient, TransferError};
use super::viewer::{self, Launcher, MimeCategory, ViewRequest, ViewerError};

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("storage check failed: {0}")]
    Entry(#[from] EntryError),
    #[error("could not reach the drive: {0}")]
    Connect(#[source] DriveError),
    #[error("download failed: {0}")]
    Transfer(#[from] TransferError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Outcome of the fetch stage: a local copy ready for viewing, or a user
/// cancellation (which is not an error).
#[derive(Debug, PartialEq, Eq)]
pub enum Fetched {
    Ready(PathBuf),
    Cancelled,
}

/// Drives the open flow: remote entries are fetched into the download root
/// (reusing a cached copy when its byte length matches the remote), then the
/// local file is handed to the platform viewer.
pub struct Opener {
    transfer: TransferClient,
    ui: Arc<dyn DialogSurface>,
    launcher: Arc<dyn Launcher>,
    download_root: PathBuf,
}

impl Opener {
    pub fn new(
        download_root: PathBuf,
        ui: Arc<dyn DialogSurface>,
        launcher: Arc<dyn Launcher>,
    ) -> Self {
        Self {
            transfer: TransferClient::new(),
            ui,
            launcher,
            download_root,
        }
    }

    pub fn with_transfer(mut self, transfer: TransferClient) -> Self {
        self.transfer = transfer;
        self
    }

    /// Open `entry` with the platform viewer. `open_as` skips content-type
    /// inference so the user is always asked for a category.
    pub async fn open(&self, entry: &Entry, open_as: bool) -> Result<(), OpenError> {
        let inferred = if open_as {
            None
        } else {
            entry.extension().as_deref().and_then(viewer::infer_mime)
        };
        match entry {
            Entry::Remote(item) => match self.fetch_remote(item).await? {
                Fetched::Cancelled => Ok(()),
                Fetched::Ready(path) => self.open_local(&path, inferred, Some(item)).await,
            },
            Entry::Local(item) => self.open_local(item.path(), inferred, None).await,
        }
    }

    /// Make sure a local copy of `item` exists under the download root.
    ///
    /// A cached copy whose byte length equals the remote's is reused without
    /// touching the network. Otherwise the flow walks Connecting (resolve the
    /// download link) and Downloading (streamed fetch), each under a
    /// cancelable progress dialog sharing one cancellation token. Cancelling
    /// during Connecting stops before any fetch; cancelling during
    /// Downloading deletes the partially written destination. Failures
    /// dismiss the indicator, surface a modal error, and leave whatever was
    /// written in place — the length check invalidates it on the next open.
    pub async fn fetch_remote(&self, item: &RemoteEntry) -> Result<Fetched, OpenError> {
        tokio::fs::create_dir_all(&self.download_root).await?;
        let dest = self.download_root.join(item.name());
        if let Ok(metadata) = tokio::fs::metadata(&dest).await
            && metadata.len() == item.len().await?
        {
            debug!(path = %dest.display(), "reusing cached copy");
            return Ok(Fetched::Ready(dest));
        }

        let cancel = CancellationToken::new();
        let connecting = self.ui.progress("Connecting", Some(cancel.clone()));
        let link = match item.client().download_link(item.path()).await {
            Ok(link) => link,
            Err(err) => {
                connecting.dismiss();
                self.ui
                    .error(&format!("Failed to connect to the drive: {err}"))
                    .await;
                return Err(OpenError::Connect(err));
            }
        };
        if cancel.is_cancelled() {
            connecting.dismiss();
            return Ok(Fetched::Cancelled);
        }
        connecting.dismiss();

        let downloading = self.ui.progress("Downloading", Some(cancel.clone()));
        let status = match self.transfer.fetch(link.href.as_str(), &dest, &cancel).await {
            Ok(status) => status,
            Err(err) => {
                downloading.dismiss();
                self.ui
                    .error(&format!("Failed to download the file: {err}"))
                    .await;
                return Err(err.into());
            }
        };
        downloading.dismiss();

        // The token may trip after the last chunk lands; treat that the same
        // as a mid-transfer cancel so a cancelled download is never handed off.
        if status == FetchStatus::Cancelled || cancel.is_cancelled() {
            if tokio::fs::try_exists(&dest).await? {
                tokio::fs::remove_file(&dest).await?;
            }
            info!(path = %dest.display(), "download cancelled");
            return Ok(Fetched::Cancelled);
        }

        Ok(Fetched::Ready(dest))
    }

    async fn open_local(
        &self,
        file: &Path,
        mime: Option<&'static str>,
        remote_source: Option<&RemoteEntry>,
    ) -> Result<(), OpenError> {
        let extension = file
            .extension()
            .map(|extension| extension.to_string_lossy().to_ascii_lowercase());
        let mut mime = mime;
        if let Some(extension) = extension.as_deref()
            && viewer::forces_plain_text(extension)
        {
            mime = Some("text/plain");
        }
        let mime = match mime {
            Some(mime) => mime,
            None => {
                let labels: Vec<&str> = MimeCategory::ALL
                    .iter()
                    .map(|category| category.label())
                    .collect();
                let Some(index) = self.ui.pick("Open as", &labels).await else {
                    return Ok(());
                };
                MimeCategory::ALL[index].mime()
            }
        };

        debug!(file = %file.display(), mime, "dispatching view request");
        match self.launcher.view(ViewRequest {
            file,
            mime,
            remote_source,
        }) {
            Ok(()) => Ok(()),
            Err(ViewerError::NoHandler { .. }) => {
                self.ui.notify("No application can open this file").await;
                Ok(())
            }
        }
    }
}
