use std::fmt;
use std::path::{Path, PathBuf};

use satchel_core::{DriveClient, DriveError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("drive error: {0}")]
    Drive(#[from] DriveError),
    #[error("entry has no parent: {0}")]
    NoParent(String),
}

/// A directory entry the manager can act on. Local and remote entries expose
/// the same operations; the variant is explicit so callers never have to
/// downcast, and derived entries (parents, siblings) stay on the same side.
#[derive(Debug, Clone)]
pub enum Entry {
    Local(LocalEntry),
    Remote(RemoteEntry),
}

#[derive(Debug, Clone)]
pub struct LocalEntry {
    path: PathBuf,
    dir: bool,
}

impl LocalEntry {
    /// The directory flag is declared by the caller rather than probed from
    /// disk: rename candidates describe entries that do not exist yet.
    pub fn new(path: impl Into<PathBuf>, dir: bool) -> Self {
        Self {
            path: path.into(),
            dir,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct RemoteEntry {
    client: DriveClient,
    path: String,
    dir: bool,
    size: Option<u64>,
}

impl RemoteEntry {
    pub fn new(client: DriveClient, path: impl Into<String>, dir: bool) -> Self {
        Self {
            client,
            path: path.into(),
            dir,
            size: None,
        }
    }

    /// Attach a byte length known from a listing, sparing a stat later.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn client(&self) -> &DriveClient {
        &self.client
    }

    pub fn name(&self) -> String {
        let trimmed = self.path.trim_end_matches('/');
        trimmed
            .rsplit_once('/')
            .map(|(_, name)| name)
            .unwrap_or(trimmed)
            .to_string()
    }

    pub async fn len(&self) -> Result<u64, EntryError> {
        if let Some(size) = self.size {
            return Ok(size);
        }
        Ok(self.client.stat(&self.path).await?.size.unwrap_or(0))
    }
}

impl fmt::Debug for RemoteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteEntry")
            .field("path", &self.path)
            .field("dir", &self.dir)
            .field("size", &self.size)
            .finish()
    }
}

impl Entry {
    pub fn name(&self) -> String {
        match self {
            Entry::Local(entry) => entry.name(),
            Entry::Remote(entry) => entry.name(),
        }
    }

    pub fn name_no_extension(&self) -> String {
        if self.is_directory() {
            return self.name();
        }
        let name = self.name();
        let (stem, _) = split_name(&name);
        stem.to_string()
    }

    pub fn extension(&self) -> Option<String> {
        if self.is_directory() {
            return None;
        }
        let name = self.name();
        let (_, extension) = split_name(&name);
        extension.map(str::to_string)
    }

    pub fn is_directory(&self) -> bool {
        match self {
            Entry::Local(entry) => entry.dir,
            Entry::Remote(entry) => entry.dir,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Entry::Remote(_))
    }

    /// Display form of the entry's location, for logs and messages.
    pub fn location(&self) -> String {
        match self {
            Entry::Local(entry) => entry.path.display().to_string(),
            Entry::Remote(entry) => entry.path.clone(),
        }
    }

    /// Parent directory, staying on the same side: a remote entry's parent is
    /// remote, a local entry's parent is local.
    pub fn parent(&self) -> Option<Entry> {
        match self {
            Entry::Local(entry) => entry
                .path
                .parent()
                .map(|parent| Entry::Local(LocalEntry::new(parent, true))),
            Entry::Remote(entry) => remote_parent(&entry.path)
                .map(|parent| Entry::Remote(RemoteEntry::new(entry.client.clone(), parent, true))),
        }
    }

    /// An entry with the same parent and directory flag but a different name.
    /// Used to build rename probes; the result is not created on storage.
    pub fn sibling(&self, name: &str) -> Result<Entry, EntryError> {
        match self {
            Entry::Local(entry) => {
                let parent = entry
                    .path
                    .parent()
                    .ok_or_else(|| EntryError::NoParent(entry.path.display().to_string()))?;
                Ok(Entry::Local(LocalEntry::new(parent.join(name), entry.dir)))
            }
            Entry::Remote(entry) => {
                let parent = remote_parent(&entry.path)
                    .ok_or_else(|| EntryError::NoParent(entry.path.clone()))?;
                Ok(Entry::Remote(RemoteEntry::new(
                    entry.client.clone(),
                    remote_join(&parent, name),
                    entry.dir,
                )))
            }
        }
    }

    pub async fn exists(&self) -> Result<bool, EntryError> {
        match self {
            Entry::Local(entry) => Ok(tokio::fs::try_exists(&entry.path).await?),
            Entry::Remote(entry) => Ok(entry.client.exists(&entry.path).await?),
        }
    }

    /// Blocking counterpart of [`exists`](Self::exists) for callers that
    /// cannot suspend. Do not call from an async context.
    pub fn exists_blocking(&self) -> Result<bool, EntryError> {
        match self {
            Entry::Local(entry) => Ok(entry.path.try_exists()?),
            Entry::Remote(entry) => Ok(entry.client.exists_blocking(&entry.path)?),
        }
    }

    pub async fn len(&self) -> Result<u64, EntryError> {
        match self {
            Entry::Local(entry) => Ok(tokio::fs::metadata(&entry.path).await?.len()),
            Entry::Remote(entry) => entry.len().await,
        }
    }
}

/// Split a file name at the last dot. Dotfiles and names with an empty stem
/// or suffix count as extensionless.
fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() && !extension.is_empty() => {
            (stem, Some(extension))
        }
        _ => (name, None),
    }
}

fn remote_parent(path: &str) -> Option<String> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rsplit_once('/') {
        Some(("", _)) => Some("/".to_string()),
        Some((parent, _)) => Some(parent.to_string()),
        None => None,
    }
}

fn remote_join(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}
