use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::entry::RawEntry;
use super::playlist::{OrderingPolicy, Playlist};
use crate::error::{PlayerError, Result};
use crate::stats::StatsStore;

/// Host-side folder access: picking a folder and listing what is in it.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// `Ok(None)` means the user backed out of the picker.
    async fn pick_directory(&self) -> Result<Option<PathBuf>>;

    /// Files directly inside `dir`, unfiltered.
    async fn list_files(&self, dir: &Path) -> Result<Vec<RawEntry>>;
}

/// Local filesystem folder source. The "picker" is whatever folder the
/// front end already settled on (command-line argument or prompt); `None`
/// stands for a dismissed prompt.
#[derive(Debug, Clone, Default)]
pub struct FsDirectory {
    choice: Option<PathBuf>,
}

impl FsDirectory {
    pub fn new(choice: Option<PathBuf>) -> Self {
        Self { choice }
    }

    pub fn chosen(path: impl Into<PathBuf>) -> Self {
        Self::new(Some(path.into()))
    }

    pub fn cancelled() -> Self {
        Self::new(None)
    }

    fn scan(dir: &Path) -> Vec<RawEntry> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), err);
                    None
                }
            })
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                debug!("Skipping non-UTF-8 filename {:?}", entry.file_name());
                continue;
            };

            // Skip hidden files (dotfiles)
            if name.starts_with('.') {
                continue;
            }

            files.push(RawEntry::new(name, entry.path()));
        }

        files
    }
}

#[async_trait]
impl DirectorySource for FsDirectory {
    async fn pick_directory(&self) -> Result<Option<PathBuf>> {
        Ok(self.choice.clone())
    }

    async fn list_files(&self, dir: &Path) -> Result<Vec<RawEntry>> {
        if !dir.is_dir() {
            return Err(PlayerError::AdapterUnavailable(format!(
                "{} is not a readable folder",
                dir.display()
            )));
        }

        let dir = dir.to_path_buf();
        tokio::task::spawn_blocking(move || Self::scan(&dir))
            .await
            .map_err(|e| PlayerError::AdapterUnavailable(format!("folder scan failed: {}", e)))
    }
}

/// Outcome of a folder selection that did not fail.
#[derive(Debug)]
pub enum FolderSelection {
    Cancelled,
    Loaded { folder: PathBuf, playlist: Playlist },
}

/// Runs folder selections one at a time. A request that arrives while
/// another is still pending is rejected with
/// [`PlayerError::SelectionInProgress`].
pub struct FolderSelector {
    in_flight: Mutex<()>,
    extension: String,
    policy: OrderingPolicy,
}

impl FolderSelector {
    pub fn new(extension: impl Into<String>, policy: OrderingPolicy) -> Self {
        Self {
            in_flight: Mutex::new(()),
            extension: extension.into(),
            policy,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    pub async fn select<D>(&self, source: &D, store: &StatsStore) -> Result<FolderSelection>
    where
        D: DirectorySource + ?Sized,
    {
        let _pending = self
            .in_flight
            .try_lock()
            .map_err(|_| PlayerError::SelectionInProgress)?;

        let Some(folder) = source.pick_directory().await? else {
            info!("Folder selection cancelled");
            return Ok(FolderSelection::Cancelled);
        };

        let files = source.list_files(&folder).await?;
        debug!("{} files listed in {}", files.len(), folder.display());

        let playlist = Playlist::ingest(&folder, files, &self.extension, self.policy, store)?;
        Ok(FolderSelection::Loaded { folder, playlist })
    }
}
