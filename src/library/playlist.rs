use std::collections::HashSet;
use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::entry::{MediaEntry, RawEntry};
use super::has_extension;
use crate::error::{PlayerError, Result};
use crate::stats::StatsStore;

/// How a freshly scanned folder is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingPolicy {
    /// Filename ascending, byte-wise.
    Alphabetical,
    /// Never-opened files first, then opened ones; alphabetical inside each group.
    #[default]
    UnopenedFirst,
}

/// The ordered entries of one folder. Order is fixed at ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    entries: Vec<MediaEntry>,
}

impl Playlist {
    /// Filters `raw` down to files with `extension` (case-insensitive),
    /// drops repeated names, and orders what is left.
    ///
    /// A folder with nothing playable is reported as
    /// [`PlayerError::NoMediaFound`] rather than an empty playlist.
    pub fn ingest(
        folder: &Path,
        raw: impl IntoIterator<Item = RawEntry>,
        extension: &str,
        policy: OrderingPolicy,
        store: &StatsStore,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut entries: Vec<MediaEntry> = raw
            .into_iter()
            .filter(|r| has_extension(&r.name, extension))
            .filter(|r| seen.insert(r.name.clone()))
            .map(MediaEntry::from_raw)
            .collect();

        if entries.is_empty() {
            return Err(PlayerError::NoMediaFound {
                folder: folder.to_path_buf(),
                extension: extension.trim_start_matches('.').to_string(),
            });
        }

        Self::order(&mut entries, policy, store);
        info!(
            "Ingested {} entries from {} ({:?})",
            entries.len(),
            folder.display(),
            policy
        );

        Ok(Self { entries })
    }

    fn order(entries: &mut [MediaEntry], policy: OrderingPolicy, store: &StatsStore) {
        entries.sort_by(|a, b| a.name().cmp(b.name()));

        if policy == OrderingPolicy::UnopenedFirst {
            // sort_by_cached_key is stable, so alphabetical order survives
            // inside each partition
            entries.sort_by_cached_key(|entry| store.get(entry.name()).opened);
            debug!(
                "Unopened-first: {} of {} entries not yet opened",
                entries.iter().filter(|e| !store.get(e.name()).opened).count(),
                entries.len()
            );
        }
    }

    pub fn entries(&self) -> &[MediaEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&MediaEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name()).collect()
    }

    /// Index after `index`, wrapping to the start.
    pub fn next_index(&self, index: usize) -> Option<usize> {
        let len = self.entries.len();
        (len > 0).then(|| (index + 1) % len)
    }

    /// Index before `index`, wrapping to the end.
    pub fn previous_index(&self, index: usize) -> Option<usize> {
        let len = self.entries.len();
        (len > 0).then(|| (index % len + len - 1) % len)
    }
}
