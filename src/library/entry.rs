use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A file as the directory adapter reports it, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub name: String,
    pub handle: PathBuf,
}

impl RawEntry {
    pub fn new(name: impl Into<String>, handle: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            handle: handle.into(),
        }
    }
}

/// Something the transport can be pointed at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator(String);

impl Locator {
    pub fn from_path(path: &Path) -> Self {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let text = absolute.to_string_lossy().replace('\\', "/");
        if text.starts_with('/') {
            Self(format!("file://{}", text))
        } else {
            Self(format!("file:///{}", text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One playable file in the current playlist. Never changes after ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEntry {
    name: String,
    handle: PathBuf,
    locator: Locator,
}

impl MediaEntry {
    pub fn from_raw(raw: RawEntry) -> Self {
        let locator = Locator::from_path(&raw.handle);
        Self {
            name: raw.name,
            handle: raw.handle,
            locator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> &Path {
        &self.handle
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_is_file_url() {
        let entry = MediaEntry::from_raw(RawEntry::new("a.webm", "/videos/a.webm"));
        assert_eq!(entry.locator().as_str(), "file:///videos/a.webm");
        assert_eq!(entry.name(), "a.webm");
        assert_eq!(entry.handle(), Path::new("/videos/a.webm"));
    }
}
