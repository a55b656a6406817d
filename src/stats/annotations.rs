use super::{Annotation, StatsPatch, StatsRecord, StatsStore};
use crate::error::Result;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

/// One annotation ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationItem {
    pub time_ms: u64,
    pub time_formatted: String,
    pub text: String,
}

/// All annotations stored for a single file, sorted by time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAnnotations {
    pub file_name: String,
    pub items: Vec<AnnotationItem>,
}

/// Every annotation in the store, grouped by file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationView {
    pub groups: Vec<FileAnnotations>,
}

impl AnnotationView {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }

    pub fn group(&self, file_name: &str) -> Option<&FileAnnotations> {
        self.groups.iter().find(|g| g.file_name == file_name)
    }
}

impl fmt::Display for AnnotationView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            writeln!(f, "No annotations yet")?;
            return write!(f, "Press Enter while watching videos to add annotations.");
        }

        write!(f, "All Annotations")?;
        for group in &self.groups {
            write!(f, "\n\n{}", group.file_name)?;
            for item in &group.items {
                write!(f, "\n  {:>8}  {}", item.time_formatted, item.text)?;
            }
        }
        Ok(())
    }
}

/// Cross-file view over the annotations held in a [`StatsStore`].
pub struct AnnotationIndex;

impl AnnotationIndex {
    /// Scans every stored record. Records that cannot be read, or whose
    /// `annotations` field is missing or malformed, are skipped.
    pub fn render_all(store: &StatsStore) -> AnnotationView {
        let keys = match store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Could not list stats records: {}", e);
                return AnnotationView::default();
            }
        };

        let mut groups: Vec<FileAnnotations> = keys
            .into_iter()
            .filter_map(|key| {
                let annotations = Self::stored_annotations(store, &key)?;
                if annotations.is_empty() {
                    return None;
                }

                let mut items: Vec<AnnotationItem> = annotations
                    .into_iter()
                    .map(|a| AnnotationItem {
                        time_formatted: format_clock(a.time_ms / 1000),
                        time_ms: a.time_ms,
                        text: a.text,
                    })
                    .collect();
                // stable: equal timestamps keep insertion order
                items.sort_by_key(|item| item.time_ms);

                Some(FileAnnotations {
                    file_name: key,
                    items,
                })
            })
            .collect();

        groups.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        AnnotationView { groups }
    }

    /// Appends to the record for `name`, keeping its other fields.
    pub fn append(store: &mut StatsStore, name: &str, annotation: Annotation) -> Result<StatsRecord> {
        let mut annotations = store.get(name).annotations.unwrap_or_default();
        debug!("Annotating '{}' at {}ms", name, annotation.time_ms);
        annotations.push(annotation);
        store.put(name, StatsPatch::annotations(annotations))
    }

    fn stored_annotations(store: &StatsStore, key: &str) -> Option<Vec<Annotation>> {
        let raw = match store.raw(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Could not read stats for '{}': {}", key, e);
                return None;
            }
        };

        let mut value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Error parsing stats for '{}': {}", key, e);
                return None;
            }
        };

        let field = value.get_mut("annotations")?.take();
        match serde_json::from_value(field) {
            Ok(annotations) => Some(annotations),
            Err(e) => {
                warn!("Ignoring malformed annotations for '{}': {}", key, e);
                None
            }
        }
    }
}

/// `H:MM:SS`, or `M:SS` when there are no whole hours.
pub fn format_clock(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Formats a transport position. Unknown or negative values show as `0:00`.
pub fn format_seconds(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return format_clock(0);
    }
    format_clock(seconds.floor() as u64)
}
