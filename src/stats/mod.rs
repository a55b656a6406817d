// Stats - the memory of the player
// One JSON record per filename: opened flag, resume position, annotations

pub mod annotations; // cross-file annotation index
#[cfg(feature = "sqlite")]
pub mod database;    // SQLite key-value backend
pub mod store;       // merge-on-write record store

pub use annotations::{AnnotationIndex, AnnotationItem, AnnotationView, FileAnnotations};
#[cfg(feature = "sqlite")]
pub use database::SqliteBackend;
pub use store::{MemoryBackend, StatsBackend, StatsStore};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Persisted state for one media file, keyed by its exact filename.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRecord {
    #[serde(default)]
    pub opened: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Vec<Annotation>>,
}

impl StatsRecord {
    /// Decodes a stored object field by field, so one wrong-typed field
    /// does not cost the others. `annotations` is kept only if the whole
    /// list decodes.
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        let opened = fields.get("opened").and_then(Value::as_bool).unwrap_or(false);
        let current_time = fields
            .get("currentTime")
            .and_then(Value::as_f64)
            .filter(|t| t.is_finite() && *t >= 0.0);
        let annotations = fields
            .get("annotations")
            .and_then(|v| serde_json::from_value(v.clone()).ok());

        Self {
            opened,
            current_time,
            annotations,
        }
    }
}

/// A note pinned to a playback position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub time_ms: u64,
    pub text: String,
}

impl Annotation {
    /// Builds an annotation from raw prompt input. Blank input yields `None`.
    pub fn from_input(time_ms: u64, input: &str) -> Option<Self> {
        let text = input.trim();
        if text.is_empty() {
            None
        } else {
            Some(Self {
                time_ms,
                text: text.to_string(),
            })
        }
    }
}

/// Field-level partial update for a [`StatsRecord`]. Fields left as `None`
/// keep whatever the stored record already has.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsPatch {
    pub opened: Option<bool>,
    pub current_time: Option<f64>,
    pub annotations: Option<Vec<Annotation>>,
}

impl StatsPatch {
    pub fn opened() -> Self {
        Self {
            opened: Some(true),
            ..Self::default()
        }
    }

    pub fn position(seconds: f64) -> Self {
        Self {
            current_time: Some(seconds.max(0.0)),
            ..Self::default()
        }
    }

    pub fn annotations(annotations: Vec<Annotation>) -> Self {
        Self {
            annotations: Some(annotations),
            ..Self::default()
        }
    }
}
