use super::{StatsPatch, StatsRecord};
use crate::error::Result;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Raw key-value storage underneath [`StatsStore`]. Keys are filenames,
/// values are JSON-encoded records.
pub trait StatsBackend {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;

    /// Called once from [`StatsStore::close`].
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// In-process backend, used by tests and by one-off commands that should
/// not touch the on-disk database.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    values: BTreeMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.values.keys().cloned().collect())
    }
}

/// Per-filename record store with field-level merge on write.
///
/// Reads never fail: an absent or unparseable record comes back as the
/// default `{opened: false}`, and a wrong-typed field reads as its default
/// without affecting the others. Reads never touch the stored value.
pub struct StatsStore {
    backend: Box<dyn StatsBackend + Send>,
}

impl StatsStore {
    pub fn new(backend: impl StatsBackend + Send + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    pub fn get(&self, name: &str) -> StatsRecord {
        match self.backend.read(name) {
            Ok(Some(raw)) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(fields)) => StatsRecord::from_fields(&fields),
                Ok(_) => {
                    warn!("Stats record for '{}' is not an object, using defaults", name);
                    StatsRecord::default()
                }
                Err(e) => {
                    warn!("Malformed stats record for '{}', using defaults: {}", name, e);
                    StatsRecord::default()
                }
            },
            Ok(None) => StatsRecord::default(),
            Err(e) => {
                warn!("Failed to read stats for '{}': {}", name, e);
                StatsRecord::default()
            }
        }
    }

    /// Merges `patch` into the stored record and writes the result back in
    /// one backend write. Fields the patch leaves out are kept, including
    /// ones this version of the record type does not know about.
    pub fn put(&mut self, name: &str, patch: StatsPatch) -> Result<StatsRecord> {
        let mut fields = self.mergeable_fields(name);

        if let Some(opened) = patch.opened {
            fields.insert("opened".into(), Value::Bool(opened));
        }
        if let Some(seconds) = patch.current_time {
            match Number::from_f64(seconds.max(0.0)) {
                Some(n) => {
                    fields.insert("currentTime".into(), Value::Number(n));
                }
                None => debug!("Ignoring non-finite position for '{}'", name),
            }
        }
        if let Some(annotations) = patch.annotations {
            fields.insert("annotations".into(), serde_json::to_value(annotations)?);
        }
        if !fields.get("opened").is_some_and(Value::is_boolean) {
            fields.insert("opened".into(), Value::Bool(false));
        }

        let record = StatsRecord::from_fields(&fields);
        self.backend.write(name, &Value::Object(fields).to_string())?;

        Ok(record)
    }

    /// Every key that has ever been written, stale filenames included.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.backend.keys()
    }

    /// The stored JSON text for `name`, unparsed.
    pub fn raw(&self, name: &str) -> Result<Option<String>> {
        self.backend.read(name)
    }

    pub fn close(mut self) -> Result<()> {
        self.backend.flush()
    }

    #[cfg(test)]
    pub(crate) fn write_raw(&mut self, name: &str, raw: &str) -> Result<()> {
        self.backend.write(name, raw)
    }

    // Starting point for a merge: the stored object, wrong-typed fields and
    // all. Only a value that is not a JSON object is replaced.
    fn mergeable_fields(&self, name: &str) -> Map<String, Value> {
        let raw = match self.backend.read(name) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Map::new(),
            Err(e) => {
                warn!("Failed to read stats for '{}' before merge: {}", name, e);
                return Map::new();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            _ => {
                warn!("Replacing malformed stats record for '{}'", name);
                Map::new()
            }
        }
    }
}
