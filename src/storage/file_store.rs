//! JSON-file key-value store.
//!
//! The whole map lives in memory and is rewritten to disk on every change.
//! The file is replaced atomically through a temporary sibling. Read and write
//! faults degrade to an empty map or an unpersisted change, logged at warn.

use querylab_core::KeyValueStore;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::LabResult;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing or unreadable file yields an empty store.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!("Ignoring malformed storage file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!("Could not read storage file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        tracing::debug!(path = %path.display(), keys = values.len(), "Opened file store");
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    fn flush(&self) -> LabResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.values)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn flush_or_warn(&self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Could not write storage file {}: {}", self.path.display(), e);
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.flush_or_warn();
    }

    fn remove(&mut self, key: &str) -> bool {
        let removed = self.values.remove(key).is_some();
        if removed {
            self.flush_or_warn();
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nope.json"));
        assert_eq!(store.keys().count(), 0);
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dir/storage.json");

        let mut store = FileStore::open(&path);
        store.set("a", "1");
        store.set("b", "[\"x\"]");
        assert!(path.exists());

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("a").as_deref(), Some("1"));
        assert_eq!(reopened.get("b").as_deref(), Some("[\"x\"]"));
        assert_eq!(reopened.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_malformed_file_is_empty_and_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();

        let mut store = FileStore::open(&path);
        assert_eq!(store.keys().count(), 0);

        store.set("k", "v");
        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_remove_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let mut store = FileStore::open(&path);
        store.set("k", "v");
        assert!(store.remove("k"));
        assert!(!store.remove("k"));

        assert_eq!(FileStore::open(&path).get("k"), None);
    }
}
