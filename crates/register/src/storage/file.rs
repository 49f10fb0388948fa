//! File-backed store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use super::{KeyValueStore, StorageError};

/// A [`KeyValueStore`] persisted as one JSON object on disk.
///
/// The file is read once on open and rewritten in full after every change.
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous contents.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store. A file that is not a JSON object is
    /// logged and treated as empty; it is replaced on the next write. Within
    /// an object, each non-string value is logged and dropped on its own.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => decode_entries(&path, &contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = entries.len(), "Opened storage");
        Ok(Self { path, entries })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn decode_entries(path: &Path, contents: &str) -> BTreeMap<String, String> {
    let object = match serde_json::from_str::<BTreeMap<String, Value>>(contents) {
        Ok(object) => object,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring malformed storage file");
            return BTreeMap::new();
        }
    };
    object
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(value) => Some((key, value)),
            other => {
                warn!(
                    path = %path.display(),
                    key = %key,
                    kind = json_kind(&other),
                    "Dropping non-string stored value"
                );
                None
            }
        })
        .collect()
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    /// Entries change only once the file write succeeds.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.entries.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            match previous {
                Some(previous) => self.entries.insert(key.to_string(), previous),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let Some(previous) = self.entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.flush() {
            self.entries.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("till-file-store-{}", uuid::Uuid::new_v4()));
        dir.join(name)
    }

    #[test]
    fn test_values_survive_reopen() {
        let path = temp_path("storage.json");
        {
            let mut store = FileStore::open(&path).unwrap();
            store.set("sales_searchTerm", "tea").unwrap();
            store.set("sales_selectedCategory", "Drinks").unwrap();
            store.remove("sales_selectedCategory").unwrap();
        }

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("sales_searchTerm").unwrap().as_deref(), Some("tea"));
        assert_eq!(store.get("sales_selectedCategory").unwrap(), None);

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = FileStore::open(temp_path("absent.json")).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn test_malformed_file_is_treated_as_empty() {
        let path = temp_path("storage.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json at all").unwrap();

        let mut store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("sales_cart").unwrap(), None);

        store.set("sales_cart", "[]").unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("sales_cart").unwrap().as_deref(), Some("[]"));

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_non_string_values_are_dropped_individually() {
        let path = temp_path("storage.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"{"sales_cart":[],"sales_searchTerm":"tea","sales_selectedCategory":"Drinks"}"#,
        )
        .unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("sales_cart").unwrap(), None);
        assert_eq!(store.get("sales_searchTerm").unwrap().as_deref(), Some("tea"));
        assert_eq!(
            store.get("sales_selectedCategory").unwrap().as_deref(),
            Some("Drinks")
        );

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_failed_write_leaves_entries_unchanged() {
        let path = temp_path("storage.json");
        let mut store = FileStore::open(&path).unwrap();
        // A regular file where the store's directory should be.
        let parent = path.parent().unwrap();
        fs::write(parent, "").unwrap();

        assert!(store.set("sales_searchTerm", "tea").is_err());
        assert_eq!(store.get("sales_searchTerm").unwrap(), None);
        assert!(store.set("sales_searchTerm", "tea").is_err());

        fs::remove_file(parent).unwrap();
    }

    #[test]
    fn test_clear_removes_file() {
        let path = temp_path("storage.json");
        let mut store = FileStore::open(&path).unwrap();
        store.set("k", "v").unwrap();
        assert!(path.exists());

        store.clear().unwrap();
        assert!(!path.exists());
        assert_eq!(store.get("k").unwrap(), None);

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
