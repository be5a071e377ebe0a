//! `json_file` store: one JSON array on disk, one authoritative `Vec` in memory.
//!
//! The file is read once at [`JsonFileStore::open`]. Every append takes the
//! write guard, serialises the whole updated collection to `<file>.tmp` and
//! renames it over the snapshot, so a reader of the file never sees a partial
//! write and two concurrent appends cannot drop each other's entry. The
//! in-memory index is only updated once the rename has succeeded.
//!
//! Snapshots written by older deployments as an object keyed by lower-cased
//! name are accepted on load and rewritten as an array on the next append.
//! Their entries come back in key order: the keyed form never recorded
//! insertion order, so `list_all` on a migrated store is alphabetical up to
//! the first append after migration.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::AppError;
use super::{CustomEntry, EntryStore, find_exact, find_substring};

/// On-disk shapes accepted at load time.
#[derive(Deserialize)]
#[serde(untagged)]
enum Snapshot {
    List(Vec<CustomEntry>),
    Keyed(BTreeMap<String, CustomEntry>),
}

pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<Vec<CustomEntry>>,
    /// Held across the read-modify-replace cycle of `append`.
    write_guard: Mutex<()>,
}

impl JsonFileStore {
    /// Open (or lazily create) the snapshot at `path`.
    ///
    /// A missing or empty file is an empty store. An unparseable file is an
    /// error: it is never silently overwritten.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Store(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let entries = load(&path)?;
        info!(path = %path.display(), entries = entries.len(), "custom store loaded");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
            write_guard: Mutex::new(()),
        })
    }

    fn persist(&self, entries: &[CustomEntry]) -> Result<(), AppError> {
        let data = serde_json::to_string_pretty(entries)
            .map_err(|e| AppError::Store(format!("serialise entries: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        let write_err = |e: std::io::Error| AppError::Store(format!("cannot write {}: {e}", tmp.display()));
        let mut file = File::create(&tmp).map_err(write_err)?;
        file.write_all(data.as_bytes()).map_err(write_err)?;
        // Contents must be on disk before the rename makes them visible.
        file.sync_all().map_err(write_err)?;
        drop(file);
        fs::rename(&tmp, &self.path).map_err(|e| {
            AppError::Store(format!("cannot replace {}: {e}", self.path.display()))
        })?;
        debug!(path = %self.path.display(), entries = entries.len(), "custom store persisted");
        Ok(())
    }
}

fn load(path: &Path) -> Result<Vec<CustomEntry>, AppError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Store(format!("cannot read {}: {e}", path.display())))?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .map_err(|e| AppError::Store(format!("parse error in {}: {e}", path.display())))?;
    Ok(match snapshot {
        Snapshot::List(entries) => entries,
        Snapshot::Keyed(map) => map.into_values().collect(),
    })
}

impl EntryStore for JsonFileStore {
    fn store_type(&self) -> &str {
        "json_file"
    }

    fn lookup_exact(&self, name: &str) -> Result<Option<CustomEntry>, AppError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AppError::Store("json store lock poisoned".into()))?;
        Ok(find_exact(&entries, name))
    }

    fn lookup_substring(&self, query: &str) -> Result<Vec<CustomEntry>, AppError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AppError::Store("json store lock poisoned".into()))?;
        Ok(find_substring(&entries, query))
    }

    fn append(&self, entry: CustomEntry) -> Result<(), AppError> {
        entry.validate()?;

        let _guard = self
            .write_guard
            .lock()
            .map_err(|_| AppError::Store("json store write guard poisoned".into()))?;

        let mut next = self.list_all()?;
        next.push(entry);
        self.persist(&next)?;

        let mut entries = self
            .entries
            .write()
            .map_err(|_| AppError::Store("json store lock poisoned".into()))?;
        *entries = next;
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<CustomEntry>, AppError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AppError::Store("json store lock poisoned".into()))?;
        Ok(entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("heroes.json")).unwrap();
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn append_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("heroes.json");
        {
            let store = JsonFileStore::open(&path).unwrap();
            store
                .append(CustomEntry::new("Foo", "A hero").with_image("http://img"))
                .unwrap();
            store.append(CustomEntry::new("Bar", "Another")).unwrap();
        }
        let reopened = JsonFileStore::open(&path).unwrap();
        let all = reopened.list_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Foo");
        assert_eq!(all[0].image_url.as_deref(), Some("http://img"));
        assert_eq!(all[1].name, "Bar");
    }

    #[test]
    fn snapshot_is_a_json_array_without_tmp_leftover() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("heroes.json");
        let store = JsonFileStore::open(&path).unwrap();
        store.append(CustomEntry::new("Foo", "A hero")).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.is_array());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn keyed_snapshot_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("heroes.json");
        fs::write(
            &path,
            r#"{"foo": {"name": "Foo", "description": "A hero", "image": "http://img"}}"#,
        )
        .unwrap();
        let store = JsonFileStore::open(&path).unwrap();
        let foo = store.lookup_exact("FOO").unwrap().unwrap();
        assert_eq!(foo.summary, "A hero");
    }

    #[test]
    fn keyed_snapshot_lists_in_key_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("heroes.json");
        fs::write(
            &path,
            r#"{"zed": {"name": "Zed", "summary": "last"}, "amy": {"name": "Amy", "summary": "first"}}"#,
        )
        .unwrap();
        let store = JsonFileStore::open(&path).unwrap();
        store.append(CustomEntry::new("Bob", "new")).unwrap();

        let names: Vec<_> = store.list_all().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Amy", "Zed", "Bob"]);

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw.is_array());
    }

    #[test]
    fn each_append_leaves_a_complete_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("heroes.json");
        let store = JsonFileStore::open(&path).unwrap();
        for i in 0..5 {
            store.append(CustomEntry::new(format!("Hero{i}"), "x")).unwrap();
            let on_disk: Vec<CustomEntry> =
                serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
            assert_eq!(on_disk.len(), i + 1);
            assert!(!path.with_extension("json.tmp").exists());
        }
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("heroes.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(AppError::Store(_))));
    }

    #[test]
    fn rejected_append_does_not_touch_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("heroes.json");
        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.append(CustomEntry::new("", "nameless")).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn concurrent_appends_are_all_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("heroes.json");
        let store = Arc::new(JsonFileStore::open(&path).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.append(CustomEntry::new(format!("Hero{i}"), "x")).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.list_all().unwrap().len(), 8);
        assert_eq!(JsonFileStore::open(&path).unwrap().list_all().unwrap().len(), 8);
    }
}
