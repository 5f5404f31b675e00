use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Result;

/// JSON documents stored by name under a base directory.
///
/// Saves go through a temporary file and a rename, so a crash mid-write
/// leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    base_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", name))
    }

    /// `Ok(None)` if the snapshot was never written.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.path(name);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn load_or_default<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        Ok(self.load(name)?.unwrap_or_default())
    }

    pub fn save<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_dir)?;

        let path = self.path(name);
        let tmp = self.base_dir.join(format!(".{}.json.tmp", name));
        fs::write(&tmp, serde_json::to_string_pretty(value)?)?;
        fs::rename(&tmp, &path)?;

        debug!("Saved snapshot {}", path.display());
        Ok(path)
    }

    /// Append `entry` to a JSON array snapshot, dropping the oldest entries
    /// beyond `cap`. Returns the stored list.
    pub fn append_capped<T>(&self, name: &str, entry: T, cap: usize) -> Result<Vec<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut entries: Vec<T> = self.load_or_default(name)?;
        entries.push(entry);
        if entries.len() > cap {
            let excess = entries.len() - cap;
            entries.drain(..excess);
        }
        self.save(name, &entries)?;
        Ok(entries)
    }

    pub fn remove(&self, name: &str) -> Result<bool> {
        match fs::remove_file(self.path(name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested"));

        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1u32);
        store.save("counts", &map).unwrap();

        let loaded: BTreeMap<String, u32> = store.load("counts").unwrap().unwrap();
        assert_eq!(loaded, map);
        assert!(!dir.path().join("nested/.counts.json.tmp").exists());
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        assert!(store.load::<Vec<u32>>("missing").unwrap().is_none());
        assert!(store.load_or_default::<Vec<u32>>("missing").unwrap().is_empty());
    }

    #[test]
    fn test_load_corrupt_is_error() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        fs::write(store.path("broken"), "{not json").unwrap();
        assert!(store.load::<Vec<u32>>("broken").is_err());
    }

    #[test]
    fn test_append_capped_drops_oldest() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());

        for i in 0..5u32 {
            store.append_capped("history", i, 3).unwrap();
        }
        let stored: Vec<u32> = store.load("history").unwrap().unwrap();
        assert_eq!(stored, vec![2, 3, 4]);
    }

    #[test]
    fn test_remove() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        store.save("gone", &1u8).unwrap();
        assert!(store.remove("gone").unwrap());
        assert!(!store.remove("gone").unwrap());
    }
}
