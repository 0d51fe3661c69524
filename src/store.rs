//! Directory-backed entity storage.
//!
//! One directory per entity under a collection root. The store owns every
//! filesystem operation the managers perform; nothing outside this module
//! touches entity locations directly.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;

/// Errors raised by entity storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{name} not found")]
    NotFound { name: String },

    #[error("{name} already exists")]
    AlreadyExists { name: String },

    #[error("filesystem error on '{name}'")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            name: path.display().to_string(),
            source,
        }
    }
}

/// Handle on one collection root (all challenges, or all teams).
pub struct EntityStore {
    root: PathBuf,
}

impl EntityStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the entity directory called `name`.
    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.entry_path(name).is_dir()
    }

    /// Names of all entity directories under the root, in listing order.
    /// Plain files are ignored.
    pub fn list_dirs(&self) -> Result<Vec<String>, StoreError> {
        let entries = fs::read_dir(&self.root).map_err(|e| StoreError::io(&self.root, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.root, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| StoreError::io(&entry.path(), e))?;
            if !file_type.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => warn!("skipping non-UTF-8 directory name {:?}", raw),
            }
        }
        Ok(names)
    }

    pub fn rename(&self, from: &str, to: &str) -> Result<(), StoreError> {
        if !self.exists(from) {
            return Err(StoreError::NotFound {
                name: format!("'{from}'"),
            });
        }
        if self.exists(to) {
            return Err(StoreError::AlreadyExists {
                name: format!("'{to}'"),
            });
        }
        fs::rename(self.entry_path(from), self.entry_path(to))
            .map_err(|e| StoreError::io(&self.entry_path(from), e))
    }

    /// Creates the entity directory and returns its path.
    pub fn create_dir(&self, name: &str) -> Result<PathBuf, StoreError> {
        let path = self.entry_path(name);
        if path.exists() {
            return Err(StoreError::AlreadyExists {
                name: format!("'{name}'"),
            });
        }
        fs::create_dir_all(&path).map_err(|e| StoreError::io(&path, e))?;
        Ok(path)
    }

    /// Removes the entity directory and everything under it.
    pub fn remove_all(&self, name: &str) -> Result<(), StoreError> {
        if !self.exists(name) {
            return Err(StoreError::NotFound {
                name: format!("'{name}'"),
            });
        }
        fs::remove_dir_all(self.entry_path(name)).map_err(|e| StoreError::io(&self.entry_path(name), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_with(entries: &[&str]) -> (TempDir, EntityStore) {
        let dir = TempDir::new().unwrap();
        for entry in entries {
            fs::create_dir(dir.path().join(entry)).unwrap();
        }
        let store = EntityStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_list_skips_files() {
        let (dir, store) = store_with(&["11-web", "x-pwn"]);
        fs::write(dir.path().join("notes.txt"), "not an entity").unwrap();

        let mut names = store.list_dirs().unwrap();
        names.sort();
        assert_eq!(names, vec!["11-web", "x-pwn"]);
    }

    #[test]
    fn test_rename_missing_source() {
        let (_dir, store) = store_with(&[]);
        let err = store.rename("x-web", "11-web").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_rename_existing_target() {
        let (_dir, store) = store_with(&["x-web", "11-web"]);
        let err = store.rename("x-web", "11-web").unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[test]
    fn test_create_and_remove() {
        let (dir, store) = store_with(&[]);

        let path = store.create_dir("3-red").unwrap();
        assert!(path.is_dir());
        assert!(matches!(
            store.create_dir("3-red").unwrap_err(),
            StoreError::AlreadyExists { .. }
        ));

        fs::write(path.join("compose.yml"), "services: {}").unwrap();
        store.remove_all("3-red").unwrap();
        assert!(!dir.path().join("3-red").exists());
    }
}
