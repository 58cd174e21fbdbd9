//! A memory store persisted as a JSON document.

use std::fs;
use std::path::{Path, PathBuf};

use super::memory::{MemoryStore, StoreData};
use super::ClassStore;
use crate::error::{Error, Result};

/// A [`MemoryStore`] loaded from and saved to a JSON file.
///
/// ```no_run
/// use classpkg::store::{ClassStore, FileStore};
///
/// let mut file = FileStore::open_or_create("store.json")?;
/// let classes = file.store().classes()?;
/// println!("{} installed classes", classes.len());
/// file.save_if_dirty()?;
/// # Ok::<(), classpkg::error::Error>(())
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    store: MemoryStore,
}

impl FileStore {
    /// Load an existing store file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::not_found("Store", path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        let data: StoreData = serde_json::from_str(&content)?;
        log::debug!("Loaded store from {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            store: MemoryStore::from_data(data),
        })
    }

    /// Load the store file, starting from an empty store when it is missing.
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::open(path);
        }
        log::info!("Initializing empty store at {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            store: MemoryStore::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MemoryStore {
        &mut self.store
    }

    /// Write the store to disk, creating parent directories as needed.
    pub fn save(&mut self) -> Result<()> {
        if self.store.in_transaction() {
            return Err(Error::store("cannot save while a transaction is open"));
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self.store.data())?;
        fs::write(&self.path, json)?;
        self.store.mark_clean();
        log::debug!("Saved store to {}", self.path.display());
        Ok(())
    }

    /// Save only when something changed. Returns whether a write happened.
    pub fn save_if_dirty(&mut self) -> Result<bool> {
        if !self.store.is_dirty() && self.path.exists() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }
}
