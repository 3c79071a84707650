//! String key-value store
//!
//! Local-storage style persistence: a flat JSON object of string values kept
//! in a single file. Writes go to a temp file first and are renamed into
//! place. An in-memory variant backs tests and ephemeral sessions.

use crate::error::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug)]
enum Backing {
    File(PathBuf),
    Memory(BTreeMap<String, String>),
}

/// Shared handle to a key-value store
#[derive(Debug, Clone)]
pub struct KeyValueStore {
    backing: Arc<Mutex<Backing>>,
}

impl KeyValueStore {
    /// Store persisted at `path`; the file is created on first write
    pub fn open(path: PathBuf) -> Self {
        Self {
            backing: Arc::new(Mutex::new(Backing::File(path))),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            backing: Arc::new(Mutex::new(Backing::Memory(BTreeMap::new()))),
        }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let backing = self.backing.lock().await;
        match &*backing {
            Backing::File(path) => Ok(read_file(path).await?.remove(key)),
            Backing::Memory(map) => Ok(map.get(key).cloned()),
        }
    }

    /// Overwrite the value under `key`
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut backing = self.backing.lock().await;
        match &mut *backing {
            Backing::File(path) => {
                let mut entries = read_file(path).await?;
                entries.insert(key.to_string(), value.to_string());
                write_file(path, &entries).await
            }
            Backing::Memory(map) => {
                map.insert(key.to_string(), value.to_string());
                Ok(())
            }
        }
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let mut backing = self.backing.lock().await;
        match &mut *backing {
            Backing::File(path) => {
                let mut entries = read_file(path).await?;
                if entries.remove(key).is_some() {
                    write_file(path, &entries).await?;
                }
                Ok(())
            }
            Backing::Memory(map) => {
                map.remove(key);
                Ok(())
            }
        }
    }
}

async fn read_file(path: &Path) -> Result<BTreeMap<String, String>> {
    if !fs::try_exists(path).await? {
        return Ok(BTreeMap::new());
    }

    let content = fs::read_to_string(path).await?;
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    Ok(serde_json::from_str(&content)?)
}

async fn write_file(path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let content = serde_json::to_string_pretty(entries)?;
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path).await?;
    file.write_all(content.as_bytes()).await?;
    file.sync_all().await?;
    fs::rename(&temp_path, path).await?;

    tracing::debug!("Key-value store written to {:?}", path);
    Ok(())
}
