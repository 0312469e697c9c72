use super::engine::DurableEngine;
use crate::core::{Result, StoreError};
use async_trait::async_trait;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;

const SLOT_EXTENSION: &str = "slot";

/// Directory-backed engine: one file per slot.
///
/// Slot names are hex-encoded into file names, so any string is a valid key.
/// Files in the root that do not carry the slot extension are never touched.
#[derive(Debug, Clone)]
pub struct FileEngine {
    root: PathBuf,
}

impl FileEngine {
    /// Open (and create if needed) the engine's root directory.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|err| {
            StoreError::Io(format!(
                "Failed to create engine directory '{}': {}",
                root.display(),
                err
            ))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", hex::encode(key.as_bytes()), SLOT_EXTENSION))
    }

    fn slot_key(path: &Path) -> Option<String> {
        if path.extension().and_then(|ext| ext.to_str()) != Some(SLOT_EXTENSION) {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let bytes = hex::decode(stem).ok()?;
        String::from_utf8(bytes).ok()
    }

    async fn slot_paths(&self) -> Result<Vec<(PathBuf, String)>> {
        let mut entries = fs::read_dir(&self.root).await.map_err(|err| {
            StoreError::Io(format!(
                "Failed to list engine directory '{}': {}",
                self.root.display(),
                err
            ))
        })?;

        let mut slots = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if let Some(key) = Self::slot_key(&path) {
                slots.push((path, key));
            }
        }
        Ok(slots)
    }
}

/// Write to a temp file in the same directory, fsync, then rename over the slot.
fn atomic_write(dir: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[async_trait]
impl DurableEngine for FileEngine {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.slot_path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::StorageRead(key.to_string(), err.to_string())),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let dir = self.root.clone();
        let path = self.slot_path(key);
        tokio::task::spawn_blocking(move || atomic_write(&dir, &path, &value))
            .await?
            .map_err(|err| StoreError::StorageWrite(key.to_string(), err.to_string()))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.slot_path(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::StorageWrite(key.to_string(), err.to_string())),
        }
    }

    async fn clear_all(&self) -> Result<()> {
        for (path, key) in self.slot_paths().await? {
            match fs::remove_file(&path).await {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(StoreError::StorageWrite(key, err.to_string())),
            }
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self
            .slot_paths()
            .await?
            .into_iter()
            .map(|(_, key)| key)
            .collect();
        keys.sort();
        Ok(keys)
    }
}
