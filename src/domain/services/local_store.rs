#[cfg(test)]
#[path = "local_store_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Result;
use strum::EnumIter;
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum StoreKey {
    CurrentSessionId,
    CurrentUrl,
}

/// Client-held key/value state that survives restarts. Mutations apply in memory right away and
/// are written to disk by `flush`. A failed write leaves the store dirty so the next flush retries.
pub struct LocalStore {
    dirty: bool,
    path: Option<PathBuf>,
    values: BTreeMap<String, String>,
}

impl LocalStore {
    pub async fn open(path: &Path) -> Result<LocalStore> {
        let mut values = BTreeMap::new();
        if path.exists() {
            let payload = fs::read_to_string(path).await?;
            if !payload.trim().is_empty() {
                values = serde_yaml::from_str(&payload)?;
            }
        }

        return Ok(LocalStore {
            dirty: false,
            path: Some(path.to_path_buf()),
            values,
        });
    }

    pub fn in_memory() -> LocalStore {
        return LocalStore {
            dirty: false,
            path: None,
            values: BTreeMap::new(),
        };
    }

    pub fn path(&self) -> Option<&Path> {
        return self.path.as_deref();
    }

    pub fn is_dirty(&self) -> bool {
        return self.dirty;
    }

    pub fn get(&self, key: StoreKey) -> Option<String> {
        return self.values.get(&key.to_string()).cloned();
    }

    pub fn set(&mut self, key: StoreKey, value: &str) {
        let previous = self.values.insert(key.to_string(), value.to_string());
        if previous.as_deref() != Some(value) {
            self.dirty = true;
        }
    }

    pub fn remove(&mut self, key: StoreKey) {
        if self.values.remove(&key.to_string()).is_some() {
            self.dirty = true;
        }
    }

    pub fn clear(&mut self) {
        if !self.values.is_empty() {
            self.values.clear();
            self.dirty = true;
        }
    }

    pub async fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        let path = match &self.path {
            Some(path) => path,
            None => {
                self.dirty = false;
                return Ok(());
            }
        };

        let payload = serde_yaml::to_string(&self.values)?;

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = fs::File::create(path).await?;
        file.write_all(payload.as_bytes()).await?;
        tracing::debug!(path = ?path, values = ?self.values, "Local store written");

        self.dirty = false;
        return Ok(());
    }
}
