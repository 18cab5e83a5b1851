// src/options/store.rs
use super::{OptionMap, OptionsError};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Named-option persistence with last-write-wins semantics.
#[async_trait]
pub trait OptionsStore: Send + Sync {
    fn get(&self, name: &str) -> Option<OptionMap>;

    async fn set(&self, name: &str, value: OptionMap) -> Result<(), OptionsError>;

    /// Returns whether the option existed.
    async fn delete(&self, name: &str) -> Result<bool, OptionsError>;

    fn get_or(&self, name: &str, default: OptionMap) -> OptionMap {
        self.get(name).unwrap_or(default)
    }
}

#[derive(Debug, Default)]
pub struct MemoryOptionsStore {
    options: DashMap<String, OptionMap>,
}

impl MemoryOptionsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OptionsStore for MemoryOptionsStore {
    fn get(&self, name: &str) -> Option<OptionMap> {
        self.options.get(name).map(|entry| entry.value().clone())
    }

    async fn set(&self, name: &str, value: OptionMap) -> Result<(), OptionsError> {
        self.options.insert(name.to_string(), value);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<bool, OptionsError> {
        Ok(self.options.remove(name).is_some())
    }
}

type Snapshot = HashMap<String, OptionMap>;

/// JSON file holding every option. Reads come from an in-memory snapshot;
/// writes are serialized and replace the file atomically before the snapshot
/// is swapped.
pub struct FileOptionsStore {
    path: PathBuf,
    snapshot: ArcSwap<Snapshot>,
    write_lock: Mutex<()>,
}

impl FileOptionsStore {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, OptionsError> {
        let path = path.as_ref().to_path_buf();

        let snapshot: Snapshot = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => Snapshot::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Snapshot::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            "Opened options store {} ({} options)",
            path.display(),
            snapshot.len()
        );

        Ok(Self {
            path,
            snapshot: ArcSwap::from_pointee(snapshot),
            write_lock: Mutex::new(()),
        })
    }

    async fn persist(&self, snapshot: &Snapshot) -> Result<(), OptionsError> {
        let contents = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl OptionsStore for FileOptionsStore {
    fn get(&self, name: &str) -> Option<OptionMap> {
        self.snapshot.load().get(name).cloned()
    }

    async fn set(&self, name: &str, value: OptionMap) -> Result<(), OptionsError> {
        let _guard = self.write_lock.lock().await;

        let mut next = Snapshot::clone(&self.snapshot.load());
        next.insert(name.to_string(), value);
        self.persist(&next).await?;
        self.snapshot.store(Arc::new(next));

        tracing::debug!(option = name, "option saved");
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<bool, OptionsError> {
        let _guard = self.write_lock.lock().await;

        let mut next = Snapshot::clone(&self.snapshot.load());
        if next.remove(name).is_none() {
            return Ok(false);
        }
        self.persist(&next).await?;
        self.snapshot.store(Arc::new(next));

        tracing::debug!(option = name, "option deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> OptionMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn memory_store_set_get_delete() {
        let store = MemoryOptionsStore::new();
        assert!(store.get("opts").is_none());

        store.set("opts", map(&[("workflow_id", "wf")])).await.unwrap();
        assert_eq!(store.get("opts").unwrap()["workflow_id"], "wf");

        assert!(store.delete("opts").await.unwrap());
        assert!(!store.delete("opts").await.unwrap());
    }

    #[tokio::test]
    async fn get_or_falls_back_to_default() {
        let store = MemoryOptionsStore::new();
        let fallback = map(&[("a", "b")]);
        assert_eq!(store.get_or("missing", fallback.clone()), fallback);
    }

    #[tokio::test]
    async fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");

        let store = FileOptionsStore::open(&path).await.unwrap();
        store.set("opts", map(&[("workflow_id", "wf_1")])).await.unwrap();
        store.set("opts", map(&[("workflow_id", "wf_2")])).await.unwrap();
        drop(store);

        let reopened = FileOptionsStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("opts").unwrap()["workflow_id"], "wf_2");

        assert!(reopened.delete("opts").await.unwrap());
        let again = FileOptionsStore::open(&path).await.unwrap();
        assert!(again.get("opts").is_none());
    }

    #[tokio::test]
    async fn file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let result = FileOptionsStore::open(&path).await;
        assert!(matches!(result, Err(OptionsError::Serialization(_))));
    }
}
