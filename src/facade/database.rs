use crate::collection::namespace::Namespace;
use crate::collection::{CollectionConfig, CollectionStore};
use crate::core::{Record, Result, StoreError};
use crate::storage::{DurableEngine, FileEngine, MemoryEngine};
use std::any::Any;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Entry point that hands out collections living on one engine.
///
/// Opening the same name twice returns the same handle, so each collection
/// has exactly one writer queue per `DocumentDb`. A global clear issued through
/// any of its collections empties all of them.
pub struct DocumentDb {
    engine: Arc<dyn DurableEngine>,
    config: CollectionConfig,
    namespace: Arc<Namespace>,
    /// Open handles by collection name
    collections: Mutex<HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl DocumentDb {
    pub fn new(engine: Arc<dyn DurableEngine>) -> Self {
        Self {
            engine,
            config: CollectionConfig::default(),
            namespace: Namespace::new(),
            collections: Mutex::new(HashMap::new()),
        }
    }

    /// Database backed by a fresh in-process engine.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryEngine::new()))
    }

    /// Database backed by slot files under `root`.
    pub async fn open_dir(root: impl Into<PathBuf>) -> Result<Self> {
        let engine = FileEngine::open(root).await?;
        Ok(Self::new(Arc::new(engine)))
    }

    /// Set the configuration used for collections opened afterwards
    pub fn with_config(mut self, config: CollectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn engine(&self) -> &Arc<dyn DurableEngine> {
        &self.engine
    }

    /// Open (or return the already open) collection `name`.
    pub async fn collection<T: Record>(&self, name: &str) -> Result<CollectionStore<T>> {
        self.collection_with_config(name, self.config.clone()).await
    }

    /// Like [`collection`](Self::collection) with an explicit config. The
    /// config is ignored when the collection is already open.
    pub async fn collection_with_config<T: Record>(
        &self,
        name: &str,
        config: CollectionConfig,
    ) -> Result<CollectionStore<T>> {
        let mut collections = self.collections.lock().await;

        if let Some(existing) = collections.get(name) {
            return existing
                .downcast_ref::<CollectionStore<T>>()
                .cloned()
                .ok_or_else(|| {
                    StoreError::ExecutionError(format!(
                        "Collection '{}' is already open with a different record type",
                        name
                    ))
                });
        }

        let store = CollectionStore::<T>::open_in_namespace(
            name,
            Arc::clone(&self.engine),
            config,
            Arc::clone(&self.namespace),
        )
        .await?;
        collections.insert(name.to_string(), Arc::new(store.clone()));
        Ok(store)
    }

    /// Names of the collections opened through this database.
    pub async fn open_collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.lock().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of all slots present on the engine.
    pub async fn slot_names(&self) -> Result<Vec<String>> {
        self.engine.keys().await
    }
}
