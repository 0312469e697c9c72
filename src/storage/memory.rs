use super::engine::DurableEngine;
use crate::core::{Result, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Process-local engine. Clones share the same namespace.
#[derive(Clone, Default)]
pub struct MemoryEngine {
    slots: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail until switched off again.
    ///
    /// Reads, removals and `clear_all` are unaffected.
    pub fn fail_writes(&self, enabled: bool) {
        self.fail_writes.store(enabled, Ordering::SeqCst);
    }

    /// Raw bytes of a slot, bypassing the async interface.
    pub async fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.slots.read().await.get(key).cloned()
    }

    pub async fn slot_count(&self) -> usize {
        self.slots.read().await.len()
    }
}

#[async_trait]
impl DurableEngine for MemoryEngine {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.slots.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::StorageWrite(
                key.to_string(),
                "write rejected by engine".to_string(),
            ));
        }
        self.slots.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.slots.write().await.remove(key);
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        self.slots.write().await.clear();
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.slots.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
