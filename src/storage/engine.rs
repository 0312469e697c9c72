use crate::core::Result;
use async_trait::async_trait;

/// Durable key-value engine a collection persists into.
///
/// One key ("slot") holds one collection's encoded sequence. The namespace is
/// shared by every collection opened on the same engine.
#[async_trait]
pub trait DurableEngine: Send + Sync {
    /// Read a slot; `None` when the key was never written or was erased.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace a slot's bytes. Failures are reported as `StorageWrite`.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Remove a single slot. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Erase every slot in the namespace.
    async fn clear_all(&self) -> Result<()>;

    /// Names of all slots currently present.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Check if a slot exists
    async fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
