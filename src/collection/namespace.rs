use crate::core::Result;
use crate::storage::DurableEngine;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::{RwLock, RwLockReadGuard};

/// A collection handle that must hear about namespace-wide erasure.
pub(crate) trait NamespaceMember: Send + Sync {
    fn namespace_cleared(&self);
}

/// Coordination shared by every collection opened on one engine namespace.
///
/// Slot writes hold the gate shared; a global erase holds it exclusively, so
/// an erase is ordered strictly before or after any write. Each erase bumps
/// the epoch, which members compare against under their writer lock.
pub(crate) struct Namespace {
    gate: RwLock<()>,
    epoch: AtomicU64,
    members: Mutex<Vec<Weak<dyn NamespaceMember>>>,
}

impl Namespace {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            gate: RwLock::new(()),
            epoch: AtomicU64::new(0),
            members: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    pub(crate) fn register(&self, member: Weak<dyn NamespaceMember>) {
        let mut members = self
            .members
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        members.retain(|existing| existing.strong_count() > 0);
        members.push(member);
    }

    /// Guard held for the duration of a slot write.
    pub(crate) async fn shared(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read().await
    }

    /// Erase every slot, then tell every live member to drop its contents.
    pub(crate) async fn clear_all(&self, engine: &dyn DurableEngine) -> Result<u64> {
        let _exclusive = self.gate.write().await;
        engine.clear_all().await?;
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let members: Vec<Arc<dyn NamespaceMember>> = {
            let mut members = self
                .members
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            members.retain(|existing| existing.strong_count() > 0);
            members.iter().filter_map(Weak::upgrade).collect()
        };
        for member in members {
            member.namespace_cleared();
        }
        Ok(epoch)
    }
}
