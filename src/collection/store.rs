use super::config::{ClearScope, CollectionConfig};
use super::namespace::{Namespace, NamespaceMember};
use super::snapshot::CollectionSnapshot;
use super::state::CollectionState;
use super::stats::{CollectionStats, WriteMetrics};
use crate::core::{Record, RecordId, Result, StoreError};
use crate::storage::{DurableEngine, codec};
use im::Vector;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{Instrument, Level, event, info_span};

struct WriterState<T: Record> {
    current: CollectionState<T>,
    metrics: WriteMetrics,
    /// Namespace epoch `current` was last reconciled with
    epoch: u64,
}

struct StoreInner<T: Record> {
    name: Arc<str>,
    engine: Arc<dyn DurableEngine>,
    config: CollectionConfig,
    namespace: Arc<Namespace>,
    writer: Mutex<WriterState<T>>,
    published: watch::Sender<CollectionSnapshot<T>>,
}

impl<T: Record> NamespaceMember for StoreInner<T> {
    fn namespace_cleared(&self) {
        self.published.send_modify(|snapshot| *snapshot = snapshot.emptied());
    }
}

/// A named collection mirrored in memory and persisted as one slot.
///
/// Handles are cheap to clone and share state. Mutations are serialized on an
/// internal writer lock that is held until the slot write resolves, so every
/// operation computes its result from the latest committed sequence. Each
/// mutation is built on a detached copy and only adopted once the write
/// succeeds, so a future dropped mid-write leaves the collection as it was.
/// Reads (`list`, `get`, `snapshot`) never wait on a writer and always see the
/// last published state.
///
/// # Examples
///
/// ```
/// use memocollect::{CollectionStore, Document, MemoryEngine};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> memocollect::Result<()> {
/// let todos = CollectionStore::<Document>::open("todos", Arc::new(MemoryEngine::new())).await?;
/// let id = todos.insert(Document::new().with("text", "a")).await?;
/// assert_eq!(todos.get(&id).unwrap().get("text"), Some(&"a".into()));
/// # Ok(())
/// # }
/// ```
pub struct CollectionStore<T: Record> {
    inner: Arc<StoreInner<T>>,
}

impl<T: Record> Clone for CollectionStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Record> fmt::Debug for CollectionStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionStore")
            .field("name", &self.inner.name)
            .field("len", &self.len())
            .field("version", &self.version())
            .finish()
    }
}

impl<T: Record> CollectionStore<T> {
    /// Open a collection with the default configuration.
    pub async fn open(name: impl Into<String>, engine: Arc<dyn DurableEngine>) -> Result<Self> {
        Self::open_with_config(name, engine, CollectionConfig::default()).await
    }

    /// Open a collection, hydrating it from its slot.
    ///
    /// An absent slot is initialized with an empty sequence. The handle is
    /// only returned once hydration is done. A handle opened this way does not
    /// learn about global clears issued by other handles; open collections
    /// through [`DocumentDb`](crate::DocumentDb) to share that.
    pub async fn open_with_config(
        name: impl Into<String>,
        engine: Arc<dyn DurableEngine>,
        config: CollectionConfig,
    ) -> Result<Self> {
        Self::open_in_namespace(name, engine, config, Namespace::new()).await
    }

    pub(crate) async fn open_in_namespace(
        name: impl Into<String>,
        engine: Arc<dyn DurableEngine>,
        config: CollectionConfig,
        namespace: Arc<Namespace>,
    ) -> Result<Self> {
        let name: String = name.into();
        if name.trim().is_empty() {
            return Err(StoreError::InvalidName(
                "collection name must not be empty".to_string(),
            ));
        }
        let name: Arc<str> = Arc::from(name);

        let span = info_span!("collection.open", collection = %name);
        let (current, epoch) = async {
            let _shared = namespace.shared().await;
            let current = hydrate::<T>(&name, engine.as_ref(), 0).await?;
            Ok::<_, StoreError>((current, namespace.epoch()))
        }
        .instrument(span)
        .await?;

        let (published, _) = watch::channel(CollectionSnapshot::capture(name.clone(), &current));
        let inner = Arc::new(StoreInner {
            name,
            engine,
            config,
            namespace: Arc::clone(&namespace),
            writer: Mutex::new(WriterState {
                current,
                metrics: WriteMetrics::default(),
                epoch,
            }),
            published,
        });

        let member: Arc<dyn NamespaceMember> = inner.clone();
        namespace.register(Arc::downgrade(&member));
        Ok(Self { inner })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.inner.config
    }

    pub fn engine(&self) -> &Arc<dyn DurableEngine> {
        &self.inner.engine
    }

    /// Append a record and persist. Returns its identifier, generating one if
    /// the record had none.
    pub async fn insert(&self, mut record: T) -> Result<RecordId> {
        let span = info_span!("collection.insert", collection = %self.inner.name);
        async move {
            let mut writer = self.inner.writer.lock().await;
            let _shared = self.inner.namespace.shared().await;
            self.sync_namespace(&mut writer);

            let supplied = record.record_id().map(str::to_string);
            let id = match supplied {
                Some(id) => {
                    if self.inner.config.reject_duplicate_ids && writer.current.contains(&id) {
                        event!(Level::DEBUG, id = %id, "insert rejected duplicate identifier");
                        return Err(StoreError::DuplicateId(id, self.inner.name.to_string()));
                    }
                    id
                }
                None => {
                    let id = self.inner.config.id_generator.next_id();
                    record.set_id(id.clone());
                    id
                }
            };

            let mut next = writer.current.clone();
            next.push(record);
            self.commit(&mut writer, next, true, "insert").await?;
            Ok(id)
        }
        .instrument(span)
        .await
    }

    /// Replace the earliest record sharing `record`'s identifier, in place.
    ///
    /// Returns `false` when nothing matched; the unchanged sequence is still
    /// written back and nothing is added.
    pub async fn update(&self, record: T) -> Result<bool> {
        let span = info_span!("collection.update", collection = %self.inner.name);
        async move {
            let mut writer = self.inner.writer.lock().await;
            let _shared = self.inner.namespace.shared().await;
            self.sync_namespace(&mut writer);

            let position = record
                .record_id()
                .and_then(|id| writer.current.position(id));
            let mut next = writer.current.clone();
            match position {
                Some(position) => next.replace_at(position, record),
                None => event!(Level::DEBUG, "update matched no record"),
            }

            self.commit(&mut writer, next, position.is_some(), "update")
                .await?;
            Ok(position.is_some())
        }
        .instrument(span)
        .await
    }

    /// Delete the earliest record with identifier `id`.
    ///
    /// Returns `false` and leaves the sequence untouched when nothing matched.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let span = info_span!("collection.remove", collection = %self.inner.name, id = %id);
        async move {
            let mut writer = self.inner.writer.lock().await;
            let _shared = self.inner.namespace.shared().await;
            self.sync_namespace(&mut writer);

            let position = writer.current.position(id);
            let mut next = writer.current.clone();
            match position {
                Some(position) => {
                    next.remove_at(position);
                }
                None => event!(Level::DEBUG, "remove matched no record"),
            }

            self.commit(&mut writer, next, position.is_some(), "remove")
                .await?;
            Ok(position.is_some())
        }
        .instrument(span)
        .await
    }

    /// Current records in order. The returned vector is detached from the store.
    pub fn list(&self) -> Vector<T> {
        self.inner.published.borrow().items().clone()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.inner.published.borrow().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.inner.published.borrow().get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.published.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.published.borrow().is_empty()
    }

    /// Monotonic counter bumped by every applied mutation.
    pub fn version(&self) -> u64 {
        self.inner.published.borrow().version()
    }

    pub fn snapshot(&self) -> CollectionSnapshot<T> {
        self.inner.published.borrow().clone()
    }

    /// Receiver that always holds the latest published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<CollectionSnapshot<T>> {
        self.inner.published.subscribe()
    }

    /// Empty the collection.
    ///
    /// With [`ClearScope::Global`] every slot on the engine is erased, this
    /// collection's included, and every collection sharing the namespace is
    /// emptied in memory as well; with [`ClearScope::Collection`] only this
    /// slot is reset to an empty sequence.
    pub async fn clear(&self) -> Result<()> {
        let span = info_span!("collection.clear", collection = %self.inner.name);
        async move {
            let mut writer = self.inner.writer.lock().await;
            self.clear_locked(&mut writer).await
        }
        .instrument(span)
        .await
    }

    /// Replace the whole collection with `next`, keeping its order.
    ///
    /// Records without an identifier get one. Under [`ClearScope::Global`] the
    /// engine namespace is erased first.
    pub async fn overwrite(&self, next: impl IntoIterator<Item = T>) -> Result<()> {
        let span = info_span!("collection.overwrite", collection = %self.inner.name);
        let mut items: Vec<T> = next.into_iter().collect();
        async move {
            for item in items.iter_mut() {
                if item.record_id().is_none() {
                    item.set_id(self.inner.config.id_generator.next_id());
                }
            }
            if self.inner.config.reject_duplicate_ids {
                let mut seen = HashSet::new();
                for item in &items {
                    if let Some(id) = item.record_id() {
                        if !seen.insert(id) {
                            return Err(StoreError::DuplicateId(
                                id.to_string(),
                                self.inner.name.to_string(),
                            ));
                        }
                    }
                }
            }

            let mut writer = self.inner.writer.lock().await;
            if self.inner.config.clear_scope == ClearScope::Global {
                self.clear_locked(&mut writer).await?;
            }

            let _shared = self.inner.namespace.shared().await;
            self.sync_namespace(&mut writer);
            event!(Level::INFO, items = items.len(), "overwriting collection");
            let next = CollectionState::from_items(items, writer.current.version());
            self.commit(&mut writer, next, true, "overwrite").await
        }
        .instrument(span)
        .await
    }

    /// Re-read the slot, discarding the in-memory sequence.
    ///
    /// Picks up writes made through other handles on the same engine.
    pub async fn reload(&self) -> Result<()> {
        let span = info_span!("collection.reload", collection = %self.inner.name);
        async move {
            let mut writer = self.inner.writer.lock().await;
            let _shared = self.inner.namespace.shared().await;
            self.sync_namespace(&mut writer);

            let version = writer.current.version() + 1;
            writer.current =
                hydrate::<T>(&self.inner.name, self.inner.engine.as_ref(), version).await?;
            self.publish(&writer.current);
            Ok(())
        }
        .instrument(span)
        .await
    }

    pub async fn stats(&self) -> CollectionStats {
        let mut writer = self.inner.writer.lock().await;
        self.sync_namespace(&mut writer);
        CollectionStats {
            name: self.inner.name.to_string(),
            item_count: writer.current.len(),
            version: writer.current.version(),
            writes: writer.metrics.writes,
            write_failures: writer.metrics.write_failures,
            rollbacks: writer.metrics.rollbacks,
            last_write_at: writer.metrics.last_write_at.clone(),
        }
    }

    async fn clear_locked(&self, writer: &mut WriterState<T>) -> Result<()> {
        let scope = self.inner.config.clear_scope;
        match scope {
            ClearScope::Global => {
                let erased = self
                    .inner
                    .namespace
                    .clear_all(self.inner.engine.as_ref())
                    .await;
                if let Err(err) = erased {
                    writer.metrics.record_failure(false);
                    event!(Level::WARN, error = %err, ?scope, "collection clear failed");
                    return Err(err);
                }
                // Every member, this one included, was already emptied and
                // republished by the namespace.
                self.sync_namespace(writer);
            }
            ClearScope::Collection => {
                let _shared = self.inner.namespace.shared().await;
                self.sync_namespace(writer);
                let erased = self
                    .inner
                    .engine
                    .set(&self.inner.name, codec::empty_sequence())
                    .await;
                if let Err(err) = erased {
                    writer.metrics.record_failure(false);
                    event!(Level::WARN, error = %err, ?scope, "collection clear failed");
                    return Err(err);
                }
                let mut next = writer.current.clone();
                next.clear();
                next.bump_version();
                writer.current = next;
                self.publish(&writer.current);
            }
        }

        writer.metrics.record_write();
        event!(Level::INFO, ?scope, "collection cleared");
        Ok(())
    }

    /// Adopt a namespace-wide erase performed through another handle.
    ///
    /// The published snapshot was already emptied when the erase happened;
    /// the writer state follows it here, under the writer lock.
    fn sync_namespace(&self, writer: &mut WriterState<T>) {
        let epoch = self.inner.namespace.epoch();
        if epoch == writer.epoch {
            return;
        }
        writer.epoch = epoch;
        let version = self.inner.published.borrow().version();
        writer.current = CollectionState::from_items(Vec::new(), version);
        event!(Level::DEBUG, epoch, "collection emptied by namespace clear");
    }

    /// Write `next` to the slot and adopt it once the write succeeded.
    ///
    /// Nothing is adopted before the write resolves. On failure `next` is
    /// dropped when rollback is enabled; otherwise it is adopted and published
    /// anyway, diverging from the slot until the next successful write.
    async fn commit(
        &self,
        writer: &mut WriterState<T>,
        mut next: CollectionState<T>,
        changed: bool,
        operation: &'static str,
    ) -> Result<()> {
        let written = match codec::encode_sequence(
            &self.inner.name,
            next.items(),
            self.inner.config.pretty_encoding,
        ) {
            Ok(bytes) => self.inner.engine.set(&self.inner.name, bytes).await,
            Err(err) => Err(err),
        };

        match written {
            Ok(()) => {
                writer.metrics.record_write();
                if changed {
                    next.bump_version();
                    writer.current = next;
                    self.publish(&writer.current);
                }
                event!(
                    Level::DEBUG,
                    operation,
                    items = writer.current.len(),
                    version = writer.current.version(),
                    "collection persisted"
                );
                Ok(())
            }
            Err(err) => {
                let rollback = self.inner.config.rollback_on_write_failure;
                writer.metrics.record_failure(rollback && changed);
                if !rollback && changed {
                    next.bump_version();
                    writer.current = next;
                    self.publish(&writer.current);
                }
                event!(
                    Level::WARN,
                    operation,
                    error = %err,
                    rolled_back = rollback,
                    "collection write failed"
                );
                Err(err)
            }
        }
    }

    fn publish(&self, state: &CollectionState<T>) {
        self.inner
            .published
            .send_replace(CollectionSnapshot::capture(self.inner.name.clone(), state));
    }
}

async fn hydrate<T: Record>(
    name: &str,
    engine: &dyn DurableEngine,
    version: u64,
) -> Result<CollectionState<T>> {
    match engine.get(name).await? {
        Some(bytes) => {
            let items: Vec<T> = codec::decode_sequence(name, &bytes)?;
            event!(Level::DEBUG, items = items.len(), "collection hydrated from slot");
            Ok(CollectionState::from_items(items, version))
        }
        None => {
            engine.set(name, codec::empty_sequence()).await?;
            event!(Level::DEBUG, "collection slot initialized empty");
            Ok(CollectionState::from_items(Vec::new(), version))
        }
    }
}
