use super::state::CollectionState;
use crate::core::{Record, RecordId};
use im::{HashMap, Vector};
use std::sync::Arc;

/// Immutable view of a collection at a given version.
///
/// Cheap to clone; mutating a snapshot's items never reaches the store.
#[derive(Debug, Clone)]
pub struct CollectionSnapshot<T: Record> {
    name: Arc<str>,
    version: u64,
    items: Vector<T>,
    index: HashMap<RecordId, usize>,
}

impl<T: Record> CollectionSnapshot<T> {
    pub(crate) fn capture(name: Arc<str>, state: &CollectionState<T>) -> Self {
        Self {
            name,
            version: state.version(),
            items: state.items().clone(),
            index: state.index().clone(),
        }
    }

    /// Same collection, one version later, with nothing in it.
    pub(crate) fn emptied(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            version: self.version + 1,
            items: Vector::new(),
            index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn items(&self) -> &Vector<T> {
        &self.items
    }

    pub fn into_items(self) -> Vector<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Earliest record carrying `id`.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).and_then(|position| self.items.get(*position))
    }

    pub fn iter(&self) -> im::vector::Iter<'_, T> {
        self.items.iter()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}
