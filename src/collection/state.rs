use crate::core::{Record, RecordId};
use im::{HashMap, Vector};

/// Ordered records plus an identifier index pointing at the earliest match.
///
/// Both halves are persistent structures, so cloning the state is O(1) and a
/// clone taken before a mutation is a valid rollback point.
#[derive(Debug, Clone)]
pub(crate) struct CollectionState<T: Record> {
    items: Vector<T>,
    index: HashMap<RecordId, usize>,
    version: u64,
}

impl<T: Record> CollectionState<T> {
    pub(crate) fn from_items(items: impl IntoIterator<Item = T>, version: u64) -> Self {
        let mut state = Self {
            items: items.into_iter().collect(),
            index: HashMap::new(),
            version,
        };
        state.rebuild_index();
        state
    }

    pub(crate) fn items(&self) -> &Vector<T> {
        &self.items
    }

    pub(crate) fn index(&self) -> &HashMap<RecordId, usize> {
        &self.index
    }

    pub(crate) fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub(crate) fn push(&mut self, item: T) {
        if let Some(id) = item.record_id() {
            if !self.index.contains_key(id) {
                self.index.insert(id.to_string(), self.items.len());
            }
        }
        self.items.push_back(item);
    }

    /// Replace the entry at `position`. The caller guarantees the identifier
    /// does not change, so the index stays valid.
    pub(crate) fn replace_at(&mut self, position: usize, item: T) {
        self.items.set(position, item);
    }

    pub(crate) fn remove_at(&mut self, position: usize) -> T {
        let removed = self.items.remove(position);
        self.rebuild_index();
        removed
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    fn rebuild_index(&mut self) {
        let mut index = HashMap::new();
        for (position, item) in self.items.iter().enumerate() {
            if let Some(id) = item.record_id() {
                if !index.contains_key(id) {
                    index.insert(id.to_string(), position);
                }
            }
        }
        self.index = index;
    }
}
