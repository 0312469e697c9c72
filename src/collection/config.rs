use crate::core::{IdGenerator, UuidGenerator};
use std::fmt;
use std::sync::Arc;

/// How far `clear` and `overwrite` reach into the engine namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClearScope {
    /// Erase every slot on the engine, other collections included.
    #[default]
    Global,
    /// Erase only this collection's slot.
    Collection,
}

/// Per-collection configuration
#[derive(Clone)]
pub struct CollectionConfig {
    /// Reach of `clear`/`overwrite`
    pub clear_scope: ClearScope,

    /// Restore the previous in-memory sequence when a write fails
    pub rollback_on_write_failure: bool,

    /// Refuse inserts/overwrites that would duplicate an identifier
    pub reject_duplicate_ids: bool,

    /// Indent the JSON stored in the slot
    pub pretty_encoding: bool,

    /// Source of identifiers for records inserted without one
    pub id_generator: Arc<dyn IdGenerator>,
}

impl CollectionConfig {
    pub fn new() -> Self {
        Self {
            clear_scope: ClearScope::Global,
            rollback_on_write_failure: true,
            reject_duplicate_ids: true,
            pretty_encoding: false,
            id_generator: Arc::new(UuidGenerator),
        }
    }

    /// Set the clear scope
    pub fn clear_scope(mut self, scope: ClearScope) -> Self {
        self.clear_scope = scope;
        self
    }

    /// Enable or disable rollback on failed writes
    pub fn rollback_on_write_failure(mut self, enabled: bool) -> Self {
        self.rollback_on_write_failure = enabled;
        self
    }

    /// Enable or disable duplicate identifier rejection
    pub fn reject_duplicate_ids(mut self, enabled: bool) -> Self {
        self.reject_duplicate_ids = enabled;
        self
    }

    /// Enable or disable pretty-printed slots
    pub fn pretty_encoding(mut self, enabled: bool) -> Self {
        self.pretty_encoding = enabled;
        self
    }

    /// Set the identifier generator
    pub fn id_generator(mut self, generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = generator;
        self
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CollectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionConfig")
            .field("clear_scope", &self.clear_scope)
            .field("rollback_on_write_failure", &self.rollback_on_write_failure)
            .field("reject_duplicate_ids", &self.reject_duplicate_ids)
            .field("pretty_encoding", &self.pretty_encoding)
            .finish_non_exhaustive()
    }
}
