use super::types::RecordId;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of fresh record identifiers.
///
/// Implementations must never return an empty string and must not repeat a
/// value for the lifetime of the data they label.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> RecordId;
}

/// Random v4 UUIDs, hyphenated. The default generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> RecordId {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `prefix` + counter identifiers (`u1`, `u2`, ...).
///
/// Only unique within one generator instance; meant for fixtures and tests.
pub struct SequentialIdGenerator {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("u")
    }
}

impl fmt::Debug for SequentialIdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequentialIdGenerator")
            .field("prefix", &self.prefix)
            .field("issued", &self.counter.load(Ordering::Relaxed))
            .finish()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> RecordId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{}", self.prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_uuid_ids_are_distinct_and_non_empty() {
        let generator = UuidGenerator;
        let ids: HashSet<_> = (0..100).map(|_| generator.next_id()).collect();
        assert_eq!(ids.len(), 100);
        assert!(ids.iter().all(|id| !id.is_empty()));
    }

    #[test]
    fn test_sequential_ids() {
        let generator = SequentialIdGenerator::default();
        assert_eq!(generator.next_id(), "u1");
        assert_eq!(generator.next_id(), "u2");

        let prefixed = SequentialIdGenerator::new("todo-");
        assert_eq!(prefixed.next_id(), "todo-1");
    }
}
