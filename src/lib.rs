// ============================================================================
// MemoCollect Library
// ============================================================================

pub mod collection;
pub mod core;
pub mod facade;
pub mod prelude;
pub mod storage;

// Re-export main types for convenience
pub use collection::{
    ClearScope, CollectionConfig, CollectionSnapshot, CollectionStats, CollectionStore,
};
pub use core::{
    Document, IdGenerator, Record, RecordId, Result, SequentialIdGenerator, StoreError,
    UuidGenerator,
};
pub use facade::DocumentDb;
pub use storage::{DurableEngine, FileEngine, MemoryEngine};
