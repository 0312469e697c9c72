//! Recommended imports grouped by abstraction level.
//!
//! `app` covers day-to-day collection work. `advanced` exposes the engine and
//! codec seams for custom backends.

pub mod app {
    //! Opening collections and working with records.
    pub use crate::{
        ClearScope, CollectionConfig, CollectionStore, Document, DocumentDb, Record, RecordId,
        Result, StoreError,
    };
}

pub mod advanced {
    //! Escape hatch for engine implementors.
    pub use crate::core::{IdGenerator, SequentialIdGenerator, UuidGenerator};
    pub use crate::storage::codec::{decode_sequence, empty_sequence, encode_sequence};
    pub use crate::storage::{DurableEngine, FileEngine, MemoryEngine};
    pub use async_trait::async_trait;
}
