pub mod config;
pub(crate) mod namespace;
pub mod snapshot;
mod state;
pub mod stats;
pub mod store;

pub use config::{ClearScope, CollectionConfig};
pub use snapshot::CollectionSnapshot;
pub use stats::CollectionStats;
pub use store::CollectionStore;
