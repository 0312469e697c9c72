pub mod error;
pub mod id;
pub mod types;

pub use error::{Result, StoreError};
pub use id::{IdGenerator, SequentialIdGenerator, UuidGenerator};
pub use types::{Document, Record, RecordId};
