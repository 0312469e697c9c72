pub mod codec;
pub mod engine;
pub mod file;
pub mod memory;

pub use engine::DurableEngine;
pub use file::FileEngine;
pub use memory::MemoryEngine;
