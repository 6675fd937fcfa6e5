mod memory;

pub use memory::{InMemoryIndex, IndexCallCounts, IndexedFile};
