//! Storage layer: abstraction traits plus the in-memory reference backend.

pub mod memory;
pub mod traits;

pub use memory::MemoryConnection;
