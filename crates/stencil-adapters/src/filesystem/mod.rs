//! Filesystem adapters: the local disk, and an in-memory tree for tests that
//! can count reads and inject read failures.

mod local;
mod memory;

pub use local::LocalFilesystem;
pub use memory::MemoryFilesystem;
