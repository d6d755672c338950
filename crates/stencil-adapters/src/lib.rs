//! Infrastructure adapters for Stencil.
//!
//! This crate implements the ports defined in `stencil-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod filesystem;
pub mod interaction;
pub mod renderer;
pub mod watcher;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use interaction::{PresetInteraction, ScriptedInteraction};
pub use renderer::HandlebarsRenderer;
pub use watcher::{ChannelWatcher, NotifyWatcher};
