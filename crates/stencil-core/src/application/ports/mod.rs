//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `stencil-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `FileWatcher`: Change notifications
//!   - `TemplateRenderer`: Template compilation and rendering
//!   - `InteractionProvider`: Asking the operator questions
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{
    CompiledTemplate, FileEntry, FileWatcher, Filesystem, InteractionProvider, ListOptions,
    TemplateHelpers, TemplateRenderer, WatchStream,
};
