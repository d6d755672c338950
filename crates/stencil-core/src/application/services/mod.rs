//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "generate a file from a template" or
//! "list the templates of a workspace".

pub mod catalog;
pub mod interactive;
pub mod pipeline;
pub mod template_service;

pub use catalog::{CatalogChange, TemplateCatalog, scan_workspace};
pub use interactive::{DirectiveRecorder, InteractiveSession};
pub use pipeline::{
    CancelPolicy, ImportGuard, ImportResolver, MAX_IMPORT_DEPTH, RenderOutput, TemplatePipeline,
};
pub use template_service::TemplateService;
