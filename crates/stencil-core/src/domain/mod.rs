// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Stencil.
//!
//! This module contains pure logic with no I/O. Filesystem access,
//! rendering, watching and user interaction are handled via ports (traits)
//! defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or terminal calls
//! - **Explicit state**: The catalog lifecycle is an enum, not flags
//! - **Tagged unions**: Interaction kinds carry their own arguments
//!
// Public API - what the world sees
pub mod entities;
pub mod error;

// Private implementation details - not visible outside domain
mod validation;

// Re-exports for convenience
pub use entities::{
    catalog::{
        CatalogAction, CatalogState, DEFAULT_CATALOG_DIR, DEFAULT_EXCLUDED_DIRS, DiscoveryMode,
        DiscoveryOptions, WatchEvent,
    },
    directive::{Answers, DirectiveRegistry, Interaction, InteractionKind, InteractiveDirective},
    render_context::{BuiltinValues, DATE_FORMAT, RenderContext, current_user},
    template::{
        DEFAULT_TEMPLATE_EXTENSION, Template, has_template_extension, strip_extension,
        template_file_name,
    },
    tree::{TreeItem, TreeNode},
};

pub use error::{DomainError, ErrorCategory};

pub use validation::DomainValidator;
