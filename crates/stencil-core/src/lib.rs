//! Stencil Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Stencil,
//! an interactive file-template engine with a per-workspace template
//! catalog, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           stencil-cli (CLI)             │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (TemplatePipeline, TemplateCatalog,    │
//! │   TemplateService, InteractiveSession)  │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Filesystem, FileWatcher, Renderer,     │
//! │  InteractionProvider)                   │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     stencil-adapters (Infrastructure)   │
//! │ (LocalFilesystem, HandlebarsRenderer,   │
//! │  NotifyWatcher, PresetInteraction)      │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Template, Directives, CatalogState)    │
//! │         No External Dependencies        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::{path::Path, sync::Arc};
//! use stencil_core::prelude::*;
//!
//! # async fn demo(
//! #     renderer: Arc<dyn TemplateRenderer>,
//! #     filesystem: Arc<dyn Filesystem>,
//! #     interaction: Arc<dyn InteractionProvider>,
//! # ) -> StencilResult<()> {
//! // 1. Discover templates
//! let catalog = TemplateCatalog::new(filesystem.clone(), None, DiscoveryOptions::default());
//! catalog.add_workspace("app", "/work/app")?;
//! let templates = catalog.templates("app").await?;
//!
//! // 2. Generate a file (asks the operator as the template requires)
//! let pipeline = TemplatePipeline::new(renderer, filesystem, interaction);
//! pipeline.generate(&templates[0], Path::new("/work/app/src/new.rs")).await?;
//! # Ok(()) }
//! ```

// Re-export domain layer (stable, well-defined API)
pub mod domain;

// Re-export application layer (orchestration logic)
pub mod application;

// Re-export error types
pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        CancelPolicy, CatalogChange, InteractiveSession, RenderOutput, TemplateCatalog,
        TemplatePipeline, TemplateService,
        ports::{
            CompiledTemplate, FileWatcher, Filesystem, InteractionProvider, TemplateHelpers,
            TemplateRenderer,
        },
    };
    pub use crate::domain::{
        Answers, BuiltinValues, CatalogState, DiscoveryMode, DiscoveryOptions, Interaction,
        InteractionKind, InteractiveDirective, RenderContext, Template, TreeItem, TreeNode,
        WatchEvent,
    };
    pub use crate::error::{StencilError, StencilResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
