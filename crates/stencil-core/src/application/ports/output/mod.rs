//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `stencil-adapters` crate provides implementations.

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::application::services::{interactive::DirectiveRecorder, pipeline::ImportResolver};
use crate::domain::{InteractiveDirective, RenderContext, WatchEvent};
use crate::error::StencilResult;

/// A file found by [`Filesystem::list_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// File name without directories.
    pub name: String,
    /// Absolute path.
    pub path: PathBuf,
}

/// Filters applied while listing a directory tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Directory names that are not descended into.
    pub exclude_dirs: Vec<String>,
    /// Only files whose name ends with this suffix (e.g. `".hbs"`).
    pub include_suffix: Option<String>,
}

impl ListOptions {
    /// `true` if a file called `name` passes the suffix filter.
    pub fn includes(&self, name: &str) -> bool {
        self.include_suffix
            .as_deref()
            .is_none_or(|suffix| name.ends_with(suffix))
    }

    /// `true` if a directory called `name` must be skipped.
    pub fn excludes_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }
}

/// Port for filesystem operations.
///
/// Implemented by:
/// - `stencil_adapters::filesystem::LocalFilesystem` (production)
/// - `stencil_adapters::filesystem::MemoryFilesystem` (testing)
///
/// ## Design Notes
///
/// - Synchronous; async callers move work onto blocking tasks
/// - Failures are reported as `ApplicationError::FilesystemError`
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Recursively list files under `root`. A missing root yields an empty list.
    fn list_files(&self, root: &Path, options: &ListOptions) -> StencilResult<Vec<FileEntry>>;

    /// Read a whole file as UTF-8 text.
    fn read_text(&self, path: &Path) -> StencilResult<String>;

    /// Write (create or truncate) a file.
    fn write_text(&self, path: &Path, content: &str) -> StencilResult<()>;

    /// Move a file.
    fn rename(&self, from: &Path, to: &Path) -> StencilResult<()>;

    /// Delete a file.
    fn delete(&self, path: &Path) -> StencilResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> StencilResult<()>;
}

/// Stream of changes below a watched directory.
///
/// Dropping the stream ends the subscription; `guard` keeps whatever native
/// resource produces the events alive until then.
pub struct WatchStream {
    events: mpsc::UnboundedReceiver<WatchEvent>,
    _guard: Box<dyn Any + Send>,
}

impl WatchStream {
    pub fn new(events: mpsc::UnboundedReceiver<WatchEvent>, guard: impl Any + Send) -> Self {
        Self {
            events,
            _guard: Box::new(guard),
        }
    }

    /// Next event, or `None` once the producer is gone.
    pub async fn next(&mut self) -> Option<WatchEvent> {
        self.events.recv().await
    }
}

impl std::fmt::Debug for WatchStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchStream").finish_non_exhaustive()
    }
}

/// Port for filesystem change notifications.
///
/// Implemented by:
/// - `stencil_adapters::watcher::NotifyWatcher` (production)
/// - `stencil_adapters::watcher::ChannelWatcher` (testing)
pub trait FileWatcher: Send + Sync {
    /// Watch `root` recursively.
    fn watch(&self, root: &Path) -> StencilResult<WatchStream>;
}

/// Port for asking the operator a question.
///
/// Implemented by:
/// - `stencil_cli::interaction::TerminalInteraction` (dialoguer prompts)
/// - `stencil_adapters::interaction::PresetInteraction` (answers by key)
/// - `stencil_adapters::interaction::ScriptedInteraction` (testing)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InteractionProvider: Send + Sync {
    /// Ask the question described by `directive`.
    ///
    /// `Ok(None)` means the user dismissed it. `Err` means the interaction
    /// itself could not take place and aborts the whole resolution.
    async fn ask(&self, directive: &InteractiveDirective) -> StencilResult<Option<Value>>;
}

/// Helpers a renderer must expose to template code.
#[derive(Clone)]
pub struct TemplateHelpers {
    /// One helper per interaction kind.
    pub directives: DirectiveRecorder,
    /// The `import` helper.
    pub imports: Arc<ImportResolver>,
}

impl TemplateHelpers {
    pub fn new(directives: DirectiveRecorder, imports: ImportResolver) -> Self {
        Self {
            directives,
            imports: Arc::new(imports),
        }
    }
}

/// Port for template compilation.
///
/// Implemented by:
/// - `stencil_adapters::renderer::HandlebarsRenderer`
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRenderer: Send + Sync {
    /// Parse `source` and bind `helpers`. Malformed source is reported as
    /// `ApplicationError::CompileFailed`.
    fn compile(
        &self,
        name: &str,
        source: &str,
        helpers: TemplateHelpers,
    ) -> StencilResult<Box<dyn CompiledTemplate>>;
}

/// A parsed template ready to be rendered any number of times.
#[cfg_attr(test, mockall::automock)]
pub trait CompiledTemplate: Send + Sync {
    fn render(&self, context: &RenderContext) -> StencilResult<String>;
}
