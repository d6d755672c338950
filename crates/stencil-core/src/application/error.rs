//! Application layer errors.
//!
//! These errors represent failures in orchestration, not domain rules.
//! Domain errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Template source is malformed; raised before any interaction.
    #[error("Template '{template}' failed to compile: {reason}")]
    CompileFailed { template: String, reason: String },

    /// Template rendering failed after compilation.
    #[error("Template rendering failed: {reason}")]
    RenderingFailed { reason: String },

    /// The user dismissed a question the operation depends on.
    #[error("Cancelled by user: {what}")]
    Cancelled { what: String },

    /// The interaction provider itself failed.
    #[error("Interaction '{key}' failed: {reason}")]
    InteractionFailed { key: String, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Listing a workspace failed; the catalog stays loading until refreshed.
    #[error("Scan of workspace '{workspace}' failed: {reason}")]
    ScanFailed { workspace: String, reason: String },

    /// A watch subscription could not be created.
    #[error("Cannot watch {path}: {reason}")]
    WatchFailed { path: PathBuf, reason: String },

    #[error("Unknown workspace '{name}'")]
    WorkspaceNotFound { name: String },

    #[error("Template '{name}' not found")]
    TemplateNotFound { name: String },

    #[error("Template already exists at {path}")]
    TemplateExists { path: PathBuf },

    /// Shared state access failed (lock poisoned).
    #[error("Catalog state is unavailable")]
    StoreLockError,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::CompileFailed { template, .. } => vec![
                format!("Fix the syntax of template '{}'", template),
                "Check that every {{#block}} has a matching {{/block}}".into(),
            ],
            Self::Cancelled { .. } => vec![
                "Operation was cancelled".into(),
                "No files were written".into(),
            ],
            Self::InteractionFailed { .. } => vec![
                "The question could not be shown".into(),
                "Run in an interactive terminal or pass answers with --set KEY=VALUE".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::ScanFailed { workspace, .. } => vec![
                format!("Could not list templates in '{}'", workspace),
                "Check the workspace path and retry with a refresh".into(),
            ],
            Self::WorkspaceNotFound { name } => vec![
                format!("'{}' is not a registered workspace", name),
                "Pass the folder with --workspace".into(),
            ],
            Self::TemplateNotFound { name } => vec![
                format!("No template named '{}'", name),
                "Try: stencil list to see available templates".into(),
            ],
            Self::TemplateExists { path } => vec![
                format!("File already exists: {}", path.display()),
                "Choose a different template name".into(),
            ],
            Self::StoreLockError => vec![
                "The catalog is locked".into(),
                "Try again in a moment".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CompileFailed { .. } => ErrorCategory::Validation,
            Self::Cancelled { .. } => ErrorCategory::Cancelled,
            Self::WorkspaceNotFound { .. } | Self::TemplateNotFound { .. } => {
                ErrorCategory::NotFound
            }
            Self::TemplateExists { .. } => ErrorCategory::Validation,
            Self::RenderingFailed { .. }
            | Self::InteractionFailed { .. }
            | Self::FilesystemError { .. }
            | Self::ScanFailed { .. }
            | Self::WatchFailed { .. }
            | Self::StoreLockError => ErrorCategory::Internal,
        }
    }
}
