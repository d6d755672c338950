// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they travel through broadcast channels)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("Invalid template name '{name}': {reason}")]
    InvalidTemplateName { name: String, reason: String },

    #[error("Invalid template path '{path}': {reason}")]
    InvalidTemplatePath { path: String, reason: String },

    #[error("Invalid directive key '{key}': {reason}")]
    InvalidDirectiveKey { key: String, reason: String },

    #[error("Directive '{key}' ({kind}) is missing its message")]
    MissingDirectiveMessage { key: String, kind: String },

    #[error("Unknown interaction kind '{0}'")]
    UnknownInteractionKind(String),
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidTemplateName { name, .. } => vec![
                format!("'{}' cannot be used as a template name", name),
                "Use a plain file name without path separators".into(),
                "Example: stencil template create component.tsx".into(),
            ],
            Self::InvalidDirectiveKey { key, .. } => vec![
                format!("Directive key '{}' is not a valid variable name", key),
                "Keys must be non-empty and contain no whitespace or dots".into(),
            ],
            Self::MissingDirectiveMessage { kind, .. } => vec![
                format!("Pass a question text as the second argument to '{}'", kind),
                format!("Example: {{{{{} \"key\" \"Question?\"}}}}", kind),
            ],
            Self::UnknownInteractionKind(_) => vec![
                "Supported kinds: confirm, prompt, select, multiselect, multiselect-native, multi-path"
                    .into(),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidTemplateName { .. }
            | Self::InvalidTemplatePath { .. }
            | Self::InvalidDirectiveKey { .. }
            | Self::MissingDirectiveMessage { .. }
            | Self::UnknownInteractionKind(_) => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}
