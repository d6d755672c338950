//! Template entity.
//!
//! A [`Template`] is a snapshot of one template file on disk: its logical
//! name, display label, raw source and absolute path. Content is read at
//! discovery (or refresh) time and is not kept live; the catalog replaces
//! records when the watcher reports changes.
//!
//! ## Naming
//!
//! ```text
//! /ws/.stencil/templates/component.tsx.hbs
//!                        └──────┬──────┘ name   = "component.tsx"
//!                        └────────┬────────┘ label = "component.tsx.hbs"
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::error::DomainError;

/// Default file extension marking a template (without the dot).
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "hbs";

/// A discovered template unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    /// Filename with the template extension stripped.
    pub name: String,
    /// Raw filename, used for display.
    pub label: String,
    /// Raw template source.
    pub code: String,
    /// Absolute path of the source file.
    pub path: PathBuf,
}

impl Template {
    /// Build a template record from a file path and its content.
    ///
    /// The extension is matched case-sensitively and only when it is the
    /// final one; a file without it keeps its full filename as name.
    pub fn from_file(
        path: impl Into<PathBuf>,
        code: impl Into<String>,
        extension: &str,
    ) -> Result<Self, DomainError> {
        let path = path.into();
        let label = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DomainError::InvalidTemplatePath {
                path: path.display().to_string(),
                reason: "path has no valid UTF-8 file name".into(),
            })?
            .to_string();

        let name = strip_extension(&label, extension).to_string();
        if name.is_empty() {
            return Err(DomainError::InvalidTemplateName {
                name: label,
                reason: "name is empty once the extension is removed".into(),
            });
        }

        Ok(Self {
            name,
            label,
            code: code.into(),
            path,
        })
    }

    /// Directory containing the template file; imports resolve against it.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// `true` if the template has no content at all.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

/// File name for a template called `name`.
pub fn template_file_name(name: &str, extension: &str) -> String {
    format!("{name}.{extension}")
}

/// Strip `.extension` from the end of `file_name` if present.
pub fn strip_extension<'a>(file_name: &'a str, extension: &str) -> &'a str {
    file_name
        .strip_suffix(extension)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(file_name)
}

/// `true` if `file_name` carries the template extension.
pub fn has_template_extension(file_name: &str, extension: &str) -> bool {
    strip_extension(file_name, extension).len() < file_name.len()
}
